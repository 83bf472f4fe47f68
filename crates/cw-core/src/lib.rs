//! Colony Watch core library.
//!
//! Predictive status engine for colony simulations:
//! - Rate estimation, cut-table classification, and time-to-threshold
//!   forecasting ([`forecast`])
//! - Domain adapters for stockpiles and colonist mood ([`adapters`])
//! - Worst-status-wins health report ([`health`])
//! - Host seams: snapshot store and floor lookup ([`store`])
//!
//! The binary entry point is in `main.rs`.

pub mod adapters;
pub mod engine;
pub mod exit_codes;
pub mod fixture;
pub mod forecast;
pub mod health;
pub mod logging;
pub mod schema;
pub mod store;

pub use engine::Engine;
