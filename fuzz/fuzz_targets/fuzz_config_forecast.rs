//! Fuzz target for forecast.json parsing and adapter construction.
//!
//! Parsing may fail and construction may reject the config, but neither
//! may panic.

#![no_main]

use cw_config::ForecastConfig;
use cw_core::Engine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(config) = ForecastConfig::parse_json(data) {
        let _ = Engine::from_config(&config);
    }
});
