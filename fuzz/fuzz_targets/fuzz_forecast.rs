//! Fuzz target for rate estimation, classification, and horizon forecasting.
//!
//! Arbitrary floats (NaN and infinities included) must produce either a
//! forecast or an error, never a panic.

#![no_main]

use arbitrary::Arbitrary;
use cw_common::{Band, CutEntry, Lookback, ModelKind, Snapshot, TimeBasis};
use cw_core::forecast::{CutTable, EventForecaster, RateCalculator};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    samples: Vec<(u16, f64)>,
    current: f64,
    floor: f64,
    fallback: f64,
    window: u8,
    fixed_floor: bool,
}

fuzz_target!(|input: Input| {
    let mut ts = 0u64;
    let history: Vec<Snapshot> = input
        .samples
        .iter()
        .map(|(dt, value)| {
            ts += u64::from(*dt);
            Snapshot::new(ts, *value)
        })
        .collect();

    let lookback = match input.window {
        0 => Lookback::All,
        n => Lookback::Samples(usize::from(n)),
    };
    let basis = TimeBasis::default();
    let model = if input.fixed_floor {
        ModelKind::FixedFloor
    } else {
        ModelKind::ZeroFloor
    };

    let rate = RateCalculator::new(lookback, &basis, input.fallback).estimate(&history);
    let _ = EventForecaster::new(model, basis).forecast(input.current, &rate, input.floor);

    if let Ok(table) = CutTable::new(
        "fuzz",
        vec![
            CutEntry::distance(Band::Critical, 0.0),
            CutEntry::value(Band::Warning, input.fallback),
        ],
        Band::Stable,
        model,
    ) {
        let _ = table.classify(input.current, input.floor);
    }
});
