//! Fuzz target for colony fixture parsing and the full health pass.

#![no_main]

use cw_config::ForecastConfig;
use cw_core::fixture::ColonyFixture;
use cw_core::store::DEFAULT_RETENTION;
use cw_core::Engine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(fixture) = ColonyFixture::parse_json(data) else {
        return;
    };
    let Ok(store) = fixture.to_store(DEFAULT_RETENTION) else {
        return;
    };
    let Ok(engine) = Engine::from_config(&ForecastConfig::default()) else {
        return;
    };
    if let Ok(resources) = engine.forecast_resources(&store, |key| fixture.current_value(key)) {
        let mood = match engine.assess_mood(&store, &fixture.floors, &[]) {
            Ok(mood) => mood,
            Err(_) => return,
        };
        let _ = engine.health(&resources, fixture.subsystems.clone(), &mood);
    }
});
