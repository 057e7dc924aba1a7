//! Integration test: Druid presets through the runner
//!
//! Checks that the balance and feral rotations actually use their toolkit.

use sod_classes::{build_player, PlayerPresets};
use sod_core::{EncounterConfig, SimConfig, SimResult, SimRunner};

fn run(config: &sod_classes::PlayerConfig) -> SimResult {
    let sim_config = SimConfig {
        iterations: 10,
        seed: 3,
        capture_log: false,
        encounter: EncounterConfig {
            duration_seconds: 120.0,
            duration_variation_seconds: 0.0,
            ..EncounterConfig::for_player_level(60)
        },
    };
    SimRunner::new(sim_config)
        .run(|sim| build_player(sim, config))
        .unwrap()
}

fn casts(result: &SimResult, label: &str) -> f64 {
    result
        .spells
        .iter()
        .filter(|s| s.label == label)
        .map(|s| s.casts)
        .sum()
}

#[test]
fn test_balance_rotation() {
    let result = run(&PlayerPresets::balance_druid_60());
    assert!(result.dps.mean > 0.0);
    assert!(casts(&result, "Moonfire") > 0.0);
    assert!(casts(&result, "Sunfire") > 0.0);
    assert!(casts(&result, "Wrath") + casts(&result, "Starfire") > 0.0);
    // Moonfire and Sunfire tick
    let ticks: f64 = result
        .spells
        .iter()
        .filter(|s| s.label == "Moonfire" || s.label == "Sunfire")
        .map(|s| s.ticks)
        .sum();
    assert!(ticks > 0.0);
}

#[test]
fn test_feral_rotation() {
    let result = run(&PlayerPresets::feral_druid_60());
    assert!(result.dps.mean > 0.0);
    // Auto attacks and at least one combo point builder
    let builders = casts(&result, "Shred") + casts(&result, "Mangle (Cat)") + casts(&result, "Rake");
    assert!(builders > 0.0);
    assert!(result.resources.iter().any(|r| r.kind == sod_core::unit::ResourceKind::Energy));
}

#[test]
fn test_feral_outdamages_naked_cat() {
    let geared = run(&PlayerPresets::feral_druid_60());
    let mut naked = PlayerPresets::feral_druid_60();
    naked.gear = Default::default();
    naked.item_sets.clear();
    let naked = run(&naked);
    assert!(geared.dps.mean > naked.dps.mean);
}
