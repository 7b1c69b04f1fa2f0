use contracts::{EventType, KernelConfig, LifecycleState, Phase, RegistryError};
use drift_core::manifest::society_manifest;
use drift_core::DriftKernel;
use proptest::prelude::*;

fn kernel() -> DriftKernel {
    DriftKernel::new(&society_manifest(), KernelConfig::default()).expect("valid manifest")
}

fn all_keys() -> Vec<String> {
    society_manifest()
        .entries
        .iter()
        .map(|entry| entry.key.clone())
        .collect()
}

#[test]
fn property_1_lifecycle_is_monotonic() {
    let mut kernel = kernel();
    kernel.read("timing_window").expect("known key");
    kernel.rewrite("timing_window").expect("known key");

    // No sequence of further operations regresses the state.
    kernel.read("timing_window").expect("known key");
    kernel.rewrite("timing_window").expect("known key");
    assert_eq!(
        kernel.describe("timing_window").expect("known key").state,
        LifecycleState::Rewritten
    );

    kernel.reset_all();
    assert_eq!(
        kernel.describe("timing_window").expect("known key").state,
        LifecycleState::Unread
    );
}

#[test]
fn property_2_read_gate_blocks_unread_rewrites() {
    let mut kernel = kernel();
    for key in all_keys() {
        let before = kernel.get_value(&key).expect("known key");
        assert!(!kernel.rewrite(&key).expect("known key").applied());
        assert_eq!(kernel.get_value(&key).expect("known key"), before);
    }
    assert_eq!(kernel.progress_fraction(), 0.0);
}

#[test]
fn property_3_first_time_reveals_match_distinct_keys_read() {
    let mut kernel = kernel();
    let reveals = kernel.subscribe_filtered([EventType::DefaultRead]);

    for key in ["timing_window", "coyote_time", "timing_window", "coyote_time"] {
        kernel.read(key).expect("known key");
    }

    assert_eq!(kernel.drain(&reveals).len(), 2);
    assert_eq!(kernel.read_count(), 2);
}

#[test]
fn property_4_progress_fraction_reaches_exactly_one_and_zero() {
    let mut kernel = kernel();
    let mut previous = kernel.progress_fraction();
    for key in all_keys() {
        kernel.read(&key).expect("known key");
        kernel.rewrite(&key).expect("known key");
        let current = kernel.progress_fraction();
        assert!(current >= previous);
        previous = current;
    }
    assert_eq!(kernel.progress_fraction(), 1.0);
    assert_eq!(kernel.phase(), Phase::Restored);

    kernel.reset_all();
    assert_eq!(kernel.progress_fraction(), 0.0);
}

#[test]
fn property_5_unknown_key_does_not_crash_the_calling_loop() {
    let mut kernel = kernel();
    for _ in 0..3 {
        assert_eq!(
            kernel.get_value("nonexistent"),
            Err(RegistryError::UnknownKey("nonexistent".to_string()))
        );
        assert_eq!(
            kernel.read("nonexistent").err(),
            Some(RegistryError::UnknownKey("nonexistent".to_string()))
        );
    }
    kernel.read("timing_window").expect("known key");
    assert!(kernel.rewrite("timing_window").expect("known key").applied());
}

proptest! {
    // Phase depends on the rewritten count alone, never on key identity
    // or order.
    #[test]
    fn property_6_phase_is_order_independent(permutation in proptest::sample::subsequence(all_keys(), 0..=15).prop_shuffle()) {
        let mut shuffled = kernel();
        for key in &permutation {
            shuffled.read(key).expect("known key");
            shuffled.rewrite(key).expect("known key");
        }

        let mut ordered = kernel();
        let mut sorted = permutation.clone();
        sorted.sort();
        for key in &sorted {
            ordered.read(key).expect("known key");
            ordered.rewrite(key).expect("known key");
        }

        prop_assert_eq!(shuffled.phase(), ordered.phase());
        prop_assert!((shuffled.drift() - ordered.drift()).abs() < 1e-9);
        prop_assert_eq!(shuffled.progress_fraction(), ordered.progress_fraction());
    }

    // Two zones on the same key: advancing one clock never moves the
    // other zone's scalar.
    #[test]
    fn property_7_zone_isolation(ticks in proptest::collection::vec(0.01f64..0.5, 1..16)) {
        let mut kernel = kernel();
        let advanced = kernel.register_zone("timing_window", 2.0).expect("known key");
        let idle = kernel.register_zone("timing_window", 2.0).expect("known key");

        kernel.read("timing_window").expect("known key");
        kernel.rewrite("timing_window").expect("known key");

        let mut previous = kernel.zone_scalar(advanced).expect("zone");
        for delta in ticks {
            kernel.advance_zone(advanced, delta);
            let current = kernel.zone_scalar(advanced).expect("zone");
            prop_assert!(current <= previous);
            prop_assert!(current >= 0.0);
            previous = current;
            prop_assert_eq!(kernel.zone_scalar(idle), Some(1.0));
        }
    }

    // Drift stays inside [0, 1] whatever mix of progress sources fires.
    #[test]
    fn property_8_drift_stays_clamped(rewrites in 0usize..15, chapters in 0u32..24, rules in 0usize..8) {
        let mut kernel = kernel();
        let keys = all_keys();
        for key in keys.iter().take(rewrites) {
            kernel.read(key).expect("known key");
            kernel.rewrite(key).expect("known key");
        }
        for _ in 0..chapters {
            kernel.advance_chapter();
        }
        for index in 0..rules {
            kernel.restore_civic_rule(&format!("rule:{index}"));
        }
        prop_assert!((0.0..=1.0).contains(&kernel.drift()));
        prop_assert_eq!(
            kernel.phase(),
            drift_core::ProgressTracker::phase_for(kernel.drift())
        );
    }
}

#[test]
fn scenario_two_key_manifest_walkthrough() {
    use contracts::{DefaultCategory, Manifest, ManifestEntry};

    let manifest = Manifest::new(vec![
        ManifestEntry {
            key: "a".to_string(),
            label: "A".to_string(),
            description: "first".to_string(),
            category: DefaultCategory::Timing,
            initial_value: 0.2,
            target_value: 0.5,
        },
        ManifestEntry {
            key: "b".to_string(),
            label: "B".to_string(),
            description: "second".to_string(),
            category: DefaultCategory::Sensory,
            initial_value: 1.0,
            target_value: 0.0,
        },
    ]);
    let mut kernel = DriftKernel::new(&manifest, KernelConfig::default()).expect("valid manifest");

    assert_eq!(kernel.get_value("a"), Ok(0.2));
    assert_eq!(kernel.phase(), Phase::Corrupted);

    let description = kernel.read("a").expect("known key");
    assert_eq!(description.state, LifecycleState::Read);

    assert!(!kernel.rewrite("b").expect("known key").applied());
    assert_eq!(kernel.get_value("b"), Ok(1.0));

    assert!(kernel.rewrite("a").expect("known key").applied());
    assert_eq!(kernel.get_value("a"), Ok(0.5));
    assert_eq!(kernel.progress_fraction(), 0.5);

    kernel.read("b").expect("known key");
    assert!(kernel.rewrite("b").expect("known key").applied());
    assert_eq!(kernel.get_value("b"), Ok(0.0));
    assert_eq!(kernel.progress_fraction(), 1.0);
    assert_eq!(kernel.phase(), Phase::Restored);
}
