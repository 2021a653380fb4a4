//! Property tests for run identity.

use chrono::NaiveDate;
use proptest::prelude::*;
use rollsim_runner::{fingerprint, RunConfig};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn arb_config() -> impl Strategy<Value = RunConfig> {
    (
        0u64..3650,
        1u64..3650,
        100_000.0..100_000_000.0f64,
        0.01..0.5f64,
    )
        .prop_map(|(start_offset, len, cash, participation)| {
            let start = d(2015, 1, 1) + chrono::Days::new(start_offset);
            let mut config = RunConfig::new(start, start + chrono::Days::new(len));
            config.starting_cash = cash;
            config.participation.adv_participation = participation;
            config
        })
}

proptest! {
    /// Fingerprinting is a pure function of the config.
    #[test]
    fn fingerprint_is_deterministic(config in arb_config()) {
        prop_assert_eq!(fingerprint(&config), fingerprint(&config.clone()));
    }

    /// Ids are fixed-width lowercase hex, safe for directory names.
    #[test]
    fn fingerprint_is_path_safe_hex(config in arb_config()) {
        let id = fingerprint(&config);
        prop_assert_eq!(id.as_str().len(), 64);
        prop_assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// Tweaking the cash by any nonzero amount changes the id.
    #[test]
    fn cash_perturbation_changes_the_id(config in arb_config(), delta in 1.0..1_000.0f64) {
        let mut other = config.clone();
        other.starting_cash += delta;
        prop_assert_ne!(fingerprint(&config), fingerprint(&other));
    }
}
