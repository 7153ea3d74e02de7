//! Property tests for participation logic and injector validation
#![allow(clippy::unwrap_used)]

use fault::{Decision, ErrorInjector, Fault, FaultOptions, FixedRandom, Injector, PathFilter};
use proptest::prelude::*;

fn path_strategy() -> impl Strategy<Value = String> {
    "/[a-z]{0,6}(/[a-z]{1,4})?/?"
}

proptest! {
    #[test]
    fn disabled_fault_never_fires(
        path in path_strategy(),
        percent in 0.0_f64..=100.0,
        draw in 0.0_f64..100.0,
    ) {
        let fault = Fault::new(
            FaultOptions::new(percent, Injector::reject())
                .with_enabled(false)
                .with_random(FixedRandom::new(draw)),
        );
        prop_assert_eq!(fault.evaluate(&path), Decision::Disabled);
    }

    #[test]
    fn blacklisted_paths_never_fire(
        path in path_strategy(),
        percent in 0.0_f64..=100.0,
        whitelist_it in any::<bool>(),
    ) {
        let mut options = FaultOptions::new(percent, Injector::error(500))
            .with_blacklist([path.clone()]);
        if whitelist_it {
            options = options.with_whitelist([path.clone()]);
        }
        let fault = Fault::new(options);
        prop_assert_eq!(fault.evaluate(&path), Decision::Blacklisted);
    }

    #[test]
    fn paths_outside_whitelist_never_fire(
        path in path_strategy(),
        other in path_strategy(),
    ) {
        prop_assume!(path != other);
        let fault = Fault::new(
            FaultOptions::new(100.0, Injector::reject()).with_whitelist([other]),
        );
        prop_assert_eq!(fault.evaluate(&path), Decision::NotWhitelisted);
    }

    #[test]
    fn sampling_fires_only_below_percent(
        percent in 0.0_f64..=100.0,
        draw in 0.0_f64..100.0,
    ) {
        let fault = Fault::new(
            FaultOptions::new(percent, Injector::reject()).with_random(FixedRandom::new(draw)),
        );
        let expected = if draw < percent { Decision::Fire } else { Decision::SampledOut };
        prop_assert_eq!(fault.evaluate("/"), expected);
    }

    #[test]
    fn out_of_range_percent_is_inert(percent in prop_oneof![
        -1.0e6_f64..-f64::EPSILON,
        100.0_f64 + 1.0e-9..1.0e6,
    ]) {
        let fault = Fault::new(FaultOptions::new(percent, Injector::reject()));
        prop_assert!(fault.is_inert());
        prop_assert_eq!(fault.evaluate("/"), Decision::Disabled);
    }

    #[test]
    fn status_validity_matches_reason_phrase(code in any::<u16>()) {
        let has_reason = axum::http::StatusCode::from_u16(code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .is_some();
        prop_assert_eq!(ErrorInjector::try_new(code).is_ok(), has_reason);
        prop_assert_eq!(ErrorInjector::new(code).is_inert(), !has_reason);
    }

    #[test]
    fn filter_blacklist_always_wins(
        path in path_strategy(),
        extra in prop::collection::vec(path_strategy(), 0..4),
    ) {
        let mut whitelist = extra;
        whitelist.push(path.clone());
        let filter = PathFilter::new([path.clone()], whitelist);
        prop_assert!(!filter.allows(&path));
    }
}
