use dawnr::intervals::{GrowthPolicy, RampParameters};
use proptest::prelude::*;

/// Ramp inputs long enough that the session always reaches the cap.
#[derive(Debug, Clone)]
struct RampCase {
    base_ms: f64,
    cap_ms: f64,
    steps: u32,
    total_ms: f64,
}

fn ramp_case() -> impl Strategy<Value = RampCase> {
    (1_000.0..10_000.0f64, 1.05..6.0f64, 1u32..40).prop_flat_map(|(base_ms, span, steps)| {
        let cap_ms = base_ms * span;
        let min_total = f64::from(steps + 2) * cap_ms;
        (min_total..min_total + 3_600_000.0).prop_map(move |total_ms| RampCase {
            base_ms,
            cap_ms,
            steps,
            total_ms,
        })
    })
}

/// Any growth policy, including ones no session length can accommodate.
fn any_growth() -> impl Strategy<Value = GrowthPolicy> {
    prop_oneof![
        (1u32..1_200).prop_map(GrowthPolicy::FixedSteps),
        (1.000_001..4.0f64).prop_map(GrowthPolicy::BoundedRatio),
    ]
}

proptest! {
    #[test]
    fn test_accepted_ramps_cover_the_session(
        base_ms in 1_000.0..60_000.0f64,
        cap_ms in 1_000.0..60_000.0f64,
        growth in any_growth(),
        total_ms in 1.0..7_200_000.0f64,
    ) {
        let Ok(params) = RampParameters::new(base_ms, cap_ms, growth, total_ms, 0.0) else {
            return Ok(());
        };
        let intervals = params.intervals_ms();
        let sum: f64 = intervals.iter().sum();

        prop_assert!(!intervals.is_empty());
        prop_assert!(params.steps() <= 1_000);
        let slack = 1e-6 * total_ms.max(cap_ms);
        prop_assert!(
            (sum - total_ms).abs() <= 1.5 * cap_ms + slack,
            "sum {} for total {} (cap {}, {:?})", sum, total_ms, cap_ms, growth
        );
    }

    #[test]
    fn test_intervals_grow_from_base_to_cap(case in ramp_case()) {
        let params = RampParameters::new(
            case.base_ms,
            case.cap_ms,
            GrowthPolicy::FixedSteps(case.steps),
            case.total_ms,
            0.0,
        )
        .unwrap();
        let intervals = params.intervals_ms();

        prop_assert!(intervals.len() > case.steps as usize);
        prop_assert!((intervals[0] - case.base_ms).abs() < 1e-9);
        prop_assert!(intervals.windows(2).all(|w| w[0] <= w[1] + 1e-9));
        prop_assert!(intervals.iter().all(|&v| v <= case.cap_ms));
        prop_assert!((intervals.last().unwrap() - case.cap_ms).abs() < 1e-6);
    }

    #[test]
    fn test_intervals_cover_the_session(case in ramp_case()) {
        let params = RampParameters::new(
            case.base_ms,
            case.cap_ms,
            GrowthPolicy::FixedSteps(case.steps),
            case.total_ms,
            0.0,
        )
        .unwrap();
        let sum: f64 = params.intervals_ms().iter().sum();

        // The session ends within one and a half cap intervals of the target
        let slack = 1e-6 * case.total_ms;
        prop_assert!(sum <= case.total_ms + slack, "sum {} > total {}", sum, case.total_ms);
        prop_assert!(
            sum >= case.total_ms - 1.5 * case.cap_ms - slack,
            "sum {} too short for total {}", sum, case.total_ms
        );
    }

    #[test]
    fn test_bounded_ratio_respects_bound(
        base_ms in 1_000.0..10_000.0f64,
        span in 1.05..6.0f64,
        r_max in 1.01..2.0f64,
    ) {
        let cap_ms = base_ms * span;
        let params = RampParameters::new(
            base_ms,
            cap_ms,
            GrowthPolicy::BoundedRatio(r_max),
            cap_ms * 400.0,
            0.0,
        )
        .unwrap();

        let n = params.steps();
        prop_assert!(n >= 1);
        prop_assert!(params.ratio() <= r_max);
        // One step fewer would break the bound
        if n > 1 {
            prop_assert!(span.powf(1.0 / f64::from(n - 1)) > r_max);
        }

        let intervals = params.intervals_ms();
        for pair in intervals.windows(2) {
            prop_assert!(pair[1] / pair[0] <= r_max + 1e-9);
        }
    }

    #[test]
    fn test_constant_ramp(interval_ms in 1_000.0..60_000.0f64, breaths in 1u32..200) {
        let total_ms = interval_ms * f64::from(breaths);
        let params = RampParameters::new(
            interval_ms,
            interval_ms,
            GrowthPolicy::BoundedRatio(1.08),
            total_ms,
            0.0,
        )
        .unwrap();

        prop_assert_eq!(params.steps(), 0);
        let intervals = params.intervals_ms();
        prop_assert_eq!(intervals.len(), breaths as usize);
        prop_assert!(intervals.iter().all(|&v| v == interval_ms));
    }
}
