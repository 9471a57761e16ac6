//! Breath-cycle interval generation.
//!
//! A pranayama session starts with short breaths and lengthens them
//! geometrically until a cap is reached, then holds the cap until the session
//! duration is covered. The growth is described either by a fixed number of
//! growth steps or by the largest ratio tolerated between two breaths.

use anyhow::{Result, bail};

use crate::constants::MAXIMUM_GROWTH_STEPS;

/// How the interval grows from the base towards the cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthPolicy {
    /// Reach the cap in exactly `n` multiplications.
    FixedSteps(u32),
    /// Use the fewest steps whose per-step ratio does not exceed the bound.
    BoundedRatio(f64),
}

/// Validated parameters of a breathing ramp. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RampParameters {
    base_interval_ms: f64,
    cap_interval_ms: f64,
    growth: GrowthPolicy,
    total_duration_ms: f64,
    pre_delay_ms: f64,
}

impl RampParameters {
    /// Build ramp parameters, rejecting values no sequence can be generated from.
    pub fn new(
        base_interval_ms: f64,
        cap_interval_ms: f64,
        growth: GrowthPolicy,
        total_duration_ms: f64,
        pre_delay_ms: f64,
    ) -> Result<Self> {
        for (name, value) in [
            ("base interval", base_interval_ms),
            ("cap interval", cap_interval_ms),
            ("total duration", total_duration_ms),
            ("pre-delay", pre_delay_ms),
        ] {
            if !value.is_finite() {
                bail!("Ramp {name} must be a finite number, got {value}");
            }
        }

        if base_interval_ms <= 0.0 {
            bail!("Ramp base interval must be positive, got {base_interval_ms} ms");
        }
        if cap_interval_ms <= 0.0 {
            bail!("Ramp cap interval must be positive, got {cap_interval_ms} ms");
        }
        if total_duration_ms <= 0.0 {
            bail!("Ramp total duration must be positive, got {total_duration_ms} ms");
        }
        if pre_delay_ms < 0.0 {
            bail!("Ramp pre-delay cannot be negative, got {pre_delay_ms} ms");
        }

        match growth {
            GrowthPolicy::FixedSteps(0) => {
                bail!("Fixed growth needs at least one step");
            }
            GrowthPolicy::BoundedRatio(r_max) if !r_max.is_finite() => {
                bail!("Growth ratio bound must be a finite number, got {r_max}");
            }
            GrowthPolicy::BoundedRatio(r_max) if r_max <= 1.0 && cap_interval_ms > base_interval_ms => {
                bail!(
                    "Growth ratio bound must be greater than 1 to grow from {base_interval_ms} ms to {cap_interval_ms} ms, got {r_max}"
                );
            }
            _ => {}
        }

        let params = Self {
            base_interval_ms,
            cap_interval_ms,
            growth,
            total_duration_ms,
            pre_delay_ms,
        };
        params.check_growth_fits()?;
        Ok(params)
    }

    /// Reject growth that needs too many steps or outlasts the session.
    fn check_growth_fits(&self) -> Result<()> {
        if !self.grows() {
            return Ok(());
        }

        let span = self.cap_interval_ms / self.base_interval_ms;
        let needed_steps = match self.growth {
            GrowthPolicy::FixedSteps(n) => f64::from(n),
            GrowthPolicy::BoundedRatio(r_max) => (span.ln() / r_max.ln()).ceil(),
        };
        if !(needed_steps <= f64::from(MAXIMUM_GROWTH_STEPS)) {
            bail!(
                "Ramp growth from {} ms to {} ms needs {} steps, more than the maximum of {}",
                self.base_interval_ms,
                self.cap_interval_ms,
                needed_steps,
                MAXIMUM_GROWTH_STEPS
            );
        }

        let growth_ms = self.growth_time_ms();
        if growth_ms > self.total_duration_ms {
            bail!(
                "Ramp growth from {} ms to {} ms in {} steps takes {:.0} ms, longer than the {} ms session",
                self.base_interval_ms,
                self.cap_interval_ms,
                self.steps(),
                growth_ms,
                self.total_duration_ms
            );
        }
        Ok(())
    }

    pub fn base_interval_ms(&self) -> f64 {
        self.base_interval_ms
    }

    pub fn cap_interval_ms(&self) -> f64 {
        self.cap_interval_ms
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.total_duration_ms
    }

    pub fn pre_delay_ms(&self) -> f64 {
        self.pre_delay_ms
    }

    /// Whether the sequence grows at all (the base is below the cap).
    fn grows(&self) -> bool {
        self.base_interval_ms < self.cap_interval_ms
    }

    /// Number of growth steps the policy resolves to. Zero for a constant ramp.
    pub fn steps(&self) -> u32 {
        if !self.grows() {
            return 0;
        }

        let span = self.cap_interval_ms / self.base_interval_ms;
        match self.growth {
            GrowthPolicy::FixedSteps(n) => n,
            GrowthPolicy::BoundedRatio(r_max) => {
                // Smallest n with span^(1/n) <= r_max, i.e. n >= ln(span) / ln(r_max).
                let mut n = ((span.ln() / r_max.ln()).ceil() as u32).max(1);
                // Guard against floating point landing one step off either way.
                while n > 1 && span.powf(1.0 / f64::from(n - 1)) <= r_max {
                    n -= 1;
                }
                while span.powf(1.0 / f64::from(n)) > r_max {
                    n += 1;
                }
                n
            }
        }
    }

    /// Per-step growth ratio. Exactly 1.0 for a constant ramp.
    pub fn ratio(&self) -> f64 {
        if !self.grows() {
            return 1.0;
        }
        let span = self.cap_interval_ms / self.base_interval_ms;
        span.powf(1.0 / f64::from(self.steps()))
    }

    /// The geometric series from the base up to and including one cap-length
    /// breath: `(a0 - r * aN) / (1 - r)`. Zero for a constant ramp.
    fn growth_time_ms(&self) -> f64 {
        if !self.grows() {
            return 0.0;
        }
        let r = self.ratio();
        (self.base_interval_ms - r * self.cap_interval_ms) / (1.0 - r)
    }

    /// The breath intervals of the whole session, in milliseconds.
    ///
    /// Non-decreasing, starting at the base interval and never above the cap.
    pub fn intervals_ms(&self) -> Vec<f64> {
        let a0 = self.base_interval_ms;
        let a_n = self.cap_interval_ms;

        if !self.grows() {
            let count = ((self.total_duration_ms / a_n).round() as usize).max(1);
            return vec![a_n; count];
        }

        let n = self.steps();
        let r = self.ratio();

        // Time spent growing is subtracted from the total; the remainder is
        // filled with cap-length breaths.
        let count =
            ((self.total_duration_ms - self.growth_time_ms()) / a_n).round() + f64::from(n);
        let count = if count.is_finite() && count >= 1.0 {
            count as usize
        } else {
            1
        };

        (0..count)
            .map(|i| (a0 * r.powi(i as i32)).min(a_n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::test_constants::*;

    fn scenario(growth: GrowthPolicy) -> RampParameters {
        RampParameters::new(
            TEST_BASE_INTERVAL_MS,
            TEST_CAP_INTERVAL_MS,
            growth,
            TEST_PRANAYAMA_DURATION_MS,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_fixed_steps_scenario() {
        let params = scenario(GrowthPolicy::FixedSteps(TEST_FIXED_STEPS));
        let intervals = params.intervals_ms();

        assert_eq!(intervals[0], TEST_BASE_INTERVAL_MS);
        assert_eq!(*intervals.last().unwrap(), TEST_CAP_INTERVAL_MS);
        assert!(intervals.windows(2).all(|w| w[0] <= w[1]));
        assert!(intervals.iter().all(|&v| v <= TEST_CAP_INTERVAL_MS));

        // The cap is reached after the growth steps and held from then on
        assert!(intervals[TEST_FIXED_STEPS as usize..]
            .iter()
            .all(|&v| (v - TEST_CAP_INTERVAL_MS).abs() < 1e-6));
        assert!(intervals[TEST_FIXED_STEPS as usize - 1] < TEST_CAP_INTERVAL_MS);

        let sum: f64 = intervals.iter().sum();
        assert!((sum - TEST_PRANAYAMA_DURATION_MS).abs() <= 1.5 * TEST_CAP_INTERVAL_MS);
    }

    #[test]
    fn test_fixed_steps_ratio() {
        let params = scenario(GrowthPolicy::FixedSteps(12));
        let expected = (TEST_CAP_INTERVAL_MS / TEST_BASE_INTERVAL_MS).powf(1.0 / 12.0);
        assert!((params.ratio() - expected).abs() < 1e-12);
        assert_eq!(params.steps(), 12);
    }

    #[test]
    fn test_bounded_ratio_finds_smallest_steps() {
        let params = scenario(GrowthPolicy::BoundedRatio(1.08));
        let n = params.steps();
        let span = TEST_CAP_INTERVAL_MS / TEST_BASE_INTERVAL_MS;

        assert!(span.powf(1.0 / f64::from(n)) <= 1.08);
        assert!(n == 1 || span.powf(1.0 / f64::from(n - 1)) > 1.08);
        // ln(2.6167) / ln(1.08) ≈ 12.5
        assert_eq!(n, 13);
    }

    #[test]
    fn test_bounded_ratio_matches_fixed_steps() {
        let bounded = scenario(GrowthPolicy::BoundedRatio(1.08));
        let fixed = scenario(GrowthPolicy::FixedSteps(bounded.steps()));
        assert_eq!(bounded.intervals_ms(), fixed.intervals_ms());
    }

    #[test]
    fn test_bounded_ratio_large_bound_uses_one_step() {
        let params = scenario(GrowthPolicy::BoundedRatio(3.0));
        assert_eq!(params.steps(), 1);
        let intervals = params.intervals_ms();
        assert_eq!(intervals[0], TEST_BASE_INTERVAL_MS);
        assert!((intervals[1] - TEST_CAP_INTERVAL_MS).abs() < 1e-6);
    }

    #[test]
    fn test_base_not_below_cap_gives_constant_sequence() {
        let params =
            RampParameters::new(20000.0, 15000.0, GrowthPolicy::BoundedRatio(1.08), 60000.0, 0.0)
                .unwrap();
        assert_eq!(params.intervals_ms(), vec![15000.0; 4]);
        assert_eq!(params.steps(), 0);
        assert_eq!(params.ratio(), 1.0);

        // A constant ramp never needs a ratio above 1
        assert!(
            RampParameters::new(15000.0, 15000.0, GrowthPolicy::BoundedRatio(1.0), 1000.0, 0.0)
                .unwrap()
                .intervals_ms()
                == vec![15000.0]
        );
    }

    #[test]
    fn test_session_shorter_than_growth_rejected() {
        let err = RampParameters::new(6000.0, 15700.0, GrowthPolicy::FixedSteps(12), 1.0, 0.0)
            .unwrap_err()
            .to_string();
        assert!(err.contains("longer than the 1 ms session"), "{err}");

        // 1000 steps of ~0.1% growth take far longer than 14 minutes
        assert!(
            RampParameters::new(
                TEST_BASE_INTERVAL_MS,
                TEST_CAP_INTERVAL_MS,
                GrowthPolicy::FixedSteps(1000),
                TEST_PRANAYAMA_DURATION_MS,
                0.0
            )
            .is_err()
        );
    }

    #[test]
    fn test_ratio_bound_near_one_rejected() {
        let err = RampParameters::new(
            TEST_BASE_INTERVAL_MS,
            TEST_CAP_INTERVAL_MS,
            GrowthPolicy::BoundedRatio(1.00001),
            TEST_PRANAYAMA_DURATION_MS,
            0.0,
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("more than the maximum"), "{err}");

        assert!(
            RampParameters::new(
                TEST_BASE_INTERVAL_MS,
                TEST_CAP_INTERVAL_MS,
                GrowthPolicy::FixedSteps(MAXIMUM_GROWTH_STEPS + 1),
                f64::MAX,
                0.0
            )
            .is_err()
        );
    }

    #[test]
    fn test_growth_exactly_filling_session_accepted() {
        // r = 2: growth series 7000 + 14000 = 21000 ms, no room for cap breaths
        let params =
            RampParameters::new(7000.0, 14000.0, GrowthPolicy::FixedSteps(1), 21000.0, 0.0)
                .unwrap();
        assert_eq!(params.intervals_ms(), vec![7000.0]);
        assert!(
            RampParameters::new(7000.0, 14000.0, GrowthPolicy::FixedSteps(1), 20999.0, 0.0)
                .is_err()
        );
    }

    #[test]
    fn test_validation_failures() {
        let ok = GrowthPolicy::FixedSteps(12);
        assert!(RampParameters::new(0.0, 15700.0, ok, 840000.0, 0.0).is_err());
        assert!(RampParameters::new(-1.0, 15700.0, ok, 840000.0, 0.0).is_err());
        assert!(RampParameters::new(6000.0, 0.0, ok, 840000.0, 0.0).is_err());
        assert!(RampParameters::new(6000.0, 15700.0, ok, 0.0, 0.0).is_err());
        assert!(RampParameters::new(6000.0, 15700.0, ok, 840000.0, -5.0).is_err());
        assert!(RampParameters::new(f64::NAN, 15700.0, ok, 840000.0, 0.0).is_err());
        assert!(RampParameters::new(6000.0, f64::INFINITY, ok, 840000.0, 0.0).is_err());
        assert!(
            RampParameters::new(6000.0, 15700.0, GrowthPolicy::FixedSteps(0), 840000.0, 0.0)
                .is_err()
        );
        assert!(
            RampParameters::new(6000.0, 15700.0, GrowthPolicy::BoundedRatio(1.0), 840000.0, 0.0)
                .is_err()
        );
        assert!(
            RampParameters::new(6000.0, 15700.0, GrowthPolicy::BoundedRatio(0.5), 840000.0, 0.0)
                .is_err()
        );
    }

    #[test]
    fn test_validation_error_names_value() {
        let err = RampParameters::new(-3.0, 15700.0, GrowthPolicy::FixedSteps(1), 1.0, 0.0)
            .unwrap_err()
            .to_string();
        assert!(err.contains("-3"));
    }
}
