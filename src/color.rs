//! Color states and the sunrise color ramp.
//!
//! A ramp starts in saturated red at zero brightness, fades the saturation out
//! over the first `red_part` of its progress while the light brightens, and then
//! warms from the baseline color temperature towards the configured target.

use serde::Deserialize;

use crate::constants::RAMP_BASELINE_KELVIN;
use crate::utils::{interpolate_f64, interpolate_u16};

/// A complete light color: HSB components in [0, 1] plus a color temperature.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColorState {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub kelvin: u16,
}

impl ColorState {
    /// Whether every HSB component lies in [0, 1].
    pub fn is_normalized(&self) -> bool {
        [self.hue, self.saturation, self.brightness]
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}

/// Color of the sunrise ramp at progress `t` (clamped to [0, 1]).
///
/// `red_part` must lie strictly inside (0, 1); configuration validation
/// guarantees this before a ramp is ever built.
pub fn color_at(target_kelvin: u16, red_part: f64, t: f64) -> ColorState {
    let t = t.clamp(0.0, 1.0);

    if t < red_part {
        ColorState {
            hue: 0.0,
            saturation: interpolate_f64(1.0, 0.0, t / red_part),
            brightness: t,
            kelvin: RAMP_BASELINE_KELVIN,
        }
    } else {
        let warm_progress = (t - red_part) / (1.0 - red_part);
        ColorState {
            hue: 0.0,
            saturation: 0.0,
            brightness: t,
            kelvin: interpolate_u16(RAMP_BASELINE_KELVIN, target_kelvin, warm_progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_at_start_is_dark_saturated_red() {
        let c = color_at(6000, 0.3, 0.0);
        assert_eq!(c.hue, 0.0);
        assert_eq!(c.saturation, 1.0);
        assert_eq!(c.brightness, 0.0);
        assert_eq!(c.kelvin, 2500);
    }

    #[test]
    fn test_color_at_end_reaches_target() {
        let c = color_at(6000, 0.3, 1.0);
        assert_eq!(c.saturation, 0.0);
        assert_eq!(c.brightness, 1.0);
        assert_eq!(c.kelvin, 6000);
    }

    #[test]
    fn test_color_at_red_part_boundary() {
        let c = color_at(6000, 0.3, 0.3);
        assert_eq!(c.saturation, 0.0);
        assert_eq!(c.kelvin, 2500);
        assert!((c.brightness - 0.3).abs() < 1e-12);

        let before = color_at(6000, 0.3, 0.15);
        assert!((before.saturation - 0.5).abs() < 1e-12);
        assert_eq!(before.kelvin, 2500);
    }

    #[test]
    fn test_color_at_kelvin_midpoint() {
        // Halfway through the warm section: 0.3 + 0.35
        let c = color_at(6000, 0.3, 0.65);
        assert_eq!(c.kelvin, 4250);
    }

    #[test]
    fn test_color_at_clamps_progress() {
        assert_eq!(color_at(6000, 0.3, -1.0), color_at(6000, 0.3, 0.0));
        assert_eq!(color_at(6000, 0.3, 7.0), color_at(6000, 0.3, 1.0));
    }

    #[test]
    fn test_brightness_and_kelvin_are_monotone() {
        let mut previous = color_at(6000, 0.3, 0.0);
        for step in 1..=200 {
            let c = color_at(6000, 0.3, step as f64 / 200.0);
            assert!(c.brightness > previous.brightness);
            assert!(c.kelvin >= previous.kelvin);
            assert!(c.saturation <= previous.saturation);
            assert!(c.is_normalized());
            previous = c;
        }
    }
}
