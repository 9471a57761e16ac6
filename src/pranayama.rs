//! Paced breathing light.
//!
//! The light brightens to the inhale color, holds, dims to the exhale color and
//! rests, once per breath interval. Intervals come from the growing breath ramp
//! of [`crate::intervals`], so breathing slows down over the session. Each
//! interval is split among the four phases by their proportions.

use anyhow::{Result, bail};
use std::time::Duration;

use crate::clock::{EffectOutcome, RoutineContext};
use crate::color::ColorState;
use crate::constants::SETTLE_DELAY_MS;
use crate::device::PowerState;
use crate::intervals::RampParameters;
use crate::logger::Log;
use crate::utils::format_duration;

/// Relative lengths of the four breath phases. Only their ratios matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseProportions {
    inhale: f64,
    hold: f64,
    exhale: f64,
    empty: f64,
}

impl PhaseProportions {
    pub fn new(inhale: f64, hold: f64, exhale: f64, empty: f64) -> Result<Self> {
        for (name, value) in [
            ("inhale", inhale),
            ("hold", hold),
            ("exhale", exhale),
            ("empty", empty),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("Breath phase '{name}' must be a positive number, got {value}");
            }
        }
        Ok(Self {
            inhale,
            hold,
            exhale,
            empty,
        })
    }

    fn total(&self) -> f64 {
        self.inhale + self.hold + self.exhale + self.empty
    }

    /// Split one breath interval into its commands and waits.
    pub fn timing(&self, interval_ms: f64) -> BreathTiming {
        let total = self.total();
        let part = |share: f64| (interval_ms * share / total).round() as u64;
        BreathTiming {
            inhale_ms: part(self.inhale),
            inhale_wait_ms: part(self.inhale + self.hold),
            exhale_ms: part(self.exhale),
            exhale_wait_ms: part(self.exhale + self.empty),
        }
    }
}

/// Millisecond timing of one breath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathTiming {
    /// Fade to the inhale color.
    pub inhale_ms: u64,
    /// Wait after starting the inhale: inhale plus hold.
    pub inhale_wait_ms: u64,
    /// Fade to the exhale color.
    pub exhale_ms: u64,
    /// Wait after starting the exhale: exhale plus empty lungs.
    pub exhale_wait_ms: u64,
}

/// Everything a pranayama session needs besides the light.
#[derive(Debug, Clone, PartialEq)]
pub struct BreathSettings {
    pub ramp: RampParameters,
    pub phases: PhaseProportions,
    pub inhale_color: ColorState,
    pub exhale_color: ColorState,
    pub after_color: ColorState,
}

/// Run a breathing session on the context's light.
///
/// A light that is off means the user does not want the session; a light that
/// does not answer is skipped too, without retrying.
pub fn run_pranayama(ctx: &RoutineContext, settings: &BreathSettings) -> EffectOutcome {
    match ctx.device.get_power() {
        Ok(PowerState::On) => {}
        Ok(PowerState::Off) => {
            Log::log_block_start("Light out. Pranayama canceled.");
            return EffectOutcome::SkippedDeviceOff;
        }
        Err(e) => {
            Log::log_block_start("Pranayama skipped: the light did not answer.");
            Log::log_indented(&format!("{e:#}"));
            return EffectOutcome::SkippedUnreachable;
        }
    }

    let intervals = settings.ramp.intervals_ms();
    Log::log_block_start("Pranayama starting.");
    Log::log_indented(&format!(
        "{} breaths, {:.1}s growing to {:.1}s",
        intervals.len(),
        settings.ramp.base_interval_ms() / 1000.0,
        settings.ramp.cap_interval_ms() / 1000.0
    ));

    send_color(ctx, &settings.exhale_color, 0);
    if let Err(e) = ctx.device.set_power(true) {
        Log::log_warning(&format!("Failed to switch the light on: {e:#}"));
    }

    let pre_delay_ms = settings.ramp.pre_delay_ms().round() as u64;
    if pre_delay_ms > 0 {
        Log::log_indented(&format!(
            "Resting {} before the first breath",
            format_duration(Duration::from_millis(pre_delay_ms))
        ));
        if !ctx.pause_ms(pre_delay_ms) {
            return cancelled();
        }
    }

    for interval in intervals {
        let timing = settings.phases.timing(interval);

        send_color(ctx, &settings.inhale_color, timing.inhale_ms);
        if !ctx.pause_ms(timing.inhale_wait_ms) {
            return cancelled();
        }

        send_color(ctx, &settings.exhale_color, timing.exhale_ms);
        if !ctx.pause_ms(timing.exhale_wait_ms) {
            return cancelled();
        }
    }

    if let Err(e) = ctx.device.set_power(false) {
        Log::log_warning(&format!("Failed to switch the light off: {e:#}"));
    }
    if !ctx.pause_ms(SETTLE_DELAY_MS) {
        return cancelled();
    }
    // Prepared for the next power-on, the light stays off
    send_color(ctx, &settings.after_color, 0);

    Log::log_decorated("Pranayama complete.");
    EffectOutcome::Completed
}

fn send_color(ctx: &RoutineContext, color: &ColorState, transition_ms: u64) {
    if let Err(e) = ctx
        .device
        .set_color(color, Duration::from_millis(transition_ms))
    {
        Log::log_warning(&format!("Failed to send breath color: {e:#}"));
    }
}

fn cancelled() -> EffectOutcome {
    Log::log_decorated("Pranayama interrupted.");
    EffectOutcome::Cancelled
}
