//! Dawn simulation.
//!
//! The ramp from dark red to bright daylight lasts far longer than a single
//! LIFX transition can (65535 ms), so it is sent as a series of chunks: each
//! command starts a transition at most one ceiling long, and the next command
//! follows once it has finished.

use std::time::Duration;

use crate::clock::{EffectOutcome, RoutineContext};
use crate::color::color_at;
use crate::constants::TRANSITION_CEILING_MS;
use crate::logger::Log;
use crate::utils::format_duration;

/// One set-color command of a ramp: the ramp progress of the color it fades
/// towards, and how long the fade lasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStep {
    pub progress: f64,
    pub transition_ms: u64,
}

/// Split a ramp of `duration_ms` into commands no longer than `ceiling_ms`.
///
/// Yields `floor(duration / ceiling)` full-length steps followed by a final
/// step to progress 1 carrying the remainder (possibly zero). Transitions sum
/// to `duration_ms` exactly and progress is strictly increasing.
pub fn plan_chunks(duration_ms: u64, ceiling_ms: u64) -> Vec<RampStep> {
    let ceiling_ms = ceiling_ms.max(1);
    let full = duration_ms / ceiling_ms;
    let remainder = duration_ms % ceiling_ms;

    let mut steps: Vec<RampStep> = (0..full)
        .map(|i| RampStep {
            progress: (i * ceiling_ms) as f64 / duration_ms as f64,
            transition_ms: ceiling_ms,
        })
        .collect();
    steps.push(RampStep {
        progress: 1.0,
        transition_ms: remainder,
    });
    steps
}

/// Run the sunrise ramp on the context's light.
///
/// The light is switched on at the start color first. Command failures are
/// logged and the ramp carries on; shutdown stops it between commands.
pub fn run_sunrise(
    ctx: &RoutineContext,
    target_kelvin: u16,
    red_part: f64,
    duration: Duration,
) -> EffectOutcome {
    let duration_ms = duration.as_millis() as u64;
    let steps = plan_chunks(duration_ms, TRANSITION_CEILING_MS);

    Log::log_block_start("Sunrise starting.");
    Log::log_indented(&format!(
        "Ramping to {}K over {} in {} commands",
        target_kelvin,
        format_duration(duration),
        steps.len()
    ));

    if let Err(e) = ctx.device.set_color(&color_at(target_kelvin, red_part, 0.0), Duration::ZERO) {
        Log::log_warning(&format!("Failed to set sunrise start color: {e:#}"));
    }
    if let Err(e) = ctx.device.set_power(true) {
        Log::log_warning(&format!("Failed to switch the light on: {e:#}"));
    }

    for step in &steps {
        let color = color_at(target_kelvin, red_part, step.progress);
        if let Err(e) = ctx
            .device
            .set_color(&color, Duration::from_millis(step.transition_ms))
        {
            Log::log_warning(&format!(
                "Failed to send sunrise step at {:.0}%: {e:#}",
                step.progress * 100.0
            ));
        }
        if !ctx.pause_ms(step.transition_ms) {
            Log::log_decorated("Sunrise interrupted.");
            return EffectOutcome::Cancelled;
        }
    }

    Log::log_decorated("Sunrise complete.");
    EffectOutcome::Completed
}
