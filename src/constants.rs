//! Application constants and default values for dawnr.
//!
//! This module contains all the configuration defaults, validation limits,
//! and operational constants used throughout the application.

use crate::color::ColorState;

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_LATITUDE: f64 = 45.508889; // Montréal, placeholder until configured
pub const DEFAULT_LONGITUDE: f64 = -73.561667;
pub const DEFAULT_SLEEP_DURATION: f64 = 7.0; // hours
pub const DEFAULT_EATING_PERIOD: f64 = 6.75; // hours from first to last meal
pub const DEFAULT_BROADCAST: bool = true; // send commands to every light on the network

pub const DEFAULT_EVENING_COLOR: ColorState = ColorState {
    hue: 0.0,
    saturation: 0.0,
    brightness: 0.8,
    kelvin: 2500,
};

// Pranayama (paced breathing) defaults
pub const DEFAULT_PRANAYAMA_BASE_INTERVAL: f64 = 6.0; // seconds per breath at the start
pub const DEFAULT_PRANAYAMA_CAP_INTERVAL: f64 = 60.0 / 3.8; // seconds, ~3.8 breaths per minute
pub const DEFAULT_PRANAYAMA_MAX_RATIO: f64 = 1.08; // maximum growth between two breaths
pub const DEFAULT_PRANAYAMA_DURATION: u64 = 14; // minutes
pub const DEFAULT_PRANAYAMA_PRE_DELAY: u64 = 60; // seconds resting on the exhale color
pub const DEFAULT_PRANAYAMA_INHALE: f64 = 3.0;
pub const DEFAULT_PRANAYAMA_HOLD: f64 = 4.0;
pub const DEFAULT_PRANAYAMA_EXHALE: f64 = 5.0;
pub const DEFAULT_PRANAYAMA_EMPTY: f64 = 2.0;

pub const DEFAULT_PRANAYAMA_INHALE_COLOR: ColorState = ColorState {
    hue: 0.5,
    saturation: 1.0,
    brightness: 0.1,
    kelvin: 3500,
};
pub const DEFAULT_PRANAYAMA_EXHALE_COLOR: ColorState = ColorState {
    hue: 0.5,
    saturation: 1.0,
    brightness: 0.01,
    kelvin: 3500,
};
pub const DEFAULT_PRANAYAMA_AFTER_COLOR: ColorState = ColorState {
    hue: 0.0,
    saturation: 1.0,
    brightness: 0.01,
    kelvin: 3500,
};

// Sunrise (dawn simulation) defaults
pub const DEFAULT_SUNRISE_KELVIN: u16 = 6000; // Kelvin at the end of the ramp
pub const DEFAULT_SUNRISE_RED_PART: f64 = 0.3; // fraction of the ramp spent in saturated red
pub const DEFAULT_SUNRISE_DURATION: u64 = 20; // minutes
pub const DEFAULT_SUNRISE_ANTICIPATION: u64 = 60; // minutes before astronomical sunrise

// ═══ Routine Constants ═══
// Fixed shape of the daily routine

pub const RAMP_BASELINE_KELVIN: u16 = 2500; // color temperature while the ramp is still red
pub const TRANSITION_CEILING_MS: u64 = 65535; // longest transition a single LIFX command encodes
pub const SETTLE_DELAY_MS: u64 = 3000; // pause between power off and the after color
pub const CIVIL_WAKE_LIMIT_HOURS: i64 = 6; // never wake later than 06:00
pub const FIRST_MEAL_DELAY_HOURS: i64 = 1; // first meal one hour after waking
pub const MEAL_SPACING_HOURS: f64 = 2.0; // gap between the first and second meal
pub const SHOWER_LEAD_HOURS: i64 = 2; // shower two hours before sleep
pub const EVENING_COLOR_LEAD_HOURS: i64 = 2; // evening color two hours before sleep

// ═══ Validation Limits ═══
// These limits ensure user inputs are within reasonable and safe ranges

// Temperature limits (Kelvin, supported by LIFX color bulbs)
pub const MINIMUM_TEMP: u16 = 1500;
pub const MAXIMUM_TEMP: u16 = 9000;

// Daily rhythm limits (hours)
pub const MINIMUM_SLEEP_DURATION: f64 = 4.0;
pub const MAXIMUM_SLEEP_DURATION: f64 = 12.0;
pub const MINIMUM_EATING_PERIOD: f64 = MEAL_SPACING_HOURS; // second meal must fit in the window
pub const MAXIMUM_EATING_PERIOD: f64 = 16.0;

// Breath interval limits (seconds); 60s keeps every phase under the transition ceiling
pub const MINIMUM_BREATH_INTERVAL: f64 = 1.0;
pub const MAXIMUM_BREATH_INTERVAL: f64 = 60.0;
pub const MAXIMUM_GROWTH_STEPS: u32 = 1000;
pub const MAXIMUM_GROWTH_RATIO: f64 = 4.0;

// Effect duration limits
pub const MINIMUM_PRANAYAMA_DURATION: u64 = 1; // minutes
pub const MAXIMUM_PRANAYAMA_DURATION: u64 = 120; // minutes (must start after the shower)
pub const MAXIMUM_PRANAYAMA_PRE_DELAY: u64 = 600; // seconds
pub const MINIMUM_SUNRISE_DURATION: u64 = 1; // minutes
pub const MAXIMUM_SUNRISE_DURATION: u64 = 120; // minutes
pub const MAXIMUM_SUNRISE_ANTICIPATION: u64 = 180; // minutes

// ═══ Operational Timing Constants ═══
// Internal timing values for application operation

pub const CHECK_INTERVAL_SECS: u64 = 1; // How often to check the running flag during sleep

// ═══ LIFX LAN Communication Constants ═══

pub const LIFX_PORT: u16 = 56700;
pub const DISCOVERY_WINDOW_MS: u64 = 1000; // how long one discovery attempt listens for replies
pub const SOCKET_TIMEOUT_MS: u64 = 1000; // timeout for power queries
pub const SOCKET_BUFFER_SIZE: usize = 1024;

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1; // General failure

// ═══ Test Constants ═══
// Common values used in tests for consistency
#[cfg(test)]
pub mod test_constants {
    pub const TEST_BASE_INTERVAL_MS: f64 = 6000.0;
    pub const TEST_CAP_INTERVAL_MS: f64 = 15700.0;
    pub const TEST_FIXED_STEPS: u32 = 12;
    pub const TEST_PRANAYAMA_DURATION_MS: f64 = 840_000.0; // 14 minutes
    pub const TEST_SUNRISE_DURATION_MS: u64 = 1_200_000; // 20 minutes
    pub const TEST_LATITUDE: f64 = 45.508889;
    pub const TEST_LONGITUDE: f64 = -73.561667;
}
