//! Geographic location-based solar calculations.
//!
//! This module provides the solar events (sunrise, sunset, solar noon, golden
//! hour) that the daily anchors are derived from.

pub mod solar;

pub use solar::{SolarEventSource, SolarEvents, SunriseCalculator};

use crate::logger::Log;

/// Log the raw solar events used for today's anchors.
///
/// Only printed with `--debug`.
pub fn log_solar_debug_info(
    latitude: f64,
    longitude: f64,
    today: &SolarEvents,
    tomorrow: &SolarEvents,
) {
    if !Log::is_debug() {
        return;
    }

    Log::log_pipe();
    Log::log_debug("Solar calculation details:");
    Log::log_indented(&format!(
        "    Raw coordinates: {:.4}°, {:.4}°",
        latitude, longitude
    ));
    for (day, events) in [("Today", today), ("Tomorrow", tomorrow)] {
        Log::log_indented(&format!("{day}:"));
        Log::log_indented(&format!(
            "            Sunrise: {}",
            events.sunrise.format("%Y-%m-%d %H:%M:%S")
        ));
        Log::log_indented(&format!(
            "         Solar noon: {}",
            events.solar_noon.format("%Y-%m-%d %H:%M:%S")
        ));
        Log::log_indented(&format!(
            "        Golden hour: {}",
            events.golden_hour.format("%Y-%m-%d %H:%M:%S")
        ));
        Log::log_indented(&format!(
            "             Sunset: {}",
            events.sunset.format("%Y-%m-%d %H:%M:%S")
        ));
    }
}
