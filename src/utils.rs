//! Utility functions shared across the codebase.
//!
//! Interpolation helpers for color ramps and small formatting helpers used by
//! the logger-facing code.

use std::path::Path;
use std::time::Duration;

/// Interpolate between two u16 values based on progress (0.0 to 1.0).
///
/// Used for color temperature ramps. The result is rounded to the nearest
/// integer and progress is clamped to [0.0, 1.0].
///
/// # Examples
/// ```
/// use dawnr::utils::interpolate_u16;
/// assert_eq!(interpolate_u16(2500, 6000, 0.5), 4250);
/// assert_eq!(interpolate_u16(6000, 3000, 0.25), 5250);
/// ```
pub fn interpolate_u16(start: u16, end: u16, progress: f64) -> u16 {
    let start_f = f64::from(start);
    let end_f = f64::from(end);
    let result = start_f + (end_f - start_f) * progress.clamp(0.0, 1.0);
    result.round() as u16
}

/// Interpolate between two f64 values based on progress (0.0 to 1.0).
///
/// # Examples
/// ```
/// use dawnr::utils::interpolate_f64;
/// assert_eq!(interpolate_f64(0.0, 1.0, 0.5), 0.5);
/// ```
pub fn interpolate_f64(start: f64, end: f64, progress: f64) -> f64 {
    start + (end - start) * progress.clamp(0.0, 1.0)
}

/// Render a path for log output, abbreviating the home directory to `~`.
pub fn path_for_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}

/// Format a duration as a compact human-readable string ("1h 05m", "14m 00s", "3.2s").
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    if total_secs >= 3600 {
        format!("{}h {:02}m", total_secs / 3600, (total_secs % 3600) / 60)
    } else if total_secs >= 60 {
        format!("{}m {:02}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
