//! Light device abstraction.
//!
//! Effects drive lights exclusively through the [`LightDevice`] trait, and the
//! daemon finds a light through [`DeviceDiscovery`]. The LIFX LAN protocol
//! implementation lives in [`lifx`]; tests use mocks or the recording device
//! from [`crate::testing`].

use anyhow::{Result, bail};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::clock::Clock;
use crate::color::ColorState;
use crate::constants::{DISCOVERY_WINDOW_MS, TRANSITION_CEILING_MS};
use crate::logger::Log;

pub mod lifx;

pub use lifx::{LifxDiscovery, LifxLight};

/// Power state reported by a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
}

/// Commands the effects need from a light.
///
/// Power state is always queried from the device, never cached.
#[cfg_attr(test, mockall::automock)]
pub trait LightDevice {
    /// Switch the light on or off immediately.
    fn set_power(&self, on: bool) -> Result<()>;

    /// Fade to `color` over `transition`.
    ///
    /// Transitions longer than [`TRANSITION_CEILING_MS`] cannot be encoded in a
    /// single command and are rejected.
    fn set_color(&self, color: &ColorState, transition: Duration) -> Result<()>;

    /// Query the current power state.
    fn get_power(&self) -> Result<PowerState>;
}

/// Source of reachable lights.
pub trait DeviceDiscovery {
    type Device: LightDevice;

    /// One discovery attempt. An empty list means nothing answered.
    fn discover(&self) -> Result<Vec<Self::Device>>;
}

/// Transition length in whole milliseconds, checked against the ceiling.
pub fn transition_ms(transition: Duration) -> Result<u32> {
    let ms = transition.as_millis();
    if ms > u128::from(TRANSITION_CEILING_MS) {
        bail!(
            "Transition of {} ms exceeds the {} ms a single command can carry",
            ms,
            TRANSITION_CEILING_MS
        );
    }
    Ok(ms as u32)
}

/// Repeat discovery until at least one light answers.
///
/// There is no attempt limit: the daemon is useless without a light. Returns
/// `None` only when shutdown was requested while searching.
pub fn discover_until_found<D: DeviceDiscovery>(
    discovery: &D,
    clock: &dyn Clock,
    running: &AtomicBool,
) -> Option<D::Device> {
    while running.load(Ordering::SeqCst) {
        match discovery.discover() {
            Ok(devices) if !devices.is_empty() => {
                Log::log_decorated("Lights detected.");
                if devices.len() > 1 {
                    Log::log_indented(&format!("{} lights answered, using the first", devices.len()));
                }
                return devices.into_iter().next();
            }
            Ok(_) => {
                Log::log_decorated("No lights detected; retrying...");
            }
            Err(e) => {
                Log::log_warning(&format!("Discovery failed: {e:#}; retrying..."));
                // Errors return immediately, so wait out a discovery window
                if !clock.sleep(Duration::from_millis(DISCOVERY_WINDOW_MS), running) {
                    break;
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClock, RecordingDevice};
    use anyhow::anyhow;
    use chrono::{Local, TimeZone};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedDiscovery {
        attempts: RefCell<VecDeque<Result<Vec<RecordingDevice>>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedDiscovery {
        fn new(attempts: Vec<Result<Vec<RecordingDevice>>>) -> Self {
            Self {
                attempts: RefCell::new(attempts.into()),
                calls: RefCell::new(0),
            }
        }
    }

    impl DeviceDiscovery for ScriptedDiscovery {
        type Device = RecordingDevice;

        fn discover(&self) -> Result<Vec<RecordingDevice>> {
            *self.calls.borrow_mut() += 1;
            self.attempts
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn clock() -> FakeClock {
        FakeClock::new(Local.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_transition_ms_ceiling() {
        assert_eq!(transition_ms(Duration::from_millis(65535)).unwrap(), 65535);
        assert_eq!(transition_ms(Duration::ZERO).unwrap(), 0);
        assert!(transition_ms(Duration::from_millis(65536)).is_err());
    }

    #[test]
    fn test_discovery_retries_until_found() {
        let discovery = ScriptedDiscovery::new(vec![
            Ok(Vec::new()),
            Err(anyhow!("socket unavailable")),
            Ok(Vec::new()),
            Ok(vec![RecordingDevice::new()]),
        ]);
        let clock = clock();
        let running = AtomicBool::new(true);

        let found = discover_until_found(&discovery, &clock, &running);
        assert!(found.is_some());
        assert_eq!(*discovery.calls.borrow(), 4);
        // Only the failed attempt waits out a window
        assert_eq!(clock.total_slept(), Duration::from_millis(DISCOVERY_WINDOW_MS));
    }

    #[test]
    fn test_discovery_stops_on_shutdown() {
        let discovery = ScriptedDiscovery::new(Vec::new());
        let clock = clock();
        let running = AtomicBool::new(false);

        assert!(discover_until_found(&discovery, &clock, &running).is_none());
        assert_eq!(*discovery.calls.borrow(), 0);
    }
}
