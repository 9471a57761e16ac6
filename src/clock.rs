//! Time source and cooperative waiting.
//!
//! All waiting in dawnr goes through a [`Clock`], so tests can run a whole
//! night of effects instantly with [`crate::testing::FakeClock`]. Waits are
//! cut into short slices and abandoned as soon as the shared `running` flag is
//! cleared by a shutdown signal.

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::constants::CHECK_INTERVAL_SECS;
use crate::device::LightDevice;

/// Wall-clock time and interruptible sleeping.
pub trait Clock {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;

    /// Wait for `duration`.
    ///
    /// Returns `false` if shutdown was requested before or during the wait.
    fn sleep(&self, duration: Duration, running: &AtomicBool) -> bool;

    /// Wait until the wall clock reaches `at`. Returns `false` on shutdown.
    fn sleep_until(&self, at: DateTime<Local>, running: &AtomicBool) -> bool {
        let remaining = (at - self.now()).to_std().unwrap_or(Duration::ZERO);
        self.sleep(remaining, running)
    }
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration, running: &AtomicBool) -> bool {
        let deadline = Instant::now() + duration;
        let slice = Duration::from_secs(CHECK_INTERVAL_SECS);

        loop {
            if !running.load(Ordering::SeqCst) {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(slice));
        }
    }

    fn sleep_until(&self, at: DateTime<Local>, running: &AtomicBool) -> bool {
        let slice = Duration::from_secs(CHECK_INTERVAL_SECS);

        // Re-read the wall clock every slice so a suspended machine catches up
        loop {
            if !running.load(Ordering::SeqCst) {
                return false;
            }
            let remaining = match (at - Local::now()).to_std() {
                Ok(remaining) if !remaining.is_zero() => remaining,
                _ => return true,
            };
            std::thread::sleep(remaining.min(slice));
        }
    }
}

/// How a light effect ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    Completed,
    /// The light was off when the effect was due, which is how a user opts out.
    SkippedDeviceOff,
    /// The power query failed; the effect is not retried.
    SkippedUnreachable,
    /// Shutdown was requested while the effect was running.
    Cancelled,
}

/// Everything an effect needs to run: time, the light and the shutdown flag.
#[derive(Clone, Copy)]
pub struct RoutineContext<'a> {
    pub clock: &'a dyn Clock,
    pub device: &'a dyn LightDevice,
    pub running: &'a AtomicBool,
}

impl<'a> RoutineContext<'a> {
    pub fn new(clock: &'a dyn Clock, device: &'a dyn LightDevice, running: &'a AtomicBool) -> Self {
        Self {
            clock,
            device,
            running,
        }
    }

    /// Wait `ms` milliseconds on the context clock. Returns `false` on shutdown.
    pub fn pause_ms(&self, ms: u64) -> bool {
        self.clock.sleep(Duration::from_millis(ms), self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_short_sleep_completes() {
        let running = AtomicBool::new(true);
        let started = Instant::now();
        assert!(SystemClock.sleep(Duration::from_millis(20), &running));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_system_clock_sleep_aborts_when_stopped() {
        let running = AtomicBool::new(false);
        let started = Instant::now();
        assert!(!SystemClock.sleep(Duration::from_secs(60), &running));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_system_clock_sleep_until_past_returns_immediately() {
        let running = AtomicBool::new(true);
        let past = Local::now() - chrono::Duration::minutes(5);
        assert!(SystemClock.sleep_until(past, &running));
    }
}
