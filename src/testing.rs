//! Test doubles for the clock and the light.
//!
//! Available to unit tests and, through the `testing-support` feature, to the
//! integration tests under `tests/`.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::Clock;
use crate::color::ColorState;
use crate::device::{LightDevice, PowerState, transition_ms};

/// A clock whose sleeps advance virtual time instantly.
///
/// Optionally requests shutdown once virtual time reaches a given instant,
/// the way a signal would during a real wait.
#[derive(Debug)]
pub struct FakeClock {
    state: Mutex<FakeClockState>,
}

#[derive(Debug)]
struct FakeClockState {
    now: DateTime<Local>,
    sleeps: Vec<Duration>,
    shutdown_at: Option<DateTime<Local>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            state: Mutex::new(FakeClockState {
                now: start,
                sleeps: Vec::new(),
                shutdown_at: None,
            }),
        }
    }

    /// Clear the running flag when virtual time reaches `at`.
    pub fn with_shutdown_at(self, at: DateTime<Local>) -> Self {
        self.lock().shutdown_at = Some(at);
        self
    }

    /// Every completed or interrupted sleep, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.lock().sleeps.iter().sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeClockState> {
        // A panicking test poisons the lock; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        self.lock().now
    }

    fn sleep(&self, duration: Duration, running: &AtomicBool) -> bool {
        if !running.load(Ordering::SeqCst) {
            return false;
        }

        let mut state = self.lock();
        let step =
            chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let target = state.now + step;

        if let Some(shutdown_at) = state.shutdown_at {
            if target >= shutdown_at {
                let interrupted = (shutdown_at - state.now).to_std().unwrap_or(Duration::ZERO);
                state.now = state.now.max(shutdown_at);
                state.sleeps.push(interrupted);
                running.store(false, Ordering::SeqCst);
                return false;
            }
        }

        state.now = target;
        state.sleeps.push(duration);
        true
    }
}

/// A command received by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    SetPower(bool),
    SetColor(ColorState, Duration),
    GetPower,
}

/// A light that records every command it receives.
///
/// Clones share the same command log, so a test can hand one clone to the
/// code under test and inspect another.
#[derive(Debug, Clone)]
pub struct RecordingDevice {
    inner: Arc<Mutex<RecordingState>>,
}

#[derive(Debug)]
struct RecordingState {
    commands: Vec<DeviceCommand>,
    power: Option<PowerState>,
    fail_commands: bool,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// A reachable light that is switched on.
    pub fn new() -> Self {
        Self::with_power(Some(PowerState::On))
    }

    /// `None` makes every power query fail as if the light were unreachable.
    pub fn with_power(power: Option<PowerState>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecordingState {
                commands: Vec::new(),
                power,
                fail_commands: false,
            })),
        }
    }

    /// Make set-power and set-color fail after being recorded.
    pub fn failing_commands(self) -> Self {
        self.lock().fail_commands = true;
        self
    }

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.lock().commands.clone()
    }

    /// Only the set-color commands, as (color, transition) pairs.
    pub fn colors(&self) -> Vec<(ColorState, Duration)> {
        self.lock()
            .commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::SetColor(color, transition) => Some((*color, *transition)),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LightDevice for RecordingDevice {
    fn set_power(&self, on: bool) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(DeviceCommand::SetPower(on));
        if state.fail_commands {
            return Err(anyhow!("simulated transmission failure"));
        }
        if state.power.is_some() {
            state.power = Some(if on { PowerState::On } else { PowerState::Off });
        }
        Ok(())
    }

    fn set_color(&self, color: &ColorState, transition: Duration) -> Result<()> {
        transition_ms(transition)?;
        let mut state = self.lock();
        state.commands.push(DeviceCommand::SetColor(*color, transition));
        if state.fail_commands {
            return Err(anyhow!("simulated transmission failure"));
        }
        Ok(())
    }

    fn get_power(&self) -> Result<PowerState> {
        let mut state = self.lock();
        state.commands.push(DeviceCommand::GetPower);
        state.power.ok_or_else(|| anyhow!("simulated power query timeout"))
    }
}
