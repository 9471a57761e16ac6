//! # Dawnr
//!
//! A circadian lighting daemon for LIFX lights.
//!
//! Dawnr derives the evening and morning routine from the sun: it sets a dim
//! evening color, guides a paced-breathing (pranayama) session before sleep by
//! pulsing the light, and wakes the sleeper with a slow red-to-white sunrise.
//!
//! ## Architecture
//!
//! - **anchors**: Daily anchor times derived from solar events and user rhythm
//! - **args**: Command-line parsing
//! - **clock**: Clock abstraction and the context effects run in
//! - **color**: Light color state and the sunrise color curve
//! - **config**: Configuration loading, validation, and default generation
//! - **constants**: Application-wide constants and defaults
//! - **device**: Light device seam and its LIFX LAN implementation
//! - **geo**: Solar event calculation
//! - **intervals**: Growing breath interval sequences
//! - **lock**: Single-instance lock file
//! - **logger**: Structured logging with visual formatting
//! - **pranayama**: The breathing session effect
//! - **routine**: The night's schedule built from configuration and anchors
//! - **scheduler**: One-shot task scheduling and timeline rendering
//! - **signals**: Shutdown signal handling
//! - **sunrise_effect**: The sunrise ramp effect
//! - **utils**: Interpolation and formatting helpers

pub mod anchors;
pub mod args;
pub mod clock;
pub mod color;
pub mod config;
pub mod constants;
pub mod device;
pub mod geo;
pub mod intervals;
pub mod lock;
pub mod logger;
pub mod pranayama;
pub mod routine;
pub mod scheduler;
pub mod signals;
pub mod sunrise_effect;
pub mod utils;

#[cfg(any(test, feature = "testing-support"))]
pub mod testing;

// Re-export important types for easier access
pub use anchors::{DailyAnchors, UserSchedule};
pub use clock::{Clock, EffectOutcome, RoutineContext, SystemClock};
pub use color::ColorState;
pub use config::Config;
pub use device::{LightDevice, PowerState};
pub use logger::{Log, LogLevel};
pub use scheduler::{MissedPolicy, Schedule, ScheduledEvent, TaskDisposition};
