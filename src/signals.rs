//! Shutdown signal handling for dawnr.
//!
//! SIGINT, SIGTERM and SIGHUP clear a shared `running` flag. Every wait in the
//! daemon goes through [`crate::clock::Clock::sleep`], which checks that flag,
//! so a signal interrupts discovery, pending events and running effects alike.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use crate::logger::Log;

/// Register shutdown signal handlers and return the shared running flag.
///
/// Spawns a background thread that waits for signals and flips the flag.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running_clone = running.clone();
    thread::spawn(move || {
        for sig in signals.forever() {
            let signal_name = match sig {
                SIGINT => "SIGINT",
                SIGTERM => "SIGTERM",
                SIGHUP => "SIGHUP",
                _ => "unknown signal",
            };

            if running_clone.swap(false, Ordering::SeqCst) {
                Log::log_block_start(&format!("Received {signal_name}, shutting down..."));
            } else {
                // A second signal while shutting down: nothing left to wait for
                Log::log_warning(&format!("Received {signal_name} again, forcing exit"));
                std::process::exit(crate::constants::EXIT_FAILURE);
            }
        }
    });

    Ok(running)
}
