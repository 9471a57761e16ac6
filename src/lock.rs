//! Single-instance lock file.
//!
//! Two daemons would send interleaved commands to the same lights, so only one
//! may run per user. The lock file lives in `$XDG_RUNTIME_DIR` (or `/tmp`) and
//! holds the owner's PID.
//!
//! The file is opened without truncation and only rewritten once the exclusive
//! lock is held, so a second instance can still read the owner's PID.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::logger::Log;

/// An acquired instance lock. Released with [`InstanceLock::release`].
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn default_path() -> PathBuf {
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(runtime_dir).join("dawnr.lock")
    }

    /// Try to take the lock at `path`.
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn acquire(path: &Path) -> Result<Option<Self>> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            return Ok(None);
        }

        file.set_len(0)
            .with_context(|| format!("Failed to reset lock file {}", path.display()))?;
        writeln!(file, "{}", std::process::id())
            .with_context(|| format!("Failed to write lock file {}", path.display()))?;
        file.flush()?;

        Ok(Some(Self {
            file,
            path: path.to_path_buf(),
        }))
    }

    /// PID recorded in the lock file at `path`, if readable.
    pub fn holder_pid(path: &Path) -> Option<u32> {
        fs::read_to_string(path).ok()?.trim().parse().ok()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock and remove the lock file.
    pub fn release(self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            Log::log_warning(&format!("Failed to unlock lock file: {}", e));
        }
        drop(self.file);

        if let Err(e) = fs::remove_file(&self.path) {
            Log::log_warning(&format!("Failed to remove lock file: {}", e));
        }
    }
}
