//! Scan serialization
//!
//! Only one scan may own the shared log sink at a time. A second trigger is
//! rejected instead of resetting the log of the scan already running.

use crate::error::SweepError;
use parking_lot::RwLock;

/// In-progress flag guarding scan execution
#[derive(Debug, Default)]
pub struct ScanGuard {
    active: RwLock<bool>,
}

impl ScanGuard {
    /// Create a guard with no scan running
    pub fn new() -> Self {
        Self {
            active: RwLock::new(false),
        }
    }

    /// Claim the guard for a new scan
    ///
    /// Fails with `ScanInProgress` while another permit is alive. The flag is
    /// released when the returned permit is dropped.
    pub fn try_begin(&self) -> Result<ScanPermit<'_>, SweepError> {
        let mut active = self.active.write();
        if *active {
            return Err(SweepError::ScanInProgress);
        }
        *active = true;
        Ok(ScanPermit { guard: self })
    }

    /// Whether a scan currently holds the guard
    pub fn is_active(&self) -> bool {
        *self.active.read()
    }
}

/// Proof of exclusive scan ownership; releases the guard on drop.
#[derive(Debug)]
pub struct ScanPermit<'a> {
    guard: &'a ScanGuard,
}

impl Drop for ScanPermit<'_> {
    fn drop(&mut self) {
        *self.guard.active.write() = false;
    }
}
