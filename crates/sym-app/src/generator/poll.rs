use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use sym_core::JobStatus;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1200;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollOptions {
    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::from_millis(DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_TIMEOUT_MS)
    }
}

/// Bookkeeping for one run of the poll loop. Lives only as long as the loop.
#[derive(Debug)]
pub struct PollSession {
    started_at: Instant,
    attempts: u32,
    last_status: JobStatus,
}

impl PollSession {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
            attempts: 0,
            last_status: JobStatus::Queued,
        }
    }

    pub fn next_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn observe(&mut self, status: JobStatus) {
        self.last_status = status;
    }

    pub fn last_status(&self) -> JobStatus {
        self.last_status
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// The "polling in progress" flag shared by every clone of a client.
#[derive(Debug, Clone, Default)]
pub struct PollingFlag {
    active: Arc<AtomicBool>,
}

impl PollingFlag {
    /// Raises the flag, or returns `None` if it is already up.
    pub fn try_acquire(&self) -> Option<PollGuard> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PollGuard { active: self.active.clone() })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Lowers the flag when dropped, whichever way the loop exits.
#[derive(Debug)]
pub struct PollGuard {
    active: Arc<AtomicBool>,
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
