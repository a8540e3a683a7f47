//! Reconnect backoff
//!
//! Linear in the number of consecutive failed logins: the first attempt
//! waits nothing, each failure adds one `unit`.

use std::time::Duration;

/// Failure count to delay mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    unit: Duration,
}

impl Backoff {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// Delay to wait before the next login attempt
    pub fn delay(&self, failures: u32) -> Duration {
        self.unit.saturating_mul(failures)
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::constants::DEFAULT_BACKOFF_UNIT_SECS))
    }
}

/// Consecutive login failures of one tenant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounter(u32);

impl FailureCounter {
    pub fn record_failure(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}
