//! Bounded retry of transient device calls.

use core::time::Duration;
use std::time::Instant;

use labfarm_devices::DeviceError;

/// Fixed retry budget for a call to external hardware.
///
/// A call is attempted once, then retried up to `retries` more times with
/// `delay` between attempts. Each attempt is handed `timeout` and counts as
/// failed if it returns later than that, whatever its result. The last error
/// is returned once the budget is spent; there is no unbounded waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Time budget of a single attempt.
    pub timeout: Duration,
    /// Pause after each failed attempt.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// 10 retries, 30 seconds per attempt, 30 seconds apart.
    fn default() -> Self {
        Self {
            retries: 10,
            timeout: Duration::from_secs(30),
            delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default 30 second attempt timeout.
    #[must_use]
    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self {
            retries,
            timeout: Duration::from_secs(30),
            delay,
        }
    }

    /// A policy that makes a single attempt.
    #[must_use]
    pub const fn once() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Sets the time budget of a single attempt.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pause after each failed attempt.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the total number of attempts the policy allows.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Calls `op` with the attempt timeout until it succeeds in time or the
    /// budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt, or [`DeviceError::Timeout`]
    /// if it overran.
    pub fn retry<T, F>(&self, device: &str, operation: &str, mut op: F) -> Result<T, DeviceError>
    where
        F: FnMut(Duration) -> Result<T, DeviceError>,
    {
        let mut attempt = 1;
        loop {
            let started = Instant::now();
            let result = op(self.timeout);
            let elapsed = started.elapsed();

            let error = match result {
                Ok(value) if elapsed <= self.timeout => return Ok(value),
                Ok(_) => DeviceError::timeout(device, operation, self.timeout),
                Err(error) => error,
            };
            if attempt >= self.attempts() {
                return Err(error);
            }

            tracing::debug!(device, operation, attempt, ?elapsed, %error, "attempt failed, retrying");
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            attempt += 1;
        }
    }
}
