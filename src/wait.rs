//! Bounded condition polling.
//!
//! Installer automation spends most of its life waiting for the guest
//! to reach some visible state. [`Wait`] turns that into a bounded
//! loop: probe, and if the condition is not there yet, sleep one
//! interval and probe again, up to a fixed number of attempts.
//!
//! The first probe runs immediately, so a wait of `n` attempts sleeps
//! `n - 1` times when the condition never shows up. Probe errors are
//! not retried; only a clean `false` is.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default interval between probe attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// Wait
// ============================================================================

/// A bounded polling policy: how often to probe and how many times.
///
/// The policy is plain data; [`Wait::until`] runs it against a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    /// Delay between consecutive probes.
    interval: Duration,
    /// Total number of probes before giving up.
    max_attempts: u32,
}

impl Wait {
    /// Creates a policy probing every `interval`, `max_attempts` times.
    #[inline]
    #[must_use]
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Creates a once-a-second policy with `max_attempts` probes.
    ///
    /// The conventional unit for installer waits: `Wait::seconds(300)`
    /// gives a condition five minutes to appear.
    #[inline]
    #[must_use]
    pub const fn seconds(max_attempts: u32) -> Self {
        Self::new(DEFAULT_INTERVAL, max_attempts)
    }

    /// Returns the delay between probes.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the probe budget.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `probe` until it reports the condition, the budget runs
    /// out, or the probe fails.
    ///
    /// `what` names the condition in logs and in the timeout error.
    ///
    /// # Errors
    ///
    /// - [`Error::WaitTimeout`] if every probe reported `false`
    /// - Any error the probe itself returns, unchanged
    pub async fn until<F, Fut>(&self, what: &str, mut probe: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        info!(
            what,
            attempts = self.max_attempts,
            interval_ms = self.interval.as_millis() as u64,
            "waiting for condition"
        );
        let started = Instant::now();

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                sleep(self.interval).await;
            }

            if probe().await? {
                info!(what, attempt, "condition observed");
                return Ok(());
            }
            debug!(what, attempt, "condition not observed yet");
        }

        Err(Error::wait_timeout(
            what,
            self.max_attempts,
            started.elapsed(),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
