//! The retry manager: fixed configuration plus per-session counters.

use super::classify::{Classify, FailureFilter};
use super::error::BuildError;
use super::session::Session;
use crate::config::RetryConfig;
use std::fmt;
use std::time::Duration;

/// Reset action run before every attempt except the first.
pub type ResetFn<E> = Box<dyn FnMut() -> Result<(), E>>;

/// Retries a unit of work until it succeeds or `max_attempts` is reached.
///
/// Configuration is fixed at build time. The counters (`attempts`,
/// `succeeded`) belong to the current session and are reset whenever a new
/// session starts, so one manager can drive any number of sessions one
/// after another. A session borrows the manager mutably, so two sessions
/// can never overlap on the same instance.
pub struct RetryManager<E> {
    pub(super) max_attempts: u32,
    pub(super) wait: Duration,
    pub(super) filter: Option<FailureFilter<E>>,
    pub(super) reset: Option<ResetFn<E>>,
    pub(super) attempt_count: u32,
    pub(super) success: bool,
}

impl<E> fmt::Debug for RetryManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryManager")
            .field("max_attempts", &self.max_attempts)
            .field("wait", &self.wait)
            .field("filter", &self.filter)
            .field("reset", &self.reset.as_ref().map(|_| "<reset>"))
            .field("attempt_count", &self.attempt_count)
            .field("success", &self.success)
            .finish()
    }
}

impl<E> Default for RetryManager<E> {
    /// One attempt, no wait, every failure qualifies.
    fn default() -> Self {
        Self {
            max_attempts: 1,
            wait: Duration::ZERO,
            filter: None,
            reset: None,
            attempt_count: 0,
            success: false,
        }
    }
}

impl<E> RetryManager<E> {
    pub fn builder() -> RetryManagerBuilder<E> {
        RetryManagerBuilder::new()
    }

    /// Build a manager from the `[retry]` config section. Exit-code filters
    /// in the section are specific to the command runner and are ignored here.
    pub fn from_config(cfg: &RetryConfig) -> Result<Self, BuildError> {
        Self::builder()
            .max_attempts(cfg.max_attempts)
            .wait_seconds(cfg.wait_seconds)
            .build()
    }

    /// Reset the session counters. [`RetryManager::session`] calls this for you.
    pub fn activate(&mut self) {
        self.attempt_count = 0;
        self.success = false;
    }

    /// Start a new session: resets the counters and hands out the loop driver.
    pub fn session(&mut self) -> Session<'_, E> {
        self.activate();
        tracing::debug!(
            "retry session started (max_attempts={}, wait={:?}, filter={:?})",
            self.max_attempts,
            self.wait,
            self.filter
        );
        Session::new(self)
    }

    /// True while the session has neither succeeded nor used up its attempts.
    pub fn should_continue(&self) -> bool {
        !self.success && self.attempt_count < self.max_attempts
    }

    /// Attempts made in the current (or most recent) session.
    pub fn attempts(&self) -> u32 {
        self.attempt_count
    }

    pub fn succeeded(&self) -> bool {
        self.success
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn filter(&self) -> Option<&FailureFilter<E>> {
        self.filter.as_ref()
    }
}

/// Builder for [`RetryManager`].
pub struct RetryManagerBuilder<E> {
    max_attempts: u32,
    wait: Duration,
    wait_seconds: Option<f64>,
    filter: Option<FailureFilter<E>>,
    reset: Option<ResetFn<E>>,
}

impl<E> Default for RetryManagerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryManagerBuilder<E> {
    pub fn new() -> Self {
        Self {
            max_attempts: 1,
            wait: Duration::ZERO,
            wait_seconds: None,
            filter: None,
            reset: None,
        }
    }

    /// Maximum number of attempts, including the first. Must be at least 1.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Fixed delay after each qualifying failure.
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self.wait_seconds = None;
        self
    }

    /// Same as [`wait`](Self::wait) but in (fractional) seconds; validated in `build`.
    pub fn wait_seconds(mut self, secs: f64) -> Self {
        self.wait_seconds = Some(secs);
        self
    }

    pub fn retry_on(mut self, filter: FailureFilter<E>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn retry_if<P>(self, pred: P) -> Self
    where
        P: Fn(&E) -> bool + 'static,
    {
        self.retry_on(FailureFilter::predicate(pred))
    }

    /// Run `reset` before every attempt after the first. Captured values
    /// play the role of bound arguments.
    pub fn reset_with<R>(mut self, reset: R) -> Self
    where
        R: FnMut() -> Result<(), E> + 'static,
    {
        self.reset = Some(Box::new(reset));
        self
    }

    pub fn build(self) -> Result<RetryManager<E>, BuildError> {
        if self.max_attempts == 0 {
            return Err(BuildError::ZeroAttempts);
        }
        let wait = match self.wait_seconds {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map_err(|_| BuildError::InvalidWait(secs))?,
            None => self.wait,
        };
        Ok(RetryManager {
            max_attempts: self.max_attempts,
            wait,
            filter: self.filter,
            reset: self.reset,
            attempt_count: 0,
            success: false,
        })
    }
}

impl<E> RetryManagerBuilder<E>
where
    E: Classify,
    E::Kind: 'static,
{
    /// Retry only failures of the given kinds. An empty list retries everything.
    pub fn retry_on_kinds<I>(self, kinds: I) -> Self
    where
        I: IntoIterator<Item = E::Kind>,
    {
        self.retry_on(FailureFilter::kinds(kinds))
    }
}
