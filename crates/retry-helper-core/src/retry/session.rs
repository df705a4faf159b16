//! One retry session: the loop driver handed out by [`RetryManager::session`].
//!
//! ```
//! use retry_helper_core::retry::{AttemptOutcome, RetryManager};
//!
//! let mut manager = RetryManager::<String>::builder().max_attempts(3).build().unwrap();
//! let mut rolls = [2, 6].into_iter();
//! let mut session = manager.session();
//! let mut hit = None;
//! while session.should_continue() {
//!     let outcome = session.attempt(|| match rolls.next() {
//!         Some(6) => Ok(6),
//!         other => Err(format!("rolled {:?}", other)),
//!     });
//!     if let AttemptOutcome::Succeeded(n) = outcome {
//!         hit = Some(n);
//!     }
//! }
//! assert_eq!(hit, Some(6));
//! assert_eq!(manager.attempts(), 2);
//! ```

use super::classify;
use super::error::RetryError;
use super::manager::RetryManager;
use std::fmt;
use std::time::Duration;

/// Result of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    /// The work returned `Ok`; the session is over.
    Succeeded(T),
    /// Qualifying failure with attempts left. The failure was swallowed
    /// after the wait; loop again.
    Retry,
    /// The session ends with this error.
    Failed(RetryError<E>),
    /// The session was already over, so the work did not run.
    Finished,
}

impl<T, E> AttemptOutcome<T, E> {
    /// `Ok(Some(v))` on success, `Ok(None)` when the loop should simply go
    /// around again, `Err` when the failure must propagate.
    pub fn into_result(self) -> Result<Option<T>, RetryError<E>> {
        match self {
            AttemptOutcome::Succeeded(v) => Ok(Some(v)),
            AttemptOutcome::Retry | AttemptOutcome::Finished => Ok(None),
            AttemptOutcome::Failed(e) => Err(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Succeeded(_))
    }
}

/// A live retry session. Borrowing the manager mutably keeps sessions on one
/// manager strictly sequential. Dropping the session does no bookkeeping;
/// the counters stay readable on the manager.
pub struct Session<'a, E> {
    manager: &'a mut RetryManager<E>,
}

impl<E> fmt::Debug for Session<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("attempts", &self.manager.attempt_count)
            .field("max_attempts", &self.manager.max_attempts)
            .field("succeeded", &self.manager.success)
            .finish()
    }
}

impl<'a, E> Session<'a, E> {
    pub(super) fn new(manager: &'a mut RetryManager<E>) -> Self {
        Self { manager }
    }

    pub fn should_continue(&self) -> bool {
        self.manager.should_continue()
    }

    pub fn attempts(&self) -> u32 {
        self.manager.attempt_count
    }

    pub fn succeeded(&self) -> bool {
        self.manager.success
    }

    pub fn max_attempts(&self) -> u32 {
        self.manager.max_attempts
    }

    /// Run one attempt of `work` with full entry/exit bookkeeping.
    ///
    /// Entry: from the second attempt on, the reset action runs first; a
    /// failing reset ends the session without counting an attempt. Then the
    /// counter is bumped.
    ///
    /// Exit: `Ok` marks the session successful. A qualifying `Err` sleeps for
    /// the configured wait (also after the last attempt) and is swallowed
    /// only if attempts remain. A non-qualifying `Err` propagates at once.
    pub fn attempt<T, F>(&mut self, work: F) -> AttemptOutcome<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.manager.should_continue() {
            tracing::debug!(
                "attempt requested on finished session (attempts={}, succeeded={})",
                self.manager.attempt_count,
                self.manager.success
            );
            return AttemptOutcome::Finished;
        }

        if let Err(e) = self.enter() {
            return AttemptOutcome::Failed(e);
        }

        match work() {
            Ok(v) => {
                self.manager.success = true;
                tracing::info!(
                    "attempt {}/{} succeeded",
                    self.manager.attempt_count,
                    self.manager.max_attempts
                );
                AttemptOutcome::Succeeded(v)
            }
            Err(e) => self.exit_with_failure(e),
        }
    }

    fn enter(&mut self) -> Result<(), RetryError<E>> {
        let m = &mut *self.manager;
        if m.attempt_count != 0 {
            if let Some(reset) = m.reset.as_mut() {
                let next = m.attempt_count + 1;
                tracing::debug!("running reset action before attempt {}", next);
                if let Err(source) = reset() {
                    tracing::error!("reset action failed before attempt {}", next);
                    return Err(RetryError::Reset {
                        attempt: next,
                        source,
                    });
                }
            }
        }
        m.attempt_count += 1;
        tracing::debug!("attempt {}/{}", m.attempt_count, m.max_attempts);
        Ok(())
    }

    fn exit_with_failure<T>(&mut self, e: E) -> AttemptOutcome<T, E> {
        let attempt = self.manager.attempt_count;
        if !classify::qualifies(self.manager.filter.as_ref(), &e) {
            tracing::warn!("attempt {} failed with a non-retriable failure", attempt);
            return AttemptOutcome::Failed(RetryError::NotRetriable { attempt, source: e });
        }

        let wait = self.manager.wait;
        let remaining = self.manager.max_attempts - attempt;
        tracing::warn!(
            "attempt {}/{} failed; waiting {:?} ({} attempt(s) left)",
            attempt,
            self.manager.max_attempts,
            wait,
            remaining
        );
        if wait > Duration::ZERO {
            std::thread::sleep(wait);
        }

        if self.manager.should_continue() {
            AttemptOutcome::Retry
        } else {
            tracing::error!("giving up after {} attempt(s)", attempt);
            AttemptOutcome::Failed(RetryError::Exhausted {
                attempts: attempt,
                source: e,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn manager(max_attempts: u32) -> RetryManager<&'static str> {
        RetryManager::builder()
            .max_attempts(max_attempts)
            .build()
            .unwrap()
    }

    #[test]
    fn success_on_first_attempt() {
        let mut m = manager(3);
        let mut s = m.session();
        let out = s.attempt(|| Ok::<_, &str>(7));
        assert!(matches!(out, AttemptOutcome::Succeeded(7)));
        assert!(!s.should_continue());
        assert_eq!(s.attempts(), 1);
        assert!(m.succeeded());
    }

    #[test]
    fn retry_then_exhausted() {
        let mut m = manager(2);
        let mut s = m.session();
        assert!(matches!(
            s.attempt(|| Err::<(), _>("first")),
            AttemptOutcome::Retry
        ));
        match s.attempt(|| Err::<(), _>("second")) {
            AttemptOutcome::Failed(RetryError::Exhausted { attempts, source }) => {
                assert_eq!(attempts, 2);
                assert_eq!(source, "second");
            }
            other => panic!("expected exhausted, got {:?}", other),
        }
        assert!(!s.should_continue());
        assert!(!m.succeeded());
    }

    #[test]
    fn finished_session_does_not_run_work() {
        let mut m = manager(1);
        let mut s = m.session();
        let _ = s.attempt(|| Ok::<_, &str>(()));
        let ran = Cell::new(false);
        let out = s.attempt(|| {
            ran.set(true);
            Ok::<_, &str>(())
        });
        assert!(matches!(out, AttemptOutcome::Finished));
        assert!(!ran.get());
        assert_eq!(m.attempts(), 1);
    }

    #[test]
    fn reset_failure_aborts_without_counting() {
        let calls = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&calls);
        let mut m = RetryManager::builder()
            .max_attempts(5)
            .reset_with(move || {
                seen.set(seen.get() + 1);
                Err("cannot reset")
            })
            .build()
            .unwrap();
        let mut s = m.session();
        assert!(matches!(s.attempt(|| Err::<(), _>("x")), AttemptOutcome::Retry));
        let ran = Cell::new(false);
        match s.attempt(|| {
            ran.set(true);
            Ok::<_, &str>(())
        }) {
            AttemptOutcome::Failed(RetryError::Reset { attempt, source }) => {
                assert_eq!(attempt, 2);
                assert_eq!(source, "cannot reset");
            }
            other => panic!("expected reset failure, got {:?}", other),
        }
        assert!(!ran.get());
        assert_eq!(calls.get(), 1);
        assert_eq!(m.attempts(), 1);
    }

    #[test]
    fn into_result_maps_outcomes() {
        assert_eq!(
            AttemptOutcome::<u8, &str>::Succeeded(1).into_result().unwrap(),
            Some(1)
        );
        assert_eq!(AttemptOutcome::<u8, &str>::Retry.into_result().unwrap(), None);
        assert_eq!(AttemptOutcome::<u8, &str>::Finished.into_result().unwrap(), None);
        let err = AttemptOutcome::<u8, &str>::Failed(RetryError::NotRetriable {
            attempt: 1,
            source: "nope",
        })
        .into_result()
        .unwrap_err();
        assert_eq!(err.into_inner(), "nope");
    }
}
