//! Retry a unit of work until it succeeds or runs out of attempts.
//!
//! A [`RetryManager`] holds fixed settings (maximum attempts, a fixed wait
//! after each qualifying failure, an optional failure filter and an optional
//! reset action) plus the counters of the current session. It can be driven
//! two ways:
//!
//! * manually, via [`RetryManager::session`] and a `while session.should_continue()`
//!   loop around [`Session::attempt`];
//! * by wrapping, via [`RetryManager::call`] or [`RetryManager::wrap`].

mod classify;
mod error;
mod manager;
mod session;
mod wrap;

pub use classify::{qualifies, Classify, FailureFilter};
pub use error::{BuildError, RetryError};
pub use manager::{ResetFn, RetryManager, RetryManagerBuilder};
pub use session::{AttemptOutcome, Session};
