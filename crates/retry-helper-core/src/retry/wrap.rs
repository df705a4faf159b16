//! Wrapping mode: drive a whole session around a closure.

use super::error::RetryError;
use super::manager::RetryManager;
use super::session::AttemptOutcome;

impl<E> RetryManager<E> {
    /// Run `f` in a fresh session until it succeeds or the session ends.
    /// Returns the first success, or the error that ended the session.
    pub fn call<T, F>(&mut self, mut f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        let mut session = self.session();
        loop {
            match session.attempt(&mut f) {
                AttemptOutcome::Succeeded(v) => return Ok(v),
                AttemptOutcome::Failed(e) => return Err(e),
                AttemptOutcome::Retry => {}
                // `Retry` implies attempts remain, and a fresh session always
                // has at least one.
                AttemptOutcome::Finished => unreachable!("retry session finished without outcome"),
            }
        }
    }

    /// Turn `f` into a self-retrying function. Every call of the returned
    /// function is an independent session on this manager's configuration;
    /// the argument is cloned for each attempt.
    pub fn wrap<A, T, F>(mut self, mut f: F) -> impl FnMut(A) -> Result<T, RetryError<E>>
    where
        A: Clone,
        F: FnMut(A) -> Result<T, E>,
    {
        move |arg: A| self.call(|| f(arg.clone()))
    }
}
