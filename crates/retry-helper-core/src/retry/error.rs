//! Errors surfaced by a retry session and by manager construction.

use std::fmt;

/// How a retry session ended without success. Always carries the most
/// recent failure; earlier failures are dropped.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a qualifying failure; `source` is the last one.
    Exhausted { attempts: u32, source: E },
    /// The failure did not match the retry filter and was propagated at once.
    NotRetriable { attempt: u32, source: E },
    /// The reset action failed before `attempt` could start.
    Reset { attempt: u32, source: E },
}

impl<E> RetryError<E> {
    /// The underlying failure.
    pub fn inner(&self) -> &E {
        match self {
            RetryError::Exhausted { source, .. }
            | RetryError::NotRetriable { source, .. }
            | RetryError::Reset { source, .. } => source,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { source, .. }
            | RetryError::NotRetriable { source, .. }
            | RetryError::Reset { source, .. } => source,
        }
    }

    /// Attempts consumed by the session when it ended.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::NotRetriable { attempt, .. } => *attempt,
            // The attempt that the reset was preparing never started.
            RetryError::Reset { attempt, .. } => attempt.saturating_sub(1),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted { attempts, source } => {
                write!(f, "giving up after {} attempt(s): {}", attempts, source)
            }
            RetryError::NotRetriable { attempt, source } => {
                write!(f, "attempt {} failed (not retried): {}", attempt, source)
            }
            RetryError::Reset { attempt, source } => {
                write!(f, "reset before attempt {} failed: {}", attempt, source)
            }
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner())
    }
}

/// Invalid manager configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("wait_seconds must be a finite, non-negative number (got {0})")]
    InvalidWait(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn inner_and_attempts() {
        let e = RetryError::Exhausted {
            attempts: 3,
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert!(e.is_exhausted());
        assert_eq!(e.attempts(), 3);
        assert_eq!(e.inner().to_string(), "boom");
        assert_eq!(e.into_inner().kind(), io::ErrorKind::Other);
    }

    #[test]
    fn reset_counts_only_started_attempts() {
        let e = RetryError::Reset {
            attempt: 2,
            source: "reset failed",
        };
        assert_eq!(e.attempts(), 1);
        assert!(!e.is_exhausted());
    }

    #[test]
    fn display_and_source() {
        let e = RetryError::NotRetriable {
            attempt: 1,
            source: io::Error::new(io::ErrorKind::InvalidInput, "bad input"),
        };
        assert_eq!(e.to_string(), "attempt 1 failed (not retried): bad input");
        assert_eq!(e.source().map(|s| s.to_string()), Some("bad input".into()));
    }

    #[test]
    fn build_error_messages() {
        assert_eq!(
            BuildError::ZeroAttempts.to_string(),
            "max_attempts must be at least 1"
        );
        assert!(BuildError::InvalidWait(-1.0).to_string().contains("-1"));
    }
}
