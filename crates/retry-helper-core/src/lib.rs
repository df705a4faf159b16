pub mod config;
pub mod logging;
pub mod retry;

pub use retry::{
    AttemptOutcome, BuildError, Classify, FailureFilter, RetryError, RetryManager, Session,
};
