//! Decide which failures qualify for another attempt.

use std::fmt;
use std::sync::Arc;

/// Maps an error value onto a coarse kind so a retry filter can be
/// expressed as a list of kinds instead of a predicate.
///
/// Implement this for your own error enum when you want
/// [`FailureFilter::kinds`] / `retry_on_kinds`.
pub trait Classify {
    type Kind: PartialEq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Predicate over failures. A failure that matches is retried (while
/// attempts remain); one that does not is propagated on the spot.
///
/// Cloning is cheap; the predicate is shared.
pub struct FailureFilter<E> {
    matches: Arc<dyn Fn(&E) -> bool>,
    label: String,
}

impl<E> Clone for FailureFilter<E> {
    fn clone(&self) -> Self {
        Self {
            matches: Arc::clone(&self.matches),
            label: self.label.clone(),
        }
    }
}

impl<E> fmt::Debug for FailureFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FailureFilter").field(&self.label).finish()
    }
}

impl<E> FailureFilter<E> {
    /// Any closure over `&E`.
    pub fn predicate<P>(pred: P) -> Self
    where
        P: Fn(&E) -> bool + 'static,
    {
        Self {
            matches: Arc::new(pred),
            label: "<predicate>".to_string(),
        }
    }

    /// Filter that accepts every failure. Equivalent to leaving the filter unset.
    pub fn any() -> Self {
        Self {
            matches: Arc::new(|_| true),
            label: "<any>".to_string(),
        }
    }

    /// True when `err` qualifies for a retry.
    pub fn matches(&self, err: &E) -> bool {
        (self.matches)(err)
    }
}

impl<E> FailureFilter<E>
where
    E: Classify,
    E::Kind: 'static,
{
    /// Retry only failures whose [`Classify::kind`] is one of `kinds`.
    ///
    /// An empty list matches everything, same as an unset filter.
    pub fn kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = E::Kind>,
    {
        let kinds: Vec<E::Kind> = kinds.into_iter().collect();
        if kinds.is_empty() {
            return Self::any();
        }
        let label = format!("{:?}", kinds);
        Self {
            matches: Arc::new(move |e: &E| kinds.contains(&e.kind())),
            label,
        }
    }
}

/// True when `err` qualifies under an optional filter. `None` qualifies everything.
pub fn qualifies<E>(filter: Option<&FailureFilter<E>>, err: &E) -> bool {
    filter.map_or(true, |f| f.matches(err))
}
