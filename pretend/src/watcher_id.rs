use std::{fmt, hash::Hash};

/// Unique identifier for a watcher registered on an [`ObservedLog`](crate::ObservedLog).
///
/// Returned by [`ObservedLog::observe`](crate::ObservedLog::observe) and
/// [`Pending::id`](crate::Pending::id). Use it to remove the watcher again
/// with [`ObservedLog::unobserve`](crate::ObservedLog::unobserve).
///
/// Ids come from a per-log counter, so they order watchers by registration
/// and print as `observer_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatcherId(u64);

impl WatcherId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_observer_prefix() {
        assert_eq!(WatcherId::new(7).to_string(), "observer_7");
    }

    #[test]
    fn orders_by_registration() {
        assert!(WatcherId::new(1) < WatcherId::new(2));
    }
}
