use std::fmt;

pub(crate) type EachFn<V> = Box<dyn FnMut(&V) + Send>;

/// Optional limit and per-append callback for [`find`](crate::ObservedLog::find),
/// [`matching`](crate::ObservedLog::matching) and [`all`](crate::ObservedLog::all).
///
/// - `limit`: number of appends to observe before giving up (`find`,
///   `matching`) or completing (`all`). A limit of `0` means no limit.
/// - `iterator`: called with every observed value, matching or not, before
///   the query checks its condition.
///
/// # Examples
///
/// ```rust
/// use pretend::WatchOptions;
///
/// let opts: WatchOptions<String> = WatchOptions::limit(3);
/// assert_eq!(opts.limit_value(), Some(3));
///
/// let opts: WatchOptions<String> = WatchOptions::default()
///     .with_limit(5)
///     .with_iterator(|value| println!("saw {value}"));
/// assert!(opts.has_iterator());
/// ```
pub struct WatchOptions<V> {
    pub(crate) limit: Option<usize>,
    pub(crate) iterator: Option<EachFn<V>>,
}

impl<V> Default for WatchOptions<V> {
    fn default() -> Self {
        Self {
            limit: None,
            iterator: None,
        }
    }
}

impl<V> WatchOptions<V> {
    /// Options with only a limit.
    pub fn limit(limit: usize) -> Self {
        Self::default().with_limit(limit)
    }

    /// Options with only an iterator.
    pub fn each<F>(iterator: F) -> Self
    where
        F: FnMut(&V) + Send + 'static,
    {
        Self::default().with_iterator(iterator)
    }

    /// Set the number of appends to observe.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Set the callback run with every observed value.
    pub fn with_iterator<F>(mut self, iterator: F) -> Self
    where
        F: FnMut(&V) + Send + 'static,
    {
        self.iterator = Some(Box::new(iterator));
        self
    }

    /// Returns the configured limit, if any.
    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// Returns true if an iterator is set.
    pub fn has_iterator(&self) -> bool {
        self.iterator.is_some()
    }
}

impl<V> fmt::Debug for WatchOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchOptions")
            .field("limit", &self.limit)
            .field("iterator", &self.iterator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_means_unlimited() {
        let opts: WatchOptions<u8> = WatchOptions::limit(0);
        assert_eq!(opts.limit_value(), None);
    }

    #[test]
    fn builders_combine() {
        let opts: WatchOptions<u8> = WatchOptions::each(|_| {}).with_limit(2);
        assert_eq!(opts.limit_value(), Some(2));
        assert!(opts.has_iterator());
    }

    #[test]
    fn default_is_empty() {
        let opts: WatchOptions<u8> = WatchOptions::default();
        assert_eq!(opts.limit_value(), None);
        assert!(!opts.has_iterator());
    }
}
