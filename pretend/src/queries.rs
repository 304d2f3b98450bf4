//! One-shot queries on an [`ObservedLog`].
//!
//! Each query registers a single watcher with its own append counter and
//! returns a [`Pending`] result. The watcher removes itself in the same step
//! as it fulfils the result, so a query resolves at most once.

use regex::Regex;
use tokio::sync::oneshot;

use crate::{Error, Matched, Observation, ObservedLog, Pending, Result, Searchable, WatchOptions};

impl<V: Clone + Send + 'static> ObservedLog<V> {
    /// Register a watcher that resolves `Pending` once `step` returns a result.
    fn resolve_with<F>(&self, mut step: F) -> Pending<V>
    where
        F: FnMut(&V, &[V]) -> Option<Observation<V>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let log = self.downgrade();
        let id = self.observe(move |value, state, id| {
            let Some(observation) = step(value, state) else {
                return;
            };
            log.unobserve(id);
            tracing::debug!(
                watcher = %id,
                count = observation.count,
                found = observation.is_found(),
                "query resolved"
            );
            if let Some(tx) = tx.take() {
                let _ = tx.send(observation);
            }
        });
        Pending::new(id, rx, self.downgrade())
    }

    /// Resolve with the next appended value.
    ///
    /// The result always has `count == 1`.
    pub fn next(&self) -> Pending<V> {
        self.resolve_with(|value, state| Some(Observation::found(value, state, 1)))
    }

    /// Resolve when a value equal to `needle` is appended.
    ///
    /// With a limit, resolves with `value: None` and `count == limit` if no
    /// equal value arrived within `limit` appends. When the limit-th append
    /// is also a match, the match wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use pretend::{ObservedLog, WatchOptions};
    ///
    /// let log = ObservedLog::new();
    /// let reply = log.find(vec!["hubot", "@alice hi"], WatchOptions::limit(5));
    /// log.push(vec!["alice", "hubot hi"]);
    /// log.push(vec!["hubot", "@alice hi"]);
    ///
    /// let reply = reply.await;
    /// assert!(reply.is_found());
    /// assert_eq!(reply.count, 2);
    /// # }
    /// ```
    pub fn find(&self, needle: V, options: WatchOptions<V>) -> Pending<V>
    where
        V: PartialEq,
    {
        let WatchOptions {
            limit,
            mut iterator,
        } = options;
        let mut count = 0;
        self.resolve_with(move |value, state| {
            if let Some(each) = iterator.as_mut() {
                each(value);
            }
            count += 1;
            if *value == needle {
                Some(Observation::found(value, state, count))
            } else if limit == Some(count) {
                Some(Observation::exhausted(state, count))
            } else {
                None
            }
        })
    }

    /// Resolve when an appended value's [search text](Searchable) matches `pattern`.
    ///
    /// Same limit and iterator handling as [`find`](Self::find). A successful
    /// result carries the match in [`Observation::matched`].
    ///
    /// # Example
    ///
    /// ```rust
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use pretend::{ObservedLog, WatchOptions};
    /// use regex::Regex;
    ///
    /// let log = ObservedLog::new();
    /// let pattern = Regex::new(r"^hubot @(\w+)").unwrap();
    /// let reply = log.matching(&pattern, WatchOptions::default());
    /// log.push(("hubot", "@bob hello"));
    ///
    /// let reply = reply.await;
    /// assert_eq!(reply.matched.unwrap().get(1), Some("bob"));
    /// # }
    /// ```
    pub fn matching(&self, pattern: &Regex, options: WatchOptions<V>) -> Pending<V>
    where
        V: Searchable,
    {
        let WatchOptions {
            limit,
            mut iterator,
        } = options;
        let pattern = pattern.clone();
        let mut count = 0;
        self.resolve_with(move |value, state| {
            if let Some(each) = iterator.as_mut() {
                each(value);
            }
            count += 1;
            if let Some(matched) = Matched::capture(&pattern, &value.search_text()) {
                Some(Observation::found(value, state, count).with_match(matched))
            } else if limit == Some(count) {
                Some(Observation::exhausted(state, count))
            } else {
                None
            }
        })
    }

    /// Observe every append, resolving after `limit` of them.
    ///
    /// Resolves with the last observed value and `count == limit`. With only
    /// an iterator the query never resolves; remove it with
    /// [`unobserve`](Self::unobserve) or [`unobserve_all`](Self::unobserve_all).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingLimitOrIterator`] without registering anything
    /// if neither a limit nor an iterator is set.
    pub fn all(&self, options: WatchOptions<V>) -> Result<Pending<V>> {
        let WatchOptions {
            limit,
            mut iterator,
        } = options;
        if limit.is_none() && iterator.is_none() {
            return Err(Error::MissingLimitOrIterator);
        }
        let mut count = 0;
        Ok(self.resolve_with(move |value, state| {
            if let Some(each) = iterator.as_mut() {
                each(value);
            }
            count += 1;
            (limit == Some(count)).then(|| Observation::found(value, state, count))
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use regex::Regex;

    use crate::{Error, ObservedLog, WatchOptions};

    const WAIT: Duration = Duration::from_millis(100);

    fn collector<V: Clone + Send + 'static>() -> (Arc<Mutex<Vec<V>>>, WatchOptions<V>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let options = WatchOptions::each(move |value: &V| sink.lock().unwrap().push(value.clone()));
        (seen, options)
    }

    // ==================== next ====================

    #[tokio::test]
    async fn next_resolves_with_first_append() {
        let log = ObservedLog::new();
        let next = log.next();
        log.push("a");
        log.push("b");

        let observation = next.await;
        assert_eq!(observation.value, Some("a"));
        assert_eq!(observation.count, 1);
        assert_eq!(observation.state, vec!["a"]);
        assert!(observation.matched.is_none());
        assert_eq!(log.watcher_count(), 0);
    }

    #[tokio::test]
    async fn next_ignores_entries_before_registration() {
        let log = ObservedLog::wrap(vec![1, 2]);
        let next = log.next();
        log.push(3);

        let observation = next.await;
        assert_eq!(observation.value, Some(3));
        assert_eq!(observation.state, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn next_on_extend_takes_first_value_with_full_snapshot() {
        let log = ObservedLog::new();
        let next = log.next();
        log.extend([1, 2, 3]);

        let observation = next.await;
        assert_eq!(observation.value, Some(1));
        assert_eq!(observation.state, vec![1, 2, 3]);
    }

    // ==================== find ====================

    #[tokio::test]
    async fn find_resolves_on_equal_value() {
        let log = ObservedLog::new();
        let found = log.find("b", WatchOptions::default());
        log.extend(["a", "b", "c"]);

        let observation = found.await;
        assert_eq!(observation.value, Some("b"));
        assert_eq!(observation.count, 2);
        assert_eq!(observation.state, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn find_exhausts_limit_with_no_value() {
        let log = ObservedLog::new();
        let missing = log.find("z", WatchOptions::limit(3));
        log.push("a");
        log.push("b");
        log.push("c");
        log.push("z");

        let observation = missing.await;
        assert_eq!(observation.value, None);
        assert_eq!(observation.count, 3);
        assert_eq!(observation.state, vec!["a", "b", "c"]);
        assert!(!observation.is_found());
    }

    #[tokio::test]
    async fn find_uses_structural_equality() {
        let log = ObservedLog::new();
        let found = log.find(vec!["hubot".to_string(), "@alice hi".to_string()], WatchOptions::default());
        log.push(vec!["alice".to_string(), "hubot hi".to_string()]);
        log.push(vec!["hubot".to_string(), "@alice hi".to_string()]);

        let observation = found.await;
        assert_eq!(observation.count, 2);
        assert_eq!(
            observation.value,
            Some(vec!["hubot".to_string(), "@alice hi".to_string()])
        );
    }

    #[tokio::test]
    async fn find_match_wins_on_limit_append() {
        let log = ObservedLog::new();
        let found = log.find(3, WatchOptions::limit(3));
        log.extend([1, 2, 3]);

        let observation = found.await;
        assert_eq!(observation.value, Some(3));
        assert_eq!(observation.count, 3);
    }

    #[tokio::test]
    async fn find_without_limit_keeps_waiting() {
        let log = ObservedLog::new();
        let found = log.find(99, WatchOptions::default());
        log.extend(0..50);

        let id = found.id();
        assert!(log.is_observing(&id));
        assert!(matches!(
            found.within(Duration::from_millis(10)).await,
            Err(Error::ObservationTimeout(_))
        ));
    }

    #[tokio::test]
    async fn find_iterator_sees_every_value_up_to_resolution() {
        let log = ObservedLog::new();
        let (seen, options) = collector();
        let found = log.find(2, options);
        log.extend([1, 2, 3]);

        let observation = found.within(WAIT).await.unwrap();
        assert_eq!(observation.count, 2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn find_with_iterator_and_limit() {
        let log = ObservedLog::new();
        let (seen, options) = collector();
        let missing = log.find(0, options.with_limit(2));
        log.extend([5, 6, 7]);

        let observation = missing.within(WAIT).await.unwrap();
        assert_eq!(observation.value, None);
        assert_eq!(observation.count, 2);
        assert_eq!(*seen.lock().unwrap(), vec![5, 6]);
    }

    // ==================== matching ====================

    #[tokio::test]
    async fn matching_joins_elements_and_keeps_groups() {
        let log = ObservedLog::new();
        let pattern = Regex::new(r"^hubot @(?P<user>\w+) (.+)$").unwrap();
        let reply = log.matching(&pattern, WatchOptions::default());
        log.push(["alice", "hubot hi"]);
        log.push(["hubot", "@alice hi"]);

        let observation = reply.within(WAIT).await.unwrap();
        assert_eq!(observation.value, Some(["hubot", "@alice hi"]));
        assert_eq!(observation.count, 2);
        let matched = observation.matched.unwrap();
        assert_eq!(matched.as_str(), "hubot @alice hi");
        assert_eq!(matched.name("user"), Some("alice"));
        assert_eq!(matched.get(2), Some("hi"));
        assert_eq!(matched.start(), 0);
    }

    #[tokio::test]
    async fn matching_exhausts_without_match_object() {
        let log = ObservedLog::new();
        let pattern = Regex::new(r"goodbye").unwrap();
        let reply = log.matching(&pattern, WatchOptions::limit(2));
        log.push(("alice", "hello"));
        log.push(("bob", "hello"));

        let observation = reply.within(WAIT).await.unwrap();
        assert_eq!(observation.value, None);
        assert_eq!(observation.count, 2);
        assert!(observation.matched.is_none());
    }

    #[tokio::test]
    async fn matching_wins_on_limit_append() {
        let log = ObservedLog::new();
        let pattern = Regex::new(r"bye$").unwrap();
        let reply = log.matching(&pattern, WatchOptions::limit(2));
        log.push(("alice", "hello"));
        log.push(("alice", "bye"));

        let observation = reply.within(WAIT).await.unwrap();
        assert_eq!(observation.value, Some(("alice", "bye")));
        assert!(observation.matched.is_some());
    }

    #[tokio::test]
    async fn matching_runs_iterator() {
        let log = ObservedLog::new();
        let (seen, options) = collector();
        let pattern = Regex::new(r"c").unwrap();
        let reply = log.matching(&pattern, options);
        log.extend([String::from("a"), String::from("b"), String::from("c")]);

        let observation = reply.within(WAIT).await.unwrap();
        assert_eq!(observation.count, 3);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    // ==================== all ====================

    #[tokio::test]
    async fn all_resolves_after_limit() {
        let log = ObservedLog::new();
        let collected = log.all(WatchOptions::limit(3)).unwrap();
        log.extend(["a", "b"]);
        log.push("c");
        log.push("d");

        let observation = collected.within(WAIT).await.unwrap();
        assert_eq!(observation.value, Some("c"));
        assert_eq!(observation.count, 3);
        assert_eq!(observation.state, vec!["a", "b", "c"]);
        assert_eq!(log.watcher_count(), 0);
    }

    #[tokio::test]
    async fn all_counts_from_registration() {
        let log = ObservedLog::new();
        log.extend([1, 2, 3]);
        let collected = log.all(WatchOptions::limit(2)).unwrap();
        log.extend([4, 5]);

        let observation = collected.within(WAIT).await.unwrap();
        assert_eq!(observation.value, Some(5));
        assert_eq!(observation.count, 2);
    }

    #[tokio::test]
    async fn all_with_iterator_only_keeps_observing() {
        let log = ObservedLog::new();
        let (seen, options) = collector();
        let pending = log.all(options).unwrap();
        log.extend([1, 2, 3, 4]);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
        assert!(log.is_observing(&pending.id()));

        log.unobserve_all();
        log.push(5);
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn all_sees_appends_made_from_other_threads_while_busy() {
        let log = ObservedLog::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let both = log
            .all(WatchOptions::limit(2).with_iterator(move |value: &u32| {
                std::thread::sleep(Duration::from_millis(100));
                sink.lock().unwrap().push(*value);
            }))
            .unwrap();

        let first = {
            let log = log.clone();
            std::thread::spawn(move || log.push(1))
        };
        std::thread::sleep(Duration::from_millis(20));
        let second = {
            let log = log.clone();
            std::thread::spawn(move || log.push(2))
        };
        first.join().unwrap();
        second.join().unwrap();

        let both = both.within(WAIT).await.unwrap();
        assert_eq!(both.count, 2);
        assert_eq!(both.value, Some(2));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(log.watcher_count(), 0);
    }

    #[test]
    fn dropping_a_query_removes_its_watcher() {
        let log: ObservedLog<u32> = ObservedLog::new();
        let found = log.find(7, WatchOptions::default());
        let kept = log.next();
        assert_eq!(log.watcher_count(), 2);

        drop(found);
        log.push(1);

        assert_eq!(log.watcher_count(), 0);
        assert!(!log.is_observing(&kept.id()));
    }

    #[test]
    fn all_without_limit_or_iterator_fails_without_registering() {
        let log: ObservedLog<u8> = ObservedLog::new();
        let result = log.all(WatchOptions::default());
        assert!(matches!(result, Err(Error::MissingLimitOrIterator)));
        assert_eq!(log.watcher_count(), 0);

        log.push(1);
        assert_eq!(log.watcher_count(), 0);
    }

    #[test]
    fn zero_limit_without_iterator_is_a_usage_error() {
        let log: ObservedLog<u8> = ObservedLog::new();
        assert!(log.all(WatchOptions::limit(0)).is_err());
    }

    // ==================== interplay ====================

    #[tokio::test]
    async fn queries_resolve_independently() {
        let log = ObservedLog::new();
        let next = log.next();
        let found = log.find("b", WatchOptions::default());
        let missing = log.find("z", WatchOptions::limit(3));
        let collected = log.all(WatchOptions::limit(2)).unwrap();

        log.push("a");
        log.push("b");
        log.push("c");

        let (next, found, missing, collected) = tokio::join!(next, found, missing, collected);
        assert_eq!((next.value, next.count), (Some("a"), 1));
        assert_eq!((found.value, found.count), (Some("b"), 2));
        assert_eq!((missing.value, missing.count), (None, 3));
        assert_eq!((collected.value, collected.count), (Some("b"), 2));
        assert_eq!(log.watcher_count(), 0);
    }

    #[tokio::test]
    async fn manual_unobserve_after_resolution_is_harmless() {
        let log = ObservedLog::new();
        let first = log.next();
        let second = log.all(WatchOptions::limit(2)).unwrap();
        let first_id = first.id();

        log.push(1);
        log.unobserve(&first_id);
        log.push(2);

        assert_eq!(first.await.value, Some(1));
        assert_eq!(second.await.value, Some(2));
    }

    #[tokio::test]
    async fn resolved_state_is_not_affected_by_later_appends() {
        let log = ObservedLog::new();
        let next = log.next();
        log.push(1);
        log.extend([2, 3]);

        let observation = next.await;
        assert_eq!(observation.state, vec![1]);
        assert_eq!(log.entries(), vec![1, 2, 3]);
    }
}
