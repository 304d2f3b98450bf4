use std::{
    collections::BTreeMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, TryLockError, Weak},
    thread::{self, ThreadId},
};

use crate::WatcherId;

type Callback<V> = Box<dyn FnMut(&V, &[V], &WatcherId) + Send>;
type Slot<V> = Arc<Mutex<Callback<V>>>;

pub(crate) struct Shared<V> {
    inner: Mutex<Inner<V>>,
    delivery: Delivery,
}

struct Inner<V> {
    entries: Vec<V>,
    watchers: BTreeMap<WatcherId, Slot<V>>,
    last_id: u64,
}

/// Serializes appends across threads. The thread currently notifying owns
/// it; appends it makes from inside a callback run nested, without waiting.
struct Delivery {
    owner: Mutex<Option<ThreadId>>,
    idle: Condvar,
}

impl Delivery {
    fn new() -> Self {
        Self {
            owner: Mutex::new(None),
            idle: Condvar::new(),
        }
    }

    /// Waits for other threads to finish delivering. Returns `None` when the
    /// current thread is already delivering.
    fn enter(&self) -> Option<DeliveryGuard<'_>> {
        let current = thread::current().id();
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        if *owner == Some(current) {
            return None;
        }
        while owner.is_some() {
            owner = self
                .idle
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *owner = Some(current);
        Some(DeliveryGuard(self))
    }
}

struct DeliveryGuard<'a>(&'a Delivery);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        *self.0.owner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.0.idle.notify_all();
    }
}

/// An append-only log that notifies watchers on every append.
///
/// `ObservedLog` owns an ordered sequence and exposes [`push`](Self::push)
/// and [`extend`](Self::extend) as the only mutations that notify. Every
/// append hands the new value, plus a copy of the whole log, to each live
/// watcher in registration order.
///
/// Watchers are either raw callbacks added with [`observe`](Self::observe) or
/// the one-shot queries [`next`](Self::next), [`find`](Self::find),
/// [`matching`](Self::matching) and [`all`](Self::all), which remove
/// themselves once resolved.
///
/// Cloning an `ObservedLog` returns another handle to the same log.
///
/// # Example
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use pretend::{ObservedLog, WatchOptions};
///
/// let log = ObservedLog::new();
/// let found = log.find("b", WatchOptions::default());
/// let missing = log.find("z", WatchOptions::limit(3));
///
/// log.extend(["a", "b", "c"]);
///
/// let found = found.await;
/// assert_eq!((found.value, found.count), (Some("b"), 2));
/// let missing = missing.await;
/// assert_eq!((missing.value, missing.count), (None, 3));
/// # }
/// ```
///
/// # Re-entrancy
///
/// No lock is held while callbacks run, so a callback may register or remove
/// watchers, including itself. Each append notifies the watchers that existed
/// when it started; one removed earlier in the same round is skipped. A
/// callback that appends to the log it watches is not re-entered by that
/// append. A callback that panics is removed.
///
/// Appends from different threads take turns: one waits until the other has
/// notified every watcher, so each watcher sees every value in log order.
pub struct ObservedLog<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for ObservedLog<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V> Default for ObservedLog<V> {
    fn default() -> Self {
        Self::wrap(Vec::new())
    }
}

impl<V> From<Vec<V>> for ObservedLog<V> {
    fn from(entries: Vec<V>) -> Self {
        Self::wrap(entries)
    }
}

impl<V> ObservedLog<V> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of existing entries. They are not announced to watchers.
    pub fn wrap(entries: Vec<V>) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    entries,
                    watchers: BTreeMap::new(),
                    last_id: 0,
                }),
                delivery: Delivery::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn downgrade(&self) -> WeakLog<V> {
        WeakLog(Arc::downgrade(&self.shared))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Run `f` with a borrowed view of the entries.
    ///
    /// Do not append to this log from inside `f`.
    pub fn with_entries<R>(&self, f: impl FnOnce(&[V]) -> R) -> R {
        f(&self.lock().entries)
    }

    /// Remove every entry without notifying watchers.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    // ==================== Watchers ====================

    /// Register a callback run with every later append.
    ///
    /// The callback receives the appended value, the log contents at the
    /// time of the append, and its own id. It stays registered until
    /// removed with [`unobserve`](Self::unobserve) or
    /// [`unobserve_all`](Self::unobserve_all).
    pub fn observe<F>(&self, callback: F) -> WatcherId
    where
        F: FnMut(&V, &[V], &WatcherId) + Send + 'static,
    {
        let callback: Callback<V> = Box::new(callback);
        let mut inner = self.lock();
        inner.last_id += 1;
        let id = WatcherId::new(inner.last_id);
        inner.watchers.insert(id, Arc::new(Mutex::new(callback)));
        tracing::trace!(watcher = %id, watchers = inner.watchers.len(), "watcher registered");
        id
    }

    /// Remove a watcher. Unknown or already removed ids are ignored.
    pub fn unobserve(&self, id: &WatcherId) {
        if self.lock().watchers.remove(id).is_some() {
            tracing::trace!(watcher = %id, "watcher removed");
        }
    }

    /// Remove every watcher. Entries are kept.
    pub fn unobserve_all(&self) {
        let removed = std::mem::take(&mut self.lock().watchers);
        if !removed.is_empty() {
            tracing::trace!(removed = removed.len(), "all watchers removed");
        }
    }

    /// Returns true if the watcher is still registered.
    pub fn is_observing(&self, id: &WatcherId) -> bool {
        self.lock().watchers.contains_key(id)
    }

    /// Returns the number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.lock().watchers.len()
    }

    fn notify(&self, value: &V, state: &[V], watchers: &[(WatcherId, Slot<V>)]) {
        for (id, slot) in watchers {
            if !self.is_observing(id) {
                continue;
            }

            // Appends are serialized, so a busy slot means this thread is
            // inside that very callback.
            let mut callback = match slot.try_lock() {
                Ok(callback) => callback,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    tracing::debug!(watcher = %id, "watcher already running, skipped");
                    continue;
                }
            };

            let result = catch_unwind(AssertUnwindSafe(|| (*callback)(value, state, id)));
            drop(callback);
            if result.is_err() {
                tracing::error!(watcher = %id, "watcher panicked, removing");
                self.unobserve(id);
            }
        }
    }
}

impl<V: Clone> ObservedLog<V> {
    /// Append one value and notify watchers.
    pub fn push(&self, value: V) {
        self.extend([value]);
    }

    /// Append several values in one call.
    ///
    /// All values are appended before anyone is notified. Each value then
    /// triggers its own notification round, in order, and every round sees
    /// the same copy of the log with all of them in it.
    pub fn extend<I>(&self, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        let appended: Vec<V> = values.into_iter().collect();
        if appended.is_empty() {
            return;
        }

        let _delivering = self.shared.delivery.enter();
        let (state, watchers) = {
            let mut inner = self.lock();
            inner.entries.extend(appended.iter().cloned());
            let watchers: Vec<(WatcherId, Slot<V>)> = inner
                .watchers
                .iter()
                .map(|(id, slot)| (*id, Arc::clone(slot)))
                .collect();
            let state = if watchers.is_empty() {
                Vec::new()
            } else {
                inner.entries.clone()
            };
            (state, watchers)
        };

        tracing::trace!(
            appended = appended.len(),
            watchers = watchers.len(),
            "log appended"
        );

        if watchers.is_empty() {
            return;
        }
        for value in &appended {
            self.notify(value, &state, &watchers);
        }
    }

    /// Returns a copy of the entries.
    pub fn entries(&self) -> Vec<V> {
        self.lock().entries.clone()
    }

    /// Returns a copy of the entry at `index`.
    pub fn get(&self, index: usize) -> Option<V> {
        self.lock().entries.get(index).cloned()
    }

    /// Returns a copy of the last entry.
    pub fn last(&self) -> Option<V> {
        self.lock().entries.last().cloned()
    }
}

impl<V> fmt::Debug for ObservedLog<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ObservedLog")
            .field("entries", &inner.entries.len())
            .field("watchers", &inner.watchers.len())
            .field("last_id", &inner.last_id)
            .finish()
    }
}

/// Handle that does not keep the log alive. Held by query watchers and
/// pending results so they can remove themselves.
pub(crate) struct WeakLog<V>(Weak<Shared<V>>);

impl<V> Clone for WeakLog<V> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<V> WeakLog<V> {
    pub(crate) fn unobserve(&self, id: &WatcherId) {
        if let Some(shared) = self.0.upgrade() {
            ObservedLog { shared }.unobserve(id);
        }
    }
}
