use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use tokio::sync::oneshot;

use crate::{Error, Observation, Result, WatcherId, observed_log::WeakLog};

/// A query result that has not resolved yet.
///
/// Returned by [`ObservedLog::next`](crate::ObservedLog::next),
/// [`find`](crate::ObservedLog::find), [`matching`](crate::ObservedLog::matching)
/// and [`all`](crate::ObservedLog::all). The watcher behind it is registered
/// when the query is created, so appends made before the first `.await` are
/// observed.
///
/// Awaiting it has no deadline. If its watcher is removed with
/// [`ObservedLog::unobserve`](crate::ObservedLog::unobserve) the future never
/// resolves; use [`within`](Self::within) to bound the wait.
///
/// Dropping a `Pending` cancels the query: its watcher is removed from the log.
/// Keep it alive for as long as the query, or its iterator, should run.
///
/// # Example
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use pretend::ObservedLog;
///
/// let log = ObservedLog::new();
/// let pending = log.next();
/// log.push("a");
/// let observation = pending.await;
/// assert_eq!(observation.value, Some("a"));
/// assert_eq!(observation.count, 1);
/// # }
/// ```
pub struct Pending<V> {
    id: WatcherId,
    receiver: oneshot::Receiver<Observation<V>>,
    log: WeakLog<V>,
}

impl<V> Pending<V> {
    pub(crate) fn new(
        id: WatcherId,
        receiver: oneshot::Receiver<Observation<V>>,
        log: WeakLog<V>,
    ) -> Self {
        Self { id, receiver, log }
    }

    /// Returns the id of the watcher backing this query.
    #[inline]
    pub fn id(&self) -> WatcherId {
        self.id
    }

    /// Await the result for at most `timeout`.
    ///
    /// On timeout the query is dropped, which removes its watcher, and
    /// [`Error::ObservationTimeout`] is returned.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let reply = session.messages().next();
    /// alice.send("hubot hi").await?;
    /// let reply = reply.within(Duration::from_millis(100)).await?;
    /// ```
    pub async fn within(self, timeout: Duration) -> Result<Observation<V>> {
        let id = self.id;
        match tokio::time::timeout(timeout, self).await {
            Ok(observation) => Ok(observation),
            Err(_) => {
                tracing::warn!(watcher = %id, ?timeout, "observation timed out");
                Err(Error::ObservationTimeout(timeout))
            }
        }
    }
}

impl<V> Future for Pending<V> {
    type Output = Observation<V>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(observation)) => Poll::Ready(observation),
            // Watcher removed without resolving: stays pending.
            Poll::Ready(Err(_)) | Poll::Pending => Poll::Pending,
        }
    }
}

impl<V> Drop for Pending<V> {
    fn drop(&mut self) {
        self.log.unobserve(&self.id);
    }
}

impl<V> fmt::Debug for Pending<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
