use std::{sync::Arc, time::Duration};

/// The single error type for all pretend operations.
///
/// Every fallible API returns `pretend::Result<T>` (alias for
/// `Result<T, pretend::Error>`). Errors raised by the bot under test are
/// wrapped in [`Error::External`] so callers only handle one error type.
///
/// A `find` or `matching` query that reaches its limit without success is
/// not an error: it resolves with an empty [`value`](crate::Observation::value).
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("all() must be called with either a limit or an iterator")]
    MissingLimitOrIterator,

    #[error("observation not resolved within {0:?}")]
    ObservationTimeout(Duration),

    #[error("Session is not running")]
    SessionClosed,

    #[error("External error: {0}")]
    External(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn external(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::External(Arc::new(e))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingLimitOrIterator, Self::MissingLimitOrIterator) => true,
            (Self::ObservationTimeout(a), Self::ObservationTimeout(b)) => a == b,
            (Self::SessionClosed, Self::SessionClosed) => true,
            (Self::External(a), Self::External(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::external(e)
    }
}
