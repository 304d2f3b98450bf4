use std::borrow::Cow;

use crate::{Searchable, searchable::join};

/// A named event with string arguments.
///
/// The bot emits them through [`Context::emit`](crate::Context::emit); tests
/// raise them for the bot through [`Session::emit`](crate::Session::emit).
/// Both end up in [`Session::events`](crate::Session::events).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmittedEvent {
    name: String,
    args: Vec<String>,
}

impl EmittedEvent {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Searchable for EmittedEvent {
    fn search_text(&self) -> Cow<'_, str> {
        Cow::Owned(join(
            std::iter::once(self.name.as_str()).chain(self.args.iter().map(String::as_str)),
        ))
    }
}
