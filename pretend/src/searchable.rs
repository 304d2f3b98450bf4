use std::borrow::Cow;

/// Text a [`matching`](crate::ObservedLog::matching) query tests its pattern against.
///
/// Composite values are joined with a single space, so the pair
/// `("alice", "hubot hi")` is searched as `"alice hubot hi"`.
///
/// # Example
///
/// ```rust
/// use pretend::Searchable;
///
/// assert_eq!(vec!["alice", "hubot hi"].search_text(), "alice hubot hi");
/// assert_eq!("plain".search_text(), "plain");
/// ```
pub trait Searchable {
    /// Returns the text used for pattern matching.
    fn search_text(&self) -> Cow<'_, str>;
}

impl Searchable for String {
    fn search_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Searchable for &str {
    fn search_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl<S: AsRef<str>> Searchable for Vec<S> {
    fn search_text(&self) -> Cow<'_, str> {
        self.as_slice().search_text()
    }
}

impl<S: AsRef<str>, const N: usize> Searchable for [S; N] {
    fn search_text(&self) -> Cow<'_, str> {
        self.as_slice().search_text()
    }
}

impl<S: AsRef<str>> Searchable for [S] {
    fn search_text(&self) -> Cow<'_, str> {
        match self {
            [single] => Cow::Borrowed(single.as_ref()),
            parts => Cow::Owned(join(parts.iter().map(|part| part.as_ref()))),
        }
    }
}

impl<A: AsRef<str>, B: AsRef<str>> Searchable for (A, B) {
    fn search_text(&self) -> Cow<'_, str> {
        Cow::Owned(join([self.0.as_ref(), self.1.as_ref()]))
    }
}

impl<A: AsRef<str>, B: AsRef<str>, C: AsRef<str>> Searchable for (A, B, C) {
    fn search_text(&self) -> Cow<'_, str> {
        Cow::Owned(join([self.0.as_ref(), self.1.as_ref(), self.2.as_ref()]))
    }
}

pub(crate) fn join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().collect::<Vec<_>>().join(" ")
}
