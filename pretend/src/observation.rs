use std::collections::HashMap;

use regex::{Captures, Regex};

/// The outcome of a query on an [`ObservedLog`](crate::ObservedLog).
///
/// # Fields
///
/// - `value`: the element that resolved the query, or `None` when a `find`
///   or `matching` query reached its limit without success
/// - `state`: copy of the whole log taken at the resolving append
/// - `count`: appends observed since the query was registered, including
///   the resolving one
/// - `matched`: the pattern match, only for successful `matching` queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation<V> {
    pub value: Option<V>,
    pub state: Vec<V>,
    pub count: usize,
    pub matched: Option<Matched>,
}

impl<V: Clone> Observation<V> {
    pub(crate) fn found(value: &V, state: &[V], count: usize) -> Self {
        Self {
            value: Some(value.clone()),
            state: state.to_vec(),
            count,
            matched: None,
        }
    }

    pub(crate) fn exhausted(state: &[V], count: usize) -> Self {
        Self {
            value: None,
            state: state.to_vec(),
            count,
            matched: None,
        }
    }

    pub(crate) fn with_match(mut self, matched: Matched) -> Self {
        self.matched = Some(matched);
        self
    }
}

impl<V> Observation<V> {
    /// Returns true if the query resolved on its condition rather than its limit.
    #[inline]
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

/// Owned copy of a successful pattern match.
///
/// Holds the searched text together with every capture group so it can
/// outlive the value it was taken from.
///
/// # Example
///
/// ```rust
/// use pretend::Matched;
/// use regex::Regex;
///
/// let pattern = Regex::new(r"@(?P<user>\w+) (\w+)").unwrap();
/// let matched = Matched::capture(&pattern, "hubot @alice hi").unwrap();
/// assert_eq!(matched.as_str(), "@alice hi");
/// assert_eq!(matched.name("user"), Some("alice"));
/// assert_eq!(matched.get(2), Some("hi"));
/// assert_eq!(matched.start(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    input: String,
    start: usize,
    end: usize,
    groups: Vec<Option<String>>,
    named: HashMap<String, String>,
}

impl Matched {
    /// Run `pattern` against `input`, keeping the first match.
    pub fn capture(pattern: &Regex, input: &str) -> Option<Self> {
        pattern
            .captures(input)
            .map(|caps| Self::from_captures(pattern, &caps, input))
    }

    fn from_captures(pattern: &Regex, caps: &Captures<'_>, input: &str) -> Self {
        let whole = caps.get(0);
        let groups = caps
            .iter()
            .map(|group| group.map(|m| m.as_str().to_owned()))
            .collect();
        let named = pattern
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_owned(), m.as_str().to_owned())))
            .collect();
        Self {
            input: input.to_owned(),
            start: whole.map_or(0, |m| m.start()),
            end: whole.map_or(0, |m| m.end()),
            groups,
            named,
        }
    }

    /// Returns the text of the whole match.
    pub fn as_str(&self) -> &str {
        &self.input[self.start..self.end]
    }

    /// Returns the capture group at `index` (0 is the whole match).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// Returns a named capture group.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Returns the number of groups, including the whole match.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always false: a match has at least the whole-match group.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Byte offset where the match starts in the searched text.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset where the match ends in the searched text.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The full text the pattern was run against.
    pub fn input(&self) -> &str {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_optional_group_is_none() {
        let pattern = Regex::new(r"hi( there)?").unwrap();
        let matched = Matched::capture(&pattern, "alice hi").unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched.get(0), Some("hi"));
        assert_eq!(matched.get(1), None);
        assert_eq!(matched.get(5), None);
        assert_eq!(matched.input(), "alice hi");
        assert_eq!(matched.end(), 8);
    }

    #[test]
    fn no_match_is_none() {
        let pattern = Regex::new(r"^bye").unwrap();
        assert!(Matched::capture(&pattern, "hello").is_none());
    }

    #[test]
    fn found_and_exhausted_copy_state() {
        let state = vec![1, 2, 3];
        let found = Observation::found(&2, &state, 2);
        assert!(found.is_found());
        assert_eq!(found.state, state);

        let exhausted = Observation::<i32>::exhausted(&state, 3);
        assert!(!exhausted.is_found());
        assert_eq!(exhausted.count, 3);
    }
}
