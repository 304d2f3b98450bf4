use std::borrow::Cow;

use tracing::Level;

use crate::Searchable;

/// A line the bot logged through [`Context::log`](crate::Context::log).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    level: Level,
    text: String,
}

impl LogEntry {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Searched as `"<level> <text>"` with a lowercase level, e.g. `"info started"`.
impl Searchable for LogEntry {
    fn search_text(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "{} {}",
            self.level.as_str().to_ascii_lowercase(),
            self.text
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_uses_lowercase_level() {
        let entry = LogEntry::new(Level::WARN, "disk almost full");
        assert_eq!(entry.search_text(), "warn disk almost full");
        assert_eq!(entry.level(), Level::WARN);
    }
}
