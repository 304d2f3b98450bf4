use std::{borrow::Cow, fmt};

use crate::{Searchable, searchable::join};

/// A chat message as seen by the harness: who said what, and where.
///
/// User messages and bot replies share this shape. Messages without a room
/// are direct exchanges with the bot.
///
/// # Example
///
/// ```rust
/// use pretend::{Message, Searchable};
///
/// let msg = Message::new("alice", "hubot hi").in_room("general");
/// assert_eq!(msg.room(), Some("general"));
/// assert_eq!(msg.search_text(), "general alice hubot hi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    room: Option<String>,
    user: String,
    text: String,
}

impl Message {
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            room: None,
            user: user.into(),
            text: text.into(),
        }
    }

    /// Returns the same message placed in `room`.
    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Returns the room the message was sent to, if any.
    #[inline]
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Returns the name of the sender.
    #[inline]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Searchable for Message {
    fn search_text(&self) -> Cow<'_, str> {
        Cow::Owned(join(
            self.room
                .as_deref()
                .into_iter()
                .chain([self.user.as_str(), self.text.as_str()]),
        ))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.room {
            Some(room) => write!(f, "[{room}] {}: {}", self.user, self.text),
            None => write!(f, "{}: {}", self.user, self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_without_room() {
        let msg = Message::new("hubot", "@alice hi");
        assert_eq!(msg.search_text(), "hubot @alice hi");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Message::new("bob", "hi"), Message::new("bob", "hi"));
        assert_ne!(
            Message::new("bob", "hi"),
            Message::new("bob", "hi").in_room("general")
        );
    }

    #[test]
    fn display_includes_room() {
        let msg = Message::new("bob", "hi").in_room("general");
        assert_eq!(msg.to_string(), "[general] bob: hi");
        assert_eq!(Message::new("bob", "hi").to_string(), "bob: hi");
    }
}
