use crate::{EmittedEvent, Message};

/// Something the harness delivers to the bot under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A user said something.
    Text(Message),
    /// A user entered a room (or the bot's presence when `room` is `None`).
    Enter { user: String, room: Option<String> },
    /// A user left a room.
    Leave { user: String, room: Option<String> },
    /// An event raised by the test through [`Session::emit`](crate::Session::emit).
    Event(EmittedEvent),
}

impl Incoming {
    /// Returns the name of the user this came from. Events have none.
    pub fn user(&self) -> Option<&str> {
        match self {
            Incoming::Text(message) => Some(message.user()),
            Incoming::Enter { user, .. } | Incoming::Leave { user, .. } => Some(user),
            Incoming::Event(_) => None,
        }
    }

    /// Returns the room this happened in, if any.
    pub fn room(&self) -> Option<&str> {
        match self {
            Incoming::Text(message) => message.room(),
            Incoming::Enter { room, .. } | Incoming::Leave { room, .. } => room.as_deref(),
            Incoming::Event(_) => None,
        }
    }

    /// Returns the message for [`Incoming::Text`].
    pub fn message(&self) -> Option<&Message> {
        match self {
            Incoming::Text(message) => Some(message),
            _ => None,
        }
    }

    /// Returns the event for [`Incoming::Event`].
    pub fn event(&self) -> Option<&EmittedEvent> {
        match self {
            Incoming::Event(event) => Some(event),
            _ => None,
        }
    }
}
