use std::{fmt, sync::Arc};

use crate::{Bot, Incoming, Message, ObservedLog, Result, Room, internal::BotController};

/// A simulated chat user.
///
/// Created with [`Session::user`](crate::Session::user). Cheap to clone.
/// A user handle optionally carries a room: [`in_room`](Self::in_room)
/// returns the same user speaking in that room.
///
/// # Example
///
/// ```ignore
/// let alice = session.user("alice");
/// alice.send("hubot hi").await?;
/// alice.in_room(&general).send("hubot hi").await?;
/// ```
pub struct User<B: Bot> {
    name: Arc<str>,
    room: Option<Arc<str>>,
    controller: BotController<B>,
}

impl<B: Bot> Clone for User<B> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            room: self.room.clone(),
            controller: self.controller.clone(),
        }
    }
}

impl<B: Bot> User<B> {
    pub(crate) fn new(name: &str, controller: BotController<B>) -> Self {
        Self {
            name: Arc::from(name),
            room: None,
            controller,
        }
    }

    /// Returns the user's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the room this handle speaks in, if any.
    #[inline]
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Returns this user speaking in `room`.
    pub fn in_room(&self, room: &Room<B>) -> Self {
        self.in_room_named(room.name())
    }

    pub(crate) fn in_room_named(&self, room: &str) -> Self {
        Self {
            room: Some(Arc::from(room)),
            ..self.clone()
        }
    }

    /// Say `text`.
    ///
    /// The message is appended to the session's messages before the bot
    /// sees it, so replies always follow it in the log. Resolves once the
    /// bot has finished handling it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`](crate::Error::SessionClosed) if the
    /// session is not running, or whatever the bot's handler failed with.
    pub async fn send(&self, text: impl Into<String>) -> Result {
        let ctx = self.controller.ctx();
        ctx.ensure_alive()?;
        let mut message = Message::new(self.name(), text);
        if let Some(room) = self.room() {
            message = message.in_room(room);
        }
        ctx.transcript().messages.push(message.clone());
        self.controller.deliver(Incoming::Text(message)).await
    }

    /// Enter the current room (or announce presence without a room).
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn enter(&self) -> Result {
        self.controller
            .deliver(Incoming::Enter {
                user: self.name().to_owned(),
                room: self.room().map(str::to_owned),
            })
            .await
    }

    /// Leave the current room.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn leave(&self) -> Result {
        self.controller
            .deliver(Incoming::Leave {
                user: self.name().to_owned(),
                room: self.room().map(str::to_owned),
            })
            .await
    }

    /// Private messages the bot sent to this user, as an observable log.
    pub fn privates(&self) -> ObservedLog<Message> {
        self.controller.ctx().transcript().privates(self.name())
    }
}

impl<B: Bot> fmt::Debug for User<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("room", &self.room)
            .finish_non_exhaustive()
    }
}
