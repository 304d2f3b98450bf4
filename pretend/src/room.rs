use std::{fmt, sync::Arc};

use crate::{Bot, Result, User, internal::BotController};

/// A simulated chat room.
///
/// Created with [`Session::room`](crate::Session::room). Cheap to clone.
pub struct Room<B: Bot> {
    name: Arc<str>,
    controller: BotController<B>,
}

impl<B: Bot> Clone for Room<B> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            controller: self.controller.clone(),
        }
    }
}

impl<B: Bot> Room<B> {
    pub(crate) fn new(name: &str, controller: BotController<B>) -> Self {
        Self {
            name: Arc::from(name),
            controller,
        }
    }

    /// Returns the room's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `user` says `text` in this room.
    ///
    /// # Errors
    ///
    /// See [`User::send`].
    pub async fn receive(&self, user: &User<B>, text: impl Into<String>) -> Result {
        user.in_room_named(self.name()).send(text).await
    }

    /// `user` enters this room.
    ///
    /// # Errors
    ///
    /// See [`User::enter`].
    pub async fn enter(&self, user: &User<B>) -> Result {
        user.in_room_named(self.name()).enter().await
    }

    /// `user` leaves this room.
    ///
    /// # Errors
    ///
    /// See [`User::leave`].
    pub async fn leave(&self, user: &User<B>) -> Result {
        user.in_room_named(self.name()).leave().await
    }

    /// Messages posted in this room so far, as `(user, text)` pairs.
    pub fn messages(&self) -> Vec<(String, String)> {
        self.controller
            .ctx()
            .transcript()
            .messages
            .with_entries(|entries| {
                entries
                    .iter()
                    .filter(|msg| msg.room() == Some(self.name()))
                    .map(|msg| (msg.user().to_owned(), msg.text().to_owned()))
                    .collect()
            })
    }
}

impl<B: Bot> fmt::Debug for Room<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
