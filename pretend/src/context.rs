use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::Level;

use crate::{
    EmittedEvent, Error, LogEntry, Message, Result, SessionId, transcript::Transcript,
};

/// Harness-provided context for the bot to answer through.
///
/// Use it to:
/// - `reply(message, text)`: answer a message, addressing its sender
/// - `send(message, text)`: answer in the same place without addressing anyone
/// - `message_room(room, text)`: post to a room
/// - `send_private(user, text)`: message a user directly
/// - `emit(name, args)`: raise a named event
/// - `log(level, text)`: write a log line
///
/// Every call is appended to the matching log of the [`Session`](crate::Session),
/// where tests can observe it.
#[derive(Clone)]
pub struct Context {
    session_id: SessionId,
    name: Arc<str>,
    alias: Option<Arc<str>>,
    transcript: Transcript,
    alive: Arc<AtomicBool>,
}

impl Context {
    pub(crate) fn new(
        session_id: SessionId,
        name: &str,
        alias: Option<&str>,
        transcript: Transcript,
    ) -> Self {
        Self {
            session_id,
            name: Arc::from(name),
            alias: alias.map(Arc::from),
            transcript,
            alive: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the bot's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bot's alias, if configured.
    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns true between [`Session::start`](crate::Session::start) and
    /// [`Session::shutdown`](crate::Session::shutdown).
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(crate) fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    pub(crate) fn ensure_alive(&self) -> Result {
        if self.is_alive() {
            Ok(())
        } else {
            Err(Error::SessionClosed)
        }
    }

    pub(crate) fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Answer `to` in the same room, prefixed with `@sender`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session is not running.
    pub fn reply(&self, to: &Message, text: impl AsRef<str>) -> Result {
        self.post(to.room(), format!("@{} {}", to.user(), text.as_ref()))
    }

    /// Answer `to` in the same room.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session is not running.
    pub fn send(&self, to: &Message, text: impl Into<String>) -> Result {
        self.post(to.room(), text.into())
    }

    /// Post `text` to `room`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session is not running.
    pub fn message_room(&self, room: &str, text: impl Into<String>) -> Result {
        self.post(Some(room), text.into())
    }

    fn post(&self, room: Option<&str>, text: String) -> Result {
        self.ensure_alive()?;
        let mut message = Message::new(self.name(), text);
        if let Some(room) = room {
            message = message.in_room(room);
        }
        self.transcript.messages.push(message);
        Ok(())
    }

    /// Send `text` to `user` only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session is not running.
    pub fn send_private(&self, user: &str, text: impl Into<String>) -> Result {
        self.ensure_alive()?;
        self.transcript
            .privates(user)
            .push(Message::new(self.name(), text));
        Ok(())
    }

    /// Raise a named event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session is not running.
    pub fn emit<I, S>(&self, name: impl Into<String>, args: I) -> Result
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_alive()?;
        self.transcript.events.push(EmittedEvent::new(name, args));
        Ok(())
    }

    /// Write a log line. It is recorded in the session's logs and forwarded
    /// to `tracing` at the same level.
    pub fn log(&self, level: Level, text: impl Into<String>) {
        let text = text.into();
        let session = self.session_id;
        let bot = self.name();
        match level {
            Level::ERROR => tracing::error!(%session, bot, "{text}"),
            Level::WARN => tracing::warn!(%session, bot, "{text}"),
            Level::INFO => tracing::info!(%session, bot, "{text}"),
            Level::DEBUG => tracing::debug!(%session, bot, "{text}"),
            _ => tracing::trace!(%session, bot, "{text}"),
        }
        self.transcript.logs.push(LogEntry::new(level, text));
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("session_id", &self.session_id)
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        let ctx = Context::new(SessionId::new(), "hubot", Some("hu"), Transcript::default());
        ctx.set_alive(true);
        ctx
    }

    #[test]
    fn reply_addresses_sender_in_same_room() {
        let ctx = context();
        let incoming = Message::new("alice", "hubot hi").in_room("general");
        ctx.reply(&incoming, "hi").unwrap();

        assert_eq!(
            ctx.transcript().messages.last(),
            Some(Message::new("hubot", "@alice hi").in_room("general"))
        );
    }

    #[test]
    fn send_and_message_room() {
        let ctx = context();
        ctx.send(&Message::new("alice", "ping"), "pong").unwrap();
        ctx.message_room("hub", "announcement").unwrap();

        assert_eq!(
            ctx.transcript().messages.entries(),
            vec![
                Message::new("hubot", "pong"),
                Message::new("hubot", "announcement").in_room("hub"),
            ]
        );
    }

    #[test]
    fn private_events_and_logs_are_recorded() {
        let ctx = context();
        ctx.send_private("bob", "secret").unwrap();
        ctx.emit("some-event", ["a", "b"]).unwrap();
        ctx.log(Level::INFO, "loaded");

        let transcript = ctx.transcript();
        assert_eq!(
            transcript.privates("bob").entries(),
            vec![Message::new("hubot", "secret")]
        );
        assert_eq!(
            transcript.events.last(),
            Some(EmittedEvent::new("some-event", ["a", "b"]))
        );
        assert_eq!(
            transcript.logs.last(),
            Some(LogEntry::new(Level::INFO, "loaded"))
        );
    }

    #[test]
    fn closed_context_refuses_to_send() {
        let ctx = context();
        ctx.set_alive(false);
        assert_eq!(
            ctx.message_room("hub", "late"),
            Err(Error::SessionClosed)
        );
        assert!(ctx.transcript().messages.is_empty());
        assert_eq!(ctx.alias(), Some("hu"));
    }
}
