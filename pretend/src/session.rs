use std::{collections::BTreeMap, fmt};

use tokio::sync::MutexGuard;

use crate::{
    Bot, Config, Context, EmittedEvent, Incoming, LogEntry, Message, ObservedLog, Result, Room,
    SessionId, User, internal::BotController, transcript::Transcript,
};

/// Test session for a chat bot.
///
/// The session owns the bot under test, the simulated users and rooms, and
/// every observable log:
/// - [`messages`](Self::messages) - everything said, by users and by the bot
/// - [`events`](Self::events) - events the bot emitted or the test raised
/// - [`logs`](Self::logs) - lines the bot logged
/// - [`User::privates`] - private messages per user
///
/// # Example
///
/// ```ignore
/// let mut session = Session::with_config(MyBot, Config::default().with_users(["alice"]));
/// session.start().await?;
///
/// let reply = session.messages().find(Message::new("hubot", "@alice hi"), WatchOptions::limit(2));
/// session.user("alice").send("hubot hi").await?;
/// assert!(reply.await.is_found());
///
/// session.shutdown().await?;
/// ```
///
/// # Lifecycle
///
/// Nothing can be sent before [`start`](Self::start). Calling `start` again
/// resets the session: logs, watchers, users and rooms are cleared and the
/// configured users and rooms are created anew. After
/// [`shutdown`](Self::shutdown) every watcher is removed and sending fails
/// with [`Error::SessionClosed`](crate::Error::SessionClosed).
pub struct Session<B: Bot> {
    id: SessionId,
    config: Config,
    controller: BotController<B>,
    users: BTreeMap<String, User<B>>,
    rooms: BTreeMap<String, Room<B>>,
}

impl<B: Bot> Session<B> {
    /// Create a session with the default [`Config`].
    pub fn new(bot: B) -> Self {
        Self::with_config(bot, Config::default())
    }

    /// Create a session with a custom configuration.
    pub fn with_config(bot: B, config: Config) -> Self {
        let id = SessionId::new();
        let ctx = Context::new(id, config.name(), config.alias(), Transcript::default());
        Self {
            id,
            config,
            controller: BotController::new(bot, ctx),
            users: BTreeMap::new(),
            rooms: BTreeMap::new(),
        }
    }

    /// Returns this session's id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the context handed to the bot.
    pub fn context(&self) -> &Context {
        self.controller.ctx()
    }

    fn transcript(&self) -> &Transcript {
        self.controller.ctx().transcript()
    }

    // ==================== Lifecycle ====================

    /// Start, or restart, the session.
    ///
    /// Clears every log and watcher, recreates the configured users and
    /// rooms, then runs [`Bot::on_start`].
    ///
    /// # Errors
    ///
    /// Returns the error from [`Bot::on_start`], unless the bot's
    /// [`Bot::on_error`] swallows it.
    pub async fn start(&mut self) -> Result {
        self.transcript().reset();
        self.users.clear();
        self.rooms.clear();

        for room in self.config.rooms().to_vec() {
            self.room(&room);
        }
        for user in self.config.users().to_vec() {
            self.user(&user);
        }

        self.controller.start().await?;
        tracing::debug!(
            session = %self.id,
            bot = self.config.name(),
            users = self.users.len(),
            rooms = self.rooms.len(),
            "session started"
        );
        Ok(())
    }

    /// Shut the session down.
    ///
    /// Runs [`Bot::on_shutdown`], closes the session and removes every
    /// watcher. Logs stay readable. Does nothing if the session is not running.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Bot::on_shutdown`]; the session is closed
    /// either way.
    pub async fn shutdown(&mut self) -> Result {
        if !self.context().is_alive() {
            return Ok(());
        }
        let res = self.controller.shutdown().await;
        self.transcript().unobserve_all();
        tracing::debug!(session = %self.id, "session shut down");
        res
    }

    /// Returns true between [`start`](Self::start) and [`shutdown`](Self::shutdown).
    pub fn is_running(&self) -> bool {
        self.context().is_alive()
    }

    // ==================== Users and rooms ====================

    /// Returns the user called `name`, creating it on first use.
    pub fn user(&mut self, name: &str) -> User<B> {
        let controller = &self.controller;
        self.users
            .entry(name.to_owned())
            .or_insert_with(|| User::new(name, controller.clone()))
            .clone()
    }

    /// Returns the room called `name`, creating it on first use.
    pub fn room(&mut self, name: &str) -> Room<B> {
        let controller = &self.controller;
        self.rooms
            .entry(name.to_owned())
            .or_insert_with(|| Room::new(name, controller.clone()))
            .clone()
    }

    /// Returns every user created since the last start, by name.
    pub fn users(&self) -> &BTreeMap<String, User<B>> {
        &self.users
    }

    /// Returns every room created since the last start, by name.
    pub fn rooms(&self) -> &BTreeMap<String, Room<B>> {
        &self.rooms
    }

    /// Raise an event for the bot to handle as [`Incoming::Event`].
    ///
    /// The event is appended to [`events`](Self::events) before the bot sees
    /// it, so anything the bot emits in response follows it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`](crate::Error::SessionClosed) if the
    /// session is not running, or whatever the bot's handler failed with.
    pub async fn emit<I, S>(&self, name: impl Into<String>, args: I) -> Result
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ctx = self.context();
        ctx.ensure_alive()?;
        let event = EmittedEvent::new(name, args);
        ctx.transcript().events.push(event.clone());
        tracing::debug!(session = %self.id, event = event.name(), "event raised");
        self.controller.deliver(Incoming::Event(event)).await
    }

    /// Exclusive access to the bot, e.g. to inspect its state.
    pub async fn bot(&self) -> MutexGuard<'_, B> {
        self.controller.bot().await
    }

    // ==================== Observable logs ====================

    /// Every message said in the session, in order.
    pub fn messages(&self) -> &ObservedLog<Message> {
        &self.transcript().messages
    }

    /// Private messages the bot sent to `user`.
    pub fn privates(&self, user: &str) -> ObservedLog<Message> {
        self.transcript().privates(user)
    }

    /// Events the bot emitted and events raised with [`emit`](Self::emit).
    pub fn events(&self) -> &ObservedLog<EmittedEvent> {
        &self.transcript().events
    }

    /// Lines the bot logged.
    pub fn logs(&self) -> &ObservedLog<LogEntry> {
        &self.transcript().logs
    }
}

#[cfg(feature = "serde")]
impl<B: Bot> Session<B> {
    /// Export the messages and emitted events as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns any serialization error produced by `serde_json`.
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn transcript_json(&self) -> serde_json::Result<String> {
        use serde::Serialize;

        #[derive(Serialize)]
        struct TranscriptExport {
            session: String,
            bot: String,
            messages: Vec<Message>,
            events: Vec<EmittedEvent>,
        }

        serde_json::to_string_pretty(&TranscriptExport {
            session: self.id.to_string(),
            bot: self.config.name().to_owned(),
            messages: self.messages().entries(),
            events: self.events().entries(),
        })
    }
}

impl<B: Bot> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("users", &self.users.len())
            .field("rooms", &self.rooms.len())
            .field("messages", &self.messages().len())
            .finish_non_exhaustive()
    }
}
