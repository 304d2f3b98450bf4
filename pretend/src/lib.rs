#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Pretend
//!
//! A test harness for chat bots built on observable, append-only logs.
//!
//! Everything the bot under test does lands in an [`ObservedLog`]: messages,
//! private messages, emitted events and log lines. Tests register queries on
//! those logs *before* acting, then await the result. No polling, no sleeps.
//!
//! ## Quick Start
//!
//! ```rust
//! use pretend::*;
//!
//! struct Greeter;
//!
//! impl Bot for Greeter {
//!     async fn receive(&mut self, ctx: &Context, incoming: &Incoming) -> Result {
//!         if let Incoming::Text(message) = incoming {
//!             if message.text() == "hubot hi" {
//!                 ctx.reply(message, "hi")?;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result {
//! let mut session = Session::new(Greeter);
//! session.start().await?;
//!
//! let reply = session.messages().next();
//! let alice = session.user("alice");
//! alice.send("hubot hi").await?;
//!
//! // `next` registered before the user spoke, so it sees her own message first
//! assert_eq!(reply.await.value, Some(Message::new("alice", "hubot hi")));
//! assert_eq!(session.messages().last(), Some(Message::new("hubot", "@alice hi")));
//!
//! session.shutdown().await
//! # }
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ObservedLog`] | Append-only log that notifies watchers on every append |
//! | [`Pending`] | A query result that has not resolved yet |
//! | [`Observation`] | What a query resolved with: value, state, count, match |
//! | [`WatchOptions`] | Limit and per-append callback for queries |
//! | [`Session`] | Owns the bot, users, rooms and logs |
//! | [`Bot`] | Trait for the bot under test |
//! | [`Context`] | Lets the bot reply, emit events and log |
//!
//! ## Queries
//!
//! | Query | Resolves when |
//! |-------|---------------|
//! | [`next`](ObservedLog::next) | the next value is appended |
//! | [`find`](ObservedLog::find) | an appended value equals the needle, or the limit is reached |
//! | [`matching`](ObservedLog::matching) | an appended value matches a pattern, or the limit is reached |
//! | [`all`](ObservedLog::all) | the limit is reached |
//!
//! Awaiting a [`Pending`] has no deadline. Use [`Pending::within`] to fail
//! with [`Error::ObservationTimeout`] instead of waiting forever.
//!
//! ## Watchers
//!
//! Raw callbacks can be registered with [`ObservedLog::observe`]. They run
//! in registration order, once per appended value, and receive the value,
//! a snapshot of the log and their own [`WatcherId`]:
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use pretend::ObservedLog;
//!
//! let log = ObservedLog::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! log.observe(move |value: &u32, state: &[u32], _id| {
//!     sink.lock().unwrap().push((*value, state.len()));
//! });
//! log.extend([1, 2]);
//! assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
//! ```
//!
//! ## Features
//!
//! - **`serde`** - Serialize/deserialize messages, events and config; adds
//!   `Session::transcript_json()`

mod bot;
mod config;
mod context;
mod emitted_event;
mod error;
mod incoming;
mod log_entry;
mod message;
mod observation;
mod observed_log;
mod pending;
mod queries;
mod room;
mod searchable;
mod session;
mod session_id;
mod transcript;
mod user;
mod watch_options;
mod watcher_id;

mod internal;

pub use bot::Bot;
pub use config::Config;
pub use context::Context;
pub use emitted_event::EmittedEvent;
pub use error::Error;
pub use incoming::Incoming;
pub use log_entry::LogEntry;
pub use message::Message;
pub use observation::{Matched, Observation};
pub use observed_log::ObservedLog;
pub use pending::Pending;
pub use room::Room;
pub use searchable::Searchable;
pub use session::Session;
pub use session_id::SessionId;
pub use user::User;
pub use watch_options::WatchOptions;
pub use watcher_id::WatcherId;

/// Convenience alias for `Result<T, pretend::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
