use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{EmittedEvent, LogEntry, Message, ObservedLog};

/// Every log a session records, shared between the session, its users and
/// rooms, and the bot's [`Context`](crate::Context).
#[derive(Clone, Default)]
pub(crate) struct Transcript {
    pub(crate) messages: ObservedLog<Message>,
    pub(crate) events: ObservedLog<EmittedEvent>,
    pub(crate) logs: ObservedLog<LogEntry>,
    privates: Arc<Mutex<HashMap<String, ObservedLog<Message>>>>,
}

impl Transcript {
    /// Private messages sent to `user`, created on first use.
    pub(crate) fn privates(&self, user: &str) -> ObservedLog<Message> {
        self.privates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user.to_owned())
            .or_default()
            .clone()
    }

    fn private_logs(&self) -> Vec<ObservedLog<Message>> {
        self.privates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Drop every watcher on every log.
    pub(crate) fn unobserve_all(&self) {
        self.messages.unobserve_all();
        self.events.unobserve_all();
        self.logs.unobserve_all();
        for log in self.private_logs() {
            log.unobserve_all();
        }
    }

    /// Drop every watcher and every entry.
    pub(crate) fn reset(&self) {
        self.unobserve_all();
        self.messages.clear();
        self.events.clear();
        self.logs.clear();
        for log in self.private_logs() {
            log.clear();
        }
    }
}
