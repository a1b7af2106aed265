//! Per-conversation ephemeral state (in-memory, process lifetime).

use std::collections::HashMap;

use crate::domain::{ChatId, Language};

/// A long reply that was cut down to a preview, waiting for the full-text trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFullText {
    pub text: String,
    pub language: Language,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub language: Language,
    greeted: bool,
    pending_full_text: Option<PendingFullText>,
}

impl Session {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            greeted: false,
            pending_full_text: None,
        }
    }

    pub fn greeted(&self) -> bool {
        self.greeted
    }

    /// Mark the conversation as greeted. Returns `true` only the first time.
    pub fn mark_greeted(&mut self) -> bool {
        !std::mem::replace(&mut self.greeted, true)
    }

    pub fn pending_full_text(&self) -> Option<&PendingFullText> {
        self.pending_full_text.as_ref()
    }

    /// Store a truncated reply. Latest truncation wins; returns whether an
    /// older pending text was dropped.
    pub fn set_pending_full_text(&mut self, text: String, language: Language) -> bool {
        self.pending_full_text
            .replace(PendingFullText { text, language })
            .is_some()
    }

    pub fn take_pending_full_text(&mut self) -> Option<PendingFullText> {
        self.pending_full_text.take()
    }
}

/// Sessions keyed by conversation, owned by the dispatcher.
#[derive(Debug)]
pub struct SessionStore {
    default_language: Language,
    sessions: HashMap<ChatId, Session>,
}

impl SessionStore {
    pub fn new(default_language: Language) -> Self {
        Self {
            default_language,
            sessions: HashMap::new(),
        }
    }

    /// Get (or create) the session for `chat_id` and apply the sender's language hint.
    pub fn observe(&mut self, chat_id: ChatId, language_hint: Option<&str>) -> &mut Session {
        let default_language = self.default_language;
        let session = self
            .sessions
            .entry(chat_id)
            .or_insert_with(|| Session::new(default_language));
        if let Some(lang) = Language::from_hint(language_hint) {
            session.language = lang;
        }
        session
    }

    pub fn get(&self, chat_id: ChatId) -> Option<&Session> {
        self.sessions.get(&chat_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
