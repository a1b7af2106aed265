use std::fmt;

use serde::{Deserialize, Serialize};

/// Telegram chat id (numeric). One chat is one conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Reply language of a conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    /// Map a sender language code (`zh-hans`, `en`, `de`, ...) to a reply language.
    ///
    /// Returns `None` for an absent/blank hint so callers keep what they had.
    pub fn from_hint(hint: Option<&str>) -> Option<Self> {
        let hint = hint?.trim();
        if hint.is_empty() {
            return None;
        }
        if hint.to_ascii_lowercase().starts_with("zh") {
            Some(Language::Zh)
        } else {
            Some(Language::En)
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "cn" | "zh-cn" | "zh-hans" => Some(Language::Zh),
            "en" | "en-us" | "en-gb" => Some(Language::En),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

/// A pressed inline button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackRef {
    pub id: String,
    pub data: String,
}

/// One inbound update, as handed over by the transport.
///
/// `raw_text` and `callback` are mutually exclusive; both are absent for
/// updates we do not handle (stickers, photos, ...), which still count towards
/// the greeting and language bookkeeping.
#[derive(Clone, Debug)]
pub struct InboundEvent {
    pub cursor: i64,
    pub conversation_id: ChatId,
    pub raw_text: Option<String>,
    pub callback: Option<CallbackRef>,
    pub sender_language_hint: Option<String>,
}

impl InboundEvent {
    pub fn text(cursor: i64, conversation_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            cursor,
            conversation_id,
            raw_text: Some(text.into()),
            callback: None,
            sender_language_hint: None,
        }
    }

    pub fn with_language_hint(mut self, hint: impl Into<String>) -> Self {
        self.sender_language_hint = Some(hint.into());
        self
    }

    /// The text to route: typed text, or the payload of a pressed button.
    pub fn routable_text(&self) -> Option<&str> {
        self.raw_text
            .as_deref()
            .or_else(|| self.callback.as_ref().map(|c| c.data.as_str()))
    }
}

/// One long-poll result.
///
/// `highest_cursor` also covers updates the adapter dropped (no chat, unknown
/// kind) so they are never requested again.
#[derive(Clone, Debug, Default)]
pub struct UpdateBatch {
    pub events: Vec<InboundEvent>,
    pub highest_cursor: Option<i64>,
}

impl UpdateBatch {
    pub fn from_events(events: Vec<InboundEvent>) -> Self {
        let highest_cursor = events.iter().map(|e| e.cursor).max();
        Self {
            events,
            highest_cursor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.highest_cursor.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_hint_mapping() {
        assert_eq!(Language::from_hint(Some("zh-hans")), Some(Language::Zh));
        assert_eq!(Language::from_hint(Some("ZH")), Some(Language::Zh));
        assert_eq!(Language::from_hint(Some("en")), Some(Language::En));
        assert_eq!(Language::from_hint(Some("de")), Some(Language::En));
        assert_eq!(Language::from_hint(Some("  ")), None);
        assert_eq!(Language::from_hint(None), None);
    }

    #[test]
    fn callback_payload_is_routable() {
        let ev = InboundEvent {
            cursor: 1,
            conversation_id: ChatId(7),
            raw_text: None,
            callback: Some(CallbackRef {
                id: "cb".to_string(),
                data: "/menu".to_string(),
            }),
            sender_language_hint: None,
        };
        assert_eq!(ev.routable_text(), Some("/menu"));
    }

    #[test]
    fn batch_highest_cursor_ignores_arrival_order() {
        let batch = UpdateBatch::from_events(vec![
            InboundEvent::text(12, ChatId(1), "a"),
            InboundEvent::text(10, ChatId(1), "b"),
            InboundEvent::text(11, ChatId(2), "c"),
        ]);
        assert_eq!(batch.highest_cursor, Some(12));
        assert!(UpdateBatch::default().is_empty());
    }
}
