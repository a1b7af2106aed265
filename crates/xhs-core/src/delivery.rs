//! Long-reply delivery: send whole, preview + "full text" on demand, or paginate.

use std::sync::Arc;

use crate::{
    domain::ChatId,
    i18n::{self, Msg},
    messaging::{port::Transport, types::InlineKeyboard},
    session::Session,
    Result,
};

/// Canonical full-text trigger; also the payload of the preview button.
pub const FULL_TEXT_TRIGGER: &str = "全文";

/// Literal replies that request the rest of a previewed reply (case-insensitive).
const FULL_TEXT_TRIGGERS: &[&str] = &[FULL_TEXT_TRIGGER, "查看全文", "fulltext", "full text", "full"];

pub fn is_full_text_trigger(text: &str) -> bool {
    let t = text.trim();
    FULL_TEXT_TRIGGERS.iter().any(|w| t.eq_ignore_ascii_case(w))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Hard per-message size in bytes (UTF-8).
    pub max_message_bytes: usize,
    /// Replies longer than this many characters are previewed.
    pub preview_chars: usize,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_message_bytes: 4000,
            preview_chars: 600,
        }
    }
}

/// How a reply will go out. Branches are checked in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryPlan {
    Pages(Vec<String>),
    Preview { message: String },
    Whole,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Whole,
    Previewed { replaced_pending: bool },
    Paged { pages: usize },
}

pub fn page_marker(page: usize) -> String {
    format!("[page {page}]\n")
}

pub fn plan(text: &str, policy: &DeliveryPolicy, session: &Session) -> DeliveryPlan {
    if text.len() > policy.max_message_bytes {
        return DeliveryPlan::Pages(paginate(text, policy.max_message_bytes));
    }
    if text.chars().count() > policy.preview_chars {
        let suffix = i18n::text(session.language, Msg::FullTextTip);
        let preview: String = text.chars().take(policy.preview_chars).collect();
        // Keep the preview itself under the hard limit for oversized thresholds.
        let room = policy.max_message_bytes.saturating_sub(suffix.len());
        let (preview, _) = split_utf8_prefix(&preview, room);
        return DeliveryPlan::Preview {
            message: format!("{preview}{suffix}"),
        };
    }
    DeliveryPlan::Whole
}

/// Split `text` into pages of at most `max_bytes` bytes (marker included),
/// never inside a multi-byte character. Pages after the first carry a marker.
pub fn paginate(text: &str, max_bytes: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut rest = text;
    let mut page = 1usize;
    while !rest.is_empty() {
        let marker = if page == 1 {
            String::new()
        } else {
            page_marker(page)
        };
        let budget = max_bytes.saturating_sub(marker.len());
        let (head, tail) = split_utf8_prefix(rest, budget);
        pages.push(format!("{marker}{head}"));
        rest = tail;
        page += 1;
    }
    pages
}

/// Longest prefix of at most `max_bytes` bytes ending on a char boundary.
/// Always takes at least one character so callers make progress.
fn split_utf8_prefix(s: &str, max_bytes: usize) -> (&str, &str) {
    if s.len() <= max_bytes {
        return (s, "");
    }
    let mut idx = max_bytes;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    if idx == 0 {
        idx = s.chars().next().map(char::len_utf8).unwrap_or(s.len());
    }
    s.split_at(idx)
}

pub struct ReplyDelivery {
    policy: DeliveryPolicy,
    transport: Arc<dyn Transport>,
}

impl ReplyDelivery {
    pub fn new(policy: DeliveryPolicy, transport: Arc<dyn Transport>) -> Self {
        Self { policy, transport }
    }

    pub fn policy(&self) -> &DeliveryPolicy {
        &self.policy
    }

    pub async fn deliver(
        &self,
        chat_id: ChatId,
        text: &str,
        session: &mut Session,
    ) -> Result<DeliveryOutcome> {
        match plan(text, &self.policy, session) {
            DeliveryPlan::Pages(pages) => {
                let count = pages.len();
                for page in &pages {
                    self.transport.send_text(chat_id, page).await?;
                }
                tracing::debug!(chat_id = chat_id.0, pages = count, "reply paginated");
                Ok(DeliveryOutcome::Paged { pages: count })
            }
            DeliveryPlan::Preview { message } => {
                // The slot only changes once the preview has actually gone out.
                if self.transport.capabilities().supports_inline_keyboards {
                    let label = i18n::text(session.language, Msg::FullTextButton);
                    let keyboard = InlineKeyboard::from_pairs([(label, FULL_TEXT_TRIGGER)]);
                    self.transport
                        .send_inline_keyboard(chat_id, &message, keyboard)
                        .await?;
                } else {
                    self.transport.send_text(chat_id, &message).await?;
                }
                let replaced_pending =
                    session.set_pending_full_text(text.to_string(), session.language);
                if replaced_pending {
                    tracing::debug!(chat_id = chat_id.0, "older pending full text replaced");
                }
                Ok(DeliveryOutcome::Previewed { replaced_pending })
            }
            DeliveryPlan::Whole => {
                self.transport.send_text(chat_id, text).await?;
                Ok(DeliveryOutcome::Whole)
            }
        }
    }

    /// Send the stored full text, clearing the slot. Returns `false` when
    /// nothing was pending. A failed send puts the text back.
    pub async fn deliver_full_text(&self, chat_id: ChatId, session: &mut Session) -> Result<bool> {
        let Some(pending) = session.take_pending_full_text() else {
            return Ok(false);
        };
        if let Err(e) = self.transport.send_text(chat_id, &pending.text).await {
            session.set_pending_full_text(pending.text, pending.language);
            return Err(e);
        }
        Ok(true)
    }
}
