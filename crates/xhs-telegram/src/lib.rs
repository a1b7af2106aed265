//! Telegram adapter (teloxide).
//!
//! Implements the `xhs-core` Transport port over the Bot API: long-poll
//! `getUpdates` inbound, plain-text messages and inline keyboards outbound.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Update, UpdateKind},
};

use tokio::time::sleep;

pub mod router;

use xhs_core::{
    domain::{CallbackRef, ChatId, InboundEvent, MessageId, MessageRef, UpdateBatch},
    errors::Error,
    messaging::{
        port::Transport,
        types::{InlineKeyboard, TransportCapabilities},
    },
    Result,
};

/// Extra HTTP headroom on top of the long-poll timeout.
const POLL_HTTP_SLACK: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Bot whose HTTP deadline outlasts a `poll_timeout` long poll.
    pub fn build_bot(token: &str, poll_timeout: Duration) -> Result<Bot> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(poll_timeout + POLL_HTTP_SLACK)
            .build()
            .map_err(|e| Error::External(format!("telegram http client build failed: {e}")))?;
        Ok(Bot::with_client(token, client))
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::debug!(retry_after_ms = d.as_millis() as u64, "telegram rate limited");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// Map one update to an inbound event. `None` for kinds we do not handle or
/// updates without a chat.
pub fn to_event(update: &Update) -> Option<InboundEvent> {
    let cursor = i64::from(update.id);
    match &update.kind {
        UpdateKind::Message(msg) => Some(InboundEvent {
            cursor,
            conversation_id: ChatId(msg.chat.id.0),
            raw_text: msg.text().map(str::to_string),
            callback: None,
            sender_language_hint: msg.from().and_then(|u| u.language_code.clone()),
        }),
        UpdateKind::CallbackQuery(q) => {
            let chat = q.message.as_ref()?.chat.id;
            Some(InboundEvent {
                cursor,
                conversation_id: ChatId(chat.0),
                raw_text: None,
                callback: Some(CallbackRef {
                    id: q.id.clone(),
                    data: q.data.clone().unwrap_or_default(),
                }),
                sender_language_hint: q.from.language_code.clone(),
            })
        }
        _ => None,
    }
}

/// Map a `getUpdates` result. The highest cursor covers every update, mapped
/// or not.
pub fn to_batch(updates: &[Update]) -> UpdateBatch {
    UpdateBatch {
        events: updates.iter().filter_map(to_event).collect(),
        highest_cursor: updates.iter().map(|u| i64::from(u.id)).max(),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities {
            supports_inline_keyboards: true,
            max_message_len: 4096,
        }
    }

    async fn fetch_updates(&self, offset: i64, timeout: Duration) -> Result<UpdateBatch> {
        let offset = i32::try_from(offset)
            .map_err(|_| Error::Transport(format!("update offset out of range: {offset}")))?;
        let timeout = u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX);
        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(timeout)
            .await
            .map_err(Self::map_err)?;
        Ok(to_batch(&updates))
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| self.bot.send_message(Self::tg_chat(chat_id), text.to_string()))
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
            .buttons
            .into_iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.label, b.callback_data)])
            .collect();
        let markup = InlineKeyboardMarkup::new(rows);

        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), text.to_string())
                    .reply_markup(markup.clone())
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.with_retry(|| self.bot.answer_callback_query(callback_id.to_string()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).expect("valid update json")
    }

    const TEXT_UPDATE: &str = r#"{
        "update_id": 1001,
        "message": {
            "message_id": 5,
            "date": 1700000000,
            "chat": {"id": 77, "type": "private", "first_name": "A"},
            "from": {"id": 77, "is_bot": false, "first_name": "A", "language_code": "en"},
            "text": "/title coffee"
        }
    }"#;

    const CALLBACK_UPDATE: &str = r#"{
        "update_id": 1003,
        "callback_query": {
            "id": "cbq-1",
            "from": {"id": 77, "is_bot": false, "first_name": "A", "language_code": "zh-hans"},
            "chat_instance": "ci",
            "data": "/menu",
            "message": {
                "message_id": 6,
                "date": 1700000001,
                "chat": {"id": 77, "type": "private", "first_name": "A"},
                "text": "welcome"
            }
        }
    }"#;

    const POLL_UPDATE: &str = r#"{
        "update_id": 1005,
        "poll": {
            "id": "p1",
            "question": "q?",
            "options": [],
            "total_voter_count": 0,
            "is_closed": false,
            "is_anonymous": true,
            "type": "regular",
            "allows_multiple_answers": false
        }
    }"#;

    #[test]
    fn maps_text_message() {
        let ev = to_event(&update(TEXT_UPDATE)).unwrap();
        assert_eq!(ev.cursor, 1001);
        assert_eq!(ev.conversation_id, ChatId(77));
        assert_eq!(ev.raw_text.as_deref(), Some("/title coffee"));
        assert_eq!(ev.sender_language_hint.as_deref(), Some("en"));
        assert!(ev.callback.is_none());
    }

    #[test]
    fn maps_callback_query() {
        let ev = to_event(&update(CALLBACK_UPDATE)).unwrap();
        assert_eq!(ev.conversation_id, ChatId(77));
        assert!(ev.raw_text.is_none());
        assert_eq!(
            ev.callback,
            Some(CallbackRef {
                id: "cbq-1".into(),
                data: "/menu".into()
            })
        );
        assert_eq!(ev.routable_text(), Some("/menu"));
    }

    #[test]
    fn unhandled_updates_still_count_for_the_cursor() {
        let updates = vec![update(POLL_UPDATE), update(TEXT_UPDATE)];
        let batch = to_batch(&updates);
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.highest_cursor, Some(1005));
    }
}
