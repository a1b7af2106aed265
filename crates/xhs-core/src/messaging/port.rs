use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, UpdateBatch},
    messaging::types::{InlineKeyboard, TransportCapabilities},
    Result,
};

/// Chat transport port.
///
/// Inbound is a long-poll feed with at-least-once delivery; outbound is plain
/// text messages, optionally with inline buttons.
#[async_trait]
pub trait Transport: Send + Sync {
    fn capabilities(&self) -> TransportCapabilities;

    /// Fetch the next batch of updates with `cursor >= offset`, waiting up to
    /// `timeout` for at least one to arrive. An empty batch is a normal outcome.
    async fn fetch_updates(&self, offset: i64, timeout: Duration) -> Result<UpdateBatch>;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    /// Acknowledge a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}
