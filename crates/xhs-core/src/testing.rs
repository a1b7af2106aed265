//! Test doubles for the transport and generator ports.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatId, MessageId, MessageRef, UpdateBatch},
    errors::Error,
    generation::Generator,
    messaging::{
        port::Transport,
        types::{InlineKeyboard, TransportCapabilities},
    },
    Result,
};

#[derive(Clone, Debug)]
pub(crate) struct Sent {
    pub chat_id: ChatId,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    next_id: AtomicI32,
    script: Mutex<VecDeque<Result<UpdateBatch>>>,
    offsets: Mutex<Vec<i64>>,
    sent: Mutex<Vec<Sent>>,
    answered: Mutex<Vec<String>>,
    /// Cancelled once the scripted batches run out.
    drained: Mutex<Option<CancellationToken>>,
    send_attempts: AtomicUsize,
    fail_sends: AtomicBool,
    fail_answers: AtomicBool,
    no_keyboards: bool,
}

impl FakeTransport {
    pub fn with_script(script: Vec<Result<UpdateBatch>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// A transport that cannot render inline keyboards.
    pub fn without_keyboards() -> Self {
        Self {
            no_keyboards: true,
            ..Self::default()
        }
    }

    /// Make every send (text or keyboard) fail with a transport error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_answers(&self, fail: bool) {
        self.fail_answers.store(fail, Ordering::SeqCst);
    }

    /// Sends tried, successful or not.
    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    pub fn cancel_when_drained(&self, token: CancellationToken) {
        *self.drained.lock().unwrap() = Some(token);
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.text).collect()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn record(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::Transport("send failed".to_string()));
        }
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities {
            supports_inline_keyboards: !self.no_keyboards,
            max_message_len: 4096,
        }
    }

    async fn fetch_updates(&self, offset: i64, _timeout: Duration) -> Result<UpdateBatch> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => {
                if let Some(token) = self.drained.lock().unwrap().as_ref() {
                    token.cancel();
                }
                Ok(UpdateBatch::default())
            }
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.record(chat_id, text, None)
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.record(chat_id, text, Some(keyboard))
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        if self.fail_answers.load(Ordering::SeqCst) {
            return Err(Error::Transport("answerCallbackQuery failed".to_string()));
        }
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}

type ReplyFn = Box<dyn Fn(&str) -> String + Send + Sync>;

enum Behavior {
    Reply(ReplyFn),
    Fail(String),
    FailWhen { needle: String, message: String },
    Slow(Duration),
    Unconfigured,
}

pub(crate) struct FakeGenerator {
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::with(Behavior::Reply(Box::new(f)))
    }

    /// Always returns the same text.
    pub fn fixed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::replying(move |_| text.clone())
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with(Behavior::Fail(message.into()))
    }

    /// Fails for prompts containing `needle`, answers `ok` otherwise.
    pub fn failing_when(needle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with(Behavior::FailWhen {
            needle: needle.into(),
            message: message.into(),
        })
    }

    pub fn slow(delay: Duration) -> Self {
        Self::with(Behavior::Slow(delay))
    }

    pub fn unconfigured() -> Self {
        Self::with(Behavior::Unconfigured)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.behavior {
            Behavior::Reply(f) => Ok(f(prompt)),
            Behavior::Fail(msg) => Err(Error::Generation(msg.clone())),
            Behavior::FailWhen { needle, message } => {
                if prompt.contains(needle.as_str()) {
                    Err(Error::Generation(message.clone()))
                } else {
                    Ok("ok".to_string())
                }
            }
            Behavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("late".to_string())
            }
            Behavior::Unconfigured => Err(Error::Config("GEMINI_API_KEY is not set".to_string())),
        }
    }
}
