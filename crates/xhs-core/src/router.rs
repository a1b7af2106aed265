//! Command dispatch: one inbound event in, zero or more replies out.
//!
//! Every handler failure is converted to one localized reply here; nothing
//! propagates back into the ingestion loop.

use std::{sync::Arc, time::Duration};

use crate::{
    commands::{self, CommandKind, CommandSpec, PromptBuilder, Route},
    config::Config,
    delivery::{self, DeliveryPolicy, ReplyDelivery},
    domain::{ChatId, InboundEvent, Language},
    errors::{Error, UserInputError},
    generation::{generate_with_timeout, Generator},
    history::{HistoryRecord, HistoryStore},
    i18n::{self, ExportSection, Msg},
    messaging::{port::Transport, types::InlineKeyboard},
    session::{Session, SessionStore},
    utils::{display_time, single_line, truncate_text},
    Result,
};

/// Separates per-topic sections of a batch reply.
pub const BATCH_DELIMITER: &str = "\n\n━━━━━━━━\n\n";

const SEARCH_LIMIT: usize = 5;
const HISTORY_LIMIT: usize = 10;
const SNIPPET_CHARS: usize = 60;

#[derive(Clone, Copy, Debug)]
pub struct RouterSettings {
    pub default_language: Language,
    pub generation_timeout: Duration,
    pub delivery: DeliveryPolicy,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            default_language: Language::Zh,
            generation_timeout: Duration::from_secs(60),
            delivery: DeliveryPolicy::default(),
        }
    }
}

impl From<&Config> for RouterSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            default_language: cfg.default_language,
            generation_timeout: cfg.generation_timeout,
            delivery: cfg.delivery_policy(),
        }
    }
}

/// Everything a handler needs besides the session. Kept apart from the
/// session map so a `&mut Session` can be held across handler calls.
struct Handlers {
    transport: Arc<dyn Transport>,
    generator: Arc<dyn Generator>,
    history: HistoryStore,
    delivery: ReplyDelivery,
    generation_timeout: Duration,
}

pub struct CommandRouter {
    sessions: SessionStore,
    handlers: Handlers,
}

impl CommandRouter {
    pub fn new(
        transport: Arc<dyn Transport>,
        generator: Arc<dyn Generator>,
        history: HistoryStore,
        settings: RouterSettings,
    ) -> Self {
        // Never exceed what the transport itself accepts.
        let mut policy = settings.delivery;
        policy.max_message_bytes = policy
            .max_message_bytes
            .min(transport.capabilities().max_message_len);
        Self {
            sessions: SessionStore::new(settings.default_language),
            handlers: Handlers {
                delivery: ReplyDelivery::new(policy, transport.clone()),
                transport,
                generator,
                history,
                generation_timeout: settings.generation_timeout,
            },
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.handlers.history
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one event to completion. Never fails: errors become replies or
    /// log lines.
    pub async fn handle_event(&mut self, event: InboundEvent) {
        let chat_id = event.conversation_id;
        let session = self
            .sessions
            .observe(chat_id, event.sender_language_hint.as_deref());
        let h = &mut self.handlers;

        if let Some(cb) = &event.callback {
            if let Err(e) = h.transport.answer_callback(&cb.id).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to answer callback");
            }
        }

        let text = event.routable_text().map(str::trim).unwrap_or_default();
        let full_text_requested = delivery::is_full_text_trigger(text);

        if full_text_requested && session.pending_full_text().is_some() {
            if let Err(e) = h.delivery.deliver_full_text(chat_id, session).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send full text");
            }
            return;
        }

        if session.mark_greeted() {
            h.send_welcome(chat_id, session.language).await;
        }

        if full_text_requested {
            h.reply(chat_id, i18n::text(session.language, Msg::NothingPending))
                .await;
            return;
        }
        if text.is_empty() {
            return;
        }

        match commands::route(text) {
            Route::Ignore => {
                tracing::debug!(chat_id = chat_id.0, "not a command, ignored");
            }
            Route::DidYouMean(fixed) => {
                tracing::debug!(chat_id = chat_id.0, suggestion = fixed, "typo suggestion");
                h.reply(chat_id, &i18n::did_you_mean(session.language, fixed))
                    .await;
            }
            Route::Command { spec, argument } => {
                tracing::debug!(
                    chat_id = chat_id.0,
                    command = spec.name,
                    lang = session.language.code(),
                    "dispatching"
                );
                if let Err(e) = h.dispatch(chat_id, spec, argument, session).await {
                    h.report(chat_id, spec, &e, session.language).await;
                }
            }
        }
    }
}

impl Handlers {
    async fn dispatch(
        &mut self,
        chat_id: ChatId,
        spec: &'static CommandSpec,
        argument: Option<String>,
        session: &mut Session,
    ) -> Result<()> {
        let lang = session.language;
        if spec.argument_required && argument.is_none() {
            return Err(missing_argument(spec));
        }

        match spec.kind {
            CommandKind::Generate(build) => {
                let topic = argument.ok_or_else(|| missing_argument(spec))?;
                let text = self.generate(spec, build, &topic, lang).await?;
                self.record(chat_id, spec.name, &topic, &text);
                self.delivery.deliver(chat_id, &text, session).await?;
            }
            CommandKind::Batch(single) => {
                let CommandKind::Generate(build) = single.kind else {
                    return Err(Error::Config(format!(
                        "/{} cannot run /{} per topic",
                        spec.name, single.name
                    )));
                };
                let topics = commands::split_batch(argument.as_deref().unwrap_or_default());
                if topics.is_empty() {
                    return Err(missing_argument(spec));
                }
                let combined = self.run_batch(chat_id, single, build, &topics, lang).await;
                self.delivery.deliver(chat_id, &combined, session).await?;
            }
            CommandKind::Search => {
                let keyword = argument.ok_or(UserInputError::EmptyKeyword)?;
                let text = self.search_text(chat_id, &keyword, lang);
                self.delivery.deliver(chat_id, &text, session).await?;
            }
            CommandKind::History => {
                let text = self.history_text(chat_id, lang);
                self.delivery.deliver(chat_id, &text, session).await?;
            }
            CommandKind::Menu => {
                self.transport
                    .send_text(chat_id, i18n::text(lang, Msg::Menu))
                    .await?;
            }
            CommandKind::Help => {
                self.transport
                    .send_text(chat_id, i18n::text(lang, Msg::Help))
                    .await?;
            }
            CommandKind::Export => {
                let topic = argument.ok_or_else(|| missing_argument(spec))?;
                let text = self.export_text(chat_id, &topic, lang);
                self.delivery.deliver(chat_id, &text, session).await?;
            }
            CommandKind::CoverHint => {
                let topic = argument.ok_or_else(|| missing_argument(spec))?;
                let text = self.cover_hint_text(chat_id, &topic, lang);
                self.transport.send_text(chat_id, &text).await?;
            }
        }
        Ok(())
    }

    async fn generate(
        &self,
        spec: &CommandSpec,
        build: PromptBuilder,
        topic: &str,
        lang: Language,
    ) -> Result<String> {
        let prompt = build(topic, lang);
        let bound = spec.timeout.unwrap_or(self.generation_timeout);
        generate_with_timeout(self.generator.as_ref(), &prompt, bound).await
    }

    /// Each topic runs as its own `single` command and is recorded under that
    /// command's name. A failed topic contributes its error line.
    async fn run_batch(
        &mut self,
        chat_id: ChatId,
        single: &CommandSpec,
        build: PromptBuilder,
        topics: &[String],
        lang: Language,
    ) -> String {
        let mut sections = Vec::with_capacity(topics.len());
        for topic in topics {
            let body = match self.generate(single, build, topic, lang).await {
                Ok(text) => {
                    self.record(chat_id, single.name, topic, &text);
                    text
                }
                Err(e) => {
                    tracing::warn!(chat_id = chat_id.0, topic = %topic, error = %e, "batch topic failed");
                    error_text(&e, lang)
                }
            };
            sections.push(format!("【{topic}】\n{body}"));
        }
        sections.join(BATCH_DELIMITER)
    }

    fn record(&mut self, chat_id: ChatId, command: &str, topic: &str, result: &str) {
        let record = HistoryRecord::now(chat_id, command, topic, result);
        if let Err(e) = self.history.append(record) {
            tracing::error!(chat_id = chat_id.0, command, error = %e, "failed to persist history record");
        }
    }

    fn search_text(&self, chat_id: ChatId, keyword: &str, lang: Language) -> String {
        let matches = self.history.search(keyword, Some(chat_id));
        if matches.is_empty() {
            return i18n::no_results(lang, keyword);
        }
        let shown: Vec<_> = matches.iter().rev().take(SEARCH_LIMIT).copied().collect();
        let mut out = i18n::search_header(lang, keyword, shown.len(), matches.len());
        for r in shown {
            out.push_str("\n\n");
            out.push_str(&format_record(r));
        }
        out
    }

    fn history_text(&self, chat_id: ChatId, lang: Language) -> String {
        let recent = self.history.recent(chat_id, HISTORY_LIMIT);
        if recent.is_empty() {
            return i18n::text(lang, Msg::NoHistory).to_string();
        }
        let mut out = i18n::history_header(lang, recent.len());
        for r in recent {
            out.push_str("\n\n");
            out.push_str(&format_record(r));
        }
        out
    }

    fn export_text(&self, chat_id: ChatId, topic: &str, lang: Language) -> String {
        let sections: Vec<String> = ExportSection::ALL
            .iter()
            .filter_map(|&section| {
                let r = self.history.latest_for(chat_id, section.command(), topic)?;
                Some(format!(
                    "【{}】\n\n{}",
                    i18n::export_section(lang, section),
                    r.result.trim()
                ))
            })
            .collect();
        if sections.is_empty() {
            return i18n::export_nothing(lang, topic);
        }
        format!(
            "{}\n\n{}",
            i18n::export_header(lang, topic),
            sections.join("\n\n---\n\n")
        )
    }

    fn cover_hint_text(&self, chat_id: ChatId, topic: &str, lang: Language) -> String {
        let line = self
            .history
            .latest_for(chat_id, "cover", topic)
            .and_then(|r| r.result.lines().map(str::trim).find(|l| !l.is_empty()));
        match line {
            Some(line) => i18n::cover_hint(lang, topic, line),
            None => i18n::cover_missing(lang, topic),
        }
    }

    async fn send_welcome(&self, chat_id: ChatId, lang: Language) {
        let welcome = i18n::text(lang, Msg::Welcome);
        let sent = if self.transport.capabilities().supports_inline_keyboards {
            let keyboard = InlineKeyboard::from_pairs([
                (i18n::text(lang, Msg::MenuButton), "/menu"),
                (i18n::text(lang, Msg::HistoryButton), "/history"),
            ]);
            self.transport
                .send_inline_keyboard(chat_id, welcome, keyboard)
                .await
        } else {
            self.transport.send_text(chat_id, welcome).await
        };
        if let Err(e) = sent {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send welcome");
        }
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
        }
    }

    /// Turn a handler failure into one localized reply.
    async fn report(&self, chat_id: ChatId, spec: &CommandSpec, err: &Error, lang: Language) {
        match err {
            Error::UserInput(_) => {
                tracing::debug!(chat_id = chat_id.0, command = spec.name, error = %err, "rejected input");
            }
            Error::Transport(_) => {
                // The reply itself could not be sent; another send would fail the same way.
                tracing::warn!(chat_id = chat_id.0, command = spec.name, error = %err, "reply delivery failed");
                return;
            }
            _ => {
                tracing::warn!(chat_id = chat_id.0, command = spec.name, error = %err, "command failed");
            }
        }
        self.reply(chat_id, &error_text(err, lang)).await;
    }
}

fn missing_argument(spec: &CommandSpec) -> Error {
    Error::UserInput(UserInputError::MissingArgument {
        command: spec.name.to_string(),
    })
}

/// Localized text for an error. Details stay in the logs.
pub fn error_text(err: &Error, lang: Language) -> String {
    match err {
        Error::UserInput(UserInputError::MissingArgument { command }) => {
            i18n::argument_required(lang, command)
        }
        Error::UserInput(UserInputError::EmptyKeyword) => {
            i18n::text(lang, Msg::EmptyKeyword).to_string()
        }
        Error::Config(_) => i18n::text(lang, Msg::NotConfigured).to_string(),
        e if e.is_timeout() => i18n::text(lang, Msg::GenerationTimeout).to_string(),
        _ => i18n::text(lang, Msg::GenerationFailed).to_string(),
    }
}

/// `time · /command · topic` followed by a one-line result snippet.
fn format_record(r: &HistoryRecord) -> String {
    format!(
        "{} · /{} · {}\n{}",
        display_time(&r.time),
        r.command_type,
        r.topic,
        truncate_text(&single_line(&r.result), SNIPPET_CHARS)
    )
}
