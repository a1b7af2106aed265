use std::sync::Arc;

use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;

use xhs_core::{
    config::Config,
    generation::Generator,
    history::HistoryStore,
    ingest::IngestionLoop,
    messaging::port::Transport,
    router::{CommandRouter, RouterSettings},
};

use crate::TelegramTransport;

/// Wire the Telegram transport, history and dispatcher together and poll
/// until `shutdown` fires.
pub async fn run_polling(
    cfg: Arc<Config>,
    generator: Arc<dyn Generator>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let bot = TelegramTransport::build_bot(&cfg.telegram_bot_token, cfg.poll_timeout)?;

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!(
            username = me.user.username.as_deref().unwrap_or("?"),
            generator = generator.name(),
            "xhs bot started"
        ),
        Err(e) => tracing::warn!(error = %e, "getMe failed; continuing"),
    }

    let history = HistoryStore::open(&cfg.history_file, cfg.history_limit);
    tracing::info!(
        path = %cfg.history_file.display(),
        records = history.len(),
        cap = history.cap(),
        "history loaded"
    );

    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot));
    let router = CommandRouter::new(
        transport.clone(),
        generator,
        history,
        RouterSettings::from(cfg.as_ref()),
    );

    IngestionLoop::new(transport, router, cfg.poll_timeout, cfg.poll_backoff)
        .run(shutdown)
        .await;

    Ok(())
}
