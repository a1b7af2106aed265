use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use xhs_core::{config::Config, generation::Generator};
use xhs_gemini::GeminiClient;

#[tokio::main]
async fn main() -> Result<(), xhs_core::Error> {
    xhs_core::logging::init("xhs")?;

    let cfg = Arc::new(Config::load()?);

    let gemini = GeminiClient::from_config(&cfg)?;
    if !gemini.is_configured() {
        tracing::warn!("GEMINI_API_KEY is not set; generation commands will reply with a configuration error");
    }
    let generator: Arc<dyn Generator> = Arc::new(gemini);

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("received Ctrl+C, stopping after the current batch");
                    shutdown.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl+C"),
            }
        });
    }

    xhs_telegram::router::run_polling(cfg, generator, shutdown)
        .await
        .map_err(|e| xhs_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
