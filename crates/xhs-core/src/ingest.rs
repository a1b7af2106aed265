//! Long-poll ingestion: fetch a batch, dispatch each event in order, advance
//! the cursor past the batch, repeat.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    domain::UpdateBatch, messaging::port::Transport, router::CommandRouter, Result,
};

/// Offset to request after `batch`: one past the highest cursor seen, never
/// moving backwards. An empty batch leaves it unchanged.
pub fn next_offset(current: i64, batch: &UpdateBatch) -> i64 {
    match batch.highest_cursor {
        Some(highest) => current.max(highest.saturating_add(1)),
        None => current,
    }
}

pub struct IngestionLoop {
    transport: Arc<dyn Transport>,
    router: CommandRouter,
    poll_timeout: Duration,
    backoff: Duration,
    offset: i64,
}

impl IngestionLoop {
    pub fn new(
        transport: Arc<dyn Transport>,
        router: CommandRouter,
        poll_timeout: Duration,
        backoff: Duration,
    ) -> Self {
        Self {
            transport,
            router,
            poll_timeout,
            backoff,
            offset: 0,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// One fetch plus dispatch. Returns the number of events handled; only a
    /// failed fetch is an error.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let batch = self
            .transport
            .fetch_updates(self.offset, self.poll_timeout)
            .await?;
        Ok(self.process(batch).await)
    }

    /// Poll until `shutdown` is cancelled. Cancellation is only observed while
    /// waiting on a fetch or a backoff; a batch in progress always finishes.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(offset = self.offset, "polling started");
        loop {
            let fetched = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                r = self.transport.fetch_updates(self.offset, self.poll_timeout) => r,
            };

            match fetched {
                Ok(batch) => {
                    self.process(batch).await;
                }
                Err(e) => {
                    tracing::warn!(
                        offset = self.offset,
                        error = %e,
                        backoff_ms = self.backoff.as_millis() as u64,
                        "fetching updates failed, backing off"
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.backoff) => {}
                    }
                }
            }
        }
        tracing::info!(offset = self.offset, "polling stopped");
    }

    async fn process(&mut self, batch: UpdateBatch) -> usize {
        let next = next_offset(self.offset, &batch);
        let mut handled = 0;
        for event in batch.events {
            if event.cursor < self.offset {
                tracing::debug!(cursor = event.cursor, offset = self.offset, "skipping already-seen update");
                continue;
            }
            self.router.handle_event(event).await;
            handled += 1;
        }
        if next != self.offset {
            tracing::debug!(from = self.offset, to = next, handled, "offset advanced");
        }
        self.offset = next;
        handled
    }
}
