//! Generator port: the external text backend, treated as an opaque call.

use std::time::Duration;

use async_trait::async_trait;

use crate::{errors::Error, Result};

/// Text generation backend (Gemini, ...).
///
/// Implementations must fail with [`Error::Config`] right away when their
/// credential is missing instead of attempting the call.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Run a generation with an explicit bound.
///
/// An elapsed bound surfaces as [`Error::GenerationTimeout`] so a stuck backend
/// only delays the event being processed.
pub async fn generate_with_timeout(
    generator: &dyn Generator,
    prompt: &str,
    bound: Duration,
) -> Result<String> {
    match tokio::time::timeout(bound, generator.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                generator = generator.name(),
                bound_ms = bound.as_millis() as u64,
                "generation exceeded its bound"
            );
            Err(Error::GenerationTimeout(bound))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGenerator;

    #[tokio::test]
    async fn passes_through_fast_results() {
        let gen = FakeGenerator::replying(|p| format!("echo: {p}"));
        let out = generate_with_timeout(&gen, "hi", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "echo: hi");
    }

    #[tokio::test]
    async fn slow_generator_times_out() {
        let gen = FakeGenerator::slow(Duration::from_secs(30));
        let err = generate_with_timeout(&gen, "hi", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GenerationTimeout(_)));
        assert!(err.is_timeout());
    }
}
