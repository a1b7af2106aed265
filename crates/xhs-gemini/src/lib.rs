//! Gemini adapter (text generation).
//!
//! Calls the `models/{model}:generateContent` REST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use xhs_core::{config::Config, errors::Error, generation::Generator, Result};

/// Outer HTTP deadline. The core applies the per-command bound well before this.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    api_base: String,
    http_timeout: Duration,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http_timeout: HTTP_TIMEOUT,
            http: build_http(HTTP_TIMEOUT)?,
        })
    }

    /// Replace the outer HTTP deadline.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_http(timeout)?;
        self.http_timeout = timeout;
        Ok(self)
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.gemini_api_key.clone(),
            cfg.gemini_model.clone(),
            cfg.gemini_api_base.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::Config("GEMINI_API_KEY is not set".to_string()));
        };

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(%status, model = %self.model, "gemini returned an error status");
            return Err(Error::Generation(format!(
                "gemini request failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: Value = resp.json().await.map_err(|e| self.map_request_error(e))?;
        extract_text(&v)
    }
}

impl GeminiClient {
    fn map_request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            return Error::GenerationTimeout(self.http_timeout);
        }
        Error::Generation(format!("gemini request error: {e}"))
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| Error::External(format!("gemini http client build failed: {e}")))
}

/// Pull the generated text out of a response. Accepts a flat `{"text": ...}`
/// body as well as the `candidates[0].content.parts[*].text` shape.
pub fn extract_text(v: &Value) -> Result<String> {
    if let Some(text) = v.get("text").and_then(Value::as_str) {
        return non_empty(text.to_string());
    }

    if let Some(candidate) = v
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
    {
        let parts = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array);
        if let Some(parts) = parts {
            let text: String = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            return non_empty(text);
        }
        let reason = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(Error::Generation(format!(
            "gemini candidate has no content (finishReason: {reason})"
        )));
    }

    if let Some(msg) = v.pointer("/error/message").and_then(Value::as_str) {
        return Err(Error::Generation(format!("gemini error: {msg}")));
    }

    Err(Error::Generation(
        "gemini response has neither `text` nor `candidates[0].content.parts`".to_string(),
    ))
}

fn non_empty(text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(Error::Generation("gemini returned empty text".to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(Some("k".into()), "m", server.uri()).unwrap()
    }

    #[tokio::test]
    async fn posts_prompt_with_key_and_reads_candidates() {
        let server = MockServer::start().await;
        let response_body = json!({
            "candidates": [{"content": {"parts": [{"text": "爆款"}, {"text": "标题"}]}}]
        });
        Mock::given(method("POST"))
            .and(path("/models/m:generateContent"))
            .and(query_param("key", "k"))
            .and(body_partial_json(json!({"contents": [{"parts": [{"text": "p"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.generate("p").await.unwrap(), "爆款标题");
    }

    #[tokio::test]
    async fn error_status_carries_body_snippet() {
        let server = MockServer::start().await;
        let error_body = json!({"error": {"code": 500, "message": "backend overloaded"}});
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(&error_body))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("p").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)), "{err}");
        let msg = err.to_string();
        assert!(msg.contains("500"), "{msg}");
        assert!(msg.contains("backend overloaded"), "{msg}");
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"text": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)
            .with_http_timeout(Duration::from_millis(200))
            .unwrap();
        let err = client.generate("p").await.unwrap_err();
        assert!(
            matches!(err, Error::GenerationTimeout(d) if d == Duration::from_millis(200)),
            "{err}"
        );
    }

    #[tokio::test]
    async fn blocked_candidate_over_http_is_a_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"candidates": [{"finishReason": "SAFETY"}]})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate("p").await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"), "{err}");
    }

    #[test]
    fn extracts_flat_text() {
        assert_eq!(extract_text(&json!({"text": "hi"})).unwrap(), "hi");
    }

    #[test]
    fn extracts_and_joins_candidate_parts() {
        let v = json!({
            "candidates": [
                {"content": {"parts": [{"text": "你好"}, {"text": "，世界"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(extract_text(&v).unwrap(), "你好，世界");
    }

    #[test]
    fn blocked_candidate_reports_finish_reason() {
        let v = json!({"candidates": [{"finishReason": "SAFETY"}]});
        let err = extract_text(&v).unwrap_err().to_string();
        assert!(err.contains("SAFETY"), "{err}");
    }

    #[test]
    fn unknown_shape_is_descriptive() {
        let err = extract_text(&json!({"foo": 1})).unwrap_err().to_string();
        assert!(err.contains("candidates"), "{err}");
        let err = extract_text(&json!({"error": {"message": "API key not valid"}}))
            .unwrap_err()
            .to_string();
        assert!(err.contains("API key not valid"), "{err}");
    }

    #[test]
    fn empty_text_is_an_error() {
        assert!(extract_text(&json!({"text": "  "})).is_err());
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        // Unroutable base: a real request would fail with a transport error instead.
        let client = GeminiClient::new(None, "m", "http://127.0.0.1:9").unwrap();
        assert!(!client.is_configured());
        let err = client.generate("p").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let client = GeminiClient::new(Some("  ".into()), "m", "http://x/").unwrap();
        assert!(!client.is_configured());
        assert_eq!(client.endpoint(), "http://x/models/m:generateContent");
    }
}
