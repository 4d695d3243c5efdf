//! Gemini inference backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use scrib_core::{Error, GenerationBackend, Result};

/// Default Gemini API endpoint.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = "gemini-2.0-flash";

/// Default sampling temperature for passthrough generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 60;

/// Gemini inference backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl GeminiBackend {
    /// Create a new Gemini backend with custom configuration.
    pub fn with_config(base_url: String, api_key: String, model: String) -> Self {
        let timeout_secs = std::env::var("SCRIB_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing Gemini backend: url={}, model={}",
            base_url, model
        );

        Self {
            client,
            base_url,
            api_key,
            model,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs,
        }
    }

    /// Create from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; `GEMINI_BASE` and `GEMINI_MODEL`
    /// fall back to the public endpoint and default model.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY is not set".to_string()))?;
        let base_url =
            std::env::var("GEMINI_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string());
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());

        Ok(Self::with_config(base_url, api_key, model))
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn generate_internal(&self, system: &str, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let system_instruction = if system.is_empty() {
            None
        } else {
            Some(Content::text(system))
        };

        let request = GenerateContentRequest {
            contents: vec![Content::text(prompt)],
            system_instruction,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::Inference("No candidates in response".to_string()))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = content.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30000 {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(content)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "gemini", op = "generate", model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_internal("", prompt).await
    }

    #[instrument(skip(self, system, prompt), fields(subsystem = "inference", component = "gemini", op = "generate_with_system", model = %self.model))]
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_internal(system, prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Request payload for the Gemini `generateContent` endpoint.
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize, Deserialize, Clone)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
struct Part {
    text: String,
}

/// Response from the Gemini `generateContent` endpoint.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> GeminiBackend {
        GeminiBackend::with_config(
            server.uri(),
            "test-key".to_string(),
            DEFAULT_GEN_MODEL.to_string(),
        )
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "/v1beta/models/{}:generateContent",
                DEFAULT_GEN_MODEL
            )))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "Hello from the model"}]}}
                ]
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let text = backend.generate("say hello").await.unwrap();
        assert_eq!(text, "Hello from the model");
    }

    #[tokio::test]
    async fn test_generate_joins_multiple_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "first "}, {"text": "second"}]}}
                ]
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let text = backend.generate("x").await.unwrap();
        assert_eq!(text, "first second");
    }

    #[tokio::test]
    async fn test_generate_sends_temperature() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(
                json!({"generationConfig": {"temperature": 0.5}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        backend.generate("x").await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_with_system_includes_instruction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "be brief"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        backend.generate_with_system("be brief", "x").await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let err = backend.generate("x").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn test_generate_upstream_error_propagates_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({"error": "quota exceeded"})),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let err = backend.generate("x").await.unwrap_err();
        match err {
            Error::Inference(msg) => assert!(msg.contains("429")),
            other => panic!("Expected Inference error, got {:?}", other),
        }
    }

    #[test]
    fn test_model_name() {
        let backend = GeminiBackend::with_config(
            DEFAULT_GEMINI_URL.to_string(),
            "k".to_string(),
            "gemini-2.0-flash".to_string(),
        );
        assert_eq!(backend.model_name(), "gemini-2.0-flash");
    }
}
