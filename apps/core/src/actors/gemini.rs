use crate::actors::messages::ChatTurn;
use crate::actors::traits::Generator;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Text generator backed by the Gemini `generateContent` endpoint.
///
/// History turns are sent as alternating `user`/`model` contents followed by
/// the new prompt as the final `user` turn.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    endpoint: Url,
    api_key: String,
    temperature: f32,
    top_p: f32,
    request_timeout: Duration,
}

impl GeminiGenerator {
    /// Builds a generator from configuration.
    ///
    /// Fails when no API key is configured or the base URL is not usable.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Config(
                    "no API key configured (set GEMINI_API_KEY or API_KEY)".to_string(),
                )
            })?;

        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| {
                base.join(&format!("v1beta/models/{}:generateContent", config.model))
            })
            .map_err(|e| GenerationError::Config(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key,
            temperature: config.temperature,
            top_p: config.top_p,
            request_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_payload(&self, prompt: &str, history: &[ChatTurn]) -> Value {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role.to_string(),
                    "parts": [{ "text": turn.text }]
                })
            })
            .collect();
        contents.push(json!({
            "role": "user",
            "parts": [{ "text": prompt }]
        }));

        json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.temperature,
                "topP": self.top_p
            }
        })
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    #[instrument(skip(self, prompt, history), fields(turns = history.len()))]
    async fn generate(&self, prompt: String, history: Vec<ChatTurn>) -> Result<String, GenerationError> {
        let payload = self.build_payload(&prompt, &history);
        debug!("Sending generateContent request to {}", self.endpoint);

        let request_future = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send();

        let res = timeout(self.request_timeout, request_future).await??;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!("Generator request failed with status {}", status);
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = res.json().await?;
        let text = extract_text(&body).ok_or(GenerationError::EmptyResponse)?;
        info!("Generator returned {} characters", text.len());
        Ok(text)
    }
}
