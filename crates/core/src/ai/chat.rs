use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{http_client, snippet, transport_error};
use crate::prompt::ChatRequest;
use crate::{ProviderConfig, ReferentError, Result, Service};

/// A chat-completion provider.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends the system and user messages and returns the generated text.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    /// Model identifier used for requests.
    fn model_name(&self) -> &str;
}

/// Client for OpenAI-compatible `/chat/completions` APIs (OpenRouter by default).
pub struct ChatClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    referer: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Creates a client from provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`ReferentError::Configuration`] when no chat key is set.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.require_chat_key()?.to_string();

        Ok(Self {
            http: http_client(Service::Chat, config.timeout)?,
            endpoint: format!("{}/chat/completions", config.chat_base_url.trim_end_matches('/')),
            api_key,
            model: config.chat_model.clone(),
            referer: config.app_origin.clone(),
        })
    }

    fn invalid_response() -> ReferentError {
        ReferentError::UpstreamService {
            service: Service::Chat,
            status: None,
            message: "Invalid response from AI service".to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [
                Message { role: "system", content: &request.system },
                Message { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
        };

        debug!(model = %self.model, title = request.title, chars = request.user.chars().count(), "chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", request.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Service::Chat, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %snippet(&text, 500), "chat provider returned an error");
            return Err(ReferentError::UpstreamService {
                service: Service::Chat,
                status: Some(status.as_u16()),
                message: format!(
                    "AI processing failed: {}",
                    status.canonical_reason().unwrap_or("unexpected status")
                ),
            });
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "chat provider returned an undecodable body");
            Self::invalid_response()
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(Self::invalid_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
