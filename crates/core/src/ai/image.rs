use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, warn};

use super::{http_client, snippet, transport_error};
use crate::{ProviderConfig, ReferentError, Result, Service};

const DEFAULT_IMAGE_TYPE: &str = "image/png";

/// A text-to-image provider.
#[async_trait]
pub trait TextToImage: Send + Sync {
    /// Generates an image for a short descriptive prompt.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// Raw image returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl GeneratedImage {
    /// Encodes the image as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Client for inference APIs taking `{"inputs": prompt}` at `/models/{model}`.
pub struct ImageClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

impl ImageClient {
    /// Creates a client from provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`ReferentError::Configuration`] when no image key is set.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.require_image_key()?.to_string();

        Ok(Self {
            http: http_client(Service::Image, config.timeout)?,
            endpoint: format!(
                "{}/models/{}",
                config.image_base_url.trim_end_matches('/'),
                config.image_model.trim_matches('/')
            ),
            api_key,
        })
    }
}

/// Message for a failed image request, keyed on the provider status.
fn failure_message(status: reqwest::StatusCode, body: &str) -> String {
    match status.as_u16() {
        503 => "Image generation service is currently loading. Please try again in a few moments.".to_string(),
        410 => "Image generation model is no longer available. Please try again later or contact support.".to_string(),
        _ => format!(
            "Failed to generate image: {}. Details: {}",
            status.canonical_reason().unwrap_or("unexpected status"),
            snippet(body, 200)
        ),
    }
}

#[async_trait]
impl TextToImage for ImageClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        debug!(endpoint = %self.endpoint, prompt, "image generation");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&InferenceRequest { inputs: prompt })
            .send()
            .await
            .map_err(|e| transport_error(Service::Image, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %snippet(&text, 500), "image provider returned an error");
            return Err(ReferentError::UpstreamService {
                service: Service::Image,
                status: Some(status.as_u16()),
                message: failure_message(status, &text),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string());

        if !content_type.starts_with("image/") && content_type != "application/octet-stream" {
            return Err(ReferentError::UpstreamService {
                service: Service::Image,
                status: Some(status.as_u16()),
                message: format!("Expected image data, got {content_type}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| transport_error(Service::Image, e))?;
        if bytes.is_empty() {
            return Err(ReferentError::UpstreamService {
                service: Service::Image,
                status: Some(status.as_u16()),
                message: "Image generation returned an empty body".to_string(),
            });
        }

        let content_type =
            if content_type.starts_with("image/") { content_type } else { DEFAULT_IMAGE_TYPE.to_string() };

        Ok(GeneratedImage { bytes: bytes.to_vec(), content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn config(server: &MockServer) -> ProviderConfig {
        ProviderConfig::builder()
            .image_api_key("hf-key")
            .image_base_url(server.uri())
            .image_model("org/model")
            .build()
    }

    #[test]
    fn test_data_url() {
        let image = GeneratedImage { bytes: b"abc".to_vec(), content_type: "image/png".to_string() };
        assert_eq!(image.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(ImageClient::new(&ProviderConfig::default()), Err(ReferentError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_generate_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/org/model"))
            .and(header("Authorization", "Bearer hf-key"))
            .and(body_json(json!({"inputs": "a lighthouse at dusk, oil painting"})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PNG_MAGIC.to_vec(), "image/png"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ImageClient::new(&config(&server)).unwrap();
        let image = client.generate("a lighthouse at dusk, oil painting").await.unwrap();

        assert_eq!(image.bytes, PNG_MAGIC);
        assert_eq!(image.content_type, "image/png");
        assert!(image.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_loading_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string(r#"{"error":"Model is loading"}"#))
            .mount(&server)
            .await;

        let client = ImageClient::new(&config(&server)).unwrap();
        let err = client.generate("prompt").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ImageModelLoading);
        assert!(err.to_string().contains("currently loading"));
    }

    #[tokio::test]
    async fn test_gone_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let client = ImageClient::new(&config(&server)).unwrap();
        let err = client.generate("prompt").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ImageModelGone);
        assert_eq!(err.upstream_status(), Some(410));
    }

    #[tokio::test]
    async fn test_other_failure_includes_body_snippet() {
        let server = MockServer::start().await;
        let body = "x".repeat(500);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(body))
            .mount(&server)
            .await;

        let client = ImageClient::new(&config(&server)).unwrap();
        let err = client.generate("prompt").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Bad Request"));
        assert!(message.contains(&"x".repeat(200)));
        assert!(!message.contains(&"x".repeat(201)));
    }

    #[tokio::test]
    async fn test_json_success_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
            .mount(&server)
            .await;

        let client = ImageClient::new(&config(&server)).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AiServiceError);
    }
}
