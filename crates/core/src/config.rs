//! Provider configuration.
//!
//! Credentials and endpoints for the chat and image providers. Values come
//! from the environment ([`ProviderConfig::from_env`]) and can be overridden
//! with the builder.
//!
//! # Example
//!
//! ```rust
//! use referent_core::ProviderConfig;
//!
//! let config = ProviderConfig::builder()
//!     .chat_api_key("sk-test")
//!     .chat_model("deepseek/deepseek-chat")
//!     .target_language("German")
//!     .build();
//! assert_eq!(config.require_chat_key().unwrap(), "sk-test");
//! ```

use std::env;

use crate::{ReferentError, Result};

pub const CHAT_API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const IMAGE_API_KEY_VAR: &str = "HUGGING_FACE_API_KEY";

pub const DEFAULT_CHAT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_CHAT_MODEL: &str = "deepseek/deepseek-chat";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_IMAGE_MODEL: &str = "runwayml/stable-diffusion-v1-5";
pub const DEFAULT_LANGUAGE: &str = "Russian";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";

/// Settings for the AI providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Bearer token for the chat-completion provider.
    pub chat_api_key: Option<String>,
    /// Base URL of an OpenAI-compatible chat API (without `/chat/completions`).
    pub chat_base_url: String,
    /// Chat model identifier.
    pub chat_model: String,
    /// Bearer token for the image provider.
    pub image_api_key: Option<String>,
    /// Base URL of the image inference API (without `/models/...`).
    pub image_base_url: String,
    /// Image model identifier.
    pub image_model: String,
    /// Language for generated summaries, posts and translations.
    pub target_language: String,
    /// Origin reported to the chat provider in `HTTP-Referer`.
    pub app_origin: String,
    /// Timeout for provider requests in seconds.
    pub timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            chat_api_key: None,
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_api_key: None,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            target_language: DEFAULT_LANGUAGE.to_string(),
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            timeout: 120,
        }
    }
}

impl ProviderConfig {
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::new()
    }

    /// Reads configuration from the process environment.
    ///
    /// Unset or blank variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            chat_api_key: get(CHAT_API_KEY_VAR),
            chat_base_url: get("REFERENT_CHAT_BASE_URL").unwrap_or(defaults.chat_base_url),
            chat_model: get("REFERENT_CHAT_MODEL").unwrap_or(defaults.chat_model),
            image_api_key: get(IMAGE_API_KEY_VAR),
            image_base_url: get("REFERENT_IMAGE_BASE_URL").unwrap_or(defaults.image_base_url),
            image_model: get("REFERENT_IMAGE_MODEL").unwrap_or(defaults.image_model),
            target_language: get("REFERENT_LANGUAGE").unwrap_or(defaults.target_language),
            app_origin: get("REFERENT_APP_ORIGIN").unwrap_or(defaults.app_origin),
            timeout: get("REFERENT_PROVIDER_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
        }
    }

    /// Chat key, or [`ReferentError::Configuration`] naming the missing variable.
    pub fn require_chat_key(&self) -> Result<&str> {
        self.chat_api_key
            .as_deref()
            .ok_or_else(|| ReferentError::Configuration(format!("{CHAT_API_KEY_VAR} is not configured")))
    }

    /// Image key, or [`ReferentError::Configuration`] naming the missing variable.
    pub fn require_image_key(&self) -> Result<&str> {
        self.image_api_key
            .as_deref()
            .ok_or_else(|| ReferentError::Configuration(format!("{IMAGE_API_KEY_VAR} is not configured")))
    }
}

/// Builder for ProviderConfig.
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ProviderConfig::default() }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn chat_api_key(mut self, value: impl Into<String>) -> Self {
        self.config.chat_api_key = Some(value.into());
        self
    }

    pub fn chat_base_url(mut self, value: impl Into<String>) -> Self {
        self.config.chat_base_url = value.into();
        self
    }

    pub fn chat_model(mut self, value: impl Into<String>) -> Self {
        self.config.chat_model = value.into();
        self
    }

    pub fn image_api_key(mut self, value: impl Into<String>) -> Self {
        self.config.image_api_key = Some(value.into());
        self
    }

    pub fn image_base_url(mut self, value: impl Into<String>) -> Self {
        self.config.image_base_url = value.into();
        self
    }

    pub fn image_model(mut self, value: impl Into<String>) -> Self {
        self.config.image_model = value.into();
        self
    }

    pub fn target_language(mut self, value: impl Into<String>) -> Self {
        self.config.target_language = value.into();
        self
    }

    pub fn app_origin(mut self, value: impl Into<String>) -> Self {
        self.config.app_origin = value.into();
        self
    }

    /// Sets the provider request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.timeout = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ProviderConfig {
        self.config
    }
}

impl Default for ProviderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
