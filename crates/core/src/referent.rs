//! Article processing pipeline.
//!
//! [`Referent`] ties the pieces together: fetch the page, extract the article,
//! build a prompt and call the AI providers. Each URL operation has an
//! `*_article` counterpart taking an already extracted article, so callers
//! with local HTML share the same code path.
//!
//! # Example
//!
//! ```rust,no_run
//! use referent_core::{Action, ProviderConfig, Referent};
//!
//! # async fn example() -> referent_core::Result<()> {
//! let referent = Referent::new(ProviderConfig::from_env());
//! let outcome = referent.process("https://example.com/post", Action::Summary).await?;
//! println!("{}", outcome.result);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::{ChatClient, ChatCompletion, GeneratedImage, ImageClient, TextToImage};
use crate::config::{CHAT_API_KEY_VAR, IMAGE_API_KEY_VAR};
use crate::fetch::{FetchConfig, fetch_url, validate_url};
use crate::prompt::Action;
use crate::{ExtractionResult, ProviderConfig, ReferentError, Result, extract_article};

/// Title and body echoed back with every generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleExcerpt {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<&ExtractionResult> for ArticleExcerpt {
    fn from(article: &ExtractionResult) -> Self {
        Self { title: article.title.clone(), content: article.content.clone() }
    }
}

/// Text artifact produced by a chat action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub result: String,
    pub action: Action,
    pub original: ArticleExcerpt,
}

/// Full translation of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub translation: String,
    pub original: ArticleExcerpt,
}

/// Generated illustration and the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Illustration {
    /// `data:` URL with the base64 encoded image.
    pub image: String,
    pub prompt: String,
    pub original: ArticleExcerpt,
}

/// Fetches articles and turns them into AI artifacts.
pub struct Referent {
    fetch_config: FetchConfig,
    providers: ProviderConfig,
    chat: Option<Arc<dyn ChatCompletion>>,
    image: Option<Arc<dyn TextToImage>>,
}

impl Referent {
    /// Creates a pipeline with HTTP provider clients built from `providers`.
    ///
    /// Missing credentials are reported when an operation needs them, not here.
    pub fn new(providers: ProviderConfig) -> Self {
        let chat = match ChatClient::new(&providers) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn ChatCompletion>),
            Err(e) => {
                debug!(error = %e, "chat client unavailable");
                None
            }
        };
        let image = match ImageClient::new(&providers) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn TextToImage>),
            Err(e) => {
                debug!(error = %e, "image client unavailable");
                None
            }
        };

        Self { fetch_config: FetchConfig::default(), providers, chat, image }
    }

    /// Replaces the page fetch settings.
    pub fn with_fetch_config(mut self, config: FetchConfig) -> Self {
        self.fetch_config = config;
        self
    }

    /// Uses `client` for chat completions.
    pub fn with_chat_client(mut self, client: Arc<dyn ChatCompletion>) -> Self {
        self.chat = Some(client);
        self
    }

    /// Uses `client` for image generation.
    pub fn with_image_client(mut self, client: Arc<dyn TextToImage>) -> Self {
        self.image = Some(client);
        self
    }

    pub fn fetch_config(&self) -> &FetchConfig {
        &self.fetch_config
    }

    pub fn providers(&self) -> &ProviderConfig {
        &self.providers
    }

    fn chat(&self) -> Result<&dyn ChatCompletion> {
        self.chat
            .as_deref()
            .ok_or_else(|| ReferentError::Configuration(format!("{CHAT_API_KEY_VAR} is not configured")))
    }

    fn image(&self) -> Result<&dyn TextToImage> {
        self.image
            .as_deref()
            .ok_or_else(|| ReferentError::Configuration(format!("{IMAGE_API_KEY_VAR} is not configured")))
    }

    /// Fetches `url` and extracts its article.
    ///
    /// Fetch problems surface as [`ReferentError::FetchFailed`] or
    /// [`ReferentError::Timeout`]; absent fields are not errors.
    pub async fn parse_url(&self, url: &str) -> Result<ExtractionResult> {
        let url = validate_url(url)?;
        let html = fetch_url(url.as_str(), &self.fetch_config).await?;
        let article = extract_article(&html)?;

        info!(%url, title = ?article.title, has_content = article.content.is_some(), "parsed article");
        Ok(article)
    }

    /// Fetches `url` and runs a text action on it.
    pub async fn process(&self, url: &str, action: Action) -> Result<ProcessOutcome> {
        validate_url(url)?;
        ensure_text_action(action)?;
        self.chat()?;

        let article = self.parse_url(url).await?;
        self.process_article(&article, action).await
    }

    /// Runs a text action (summary, theses, telegram, translate) on an article.
    pub async fn process_article(&self, article: &ExtractionResult, action: Action) -> Result<ProcessOutcome> {
        ensure_text_action(action)?;
        let chat = self.chat()?;
        let request = action.build_request(article, &self.providers.target_language)?;

        let result = chat.complete(&request).await?;
        Ok(ProcessOutcome { result, action, original: ArticleExcerpt::from(article) })
    }

    /// Fetches `url` and translates its article.
    pub async fn translate(&self, url: &str) -> Result<Translation> {
        validate_url(url)?;
        self.chat()?;

        let article = self.parse_url(url).await?;
        self.translate_article(&article).await
    }

    /// Translates an article into the configured target language.
    pub async fn translate_article(&self, article: &ExtractionResult) -> Result<Translation> {
        let outcome = self.process_article(article, Action::Translate).await?;
        Ok(Translation { translation: outcome.result, original: outcome.original })
    }

    /// Fetches `url` and generates an illustration for its article.
    pub async fn illustrate(&self, url: &str) -> Result<Illustration> {
        validate_url(url)?;
        self.chat()?;
        self.image()?;

        let article = self.parse_url(url).await?;
        self.illustrate_article(&article).await
    }

    /// Generates an image prompt for the article, then the image itself.
    pub async fn illustrate_article(&self, article: &ExtractionResult) -> Result<Illustration> {
        let (prompt, generated) = self.render_illustration(article).await?;
        Ok(Illustration { image: generated.to_data_url(), prompt, original: ArticleExcerpt::from(article) })
    }

    /// Like [`Referent::illustrate_article`] but returns the raw image with its prompt.
    pub async fn render_illustration(&self, article: &ExtractionResult) -> Result<(String, GeneratedImage)> {
        let chat = self.chat()?;
        let image = self.image()?;
        let request = Action::ImagePrompt.build_request(article, &self.providers.target_language)?;

        let prompt = chat.complete(&request).await?.trim().to_string();
        debug!(%prompt, "generated image prompt");

        let generated = image.generate(&prompt).await?;
        Ok((prompt, generated))
    }
}

fn ensure_text_action(action: Action) -> Result<()> {
    match action {
        Action::ImagePrompt => Err(ReferentError::InvalidInput(
            "image prompts are produced by the illustration pipeline".to_string(),
        )),
        _ => Ok(()),
    }
}
