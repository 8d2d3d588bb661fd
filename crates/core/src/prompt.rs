//! Chat prompts built from extracted articles.
//!
//! The article text sent to a provider is `Title: <title>` (when known)
//! followed by the body, cut to a per-task character budget.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ExtractionResult, ReferentError, Result};

/// Character budget for text-generation tasks.
pub const TEXT_BUDGET: usize = 8000;

/// Character budget when generating an image prompt.
pub const IMAGE_PROMPT_BUDGET: usize = 4000;

/// Marker appended to truncated article text.
pub const ELLIPSIS: &str = "...";

/// Artifact a chat model produces from an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Two or three paragraph summary.
    Summary,
    /// Bulleted list of the main theses.
    Theses,
    /// Telegram-style social media post.
    Telegram,
    /// Full translation.
    Translate,
    /// Short English prompt for an illustration.
    ImagePrompt,
}

impl Action {
    /// Actions exposed through the generic processing endpoint.
    pub const PROCESSING: [Action; 3] = [Action::Summary, Action::Theses, Action::Telegram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Summary => "summary",
            Action::Theses => "theses",
            Action::Telegram => "telegram",
            Action::Translate => "translate",
            Action::ImagePrompt => "image_prompt",
        }
    }

    /// Character budget for the article text of this action.
    pub fn budget(&self) -> usize {
        match self {
            Action::ImagePrompt => IMAGE_PROMPT_BUDGET,
            _ => TEXT_BUDGET,
        }
    }

    /// Sampling temperature for this action.
    pub fn temperature(&self) -> f32 {
        match self {
            Action::Summary => 0.5,
            Action::Theses => 0.4,
            Action::Telegram => 0.6,
            Action::Translate => 0.3,
            Action::ImagePrompt => 0.7,
        }
    }

    /// Value of the `X-Title` attribution header sent to the provider.
    pub fn request_title(&self) -> &'static str {
        match self {
            Action::Summary | Action::Theses | Action::Telegram => "Referent - AI Article Processor",
            Action::Translate => "Referent - Article Translator",
            Action::ImagePrompt => "Referent - Image Prompt Generator",
        }
    }

    fn system_prompt(&self, language: &str) -> String {
        match self {
            Action::Summary => {
                format!("You are an experienced analyst. Write a concise summary of the article in {language}.")
            }
            Action::Theses => "You are an expert in text analysis. Identify the key theses of the article.".to_string(),
            Action::Telegram => {
                "You are a social media content creator. Write a Telegram post based on the article.".to_string()
            }
            Action::Translate => format!(
                "You are a professional translator. Translate the following English text into {language}, \
                 preserving its structure and formatting."
            ),
            Action::ImagePrompt => "You are an expert at writing prompts for image generation. Write a short but \
                                    detailed English prompt for an illustration of the article. The prompt must be \
                                    descriptive, name a style (realistic, digital art, photography, etc.), the main \
                                    elements and the atmosphere, and be no longer than 200 characters."
                .to_string(),
        }
    }

    fn user_instruction(&self, language: &str) -> String {
        match self {
            Action::Summary => {
                format!("Briefly describe (2-3 paragraphs) what this article is about. Answer in {language}.")
            }
            Action::Theses => {
                format!("List the 5-7 main theses of this article as a bulleted list in {language}.")
            }
            Action::Telegram => format!(
                "Write a Telegram post in {language} based on this article. The post must be engaging, \
                 informative, use emoji, be structured (headline, short summary, call to action) and be no \
                 longer than 1000 characters."
            ),
            Action::Translate => format!("Translate the following article into {language}."),
            Action::ImagePrompt => "Write an image generation prompt for this article. The prompt must be in \
                                    English, short (up to 200 characters) and descriptive."
                .to_string(),
        }
    }

    /// Builds the chat request for `article`.
    ///
    /// # Errors
    ///
    /// Returns [`ReferentError::ExtractionEmpty`] when the article has no body.
    pub fn build_request(&self, article: &ExtractionResult, language: &str) -> Result<ChatRequest> {
        let content = article.require_content()?;
        let text = prepare_article_text(article.title.as_deref(), content, self.budget());

        Ok(ChatRequest {
            system: self.system_prompt(language),
            user: format!("{}\n\n{}", self.user_instruction(language), text),
            temperature: self.temperature(),
            title: self.request_title(),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ReferentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(Action::Summary),
            "theses" => Ok(Action::Theses),
            "telegram" => Ok(Action::Telegram),
            "translate" | "translation" => Ok(Action::Translate),
            "image_prompt" => Ok(Action::ImagePrompt),
            other => Err(ReferentError::InvalidInput(format!(
                "unknown action {other:?}, expected one of: summary, theses, telegram"
            ))),
        }
    }
}

/// A two-message chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System instruction.
    pub system: String,
    /// User instruction with the embedded article text.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Attribution title sent alongside the request.
    pub title: &'static str,
}

/// Joins title and body and cuts the result to `budget` characters.
///
/// When cut, [`ELLIPSIS`] is appended after the first `budget` characters.
pub fn prepare_article_text(title: Option<&str>, content: &str, budget: usize) -> String {
    let mut text = String::new();
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        text.push_str("Title: ");
        text.push_str(title);
        text.push_str("\n\n");
    }
    text.push_str(content);

    truncate_chars(text, budget)
}

fn truncate_chars(mut text: String, budget: usize) -> String {
    if let Some((cut, _)) = text.char_indices().nth(budget) {
        text.truncate(cut);
        text.push_str(ELLIPSIS);
    }
    text
}
