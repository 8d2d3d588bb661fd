//! Error types for Referent operations.
//!
//! [`ReferentError`] is assigned at the point of failure and carries the
//! structured context (upstream status, service, url) a boundary layer needs.
//! [`ErrorKind`] is the classification derived from it, with a stable code and
//! a user-facing message, so callers never inspect error text.
//!
//! # Example
//!
//! ```rust
//! use referent_core::{ErrorKind, ReferentError};
//!
//! let err = ReferentError::FetchFailed {
//!     url: "https://example.com/a".to_string(),
//!     status: Some(404),
//!     reason: "Not Found".to_string(),
//! };
//! assert_eq!(err.kind(), ErrorKind::ArticleNotFound);
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// External provider that produced an [`ReferentError::UpstreamService`] failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Chat-completion provider (summaries, translation, image prompts).
    Chat,
    /// Text-to-image inference provider.
    Image,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Chat => write!(f, "chat completion"),
            Service::Image => write!(f, "image generation"),
        }
    }
}

/// Main error type for fetching, extraction and AI processing.
#[derive(Error, Debug)]
pub enum ReferentError {
    /// Missing or malformed request input (action, required field).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or does not use http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The article page could not be retrieved.
    ///
    /// `status` is the upstream HTTP status when a response was received.
    #[error("Failed to fetch URL {url}: {reason}")]
    FetchFailed { url: String, status: Option<u16>, reason: String },

    /// Request timeout.
    ///
    /// Returned when the page fetch exceeds the configured timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// HTML could not be processed (invalid selector or unusable markup).
    #[error("Failed to parse HTML: {0}")]
    MarkupError(String),

    /// The page parsed but no article body was found.
    #[error("Article content not found")]
    ExtractionEmpty,

    /// A chat or image provider failed or returned an unusable payload.
    #[error("{service} service error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    UpstreamService { service: Service, status: Option<u16>, message: String },

    /// A required credential or setting is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Local I/O errors (file and stdin input, output writing).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ReferentError.
pub type Result<T> = std::result::Result<T, ReferentError>;

/// User-facing classification of a [`ReferentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    InvalidInput,
    ArticleNotFound,
    ArticleFetchFailed,
    ArticleParseFailed,
    AiServiceError,
    ImageModelLoading,
    ImageModelGone,
    ApiKeyMissing,
    #[serde(rename = "unknown_error")]
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::ArticleNotFound => "article_not_found",
            ErrorKind::ArticleFetchFailed => "article_fetch_failed",
            ErrorKind::ArticleParseFailed => "article_parse_failed",
            ErrorKind::AiServiceError => "ai_service_error",
            ErrorKind::ImageModelLoading => "image_model_loading",
            ErrorKind::ImageModelGone => "image_model_gone",
            ErrorKind::ApiKeyMissing => "api_key_missing",
            ErrorKind::Unknown => "unknown_error",
        }
    }

    /// Message suitable for showing to an end user.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "Invalid link format. Make sure the link starts with http:// or https://",
            ErrorKind::InvalidInput => "The request is incomplete. Check the link and the selected action.",
            ErrorKind::ArticleNotFound | ErrorKind::ArticleFetchFailed => "Could not load the article from this link.",
            ErrorKind::ArticleParseFailed => {
                "Could not process the article content. Check that the link points to an article."
            }
            ErrorKind::AiServiceError => "The AI service failed to process the article. Please try again later.",
            ErrorKind::ImageModelLoading => {
                "The image generation service is loading. Please try again in a few moments."
            }
            ErrorKind::ImageModelGone => "The image generation model is no longer available.",
            ErrorKind::ApiKeyMissing => "Server configuration error. Please contact the administrator.",
            ErrorKind::Unknown => "Something went wrong. Please try again or check the link.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl ReferentError {
    /// Classifies this error from its variant and structured fields.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReferentError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ReferentError::InvalidInput(_) => ErrorKind::InvalidInput,
            ReferentError::FetchFailed { status: Some(404), .. } => ErrorKind::ArticleNotFound,
            ReferentError::FetchFailed { .. } | ReferentError::Timeout { .. } => ErrorKind::ArticleFetchFailed,
            ReferentError::MarkupError(_) | ReferentError::ExtractionEmpty => ErrorKind::ArticleParseFailed,
            ReferentError::UpstreamService { service: Service::Image, status: Some(503), .. } => {
                ErrorKind::ImageModelLoading
            }
            ReferentError::UpstreamService { service: Service::Image, status: Some(410), .. } => {
                ErrorKind::ImageModelGone
            }
            ReferentError::UpstreamService { .. } => ErrorKind::AiServiceError,
            ReferentError::Configuration(_) => ErrorKind::ApiKeyMissing,
            ReferentError::FileNotFound(_) | ReferentError::Io(_) => ErrorKind::Unknown,
        }
    }

    /// Upstream HTTP status attached at the failure site, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ReferentError::FetchFailed { status, .. } | ReferentError::UpstreamService { status, .. } => *status,
            _ => None,
        }
    }

    /// Serializable boundary form of this error.
    pub fn info(&self) -> ErrorInfo {
        let kind = self.kind();
        ErrorInfo { kind, message: self.to_string(), friendly_message: kind.friendly_message().to_string() }
    }
}

/// Error payload returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    #[serde(rename = "error")]
    pub message: String,
    pub friendly_message: String,
}
