pub mod cascade;
pub mod config;
pub mod error;
pub mod extract;
pub mod parse;
pub mod prompt;

#[cfg(feature = "fetch")]
pub mod ai;
#[cfg(feature = "fetch")]
pub mod fetch;
#[cfg(feature = "fetch")]
pub mod referent;

pub use config::{ProviderConfig, ProviderConfigBuilder};
pub use error::{ErrorInfo, ErrorKind, ReferentError, Result, Service};
pub use extract::{CONTENT_MIN_CHARS, ExtractionResult, extract_article, extract_from_document};
pub use parse::Document;
pub use prompt::{Action, ChatRequest, IMAGE_PROMPT_BUDGET, TEXT_BUDGET, prepare_article_text};

#[cfg(feature = "fetch")]
pub use ai::{ChatClient, ChatCompletion, GeneratedImage, ImageClient, TextToImage};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, fetch_file, fetch_stdin, fetch_url, validate_url};
#[cfg(feature = "fetch")]
pub use referent::{ArticleExcerpt, Illustration, ProcessOutcome, Referent, Translation};
