//! Clients for the AI providers.
//!
//! Both providers sit behind small traits ([`ChatCompletion`], [`TextToImage`])
//! so the orchestration in [`crate::Referent`] can run against any
//! implementation.

pub mod chat;
pub mod image;

pub use chat::{ChatClient, ChatCompletion};
pub use image::{GeneratedImage, ImageClient, TextToImage};

use std::time::Duration;

use reqwest::Client;

use crate::{ReferentError, Result, Service};

/// Builds the HTTP client shared by a provider client.
fn http_client(service: Service, timeout: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(|e| ReferentError::UpstreamService { service, status: None, message: e.to_string() })
}

/// Maps a transport failure (no usable response) to an upstream error.
fn transport_error(service: Service, err: reqwest::Error) -> ReferentError {
    let message = if err.is_timeout() { format!("request timed out: {err}") } else { err.to_string() };
    ReferentError::UpstreamService { service, status: None, message }
}

/// First `max` characters of an upstream error body, for messages and logs.
fn snippet(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
