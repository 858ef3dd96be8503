//! OpenAI API client construction.
//!
//! The embedder and the chat model talk to the same API; this module owns the
//! HTTP client setup so per-request timeouts are applied consistently. The
//! API key is read from `OPENAI_API_KEY`.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Applied when a backend has no configured timeout of its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a client with the given per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}
