pub mod client;
pub mod types;

use thiserror::Error;

pub use client::AnthropicClient;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request failed with status code {status}")]
    Api { status: u16, detail: String },
    #[error("invalid API key header")]
    InvalidKey,
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
