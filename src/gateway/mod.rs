//! HTTP proxy in front of the upstream messages API.
//!
//! - `POST /api/anthropic` forwards `{apiKey?, prompt, model?, maxTokens?}`
//! - `GET /health` answers liveness checks
//!
//! Handlers share nothing mutable: the state is the read-only config plus an
//! upstream client.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::credentials::{self, ApiKey, SERVER_KEY_VAR};
use crate::upstream::{AnthropicClient, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub allowed_origin: String,
    pub default_api_key: Option<ApiKey>,
    pub upstream_base_url: String,
    pub default_model: String,
    pub default_max_tokens: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            default_api_key: None,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl GatewayConfig {
    /// Build the config from the environment (after loading .env files).
    pub fn from_env() -> Result<Self, ConfigError> {
        credentials::load_env_files();
        Self::from_lookup(credentials::env_var)
    }

    /// Build the config from any variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => defaults.port,
        };

        let default_max_tokens = match get("ANTHROPIC_MAX_TOKENS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "ANTHROPIC_MAX_TOKENS",
                value,
            })?,
            None => defaults.default_max_tokens,
        };

        let allowed_origin = get("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin);
        HeaderValue::from_str(&allowed_origin).map_err(|_| ConfigError::Invalid {
            name: "ALLOWED_ORIGIN",
            value: allowed_origin.clone(),
        })?;

        Ok(Self {
            port,
            allowed_origin,
            default_api_key: get(SERVER_KEY_VAR).and_then(ApiKey::new),
            upstream_base_url: get("ANTHROPIC_BASE_URL").unwrap_or(defaults.upstream_base_url),
            default_model: get("ANTHROPIC_MODEL").unwrap_or(defaults.default_model),
            default_max_tokens,
        })
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct GatewayState {
    pub config: GatewayConfig,
    pub upstream: AnthropicClient,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Self {
        let upstream = AnthropicClient::new(config.upstream_base_url.clone());
        Self { config, upstream }
    }
}

pub fn router(state: Arc<GatewayState>) -> Router {
    // Validated in `from_lookup`; an unparsable value only reaches here when
    // the config was built by hand, in which case no origin is allowed.
    let origin = HeaderValue::from_str(&state.config.allowed_origin)
        .unwrap_or_else(|_| HeaderValue::from_static("null"));

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/anthropic", post(handlers::anthropic_handler))
        .route("/health", get(handlers::health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: GatewayConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(
        %addr,
        origin = %config.allowed_origin,
        upstream = %config.upstream_base_url,
        server_key = config.default_api_key.is_some(),
        "gateway starting"
    );
    if config.default_api_key.is_none() {
        tracing::warn!("{SERVER_KEY_VAR} not set; requests must carry their own apiKey");
    }

    let app = router(Arc::new(GatewayState::new(config)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Server running on port {}", addr.port());
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
        assert!(config.default_api_key.is_none());
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.default_max_tokens, 4000);
    }

    #[test]
    fn reads_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("ALLOWED_ORIGIN", "https://copycode.example"),
            ("ANTHROPIC_API_KEY", "sk-server"),
            ("ANTHROPIC_MAX_TOKENS", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origin, "https://copycode.example");
        assert_eq!(config.default_api_key.unwrap().expose(), "sk-server");
        assert_eq!(config.default_max_tokens, 1024);
    }

    #[test]
    fn rejects_bad_port() {
        let err = GatewayConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid PORT: http");
    }

    #[test]
    fn debug_never_prints_key() {
        let config =
            GatewayConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "sk-ant-secret")])).unwrap();
        assert!(!format!("{config:?}").contains("sk-ant-secret"));
    }
}
