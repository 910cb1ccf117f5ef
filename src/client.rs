use reqwest::Response;
use serde::Deserialize;
use thiserror::Error;

use crate::gateway::handlers::ProxyRequest;
use crate::upstream::types::ChatResponse;

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3001";
const FALLBACK_ERROR: &str = "Error calling Anthropic API";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Gateway { status: u16, message: String },
    #[error("Response contained no text content")]
    EmptyResponse,
    #[error("deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid gateway URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Caller side of the gateway's `POST /api/anthropic`.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

impl GatewayClient {
    /// Any path on `base_url` is kept as a prefix of the endpoint.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = url::Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        let endpoint = base.join("api/anthropic")?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Send `prompt` and return the text of the first content block.
    pub async fn process(&self, api_key: Option<&str>, prompt: &str) -> Result<String, ClientError> {
        let body = ProxyRequest {
            api_key: api_key.map(str::to_owned),
            prompt: prompt.to_owned(),
            ..Default::default()
        };

        tracing::debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "calling gateway");
        let resp = self.http.post(self.endpoint.clone()).json(&body).send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response(&self, resp: Response) -> Result<String, ClientError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GatewayErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            return Err(ClientError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        parsed
            .first_text()
            .map(str::to_owned)
            .ok_or(ClientError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing::post;

    use super::*;

    async fn spawn_gateway(status: StatusCode, reply: &'static str) -> String {
        let app = Router::new().route(
            "/api/anthropic",
            post(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], reply) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn endpoint_is_joined_onto_base() {
        let client = GatewayClient::new("http://localhost:3001").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3001/api/anthropic");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = GatewayClient::new("https://host.example/copycode").unwrap();
        assert_eq!(client.endpoint(), "https://host.example/copycode/api/anthropic");

        let client = GatewayClient::new("https://host.example/copycode/").unwrap();
        assert_eq!(client.endpoint(), "https://host.example/copycode/api/anthropic");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(GatewayClient::new("not a url"), Err(ClientError::Url(_))));
    }

    #[tokio::test]
    async fn returns_first_text_block() {
        let url = spawn_gateway(StatusCode::OK, r#"{"content":[{"type":"text","text":"ok"}]}"#).await;
        let client = GatewayClient::new(&url).unwrap();
        assert_eq!(client.process(Some("k"), "hi").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn surfaces_gateway_error_message() {
        let url = spawn_gateway(StatusCode::BAD_REQUEST, r#"{"error":"API key is required"}"#).await;
        let client = GatewayClient::new(&url).unwrap();
        let err = client.process(None, "hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Gateway { status: 400, .. }));
        assert_eq!(err.to_string(), "API key is required");
    }

    #[tokio::test]
    async fn falls_back_when_error_body_is_not_json() {
        let url = spawn_gateway(StatusCode::BAD_GATEWAY, "upstream down").await;
        let client = GatewayClient::new(&url).unwrap();
        let err = client.process(Some("k"), "hi").await.unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_ERROR);
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let url = spawn_gateway(StatusCode::OK, r#"{"content":[]}"#).await;
        let client = GatewayClient::new(&url).unwrap();
        let err = client.process(Some("k"), "hi").await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyResponse));
    }
}
