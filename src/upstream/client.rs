use reqwest::Response;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use super::types::ChatRequest;
use super::{API_VERSION, UpstreamError};

/// Thin client for the upstream messages endpoint.
///
/// The credential is supplied per call because the gateway resolves it per
/// request; only the versioning headers are fixed on the HTTP client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Send one messages request and return the raw success body.
    ///
    /// The body is returned as text so callers can forward it verbatim.
    pub async fn send_message(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<String, UpstreamError> {
        let key = HeaderValue::from_str(api_key).map_err(|_| UpstreamError::InvalidKey)?;
        let url = format!("{}/v1/messages", self.base_url);

        tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "sending upstream request");

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", key)
            .json(request)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    /// Check status and hand back the body untouched.
    async fn handle_response(&self, resp: Response) -> Result<String, UpstreamError> {
        let status = resp.status();

        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(resp.text().await?)
    }
}
