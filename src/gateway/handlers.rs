use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::GatewayState;
use super::error::GatewayError;
use crate::credentials::resolve_key;
use crate::upstream::types::ChatRequest;

/// Body of `POST /api/anthropic`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn anthropic_handler(
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<ProxyRequest>, JsonRejection>,
) -> Response {
    match proxy(&state, body).await {
        Ok(upstream_body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            upstream_body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(status = err.status().as_u16(), error = %err, "error proxying to upstream");
            err.into_response()
        }
    }
}

async fn proxy(
    state: &GatewayState,
    body: Result<Json<ProxyRequest>, JsonRejection>,
) -> Result<String, GatewayError> {
    let Json(req) = body.map_err(|e| GatewayError::InvalidBody(e.body_text()))?;

    let api_key = resolve_key(req.api_key.as_deref(), state.config.default_api_key.as_ref())
        .ok_or(GatewayError::MissingApiKey)?;

    if req.prompt.is_empty() {
        return Err(GatewayError::MissingPrompt);
    }

    let chat = ChatRequest::single_turn(req.prompt)
        .with_model(req.model.unwrap_or_else(|| state.config.default_model.clone()))
        .with_max_tokens(req.max_tokens.unwrap_or(state.config.default_max_tokens));

    Ok(state.upstream.send_message(api_key.expose(), &chat).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, Request};
    use axum::routing::post;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::credentials::ApiKey;
    use crate::gateway::error::{MISSING_KEY, MISSING_PROMPT};
    use crate::gateway::{GatewayConfig, router};

    /// What the stub upstream saw on its last call.
    #[derive(Default)]
    struct Seen {
        api_key: Option<String>,
        version: Option<String>,
        body: Option<Value>,
        calls: usize,
    }

    /// Serve a fixed reply on `/v1/messages` from an ephemeral local port.
    async fn spawn_upstream(status: StatusCode, reply: &'static str) -> (String, Arc<Mutex<Seen>>) {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let recorder = Arc::clone(&seen);

        let app = Router::new().route(
            "/v1/messages",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    let mut seen = recorder.lock().unwrap();
                    seen.calls += 1;
                    seen.api_key = headers
                        .get("x-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    seen.version = headers
                        .get("anthropic-version")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    seen.body = Some(body);
                    (status, [(header::CONTENT_TYPE, "application/json")], reply)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), seen)
    }

    fn gateway(upstream: &str, default_key: Option<&str>) -> Router {
        let config = GatewayConfig {
            upstream_base_url: upstream.to_string(),
            default_api_key: default_key.and_then(ApiKey::new),
            ..GatewayConfig::default()
        };
        router(Arc::new(GatewayState::new(config)))
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/anthropic")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn error_of(body: &str) -> String {
        let value: Value = serde_json::from_str(body).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn missing_key_is_rejected_before_upstream() {
        let (url, seen) = spawn_upstream(StatusCode::OK, r#"{"content":[]}"#).await;

        let (status, body) = post_json(gateway(&url, None), r#"{"prompt":"hi"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"API key is required"}"#);
        assert_eq!(error_of(&body), MISSING_KEY);
        assert_eq!(seen.lock().unwrap().calls, 0);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_upstream() {
        let (url, seen) = spawn_upstream(StatusCode::OK, r#"{"content":[]}"#).await;

        let (status, body) =
            post_json(gateway(&url, None), r#"{"apiKey":"sk-client","prompt":""}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), MISSING_PROMPT);

        let (status, body) = post_json(gateway(&url, None), r#"{"apiKey":"sk-client"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), MISSING_PROMPT);
        assert_eq!(seen.lock().unwrap().calls, 0);
    }

    #[tokio::test]
    async fn whitespace_prompt_is_forwarded() {
        let (url, seen) = spawn_upstream(StatusCode::OK, r#"{"content":[{"text":"ok"}]}"#).await;

        let (status, _) =
            post_json(gateway(&url, None), r#"{"apiKey":"sk-client","prompt":" "}"#).await;

        assert_eq!(status, StatusCode::OK);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.calls, 1);
        assert_eq!(seen.body.as_ref().unwrap()["messages"][0]["content"], " ");
    }

    #[tokio::test]
    async fn success_body_is_forwarded_verbatim() {
        let reply = r#"{"content":[{"text":"ok"}]}"#;
        let (url, seen) = spawn_upstream(StatusCode::OK, reply).await;

        let (status, body) =
            post_json(gateway(&url, None), r#"{"apiKey":"sk-client","prompt":"hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, reply);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.api_key.as_deref(), Some("sk-client"));
        assert_eq!(seen.version.as_deref(), Some("2023-06-01"));
        let sent = seen.body.as_ref().unwrap();
        assert_eq!(sent["model"], "claude-3-5-sonnet-20240620");
        assert_eq!(sent["max_tokens"], 4000);
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(sent["messages"][0]["content"], "hi");
    }

    #[tokio::test]
    async fn server_default_key_is_used_when_request_has_none() {
        let (url, seen) = spawn_upstream(StatusCode::OK, r#"{"content":[{"text":"ok"}]}"#).await;

        let (status, _) = post_json(gateway(&url, Some("sk-server")), r#"{"prompt":"hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(seen.lock().unwrap().api_key.as_deref(), Some("sk-server"));
    }

    #[tokio::test]
    async fn model_and_max_tokens_overrides_are_forwarded() {
        let (url, seen) = spawn_upstream(StatusCode::OK, r#"{"content":[{"text":"ok"}]}"#).await;

        let body = r#"{"apiKey":"k","prompt":"hi","model":"claude-test","maxTokens":256,"commentLevel":"none"}"#;
        let (status, _) = post_json(gateway(&url, None), body).await;

        assert_eq!(status, StatusCode::OK);
        let seen = seen.lock().unwrap();
        let sent = seen.body.as_ref().unwrap();
        assert_eq!(sent["model"], "claude-test");
        assert_eq!(sent["max_tokens"], 256);
    }

    #[tokio::test]
    async fn upstream_error_status_and_message_are_relayed() {
        let (url, _) = spawn_upstream(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"rate limited"}}"#,
        )
        .await;

        let (status, body) =
            post_json(gateway(&url, None), r#"{"apiKey":"k","prompt":"hi"}"#).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, r#"{"error":"rate limited"}"#);
    }

    #[tokio::test]
    async fn upstream_error_without_envelope_falls_back_to_status_text() {
        let (url, _) = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, "overloaded").await;

        let (status, body) =
            post_json(gateway(&url, None), r#"{"apiKey":"k","prompt":"hi"}"#).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error_of(&body), "Request failed with status code 503");
    }

    #[tokio::test]
    async fn unreachable_upstream_maps_to_500() {
        // Grab a free port, then close it so the connection is refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (status, body) = post_json(
            gateway(&format!("http://{addr}"), None),
            r#"{"apiKey":"k","prompt":"hi"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!error_of(&body).is_empty());
    }

    #[tokio::test]
    async fn malformed_json_gets_error_body() {
        let (status, body) = post_json(gateway("http://127.0.0.1:9", None), "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_of(&body).starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = gateway("http://127.0.0.1:9", None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
