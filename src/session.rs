use thiserror::Error;

use crate::client::{ClientError, GatewayClient};
use crate::extract::extract_code;
use crate::prompt::{ProcessingRequest, build_prompt, detect_language};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please paste some code first")]
    EmptySource,
    #[error("Please enter your Anthropic API key in settings")]
    MissingApiKey,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// The reply of one run, with the code already pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResult {
    pub language: Option<&'static str>,
    pub raw_reply: String,
    pub code: String,
}

/// Check a request before anything goes on the wire.
///
/// `allow_server_key` lets a request without its own key through, relying
/// on the gateway's default credential.
pub fn validate(req: &ProcessingRequest, allow_server_key: bool) -> Result<(), ValidationError> {
    if req.source_text.trim().is_empty() {
        return Err(ValidationError::EmptySource);
    }

    let has_key = req.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
    if !has_key && !allow_server_key {
        return Err(ValidationError::MissingApiKey);
    }

    Ok(())
}

/// Validate, build the prompt, call the gateway and extract the code.
pub async fn run(
    client: &GatewayClient,
    req: ProcessingRequest,
    allow_server_key: bool,
) -> Result<ProcessedResult, SessionError> {
    validate(&req, allow_server_key)?;

    let prompt = build_prompt(&req);
    let api_key = req.api_key.as_deref().filter(|k| !k.trim().is_empty());

    tracing::info!(mode = ?req.mode, comments = ?req.comment_level, "processing request");
    let raw_reply = client.process(api_key, &prompt).await?;
    let code = extract_code(&raw_reply).to_owned();

    Ok(ProcessedResult {
        language: detect_language(&req.source_text),
        raw_reply,
        code,
    })
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing::post;

    use super::*;

    fn request(source: &str, key: Option<&str>) -> ProcessingRequest {
        ProcessingRequest {
            source_text: source.to_string(),
            api_key: key.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn blank_source_is_rejected_first() {
        assert_eq!(validate(&request("  \n", None), false), Err(ValidationError::EmptySource));
        assert_eq!(validate(&request("", Some("k")), true), Err(ValidationError::EmptySource));
    }

    #[test]
    fn missing_key_is_rejected_unless_server_key_allowed() {
        assert_eq!(validate(&request("x = 1", None), false), Err(ValidationError::MissingApiKey));
        assert_eq!(validate(&request("x = 1", Some(" ")), false), Err(ValidationError::MissingApiKey));
        assert_eq!(validate(&request("x = 1", None), true), Ok(()));
        assert_eq!(validate(&request("x = 1", Some("k")), false), Ok(()));
    }

    #[tokio::test]
    async fn run_extracts_code_from_reply() {
        let app = Router::new().route(
            "/api/anthropic",
            post(|| async {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"content":[{"type":"text","text":"Sure:\n```python\nx = 2\n```\nDone."}]}"#,
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = GatewayClient::new(&format!("http://{addr}")).unwrap();
        let result = run(&client, request("import os", Some("k")), false).await.unwrap();

        assert_eq!(result.code, "x = 2\n");
        assert_eq!(result.language, Some("Python"));
        assert!(result.raw_reply.starts_with("Sure:"));
    }

    #[tokio::test]
    async fn run_stops_on_validation_error() {
        // Nothing listens here; validation must fail before any connection.
        let client = GatewayClient::new("http://127.0.0.1:9").unwrap();
        let err = run(&client, request("", Some("k")), false).await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(ValidationError::EmptySource)));
    }
}
