//! Vertex AI generateContent client.
//!
//! Sends the system instruction and the request parts as a single user turn
//! and returns the concatenated text of the first candidate.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{Credentials, ModelClient};
use crate::config::GenzConfig;
use crate::error::{GenzError, GenzResult};
use crate::request::Part;

/// Client for the Vertex AI prediction service.
#[derive(Clone)]
pub struct VertexClient {
    url: String,
    model: String,
    credentials: Arc<Credentials>,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl<'a> From<&'a Part> for WirePart<'a> {
    fn from(part: &'a Part) -> Self {
        match part {
            Part::Text(text) => WirePart::Text { text: text.as_str() },
            Part::Binary { bytes, mime_type } => WirePart::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.as_str(),
                    data: base64::engine::general_purpose::STANDARD.encode(bytes),
                },
            },
        }
    }
}

impl VertexClient {
    /// Create a client for the model selected by `config`.
    pub fn new(config: &GenzConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        let credentials = Credentials::from_config(config);
        debug!(model = %config.model, auth = credentials.kind(), "Vertex AI client ready");

        Self {
            url: config.generate_url(),
            model: config.model.clone(),
            credentials: Arc::new(credentials),
            client: builder.build().unwrap_or_default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[async_trait]
impl ModelClient for VertexClient {
    async fn generate(&self, system_instruction: &str, parts: &[Part]) -> GenzResult<String> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![WirePart::Text {
                    text: system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: parts.iter().map(WirePart::from).collect(),
            }],
        };

        debug!(model = %self.model, parts = parts.len(), "Calling Vertex AI generateContent");
        let started = Instant::now();

        let mut call = self.client.post(&self.url).json(&request);
        if let Some(token) = self.credentials.bearer_token().await? {
            call = call.bearer_auth(token);
        }

        let response = call
            .send()
            .await
            .map_err(|e| GenzError::model(format!("Failed to reach Vertex AI: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenzError::model(format!(
                "Vertex AI error (HTTP {}): {}",
                status,
                body.trim()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenzError::model(format!("Failed to parse Vertex AI response: {}", e)))?;

        let text = extract_text(body)?;
        info!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "Vertex AI response received"
        );
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Join the text parts of the first candidate.
fn extract_text(body: GenerateContentResponse) -> GenzResult<String> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenzError::model(format!("Request blocked by the model: {}", reason)));
    }

    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(GenzError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode, Uri},
        response::IntoResponse,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Recorded {
        path: String,
        authorization: Option<String>,
        body: Value,
    }

    /// Start a fake prediction service that answers every POST with `reply`.
    async fn fake_vertex(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Recorded>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorder = calls.clone();

        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                recorder.lock().unwrap().push(Recorded {
                    path: uri.path().to_string(),
                    authorization: headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from),
                    body,
                });
                (status, Json(reply)).into_response()
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), calls)
    }

    fn config_for(endpoint: &str) -> GenzConfig {
        GenzConfig {
            endpoint: Some(endpoint.to_string()),
            access_token: Some("test-token".to_string()),
            ..GenzConfig::default()
        }
    }

    fn candidate(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
    }

    #[tokio::test]
    async fn test_generate_sends_instruction_and_parts() {
        let (endpoint, calls) = fake_vertex(StatusCode::OK, candidate("  Badge: TRUE  ")).await;
        let client = VertexClient::new(&config_for(&endpoint));

        let parts = vec![
            Part::Binary {
                bytes: b"hello".to_vec(),
                mime_type: "text/plain".to_string(),
            },
            Part::Text("Is this true?".to_string()),
        ];
        let text = client.generate("Be precise.", &parts).await.unwrap();
        assert_eq!(text, "Badge: TRUE");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(
            call.path,
            "/v1/projects/genzfact/locations/us-central1/publishers/google/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(call.authorization.as_deref(), Some("Bearer test-token"));
        assert_eq!(call.body["systemInstruction"]["parts"][0]["text"], "Be precise.");
        assert_eq!(call.body["contents"][0]["role"], "user");

        let sent = &call.body["contents"][0]["parts"];
        assert_eq!(sent[0]["inlineData"]["mimeType"], "text/plain");
        assert_eq!(sent[0]["inlineData"]["data"], "aGVsbG8=");
        assert_eq!(sent[1]["text"], "Is this true?");
    }

    #[tokio::test]
    async fn test_custom_endpoint_without_token_sends_no_authorization() {
        let (endpoint, calls) = fake_vertex(StatusCode::OK, candidate("Badge: false")).await;
        let config = GenzConfig {
            endpoint: Some(endpoint),
            ..GenzConfig::default()
        };
        let client = VertexClient::new(&config);
        assert!(matches!(client.credentials(), Credentials::Anonymous));

        client.generate("x", &[Part::Text("q".into())]).await.unwrap();
        assert_eq!(calls.lock().unwrap()[0].authorization, None);
    }

    #[tokio::test]
    async fn test_multiple_text_parts_are_joined() {
        let reply = json!({ "candidates": [{ "content": { "parts": [{ "text": "1. What" }, { "text": " is it?" }] } }] });
        let (endpoint, _) = fake_vertex(StatusCode::OK, reply).await;
        let client = VertexClient::new(&config_for(&endpoint));

        let text = client.generate("x", &[Part::Text("q".into())]).await.unwrap();
        assert_eq!(text, "1. What is it?");
    }

    #[tokio::test]
    async fn test_http_error_carries_description() {
        let reply = json!({ "error": { "code": 429, "message": "Quota exceeded" } });
        let (endpoint, _) = fake_vertex(StatusCode::TOO_MANY_REQUESTS, reply).await;
        let client = VertexClient::new(&config_for(&endpoint));

        let err = client.generate("x", &[Part::Text("q".into())]).await.unwrap_err();
        assert!(matches!(err, GenzError::Model(_)));
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("Quota exceeded"));
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let reply = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let (endpoint, _) = fake_vertex(StatusCode::OK, reply).await;
        let client = VertexClient::new(&config_for(&endpoint));

        let err = client.generate("x", &[Part::Text("q".into())]).await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let (endpoint, _) = fake_vertex(StatusCode::OK, json!({ "candidates": [] })).await;
        let client = VertexClient::new(&config_for(&endpoint));

        let err = client.generate("x", &[Part::Text("q".into())]).await.unwrap_err();
        assert!(matches!(err, GenzError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_model_error() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = VertexClient::new(&config_for(&format!("http://{}", addr)));
        let err = client.generate("x", &[Part::Text("q".into())]).await.unwrap_err();
        assert!(matches!(err, GenzError::Model(_)));
        assert!(err.to_string().starts_with("Failed to reach Vertex AI"));
    }
}
