//! JSON analysis endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use base64::Engine;
use genzfact_core::{analysis::failure_message, Badge, GenzError, Query, Upload};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: Option<String>,
    pub file: Option<FilePayload>,
}

#[derive(Debug, Deserialize)]
pub struct FilePayload {
    pub name: String,
    pub mime_type: Option<String>,
    pub data_base64: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub verdict: Option<Badge>,
    pub badges: Vec<Badge>,
    pub html: String,
    pub raw_text: String,
    pub elapsed_ms: u64,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// POST /api/analyze - Run one analysis from a JSON body.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| api_error(e.status(), e.body_text()))?;

    let upload = match req.file {
        Some(file) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(file.data_base64.trim())
                .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid base64 file data: {}", e)))?;
            Some(Upload::new(file.name, file.mime_type.as_deref(), bytes))
        }
        None => None,
    };

    let query = Query::new(req.text, upload);
    let report = state.analyzer.analyze(&query).await.map_err(|e| match e {
        e if e.is_input_error() => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        e @ GenzError::Config(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, failure_message(&e)),
        e => api_error(StatusCode::BAD_GATEWAY, failure_message(&e)),
    })?;

    Ok(Json(AnalyzeResponse {
        verdict: report.verdict(),
        badges: report.badges,
        html: report.html,
        raw_text: report.raw_text,
        elapsed_ms: report.elapsed_ms,
    }))
}

#[cfg(test)]
mod tests {
    use crate::{create_router, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use genzfact_core::{model::fake::FakeModel, Analyzer, GenzConfig, Part};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(model: Arc<FakeModel>) -> Router {
        let analyzer = Analyzer::new(model, Arc::new(GenzConfig::default()));
        create_router(AppState::new(analyzer))
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::post("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_text_analysis() {
        let model = Arc::new(FakeModel::replying("- Badge: TRUE\n- Badge: mislead"));
        let (status, body) = post_json(app(model), json!({ "text": "Water is wet" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"], "TRUE");
        assert_eq!(body["badges"], json!(["TRUE", "MISLEAD"]));
        assert!(body["html"].as_str().unwrap().contains("#4CAF50"));
        assert_eq!(body["raw_text"], "- Badge: TRUE\n- Badge: mislead");
    }

    #[tokio::test]
    async fn test_file_payload_is_decoded() {
        let model = Arc::new(FakeModel::replying("Badge: unverified"));
        let request = json!({
            "file": { "name": "note.txt", "data_base64": "aGVsbG8=" }
        });
        let (status, body) = post_json(app(model.clone()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"], "UNVERIFIED");
        assert_eq!(
            model.calls()[0].parts,
            vec![Part::Binary {
                bytes: b"hello".to_vec(),
                mime_type: "text/plain".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_request_is_bad_request() {
        let model = Arc::new(FakeModel::replying("Badge: true"));
        let (status, body) = post_json(app(model.clone()), json!({ "text": "" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please provide some text or upload a file to analyze.");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_base64_is_bad_request() {
        let model = Arc::new(FakeModel::replying("Badge: true"));
        let request = json!({ "file": { "name": "a.pdf", "data_base64": "***" } });
        let (status, _) = post_json(app(model.clone()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_gets_error_body() {
        let model = Arc::new(FakeModel::replying("Badge: true"));
        let request = Request::post("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"text\": "))
            .unwrap();
        let response = app(model.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_bad_gateway() {
        let model = Arc::new(FakeModel::failing("Vertex AI error (HTTP 503): unavailable"));
        let (status, body) = post_json(app(model), json!({ "text": "claim" })).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["error"],
            "An error occurred during analysis: Vertex AI error (HTTP 503): unavailable"
        );
        assert!(body.get("html").is_none());
    }
}
