pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::history::handlers as history;
use crate::state::AppState;

/// Upper bound for resume uploads.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis/job-match", post(analysis::handle_job_match))
        .route("/api/v1/analysis/ats-score", post(analysis::handle_ats_score))
        .route("/api/v1/analysis/optimize", post(analysis::handle_optimize))
        .route(
            "/api/v1/resumes/extract-text",
            post(analysis::handle_extract_text).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // History API
        .route(
            "/api/v1/history",
            get(history::handle_list_history).post(history::handle_create_history),
        )
        .route("/api/v1/history/events", get(history::handle_history_events))
        .route("/api/v1/history/:id", delete(history::handle_delete_history))
        .route("/api/v1/dashboard", get(history::handle_dashboard))
        .route(
            "/api/v1/profile",
            get(history::handle_get_profile).put(history::handle_update_profile),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::analysis::flows::AnalysisFlows;
    use crate::analysis::testing::ScriptedModel;
    use crate::history::feed::LocalChangeFeed;
    use crate::history::gateway::PersistenceGateway;
    use crate::history::memory::MemoryHistoryStore;
    use crate::schema::SchemaRegistry;

    fn app(model: Arc<ScriptedModel>) -> Router {
        let state = AppState {
            flows: Arc::new(AnalysisFlows::new(
                model,
                Arc::new(SchemaRegistry::builtin()),
                Duration::from_secs(60),
            )),
            history: Arc::new(PersistenceGateway::new(
                Arc::new(MemoryHistoryStore::new()),
                Arc::new(LocalChangeFeed::new()),
                Duration::from_secs(300),
            )),
        };
        build_router(state)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(ScriptedModel::replying(Vec::<String>::new())), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "talenttrace-api");
    }

    #[tokio::test]
    async fn test_job_match_success() {
        let model = ScriptedModel::replying([
            r#"```json
{"matchScore": 82, "matchedSkills": ["React"], "missingSkills": ["GraphQL"]}
```"#,
        ]);
        let app = app(model);
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/analysis/job-match",
                json!({"resumeText": "React, TypeScript", "jobDescriptionText": "React, GraphQL"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"matchScore": 82.0, "matchedSkills": ["React"], "missingSkills": ["GraphQL"]})
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_400_without_model_call() {
        let model = ScriptedModel::replying(Vec::<String>::new());
        let app = app(model.clone());
        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/analysis/ats-score", json!({"resumeText": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");

        let (status, _) = send(&app, json_request("POST", "/api/v1/analysis/optimize", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_null_and_wrong_type_fields_are_400_invalid_input() {
        let model = ScriptedModel::replying(Vec::<String>::new());
        let app = app(model.clone());

        for resume_text in [Value::Null, json!(5), json!(["React"])] {
            let (status, body) = send(
                &app,
                json_request(
                    "POST",
                    "/api/v1/analysis/job-match",
                    json!({"resumeText": resume_text, "jobDescriptionText": "React developer"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(body["error"]["code"], "INVALID_INPUT");
            assert!(body["error"]["message"].as_str().unwrap().contains("resumeText"));
        }

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/analysis/optimize", json!("just a string")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_body_uses_error_envelope() {
        let model = ScriptedModel::replying(Vec::<String>::new());
        let app = app(model.clone());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analysis/ats-score")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"resumeText\": "))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/history", json!({"userId": "not-a-uuid", "kind": "ats_scan"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_reply_is_502_with_generic_message() {
        let model = ScriptedModel::replying([
            r#"{"matchScore": 150, "matchedSkills": [], "missingSkills": []}"#,
        ]);
        let (status, body) = send(
            &app(model),
            json_request(
                "POST",
                "/api/v1/analysis/job-match",
                json!({"resumeText": "resume", "jobDescriptionText": "job"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_FAILED");
        assert!(!body["error"]["message"].as_str().unwrap().contains("150"));
    }

    #[tokio::test]
    async fn test_history_lifecycle() {
        let app = app(ScriptedModel::replying(Vec::<String>::new()));
        let user = Uuid::new_v4();

        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/history",
                json!({"userId": user, "kind": "ats_scan", "title": "Backend CV", "score": 71}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Backend CV");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, list) = send(&app, get_request(&format!("/api/v1/history?userId={user}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, dashboard) = send(&app, get_request(&format!("/api/v1/dashboard?userId={user}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["totalAnalyses"], 1);
        assert_eq!(dashboard["recentScore"], 71.0);

        let delete_uri = format!("/api/v1/history/{id}?userId={user}");
        let delete = || Request::builder().method("DELETE").uri(&delete_uri).body(Body::empty()).unwrap();
        let (status, _) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_history_requires_user_id() {
        let app = app(ScriptedModel::replying(Vec::<String>::new()));
        let response = app.oneshot(get_request("/api/v1/history")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let app = app(ScriptedModel::replying(Vec::<String>::new()));
        let user = Uuid::new_v4();
        let uri = format!("/api/v1/profile?userId={user}");

        let (status, _) = send(&app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, profile) = send(
            &app,
            json_request(
                "PUT",
                "/api/v1/profile",
                json!({"userId": user, "displayName": "Jane", "professionalTitle": "Staff Engineer"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["displayName"], "Jane");

        let (status, profile) = send(&app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["professionalTitle"], "Staff Engineer");
    }

    #[tokio::test]
    async fn test_extract_text_from_multipart_upload() {
        let app = app(ScriptedModel::replying(Vec::<String>::new()));
        let body = "--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            Jane Doe\nRust engineer\n\r\n\
            --XBOUNDARY--\r\n";
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/extract-text")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resumeText"], "Jane Doe\nRust engineer");
    }

    #[tokio::test]
    async fn test_history_events_is_event_stream() {
        let app = app(ScriptedModel::replying(Vec::<String>::new()));
        let response = app
            .oneshot(get_request(&format!("/api/v1/history/events?userId={}", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
    }
}
