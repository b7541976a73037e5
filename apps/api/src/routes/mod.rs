pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::{self, middleware::require_auth};
use crate::batch;
use crate::descriptions::handlers as descriptions;
use crate::review::handlers as review;
use crate::reviewers::handlers as reviewers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Reachable without a bearer token. The approval routes are guarded by the
    // token in the path instead.
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/login", post(auth::handlers::handle_login))
        .route("/api/job-profiles", get(descriptions::handle_list_profiles))
        .route(
            "/api/job-description/pending/:token",
            get(descriptions::handle_get_pending),
        )
        .route(
            "/api/job-description/approve/:token",
            post(descriptions::handle_approve_token),
        );

    let protected = Router::new()
        // Descriptions
        .route(
            "/api/job-description/:id",
            get(descriptions::handle_get_description).post(descriptions::handle_save_description),
        )
        .route(
            "/api/generate-job-description",
            post(descriptions::handle_generate_or_fetch),
        )
        .route(
            "/api/job-description/by-title",
            post(descriptions::handle_save_by_title),
        )
        .route(
            "/api/job-description/send-link",
            post(descriptions::handle_send_link),
        )
        // Review screens
        .route("/api/all-job-profiles", get(review::handle_all_profiles))
        .route(
            "/api/internal/all-job-profiles",
            get(review::handle_internal_profiles),
        )
        .route(
            "/api/external/all-job-profiles",
            get(review::handle_external_profiles),
        )
        .route("/api/job-profile/:name", get(review::handle_get_profile))
        .route("/api/job-profile-approvals", get(review::handle_approvals))
        .route("/api/internal-review/save", post(review::handle_internal_save))
        .route(
            "/api/internal-review/approve",
            post(review::handle_internal_approve),
        )
        .route("/api/external-review/save", post(review::handle_external_save))
        .route(
            "/api/external-review/approve",
            post(review::handle_external_approve),
        )
        .route("/api/admin-review/update", post(review::handle_admin_update))
        // Reviewer registry
        .route("/api/reviewers-list", get(reviewers::handle_reviewers_list))
        .route(
            "/api/recuriter_reviewers-list",
            get(reviewers::handle_recruiter_list),
        )
        .route("/api/admin-reviewers/add", post(reviewers::handle_add_reviewer))
        // Spreadsheet batch
        .route(
            "/upload",
            post(batch::handlers::handle_upload)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::Duration;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::jwt::JwtAuth;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedCompleter;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/jobdesk_test".to_string(),
            openai_api_key: "sk-test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_minutes: 30,
            port: 0,
            rust_log: "info".to_string(),
            export_dir: "exports/job_profiles".into(),
            batch_output_dir: "processed".into(),
            max_upload_bytes: 4096,
            approval_base_url: "http://localhost:5174/approve-job-description".to_string(),
            pending_token_ttl_days: 7,
            management_level_id: "MANAGEMENT_LEVEL-3-30".to_string(),
            job_family_id: "EMPLOYEE_RELATIONS".to_string(),
            llm_max_attempts: 1,
            llm_backoff_ms: 0,
        }
    }

    /// Router over a lazy pool: nothing here may reach the database.
    fn app() -> (Router, Arc<JwtAuth>) {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let jwt = Arc::new(JwtAuth::new(&config.jwt_secret, Duration::minutes(30)));
        let state = AppState {
            db,
            llm: Arc::new(ScriptedCompleter::constant("drafted")),
            config,
            jwt: jwt.clone(),
        };
        (build_router(state), jwt)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "jobdesk");
    }

    #[tokio::test]
    async fn test_protected_route_requires_bearer_token() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::get("/api/all-job-profiles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::post("/upload")
                    .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_validation() {
        let (app, jwt) = app();
        let token = jwt.issue("1").unwrap();
        let response = app
            .oneshot(
                Request::post("/api/generate-job-description")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"profileName": "  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "profileName is required");
    }

    #[tokio::test]
    async fn test_login_without_credentials_is_bad_request() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::post("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username": "hr"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Username and password are required"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_reported_as_json_error() {
        let (app, jwt) = app();
        let token = jwt.issue("1").unwrap();
        let response = app
            .oneshot(
                Request::post("/api/internal-review/save")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_numeric_profile_id_is_json_bad_request() {
        let (app, jwt) = app();
        let token = jwt.issue("1").unwrap();
        let response = app
            .oneshot(
                Request::get("/api/job-description/abc")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    fn upload_request(token: &str, file: &[u8]) -> Request<Body> {
        let mut body = b"--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"roles.xlsx\"\r\n\
            Content-Type: application/octet-stream\r\n\r\n"
            .to_vec();
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");

        Request::post("/upload")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_without_multipart_body_is_json_bad_request() {
        let (app, jwt) = app();
        let token = jwt.issue("1").unwrap();
        let response = app
            .oneshot(
                Request::post("/upload")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_over_configured_limit_is_413() {
        let (app, jwt) = app();
        let token = jwt.issue("1").unwrap();
        let response = app
            .oneshot(upload_request(&token, &[b'a'; 8192]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["error"], "Uploaded file is too large");
    }

    #[tokio::test]
    async fn test_upload_under_limit_reaches_spreadsheet_parsing() {
        let (app, jwt) = app();
        let token = jwt.issue("1").unwrap();
        let response = app
            .oneshot(upload_request(&token, b"not a workbook"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}
