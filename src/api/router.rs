//! History API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Context extension → 2. CORS → 3. Audit logger → 4. Cache-Control
//! → 5. Clinician validator (protected routes only)

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the history API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn history_api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/patients", get(endpoints::patients::list))
        .route("/patients/:id/history", get(endpoints::history::detail))
        .route("/queue", get(endpoints::queue::daily))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(
            middleware::clinician::require_clinician,
        ));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", protected.merge(public))
        .fallback(endpoints::not_found)
        // Patient data must never sit in intermediary caches
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(cors)
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::api::types::CLINICIAN_HEADER;
    use crate::db::repository::seed;
    use crate::history::{ClinicSource, SqliteSource};
    use crate::models::PatientRef;

    /// Core state over a seeded temp database. The tempdir guard must be
    /// kept alive for the duration of the test.
    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");
        let source: Arc<dyn ClinicSource> = Arc::new(SqliteSource::open(&path).unwrap());
        let conn = crate::db::open_connection(&path).unwrap();

        seed::doctor(&conn, "d1", "Dr. Ana");
        seed::doctor(&conn, "d2", "Dr. Bruno");
        seed::patient(&conn, "p1", "Maria");
        seed::patient(&conn, "p2", "Joana");
        let p1 = PatientRef::Registered("p1".into());
        let p2 = PatientRef::Registered("p2".into());
        seed::appointment(&conn, "a1", &p1, "d1", Some("2026-10-01T09:00:00Z"));
        seed::consultation(&conn, "c1", &p1, "d1", Some("a1"), Some("Gripe"));
        seed::appointment(&conn, "a2", &p2, "d2", Some("2026-10-02T09:00:00Z"));
        seed::queue_entry(&conn, "q1", &p1, "d1", Some("a1"), "2026-10-19", Some("2026-10-19T08:00:00Z"));
        seed::queue_entry(&conn, "q2", &p1, "d1", Some("a1"), "2026-10-19", Some("2026-10-19T08:05:00Z"));

        (Arc::new(CoreState::new(source)), dir)
    }

    fn make_request(uri: &str, clinician: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(id) = clinician {
            builder = builder.header(CLINICIAN_HEADER, id);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app.oneshot(make_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn history_requires_clinician_header() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app
            .oneshot(make_request("/api/patients/p1/history", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn history_returns_merged_timeline_for_owner() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app
            .oneshot(make_request("/api/patients/p1/history", Some("d1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
        assert!(response.headers().contains_key("X-Request-Id"));

        let json = response_json(response).await;
        assert_eq!(json["access"], "owned_only");
        let consultations = json["consultations"].as_array().unwrap();
        assert_eq!(consultations.len(), 1);
        assert_eq!(consultations[0]["diagnosis"], "Gripe");
        assert_eq!(json["summary"]["consultations_count"], 1);
    }

    #[tokio::test]
    async fn history_of_foreign_patient_is_forbidden() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app
            .oneshot(make_request("/api/patients/p2/history", Some("d1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "ACCESS_DENIED");
    }

    #[tokio::test]
    async fn patient_list_marks_access_per_row() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app
            .oneshot(make_request("/api/patients?include_summary=true", Some("d1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["meta"]["page"], 1);
        assert_eq!(json["meta"]["per_page"], 20);

        let rows = json["data"].as_array().unwrap();
        let p1 = rows.iter().find(|r| r["id"] == "p1").unwrap();
        let p2 = rows.iter().find(|r| r["id"] == "p2").unwrap();
        assert_eq!(p1["access"], "owned_only");
        assert_eq!(p1["summary"]["consultations_count"], 1);
        assert_eq!(p2["access"], "no_access");
        assert!(p2["summary"].is_null());
    }

    #[tokio::test]
    async fn queue_is_deduplicated_per_appointment() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app
            .oneshot(make_request("/api/queue?date=2026-10-19", Some("d1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["id"], "q1");
    }

    #[tokio::test]
    async fn queue_rejects_malformed_date() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app
            .oneshot(make_request("/api/queue?date=tomorrow", Some("d1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_returns_json_404() {
        let (core, _dir) = test_core();
        let app = history_api_router(core);

        let response = app
            .oneshot(make_request("/api/nonexistent", Some("d1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn rejected_requests_are_audited() {
        let (core, _dir) = test_core();
        let app = history_api_router(core.clone());

        let response = app
            .oneshot(make_request("/api/patients", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let entries = core.audit_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, 401);
        assert_eq!(entries[0].action, "GET /api/patients");
        assert!(entries[0].clinician_id.is_none());
    }
}
