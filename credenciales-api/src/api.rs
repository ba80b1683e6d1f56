pub use crate::credenciales::{
    create_credencial, delete_credencial_by_id, delete_credenciales_by_curp, get_credencial_by_id,
    get_credenciales_by_curp, list_credenciales, update_credencial,
};

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub async fn health_handler() -> impl IntoResponse {
    // Simple readiness/health endpoint. Keep it lightweight.
    Json(json!({ "status": "ok" }))
}

/// Assemble the application router. Static segments (`id`, `curp`) win
/// over the `:id` capture at the same position, so the three lookup
/// routes coexist with update/delete by id.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body = state.max_request_body_bytes;
    Router::new()
        .route(
            "/credenciales",
            get(list_credenciales).post(create_credencial),
        )
        .route("/credenciales/id/:id", get(get_credencial_by_id))
        .route(
            "/credenciales/curp/:curp",
            get(get_credenciales_by_curp).delete(delete_credenciales_by_curp),
        )
        .route(
            "/credenciales/:id",
            put(update_credencial).delete(delete_credencial_by_id),
        )
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    fn test_state(vars: &[(&str, &str)]) -> Arc<AppState> {
        let base = [
            ("DB_HOST", "127.0.0.1"),
            ("DB_USER", "root"),
            ("DB_PASS", "secret"),
            ("DB_NAME", "credenciales_test"),
        ];
        let vars: Vec<(&str, &str)> = base.iter().chain(vars.iter()).copied().collect();
        let cfg = Config::from_lookup(move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .expect("config");
        Arc::new(AppState::from_config(&cfg))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = router(test_state(&[]));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let resp = app.oneshot(req).await.expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = hyper::body::to_bytes(resp.into_body()).await.expect("bytes");
        let v: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(v["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = router(test_state(&[]));
        let req = Request::builder()
            .uri("/no-such-route")
            .body(Body::empty())
            .expect("request");
        let resp = app.oneshot(req).await.expect("response");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn request_body_size_limit_is_enforced() {
        const TEST_SIZE_LIMIT: usize = 64;

        let app = router(test_state(&[("MAX_REQUEST_BODY_BYTES", "64")]));
        let oversized = format!(
            r#"{{"clave_ine":"{}","curp":"CURP01","IDpersona":"P1"}}"#,
            "x".repeat(TEST_SIZE_LIMIT * 2)
        );
        assert!(oversized.len() > TEST_SIZE_LIMIT);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/credenciales")
            .header("content-type", "application/json")
            .body(Body::from(oversized))
            .expect("request");
        let resp = app.oneshot(req).await.expect("response");
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
