//! Route definitions and router construction.

use axum::routing::get;
use axum::{Json, Router};
use harbor_core::{ConfigError, ServerConfig};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::HttpError;
use crate::runner::RequestHandlerRunner;

/// The default application: a health check and JSON 404s.
pub fn app_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(not_found)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> HttpError {
    HttpError::not_found()
}

/// Full router for `config`: the runner in front of [`app_routes`] when
/// static files are enabled, with request tracing outermost.
pub fn router(config: &ServerConfig) -> Result<Router, ConfigError> {
    let app = app_routes();
    let app = match RequestHandlerRunner::from_config(&config.static_files)? {
        Some(runner) => {
            info!(root = %runner.site().root().path().display(), "serving static files");
            runner.wrap(app)
        }
        None => app,
    };
    Ok(app.layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn health_is_ok_json() {
        let response = app_routes()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let response = app_routes()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], 404);
    }

    #[test]
    fn router_rejects_invalid_static_config() {
        let mut config = ServerConfig::default();
        config.static_files.enabled = true;
        config.static_files.document_root = "/nonexistent/harbor/root".into();
        assert!(matches!(
            router(&config),
            Err(ConfigError::InvalidDocumentRoot { .. })
        ));
    }
}
