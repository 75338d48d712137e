//! Request handler runner: static resources first, the application second.
//!
//! Every request is offered to the [`StaticSite`]. A decline hands it to
//! the wrapped router untouched; any other decision is rendered here and
//! the application never sees the request.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use harbor_core::{ConfigError, StaticFilesConfig};
use harbor_static::{ResourceRequest, StaticSite};
use tracing::{debug, error};

use crate::error::HttpError;
use crate::response::render;

/// Bridges the static pipeline and an application router.
#[derive(Debug, Clone)]
pub struct RequestHandlerRunner {
    site: Arc<StaticSite>,
}

impl RequestHandlerRunner {
    pub fn new(site: StaticSite) -> Self {
        Self {
            site: Arc::new(site),
        }
    }

    /// Runner for `config`, or `None` when static files are disabled.
    pub fn from_config(config: &StaticFilesConfig) -> Result<Option<Self>, ConfigError> {
        if !config.enabled {
            return Ok(None);
        }
        StaticSite::from_config(config).map(|site| Some(Self::new(site)))
    }

    pub fn site(&self) -> &StaticSite {
        &self.site
    }

    /// Put the runner in front of `app`.
    pub fn wrap(self, app: Router) -> Router {
        app.layer(middleware::from_fn_with_state(self, run))
    }

    /// Decide for `request`: `Ok` with a response, or `Err` with the
    /// untouched request when the application should handle it.
    pub async fn handle(&self, request: Request) -> Result<Response, Request> {
        let resource = ResourceRequest::new(request.method().clone(), request.uri().path())
            .with_headers(request.headers().clone());

        let site = Arc::clone(&self.site);
        let resolution = match tokio::task::spawn_blocking(move || site.resolve(&resource)).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!(error = %e, "static resolution task failed");
                return Ok(HttpError::Internal("failed to resolve resource".into()).into_response());
            }
        };

        if resolution.decision.is_decline() {
            return Err(request);
        }

        debug!(
            path = %request.uri().path(),
            status = ?resolution.decision.status(),
            "static decision"
        );
        Ok(render(resolution.decision).await)
    }
}

/// Middleware entry point.
pub async fn run(
    State(runner): State<RequestHandlerRunner>,
    request: Request,
    next: Next,
) -> Response {
    match runner.handle(request).await {
        Ok(response) => response,
        Err(request) => next.run(request).await,
    }
}
