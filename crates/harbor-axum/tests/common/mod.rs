//! Shared fixtures for harbor-axum integration tests.

use std::fs;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use harbor_core::{ServerConfig, StaticFilesConfig};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

/// Body of `/data.bin`: bytes 0..=255 repeated to 1000 bytes.
pub fn data_bytes() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 256) as u8).collect()
}

pub const STYLE: &str = "body { color: red; }\n";

pub struct TestSite {
    pub dir: TempDir,
    pub app: Router,
}

/// A document root with a binary file, a stylesheet large enough to be
/// compressed and a script the application should see.
pub fn site_with(configure: impl FnOnce(&mut StaticFilesConfig)) -> TestSite {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.bin"), data_bytes()).unwrap();
    fs::write(dir.path().join("style.css"), STYLE.repeat(200)).unwrap();
    fs::write(dir.path().join("index.php"), "<?php echo 1;").unwrap();

    let mut config = ServerConfig {
        static_files: StaticFilesConfig::serving(dir.path()),
        ..ServerConfig::default()
    };
    configure(&mut config.static_files);
    let app = harbor_axum::router(&config).unwrap();
    TestSite { dir, app }
}

pub fn site() -> TestSite {
    site_with(|_| {})
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
