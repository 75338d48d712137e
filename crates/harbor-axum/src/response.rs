//! Turning a [`ResourceDecision`] into an HTTP response.
//!
//! Bodies are streamed from the file; only compressed bodies are built in
//! memory (on the blocking pool). The file is opened before the status line
//! is committed, so a file that vanished after the decision still gets a
//! clean 404.

use std::io::{self, SeekFrom};
use std::path::Path;

use async_stream::try_stream;
use axum::body::Body;
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use harbor_core::config::DEFAULT_COMPRESSION_LEVEL;
use harbor_static::{ByteRange, ByteSource, MultipartLayout, ResourceDecision};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

use crate::error::HttpError;

/// Render a decision. [`ResourceDecision::Decline`] has no response of its
/// own and renders as 404.
pub async fn render(decision: ResourceDecision) -> Response {
    match decision {
        ResourceDecision::Decline | ResourceDecision::NotFound => {
            HttpError::not_found().into_response()
        }
        ResourceDecision::NotModified { headers } => empty(StatusCode::NOT_MODIFIED, headers),
        ResourceDecision::PreconditionFailed { headers } => {
            empty(StatusCode::PRECONDITION_FAILED, headers)
        }
        ResourceDecision::RangeNotSatisfiable { headers } => {
            empty(StatusCode::RANGE_NOT_SATISFIABLE, headers)
        }
        ResourceDecision::FullContent { headers, source } => full(headers, source).await,
        ResourceDecision::PartialContent {
            ranges,
            headers,
            source,
            multipart,
        } => partial(headers, &source, ranges, multipart).await,
    }
}

fn respond(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn empty(status: StatusCode, headers: HeaderMap) -> Response {
    respond(status, headers, Body::empty())
}

async fn full(mut headers: HeaderMap, source: ByteSource) -> Response {
    if !source.include_body() {
        return empty(StatusCode::OK, headers);
    }

    let body = match source.encoding() {
        Some(encoding) => {
            let level = source
                .compression_level()
                .unwrap_or(DEFAULT_COMPRESSION_LEVEL);
            let path = source.path().to_path_buf();
            let encoded =
                tokio::task::spawn_blocking(move || encoding.encode_file(&path, level)).await;
            match encoded {
                Ok(Ok(bytes)) => {
                    headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                    Body::from(bytes)
                }
                Ok(Err(e)) => return file_error(source.path(), &e),
                Err(e) => {
                    error!(error = %e, "compression task failed");
                    return HttpError::Internal("failed to read resource".into()).into_response();
                }
            }
        }
        None => match open_at(source.path(), 0).await {
            Ok(file) => Body::from_stream(ReaderStream::new(file.take(source.size()))),
            Err(e) => return file_error(source.path(), &e),
        },
    };

    respond(StatusCode::OK, headers, body)
}

async fn partial(
    headers: HeaderMap,
    source: &ByteSource,
    ranges: Vec<ByteRange>,
    multipart: Option<MultipartLayout>,
) -> Response {
    let Some(first) = ranges.first().copied() else {
        return HttpError::Internal("empty range set".into()).into_response();
    };

    let file = match open_at(source.path(), first.start).await {
        Ok(file) => file,
        Err(e) => return file_error(source.path(), &e),
    };

    if !source.include_body() {
        return empty(StatusCode::PARTIAL_CONTENT, headers);
    }

    let body = match multipart {
        None => Body::from_stream(ReaderStream::new(file.take(first.len()))),
        Some(layout) => Body::from_stream(multipart_body(file, ranges, layout)),
    };

    respond(StatusCode::PARTIAL_CONTENT, headers, body)
}

async fn open_at(path: &Path, offset: u64) -> io::Result<File> {
    let mut file = File::open(path).await?;
    if offset > 0 {
        file.seek(SeekFrom::Start(offset)).await?;
    }
    Ok(file)
}

fn multipart_body(
    mut file: File,
    ranges: Vec<ByteRange>,
    layout: MultipartLayout,
) -> impl Stream<Item = io::Result<Bytes>> {
    try_stream! {
        for (index, range) in ranges.iter().enumerate() {
            if let Some(header) = layout.part_header(index) {
                yield Bytes::copy_from_slice(header.as_bytes());
            }
            file.seek(SeekFrom::Start(range.start)).await?;
            let mut part = ReaderStream::new((&mut file).take(range.len()));
            while let Some(chunk) = part.next().await {
                yield chunk?;
            }
        }
        yield Bytes::copy_from_slice(layout.closing().as_bytes());
    }
}

fn file_error(path: &Path, error: &io::Error) -> Response {
    if error.kind() == io::ErrorKind::NotFound {
        warn!(path = %path.display(), "file vanished before it could be sent");
        return HttpError::not_found().into_response();
    }
    error!(path = %path.display(), error = %error, "failed to read static file");
    HttpError::Internal("failed to read resource".into()).into_response()
}
