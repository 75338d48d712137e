//! Pipeline output.

use std::path::{Path, PathBuf};

use http::{HeaderMap, StatusCode};

use crate::encoding::ContentEncoding;
use crate::multipart::MultipartLayout;
use crate::range::ByteRange;

/// Where the body of a 200/206 comes from. Nothing is read until the
/// runner sends the response, and never for HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSource {
    path: PathBuf,
    size: u64,
    encoding: Option<(ContentEncoding, u32)>,
    include_body: bool,
}

impl ByteSource {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            encoding: None,
            include_body: true,
        }
    }

    /// Send the file compressed with `encoding` at `level`.
    #[must_use]
    pub fn encoded(mut self, encoding: ContentEncoding, level: u32) -> Self {
        self.encoding = Some((encoding, level));
        self
    }

    /// Headers only (HEAD).
    #[must_use]
    pub fn headers_only(mut self) -> Self {
        self.include_body = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file on disk when the decision was made.
    pub const fn size(&self) -> u64 {
        self.size
    }

    pub fn encoding(&self) -> Option<ContentEncoding> {
        self.encoding.map(|(encoding, _)| encoding)
    }

    pub fn compression_level(&self) -> Option<u32> {
        self.encoding.map(|(_, level)| level)
    }

    pub const fn include_body(&self) -> bool {
        self.include_body
    }
}

/// What to do with a request, as decided by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceDecision {
    /// Not a static resource; hand the request to the application.
    Decline,
    /// No servable file at this path.
    NotFound,
    NotModified {
        headers: HeaderMap,
    },
    PreconditionFailed {
        headers: HeaderMap,
    },
    RangeNotSatisfiable {
        headers: HeaderMap,
    },
    FullContent {
        headers: HeaderMap,
        source: ByteSource,
    },
    PartialContent {
        ranges: Vec<ByteRange>,
        headers: HeaderMap,
        source: ByteSource,
        /// Present when more than one range is served.
        multipart: Option<MultipartLayout>,
    },
}

impl ResourceDecision {
    /// HTTP status, or `None` for [`ResourceDecision::Decline`].
    pub const fn status(&self) -> Option<StatusCode> {
        Some(match self {
            Self::Decline => return None,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotModified { .. } => StatusCode::NOT_MODIFIED,
            Self::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::FullContent { .. } => StatusCode::OK,
            Self::PartialContent { .. } => StatusCode::PARTIAL_CONTENT,
        })
    }

    pub const fn is_decline(&self) -> bool {
        matches!(self, Self::Decline)
    }

    pub const fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Decline | Self::NotFound => None,
            Self::NotModified { headers }
            | Self::PreconditionFailed { headers }
            | Self::RangeNotSatisfiable { headers }
            | Self::FullContent { headers, .. }
            | Self::PartialContent { headers, .. } => Some(headers),
        }
    }

    pub const fn headers_mut(&mut self) -> Option<&mut HeaderMap> {
        match self {
            Self::Decline | Self::NotFound => None,
            Self::NotModified { headers }
            | Self::PreconditionFailed { headers }
            | Self::RangeNotSatisfiable { headers }
            | Self::FullContent { headers, .. }
            | Self::PartialContent { headers, .. } => Some(headers),
        }
    }

    /// Byte source for 200/206 decisions.
    pub const fn source(&self) -> Option<&ByteSource> {
        match self {
            Self::FullContent { source, .. } | Self::PartialContent { source, .. } => Some(source),
            _ => None,
        }
    }
}
