//! Static resource pipeline for harbor.
//!
//! Given a request and the file its URL maps to under the document root,
//! the pipeline decides what to send: the whole file, part of it, a 304,
//! 404, 412 or 416, or nothing at all (the request is declined and goes to
//! the application). Decisions are plain values; reading and sending the
//! bytes is left to the server adapter.
//!
//! ```text
//! ResourceRequest ──► DocumentRoot::resolve ──► CandidateFile
//!                                                    │
//!             ┌──────────────────────────────────────┘
//!             ▼
//!   existence ─► method ─► content-type ─► conditional ─► range ─► compression ─► serve
//!             │
//!             ▼
//!   ResourceDecision (+ Cache-Control / Last-Modified / ETag)
//! ```

#![deny(unused_crate_dependencies)]

pub mod cache;
pub mod candidate;
pub mod date;
pub mod decision;
pub mod encoding;
pub mod etag;
pub mod mime;
pub mod multipart;
pub mod pipeline;
pub mod range;
pub mod request;
pub mod units;

pub use cache::CachePolicy;
pub use candidate::{CandidateFile, DocumentRoot};
pub use decision::{ByteSource, ResourceDecision};
pub use encoding::ContentEncoding;
pub use etag::EntityTag;
pub use multipart::MultipartLayout;
pub use pipeline::{MissingResourcePolicy, Resolution, StaticResourcePipeline, StaticSite};
pub use range::{ByteRange, RangeSpec};
pub use request::ResourceRequest;
pub use units::{Continuation, ResourceUnit, UnitOutcome};
