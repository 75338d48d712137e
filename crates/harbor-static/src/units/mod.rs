//! Resource-decision units.
//!
//! Each unit inspects the request and the candidate file and either decides
//! the outcome or delegates to the units after it. Units share per-request
//! state through the [`Continuation`] they are handed.

mod compression;
mod conditional;
mod content_type;
mod existence;
mod method;
mod range;
mod serve;

pub use compression::Compression;
pub use conditional::ConditionalGet;
pub use content_type::ContentTypeFilter;
pub use existence::ExistenceCheck;
pub use method::MethodCheck;
pub use range::RangeRequest;
pub use serve::ServeFile;

use crate::candidate::CandidateFile;
use crate::decision::ResourceDecision;
use crate::encoding::ContentEncoding;
use crate::etag::EntityTag;
use crate::request::ResourceRequest;

/// MIME type used when an allowed extension has no known type.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// What a unit did with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Let the next unit decide.
    Delegate,
    /// Stop the chain with this decision.
    Decide(ResourceDecision),
}

/// One step of the static resource pipeline.
pub trait ResourceUnit: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        request: &ResourceRequest,
        candidate: &CandidateFile,
        next: &mut Continuation,
    ) -> UnitOutcome;
    /// Whether this unit could pick a different representation of
    /// `candidate` depending on `Accept-Encoding`, whatever unit decided.
    fn varies_by_encoding(&self, _candidate: &CandidateFile, _next: &Continuation) -> bool {
        false
    }
}

/// Per-request state handed down the chain.
#[derive(Debug, Default)]
pub struct Continuation {
    entity_tag: Option<EntityTag>,
    content_type: Option<&'static str>,
    encoding: Option<(ContentEncoding, u32)>,
    vary_encoding: bool,
}

impl Continuation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity tag of the candidate, computed on first use.
    pub fn entity_tag(&mut self, candidate: &CandidateFile) -> &EntityTag {
        self.entity_tag
            .get_or_insert_with(|| EntityTag::for_file(candidate))
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type.unwrap_or(FALLBACK_CONTENT_TYPE)
    }

    pub const fn set_content_type(&mut self, content_type: &'static str) {
        self.content_type = Some(content_type);
    }

    pub const fn encoding(&self) -> Option<(ContentEncoding, u32)> {
        self.encoding
    }

    pub const fn set_encoding(&mut self, encoding: ContentEncoding, level: u32) {
        self.encoding = Some((encoding, level));
    }

    /// Response varies by `Accept-Encoding`.
    pub const fn varies_by_encoding(&self) -> bool {
        self.vary_encoding
    }

    pub const fn mark_vary_encoding(&mut self) {
        self.vary_encoding = true;
    }
}
