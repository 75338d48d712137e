use http::header::{ACCEPT_ENCODING, ACCEPT_RANGES, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG, VARY};
use http::{HeaderMap, HeaderValue};

use super::{Continuation, ResourceUnit, UnitOutcome};
use crate::candidate::CandidateFile;
use crate::decision::{ByteSource, ResourceDecision};
use crate::request::ResourceRequest;

/// Terminal unit: serves the whole file, compressed when a coding was
/// chosen upstream.
///
/// A compressed representation gets a weak `ETag` since its bytes differ
/// from the file on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServeFile;

impl ResourceUnit for ServeFile {
    fn name(&self) -> &'static str {
        "serve"
    }

    fn evaluate(
        &self,
        request: &ResourceRequest,
        candidate: &CandidateFile,
        next: &mut Continuation,
    ) -> UnitOutcome {
        let mut headers = HeaderMap::new();
        if let Ok(content_type) = HeaderValue::from_str(next.content_type()) {
            headers.insert(CONTENT_TYPE, content_type);
        }
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        if next.varies_by_encoding() {
            headers.insert(VARY, HeaderValue::from(ACCEPT_ENCODING));
        }

        let mut source = ByteSource::new(candidate.path.clone(), candidate.size);
        match next.encoding() {
            Some((encoding, level)) => {
                headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()));
                let weak = next.entity_tag(candidate).to_weak().to_string();
                if let Ok(etag) = HeaderValue::from_str(&weak) {
                    headers.insert(ETAG, etag);
                }
                source = source.encoded(encoding, level);
            }
            None => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(candidate.size));
            }
        }

        if request.is_head() {
            source = source.headers_only();
        }

        UnitOutcome::Decide(ResourceDecision::FullContent { headers, source })
    }
}
