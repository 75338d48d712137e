use harbor_core::config::CompressionConfig;
use http::header::ACCEPT_ENCODING;

use super::{Continuation, ResourceUnit, UnitOutcome};
use crate::candidate::CandidateFile;
use crate::encoding::negotiate;
use crate::mime::is_compressible;
use crate::request::ResourceRequest;

/// Chooses a content coding for the full response. Never decides; the
/// choice is carried to [`super::ServeFile`] through the continuation.
///
/// Runs after [`super::RangeRequest`], so partial content is never
/// compressed. Eligible files still get `Vary: Accept-Encoding` on every
/// stamped decision, 206 and 304 included.
#[derive(Debug, Clone)]
pub struct Compression {
    config: CompressionConfig,
}

impl Compression {
    pub const fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    fn eligible(&self, candidate: &CandidateFile, next: &Continuation) -> bool {
        self.config.enabled
            && is_compressible(next.content_type())
            && (self.config.min_size..=self.config.max_size).contains(&candidate.size)
    }
}

impl ResourceUnit for Compression {
    fn name(&self) -> &'static str {
        "compression"
    }

    fn evaluate(
        &self,
        request: &ResourceRequest,
        candidate: &CandidateFile,
        next: &mut Continuation,
    ) -> UnitOutcome {
        if !self.eligible(candidate, next) {
            return UnitOutcome::Delegate;
        }

        next.mark_vary_encoding();
        if let Some(encoding) = request
            .header_text(&ACCEPT_ENCODING)
            .and_then(|accept| negotiate(&accept))
        {
            next.set_encoding(encoding, self.config.level);
        }
        UnitOutcome::Delegate
    }

    fn varies_by_encoding(&self, candidate: &CandidateFile, next: &Continuation) -> bool {
        self.eligible(candidate, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ContentEncoding;
    use crate::units::test_support::file;

    fn run(content_type: &'static str, size: u64, accept: Option<&str>) -> Continuation {
        let mut request = ResourceRequest::get("/x");
        if let Some(accept) = accept {
            request = request.with_header(ACCEPT_ENCODING, accept);
        }
        let mut next = Continuation::new();
        next.set_content_type(content_type);
        let outcome = Compression::new(CompressionConfig::default()).evaluate(
            &request,
            &file("x", size),
            &mut next,
        );
        assert_eq!(outcome, UnitOutcome::Delegate);
        next
    }

    #[test]
    fn compressible_text_is_encoded() {
        let next = run("text/css; charset=utf-8", 10_000, Some("gzip, deflate"));
        assert_eq!(next.encoding().map(|(e, _)| e), Some(ContentEncoding::Gzip));
        assert!(next.varies_by_encoding());
    }

    #[test]
    fn client_without_support_still_gets_vary() {
        let next = run("text/css; charset=utf-8", 10_000, None);
        assert_eq!(next.encoding(), None);
        assert!(next.varies_by_encoding());
    }

    #[test]
    fn images_and_small_files_are_left_alone() {
        let next = run("image/png", 10_000, Some("gzip"));
        assert_eq!(next.encoding(), None);
        assert!(!next.varies_by_encoding());

        let next = run("text/plain; charset=utf-8", 10, Some("gzip"));
        assert_eq!(next.encoding(), None);
    }
}
