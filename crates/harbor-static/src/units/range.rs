use http::header::{
    ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, IF_RANGE, RANGE,
};
use http::{HeaderMap, HeaderValue};
use tracing::debug;

use super::{Continuation, ResourceUnit, UnitOutcome};
use crate::candidate::CandidateFile;
use crate::date::{parse_http_date, unix_seconds};
use crate::decision::{ByteSource, ResourceDecision};
use crate::etag::EntityTag;
use crate::multipart::MultipartLayout;
use crate::range::{parse_range_header, resolve_ranges, unsatisfied_content_range};
use crate::request::ResourceRequest;

/// Turns a `Range` header into `PartialContent` or `RangeNotSatisfiable`.
#[derive(Debug, Clone, Copy)]
pub struct RangeRequest {
    max_ranges: usize,
}

impl RangeRequest {
    pub const fn new(max_ranges: usize) -> Self {
        Self { max_ranges }
    }
}

impl ResourceUnit for RangeRequest {
    fn name(&self) -> &'static str {
        "range"
    }

    fn evaluate(
        &self,
        request: &ResourceRequest,
        candidate: &CandidateFile,
        next: &mut Continuation,
    ) -> UnitOutcome {
        let Some(raw) = request.header_text(&RANGE) else {
            return UnitOutcome::Delegate;
        };

        if let Some(if_range) = request.header_text(&IF_RANGE) {
            if !if_range_matches(&if_range, candidate, next) {
                debug!(path = %request.path(), "If-Range mismatch, ignoring Range");
                return UnitOutcome::Delegate;
            }
        }

        let size = candidate.size;
        let ranges = match parse_range_header(&raw)
            .and_then(|specs| resolve_ranges(&specs, size, self.max_ranges))
        {
            Ok(ranges) => ranges,
            Err(e) => {
                debug!(path = %request.path(), error = %e, "range not satisfiable");
                let mut headers = HeaderMap::new();
                insert(&mut headers, CONTENT_RANGE, &unsatisfied_content_range(size));
                return UnitOutcome::Decide(ResourceDecision::RangeNotSatisfiable { headers });
            }
        };

        let mut source = ByteSource::new(candidate.path.clone(), size);
        if request.is_head() {
            source = source.headers_only();
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

        let multipart = if let [range] = ranges.as_slice() {
            insert(&mut headers, CONTENT_TYPE, next.content_type());
            insert(&mut headers, CONTENT_RANGE, &range.content_range(size));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
            None
        } else {
            let boundary = MultipartLayout::boundary_for(next.entity_tag(candidate));
            let layout = MultipartLayout::new(boundary, next.content_type(), &ranges, size);
            insert(&mut headers, CONTENT_TYPE, &layout.content_type());
            headers.insert(CONTENT_LENGTH, HeaderValue::from(layout.content_length()));
            Some(layout)
        };

        UnitOutcome::Decide(ResourceDecision::PartialContent {
            ranges,
            headers,
            source,
            multipart,
        })
    }
}

/// `If-Range` holds either a strong entity tag or an exact date.
fn if_range_matches(raw: &str, candidate: &CandidateFile, next: &mut Continuation) -> bool {
    let raw = raw.trim();
    if raw.starts_with('"') || raw.starts_with("W/") {
        return EntityTag::parse(raw).is_some_and(|tag| tag.strong_eq(next.entity_tag(candidate)));
    }

    match (parse_http_date(raw), candidate.last_modified) {
        (Some(date), Some(modified)) => unix_seconds(modified) == date,
        _ => false,
    }
}

fn insert(headers: &mut HeaderMap, name: http::HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderName;

    use super::*;
    use crate::date::format_http_date;
    use crate::range::ByteRange;
    use crate::units::test_support::{file, mtime};

    fn run(headers: &[(HeaderName, String)]) -> UnitOutcome {
        let candidate = file("video.mp4", 500);
        let mut request = ResourceRequest::get("/video.mp4");
        for (name, value) in headers {
            request = request.with_header(name.clone(), value);
        }
        let mut next = Continuation::new();
        next.set_content_type("video/mp4");
        RangeRequest::new(4).evaluate(&request, &candidate, &mut next)
    }

    fn header<'a>(outcome: &'a UnitOutcome, name: &HeaderName) -> &'a str {
        let UnitOutcome::Decide(decision) = outcome else {
            panic!("expected a decision, got {outcome:?}");
        };
        decision.headers().unwrap().get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn without_range_header_delegates() {
        assert_eq!(run(&[]), UnitOutcome::Delegate);
    }

    #[test]
    fn single_range_is_partial_content() {
        let outcome = run(&[(RANGE, "bytes=0-99".into())]);
        let UnitOutcome::Decide(ResourceDecision::PartialContent {
            ranges, multipart, ..
        }) = &outcome
        else {
            panic!("expected partial content, got {outcome:?}");
        };
        assert_eq!(ranges, &[ByteRange { start: 0, end: 99 }]);
        assert!(multipart.is_none());
        assert_eq!(header(&outcome, &CONTENT_RANGE), "bytes 0-99/500");
        assert_eq!(header(&outcome, &CONTENT_LENGTH), "100");
        assert_eq!(header(&outcome, &CONTENT_TYPE), "video/mp4");
    }

    #[test]
    fn start_beyond_end_is_not_satisfiable() {
        let outcome = run(&[(RANGE, "bytes=1000-".into())]);
        assert!(matches!(
            outcome,
            UnitOutcome::Decide(ResourceDecision::RangeNotSatisfiable { .. })
        ));
        assert_eq!(header(&outcome, &CONTENT_RANGE), "bytes */500");
    }

    #[test]
    fn malformed_and_excessive_ranges_are_not_satisfiable() {
        for raw in ["bytes=x-y", "pages=1-2", "bytes=0-0,1-1,2-2,3-3,4-4"] {
            let outcome = run(&[(RANGE, raw.into())]);
            assert!(
                matches!(
                    outcome,
                    UnitOutcome::Decide(ResourceDecision::RangeNotSatisfiable { .. })
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn multiple_ranges_use_multipart() {
        let outcome = run(&[(RANGE, "bytes=0-9, 20-29".into())]);
        let content_type = header(&outcome, &CONTENT_TYPE).to_string();
        assert!(content_type.starts_with("multipart/byteranges; boundary=harbor-"));

        let UnitOutcome::Decide(ResourceDecision::PartialContent {
            multipart: Some(layout),
            ..
        }) = &outcome
        else {
            panic!("expected multipart, got {outcome:?}");
        };
        assert_eq!(
            header(&outcome, &CONTENT_LENGTH),
            layout.content_length().to_string()
        );
    }

    #[test]
    fn if_range_mismatch_ignores_range() {
        let outcome = run(&[
            (RANGE, "bytes=0-9".into()),
            (IF_RANGE, "\"stale\"".into()),
        ]);
        assert_eq!(outcome, UnitOutcome::Delegate);

        let tag = EntityTag::for_file(&file("video.mp4", 500)).to_string();
        let outcome = run(&[(RANGE, "bytes=0-9".into()), (IF_RANGE, tag)]);
        assert!(matches!(
            outcome,
            UnitOutcome::Decide(ResourceDecision::PartialContent { .. })
        ));

        let outcome = run(&[
            (RANGE, "bytes=0-9".into()),
            (IF_RANGE, format_http_date(mtime())),
        ]);
        assert!(matches!(
            outcome,
            UnitOutcome::Decide(ResourceDecision::PartialContent { .. })
        ));
    }

    #[test]
    fn head_request_has_no_body() {
        let candidate = file("video.mp4", 500);
        let request = ResourceRequest::head("/video.mp4").with_header(RANGE, "bytes=0-9");
        let outcome = RangeRequest::new(4).evaluate(&request, &candidate, &mut Continuation::new());
        let UnitOutcome::Decide(decision) = outcome else {
            panic!("expected decision");
        };
        assert!(!decision.source().unwrap().include_body());
    }
}
