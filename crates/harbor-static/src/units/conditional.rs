use http::HeaderMap;
use http::header::{IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE};

use super::{Continuation, ResourceUnit, UnitOutcome};
use crate::candidate::CandidateFile;
use crate::date::{parse_http_date, unix_seconds};
use crate::decision::ResourceDecision;
use crate::etag::TagList;
use crate::request::ResourceRequest;

/// Evaluates conditional request headers in RFC 7232 order:
///
/// 1. `If-Match` (strong comparison), else `If-Unmodified-Since`; failure
///    yields `PreconditionFailed`.
/// 2. `If-None-Match` (weak comparison), else `If-Modified-Since`; a match
///    yields `NotModified`.
///
/// A failed `If-Match` therefore wins over a matching `If-None-Match`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalGet;

impl ResourceUnit for ConditionalGet {
    fn name(&self) -> &'static str {
        "conditional"
    }

    fn evaluate(
        &self,
        request: &ResourceRequest,
        candidate: &CandidateFile,
        next: &mut Continuation,
    ) -> UnitOutcome {
        let modified = candidate.last_modified.map(unix_seconds);

        if let Some(if_match) = request.header_text(&IF_MATCH) {
            if !TagList::parse(&if_match).matches_strong(next.entity_tag(candidate)) {
                return precondition_failed();
            }
        } else if let Some(since) = request
            .header_text(&IF_UNMODIFIED_SINCE)
            .and_then(|raw| parse_http_date(&raw))
        {
            if modified.is_some_and(|m| m > since) {
                return precondition_failed();
            }
        }

        if let Some(if_none_match) = request.header_text(&IF_NONE_MATCH) {
            if TagList::parse(&if_none_match).matches_weak(next.entity_tag(candidate)) {
                return not_modified();
            }
        } else if let Some(since) = request
            .header_text(&IF_MODIFIED_SINCE)
            .and_then(|raw| parse_http_date(&raw))
        {
            if modified.is_some_and(|m| m <= since) {
                return not_modified();
            }
        }

        UnitOutcome::Delegate
    }
}

fn precondition_failed() -> UnitOutcome {
    UnitOutcome::Decide(ResourceDecision::PreconditionFailed {
        headers: HeaderMap::new(),
    })
}

fn not_modified() -> UnitOutcome {
    UnitOutcome::Decide(ResourceDecision::NotModified {
        headers: HeaderMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::HeaderName;

    use super::*;
    use crate::date::format_http_date;
    use crate::etag::EntityTag;
    use crate::units::test_support::{file, mtime};

    fn run(headers: &[(HeaderName, String)]) -> UnitOutcome {
        let candidate = file("app.js", 10);
        let mut request = ResourceRequest::get("/app.js");
        for (name, value) in headers {
            request = request.with_header(name.clone(), value);
        }
        ConditionalGet.evaluate(&request, &candidate, &mut Continuation::new())
    }

    fn current_tag() -> EntityTag {
        EntityTag::for_file(&file("app.js", 10))
    }

    fn is_not_modified(outcome: &UnitOutcome) -> bool {
        matches!(outcome, UnitOutcome::Decide(ResourceDecision::NotModified { .. }))
    }

    fn is_precondition_failed(outcome: &UnitOutcome) -> bool {
        matches!(
            outcome,
            UnitOutcome::Decide(ResourceDecision::PreconditionFailed { .. })
        )
    }

    #[test]
    fn no_conditions_delegates() {
        assert_eq!(run(&[]), UnitOutcome::Delegate);
    }

    #[test]
    fn matching_if_none_match_is_not_modified() {
        let tag = current_tag().to_string();
        assert!(is_not_modified(&run(&[(IF_NONE_MATCH, tag)])));

        let weak = current_tag().to_weak().to_string();
        assert!(is_not_modified(&run(&[(IF_NONE_MATCH, weak)])));

        assert!(is_not_modified(&run(&[(IF_NONE_MATCH, "*".into())])));
        assert_eq!(
            run(&[(IF_NONE_MATCH, "\"other\"".into())]),
            UnitOutcome::Delegate
        );
    }

    #[test]
    fn if_modified_since_uses_second_granularity() {
        let same = format_http_date(mtime());
        assert!(is_not_modified(&run(&[(IF_MODIFIED_SINCE, same)])));

        let earlier = format_http_date(mtime() - Duration::from_secs(1));
        assert_eq!(run(&[(IF_MODIFIED_SINCE, earlier)]), UnitOutcome::Delegate);

        assert_eq!(
            run(&[(IF_MODIFIED_SINCE, "not a date".into())]),
            UnitOutcome::Delegate
        );
    }

    #[test]
    fn if_none_match_takes_precedence_over_if_modified_since() {
        let newer = format_http_date(mtime() + Duration::from_secs(60));
        assert_eq!(
            run(&[
                (IF_NONE_MATCH, "\"stale\"".into()),
                (IF_MODIFIED_SINCE, newer),
            ]),
            UnitOutcome::Delegate
        );
    }

    #[test]
    fn failed_if_match_is_precondition_failed() {
        assert!(is_precondition_failed(&run(&[(IF_MATCH, "\"stale\"".into())])));
        assert_eq!(run(&[(IF_MATCH, current_tag().to_string())]), UnitOutcome::Delegate);

        let weak = current_tag().to_weak().to_string();
        assert!(is_precondition_failed(&run(&[(IF_MATCH, weak)])));
    }

    #[test]
    fn failed_if_match_wins_over_matching_if_none_match() {
        let outcome = run(&[
            (IF_MATCH, "\"stale\"".into()),
            (IF_NONE_MATCH, current_tag().to_string()),
        ]);
        assert!(is_precondition_failed(&outcome));
    }

    #[test]
    fn if_unmodified_since() {
        let earlier = format_http_date(mtime() - Duration::from_secs(10));
        assert!(is_precondition_failed(&run(&[(IF_UNMODIFIED_SINCE, earlier)])));

        let same = format_http_date(mtime());
        assert_eq!(run(&[(IF_UNMODIFIED_SINCE, same)]), UnitOutcome::Delegate);
    }
}
