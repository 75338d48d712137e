use std::collections::HashSet;

use super::{Continuation, FALLBACK_CONTENT_TYPE, ResourceUnit, UnitOutcome};
use crate::candidate::CandidateFile;
use crate::decision::ResourceDecision;
use crate::mime::content_type_for;
use crate::request::ResourceRequest;

/// Decides which files count as static resources by extension and records
/// their content type.
///
/// Without an allow-list every extension with a known MIME type passes;
/// with one, only listed extensions pass. Anything else is declined so the
/// application can handle it.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeFilter {
    allowed: Option<HashSet<String>>,
}

impl ContentTypeFilter {
    pub fn new(allowed_extensions: Option<&[String]>) -> Self {
        Self {
            allowed: allowed_extensions.map(|exts| {
                exts.iter()
                    .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                    .collect()
            }),
        }
    }
}

impl ResourceUnit for ContentTypeFilter {
    fn name(&self) -> &'static str {
        "content-type"
    }

    fn evaluate(
        &self,
        _request: &ResourceRequest,
        candidate: &CandidateFile,
        next: &mut Continuation,
    ) -> UnitOutcome {
        let extension = candidate.extension().unwrap_or_default();
        let known = content_type_for(&extension);

        let content_type = match &self.allowed {
            Some(allowed) if allowed.contains(&extension) => {
                known.unwrap_or(FALLBACK_CONTENT_TYPE)
            }
            Some(_) => return UnitOutcome::Decide(ResourceDecision::Decline),
            None => match known {
                Some(content_type) => content_type,
                None => return UnitOutcome::Decide(ResourceDecision::Decline),
            },
        };

        next.set_content_type(content_type);
        UnitOutcome::Delegate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::test_support::file;

    #[test]
    fn known_extension_sets_content_type() {
        let mut next = Continuation::new();
        let outcome = ContentTypeFilter::default().evaluate(
            &ResourceRequest::get("/a.css"),
            &file("a.css", 1),
            &mut next,
        );
        assert_eq!(outcome, UnitOutcome::Delegate);
        assert_eq!(next.content_type(), "text/css; charset=utf-8");
    }

    #[test]
    fn unknown_extension_is_declined() {
        let mut next = Continuation::new();
        let outcome = ContentTypeFilter::default().evaluate(
            &ResourceRequest::get("/index.php"),
            &file("index.php", 1),
            &mut next,
        );
        assert_eq!(outcome, UnitOutcome::Decide(ResourceDecision::Decline));
    }

    #[test]
    fn allow_list_overrides_mime_map() {
        let allowed = vec![".dat".to_string(), "CSS".to_string()];
        let filter = ContentTypeFilter::new(Some(&allowed));
        let mut next = Continuation::new();

        assert_eq!(
            filter.evaluate(&ResourceRequest::get("/x.dat"), &file("x.dat", 1), &mut next),
            UnitOutcome::Delegate
        );
        assert_eq!(next.content_type(), FALLBACK_CONTENT_TYPE);

        assert_eq!(
            filter.evaluate(&ResourceRequest::get("/x.png"), &file("x.png", 1), &mut next),
            UnitOutcome::Decide(ResourceDecision::Decline)
        );
    }
}
