use http::Method;

use super::{Continuation, ResourceUnit, UnitOutcome};
use crate::candidate::CandidateFile;
use crate::decision::ResourceDecision;
use crate::request::ResourceRequest;

/// Declines anything but GET and HEAD so other methods reach the
/// application.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodCheck;

impl ResourceUnit for MethodCheck {
    fn name(&self) -> &'static str {
        "method"
    }

    fn evaluate(
        &self,
        request: &ResourceRequest,
        _candidate: &CandidateFile,
        _next: &mut Continuation,
    ) -> UnitOutcome {
        if matches!(*request.method(), Method::GET | Method::HEAD) {
            UnitOutcome::Delegate
        } else {
            UnitOutcome::Decide(ResourceDecision::Decline)
        }
    }
}
