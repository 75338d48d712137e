use super::{Continuation, ResourceUnit, UnitOutcome};
use crate::candidate::CandidateFile;
use crate::decision::ResourceDecision;
use crate::request::ResourceRequest;

/// Stops the chain with `NotFound` unless the candidate is an existing
/// regular file inside the document root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistenceCheck;

impl ResourceUnit for ExistenceCheck {
    fn name(&self) -> &'static str {
        "existence"
    }

    fn evaluate(
        &self,
        _request: &ResourceRequest,
        candidate: &CandidateFile,
        _next: &mut Continuation,
    ) -> UnitOutcome {
        if candidate.is_servable() {
            UnitOutcome::Delegate
        } else {
            UnitOutcome::Decide(ResourceDecision::NotFound)
        }
    }
}
