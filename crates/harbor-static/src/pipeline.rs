//! The static resource pipeline and the site that feeds it.

use std::fmt;

use harbor_core::{ConfigError, StaticFilesConfig};
use http::HeaderValue;
use http::header::{ACCEPT_ENCODING, CACHE_CONTROL, ETAG, LAST_MODIFIED, VARY};
use tracing::trace;

use crate::cache::CachePolicy;
use crate::candidate::{CandidateFile, DocumentRoot};
use crate::date::format_http_date;
use crate::decision::ResourceDecision;
use crate::request::ResourceRequest;
use crate::units::{
    Compression, ConditionalGet, ContentTypeFilter, Continuation, ExistenceCheck, MethodCheck,
    RangeRequest, ResourceUnit, ServeFile, UnitOutcome,
};

/// Ordered chain of [`ResourceUnit`]s.
///
/// The first unit that decides wins; if every unit delegates the request
/// is declined. Any decision other than `Decline` about an existing file is
/// then stamped with `Cache-Control`, `Last-Modified` and `ETag`, plus
/// `Vary: Accept-Encoding` when a unit could have compressed the file.
pub struct StaticResourcePipeline {
    units: Vec<Box<dyn ResourceUnit>>,
    cache: CachePolicy,
}

impl StaticResourcePipeline {
    pub fn new(units: Vec<Box<dyn ResourceUnit>>, cache: CachePolicy) -> Self {
        Self { units, cache }
    }

    /// The standard chain: existence, method, content type, conditional
    /// headers, ranges, compression, then the file itself.
    pub fn standard(config: &StaticFilesConfig) -> Result<Self, ConfigError> {
        let cache = CachePolicy::new(&config.cache_control, &config.default_cache_control)?;
        let units: Vec<Box<dyn ResourceUnit>> = vec![
            Box::new(ExistenceCheck),
            Box::new(MethodCheck),
            Box::new(ContentTypeFilter::new(config.allowed_extensions.as_deref())),
            Box::new(ConditionalGet),
            Box::new(RangeRequest::new(config.max_ranges)),
            Box::new(Compression::new(config.compression.clone())),
            Box::new(ServeFile),
        ];
        Ok(Self::new(units, cache))
    }

    pub fn unit_names(&self) -> Vec<&'static str> {
        self.units.iter().map(|unit| unit.name()).collect()
    }

    pub fn evaluate(&self, request: &ResourceRequest, candidate: &CandidateFile) -> ResourceDecision {
        let mut next = Continuation::new();

        let mut decision = self
            .units
            .iter()
            .find_map(|unit| match unit.evaluate(request, candidate, &mut next) {
                UnitOutcome::Delegate => None,
                UnitOutcome::Decide(decision) => {
                    trace!(unit = unit.name(), path = %request.path(), "unit decided");
                    Some(decision)
                }
            })
            .unwrap_or(ResourceDecision::Decline);

        if candidate.is_servable() {
            self.stamp(&mut decision, request, candidate, &mut next);
        }
        decision
    }

    fn stamp(
        &self,
        decision: &mut ResourceDecision,
        request: &ResourceRequest,
        candidate: &CandidateFile,
        next: &mut Continuation,
    ) {
        let etag = HeaderValue::from_str(&next.entity_tag(candidate).to_string()).ok();
        let last_modified = candidate
            .last_modified
            .and_then(|time| HeaderValue::from_str(&format_http_date(time)).ok());
        let next: &Continuation = next;
        let varies = next.varies_by_encoding()
            || self
                .units
                .iter()
                .any(|unit| unit.varies_by_encoding(candidate, next));

        let Some(headers) = decision.headers_mut() else {
            return;
        };

        headers
            .entry(CACHE_CONTROL)
            .or_insert_with(|| self.cache.directives_for(request.path()).clone());
        if let Some(value) = last_modified {
            headers.entry(LAST_MODIFIED).or_insert(value);
        }
        if let Some(value) = etag {
            headers.entry(ETAG).or_insert(value);
        }
        if varies {
            headers
                .entry(VARY)
                .or_insert(HeaderValue::from(ACCEPT_ENCODING));
        }
    }
}

impl fmt::Debug for StaticResourcePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticResourcePipeline")
            .field("units", &self.unit_names())
            .field("cache", &self.cache)
            .finish()
    }
}

/// What to do with `NotFound` for a path that simply has no file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingResourcePolicy {
    /// Decline so the application can route the request.
    Fallthrough,
    /// Answer 404.
    NotFound,
}

impl MissingResourcePolicy {
    pub const fn from_fallthrough(fallthrough: bool) -> Self {
        if fallthrough { Self::Fallthrough } else { Self::NotFound }
    }

    /// Paths that try to leave the document root are always `NotFound`.
    pub fn apply(self, candidate: &CandidateFile, decision: ResourceDecision) -> ResourceDecision {
        match (self, &decision) {
            (Self::Fallthrough, ResourceDecision::NotFound)
                if !candidate.exists && !candidate.outside_root =>
            {
                ResourceDecision::Decline
            }
            _ => decision,
        }
    }
}

/// A document root, its pipeline and the missing-file policy.
#[derive(Debug)]
pub struct StaticSite {
    root: DocumentRoot,
    pipeline: StaticResourcePipeline,
    missing: MissingResourcePolicy,
}

/// A candidate file together with the decision taken for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: CandidateFile,
    pub decision: ResourceDecision,
}

impl StaticSite {
    pub const fn new(
        root: DocumentRoot,
        pipeline: StaticResourcePipeline,
        missing: MissingResourcePolicy,
    ) -> Self {
        Self {
            root,
            pipeline,
            missing,
        }
    }

    /// Site with the standard pipeline. Validates the configuration.
    pub fn from_config(config: &StaticFilesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            DocumentRoot::new(&config.document_root)?,
            StaticResourcePipeline::standard(config)?,
            MissingResourcePolicy::from_fallthrough(config.fallthrough_on_missing),
        ))
    }

    pub const fn root(&self) -> &DocumentRoot {
        &self.root
    }

    /// Resolve the request path and run the pipeline. Performs blocking
    /// filesystem calls.
    pub fn resolve(&self, request: &ResourceRequest) -> Resolution {
        let candidate = self.root.resolve(request.path());
        let decision = self.pipeline.evaluate(request, &candidate);
        let decision = self.missing.apply(&candidate, decision);
        Resolution {
            candidate,
            decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::units::test_support::file;

    struct Always(ResourceDecision);

    impl ResourceUnit for Always {
        fn name(&self) -> &'static str {
            "always"
        }

        fn evaluate(&self, _: &ResourceRequest, _: &CandidateFile, _: &mut Continuation) -> UnitOutcome {
            UnitOutcome::Decide(self.0.clone())
        }
    }

    struct Pass;

    impl ResourceUnit for Pass {
        fn name(&self) -> &'static str {
            "pass"
        }

        fn evaluate(&self, _: &ResourceRequest, _: &CandidateFile, _: &mut Continuation) -> UnitOutcome {
            UnitOutcome::Delegate
        }
    }

    #[test]
    fn all_delegating_units_decline() {
        let pipeline = StaticResourcePipeline::new(vec![Box::new(Pass), Box::new(Pass)], CachePolicy::default());
        let decision = pipeline.evaluate(&ResourceRequest::get("/a.css"), &file("a.css", 1));
        assert_eq!(decision, ResourceDecision::Decline);
    }

    #[test]
    fn first_decision_wins() {
        let pipeline = StaticResourcePipeline::new(
            vec![
                Box::new(Pass),
                Box::new(Always(ResourceDecision::NotFound)),
                Box::new(Always(ResourceDecision::Decline)),
            ],
            CachePolicy::default(),
        );
        let decision = pipeline.evaluate(&ResourceRequest::get("/a.css"), &file("a.css", 1));
        assert_eq!(decision, ResourceDecision::NotFound);
    }

    #[test]
    fn standard_chain_order() {
        let pipeline = StaticResourcePipeline::standard(&StaticFilesConfig::default()).unwrap();
        assert_eq!(
            pipeline.unit_names(),
            ["existence", "method", "content-type", "conditional", "range", "compression", "serve"]
        );
    }

    #[test]
    fn fallthrough_only_applies_to_missing_files() {
        let missing = CandidateFile::missing(PathBuf::from("/srv/www/api"));
        let rejected = CandidateFile::rejected(PathBuf::from("/srv/www"));

        let policy = MissingResourcePolicy::Fallthrough;
        assert_eq!(policy.apply(&missing, ResourceDecision::NotFound), ResourceDecision::Decline);
        assert_eq!(policy.apply(&rejected, ResourceDecision::NotFound), ResourceDecision::NotFound);

        let policy = MissingResourcePolicy::NotFound;
        assert_eq!(policy.apply(&missing, ResourceDecision::NotFound), ResourceDecision::NotFound);
    }
}
