//! `Cache-Control` selection by URL path.

use harbor_core::ConfigError;
use harbor_core::config::CacheControlRule;
use http::HeaderValue;
use regex::Regex;

/// Compiled cache-control rules. The first matching rule wins; otherwise
/// the default applies.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    rules: Vec<(Regex, HeaderValue)>,
    default: HeaderValue,
}

impl CachePolicy {
    pub fn new(rules: &[CacheControlRule], default: &str) -> Result<Self, ConfigError> {
        let header = |pattern: &str, value: &str| {
            HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidCacheRule {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
        };

        let rules = rules
            .iter()
            .map(|rule| Ok((rule.compile()?, header(&rule.pattern, &rule.directives)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            rules,
            default: header("<default>", default)?,
        })
    }

    pub fn directives_for(&self, url_path: &str) -> &HeaderValue {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(url_path))
            .map_or(&self.default, |(_, value)| value)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default: HeaderValue::from_static(harbor_core::config::DEFAULT_CACHE_CONTROL),
        }
    }
}
