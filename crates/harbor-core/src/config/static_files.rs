//! Static file serving configuration.

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ConfigError;

pub const DEFAULT_CACHE_CONTROL: &str = "no-cache";
pub const DEFAULT_MAX_RANGES: usize = 16;
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
pub const DEFAULT_COMPRESSION_MIN_SIZE: u64 = 1024;
pub const DEFAULT_COMPRESSION_MAX_SIZE: u64 = 4 * 1024 * 1024;

/// Maps URL paths matching `pattern` to a `Cache-Control` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControlRule {
    /// Regular expression matched against the decoded URL path.
    pub pattern: String,
    /// Header value, e.g. `public, max-age=86400`.
    pub directives: String,
}

impl CacheControlRule {
    pub fn new(pattern: impl Into<String>, directives: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            directives: directives.into(),
        }
    }

    pub fn compile(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.pattern).map_err(|e| ConfigError::InvalidCacheRule {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub enabled: bool,
    /// flate2 level, 0 (store) to 9 (best).
    pub level: u32,
    /// Smallest file, in bytes, worth compressing.
    pub min_size: u64,
    /// Largest file, in bytes, compressed on the fly.
    pub max_size: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: DEFAULT_COMPRESSION_LEVEL,
            min_size: DEFAULT_COMPRESSION_MIN_SIZE,
            max_size: DEFAULT_COMPRESSION_MAX_SIZE,
        }
    }
}

/// Static resource pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub enabled: bool,
    pub document_root: PathBuf,
    /// Used when no [`CacheControlRule`] matches.
    pub default_cache_control: String,
    /// First match wins.
    pub cache_control: Vec<CacheControlRule>,
    pub compression: CompressionConfig,
    /// Extensions (without the dot) treated as static resources. `None`
    /// means every extension with a known MIME type.
    pub allowed_extensions: Option<Vec<String>>,
    /// Upper bound on ranges in one `Range` header.
    pub max_ranges: usize,
    /// Let requests for paths with no file fall through to the application
    /// instead of answering 404.
    pub fallthrough_on_missing: bool,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            document_root: PathBuf::from("public"),
            default_cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            cache_control: Vec::new(),
            compression: CompressionConfig::default(),
            allowed_extensions: None,
            max_ranges: DEFAULT_MAX_RANGES,
            fallthrough_on_missing: true,
        }
    }
}

impl StaticFilesConfig {
    /// Enabled configuration serving `document_root` with defaults.
    pub fn serving(document_root: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            document_root: document_root.into(),
            ..Self::default()
        }
    }

    /// Check the settings. A disabled configuration only has its rules and
    /// bounds checked; the document root is not touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.cache_control {
            rule.compile()?;
        }

        if self.compression.level > 9 {
            return Err(ConfigError::InvalidCompressionLevel(self.compression.level));
        }

        if self.compression.min_size > self.compression.max_size {
            return Err(ConfigError::InvalidCompressionBounds {
                min: self.compression.min_size,
                max: self.compression.max_size,
            });
        }

        if self.max_ranges == 0 {
            return Err(ConfigError::InvalidMaxRanges);
        }

        if self.enabled {
            let invalid = |reason: &str| ConfigError::InvalidDocumentRoot {
                path: self.document_root.clone(),
                reason: reason.to_string(),
            };
            let meta = std::fs::metadata(&self.document_root)
                .map_err(|e| invalid(&e.to_string()))?;
            if !meta.is_dir() {
                return Err(invalid("not a directory"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_ignores_missing_root() {
        let config = StaticFilesConfig {
            document_root: PathBuf::from("/definitely/not/here"),
            ..StaticFilesConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn enabled_config_requires_directory_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StaticFilesConfig::serving(dir.path()).validate().is_ok());

        let file = dir.path().join("index.html");
        std::fs::write(&file, "hi").unwrap();
        assert!(matches!(
            StaticFilesConfig::serving(&file).validate(),
            Err(ConfigError::InvalidDocumentRoot { .. })
        ));
        assert!(matches!(
            StaticFilesConfig::serving(dir.path().join("missing")).validate(),
            Err(ConfigError::InvalidDocumentRoot { .. })
        ));
    }

    #[test]
    fn bad_cache_rule_is_rejected() {
        let config = StaticFilesConfig {
            cache_control: vec![CacheControlRule::new("([a-z", "public")],
            ..StaticFilesConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCacheRule { .. })
        ));
    }

    #[test]
    fn compression_bounds_are_checked() {
        let mut config = StaticFilesConfig::default();
        config.compression.level = 10;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCompressionLevel(10))
        );

        config.compression.level = 1;
        config.compression.min_size = 10;
        config.compression.max_size = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCompressionBounds { .. })
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: StaticFilesConfig =
            serde_json::from_str(r#"{"enabled":true,"document_root":"/srv/www"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_ranges, DEFAULT_MAX_RANGES);
        assert!(config.fallthrough_on_missing);
        assert_eq!(config.default_cache_control, DEFAULT_CACHE_CONTROL);
    }
}
