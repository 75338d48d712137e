//! Entity tags and `If-Match`/`If-None-Match` list matching.

use std::fmt::{self, Write as _};

use sha2::{Digest, Sha256};

use crate::candidate::CandidateFile;
use crate::date::unix_seconds;

/// An entity tag as it appears in `ETag` and conditional headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag {
    pub weak: bool,
    /// Opaque value without quotes.
    pub tag: String,
}

impl EntityTag {
    pub fn strong(tag: impl Into<String>) -> Self {
        Self {
            weak: false,
            tag: tag.into(),
        }
    }

    pub fn weak(tag: impl Into<String>) -> Self {
        Self {
            weak: true,
            tag: tag.into(),
        }
    }

    /// Strong tag derived from path, size and modification time. The file
    /// content is never read.
    pub fn for_file(candidate: &CandidateFile) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(candidate.path.to_string_lossy().as_bytes());
        hasher.update(candidate.size.to_be_bytes());
        if let Some(modified) = candidate.last_modified {
            hasher.update(unix_seconds(modified).to_be_bytes());
            let nanos = modified
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.subsec_nanos());
            hasher.update(nanos.to_be_bytes());
        }

        let digest = hasher.finalize();
        let mut tag = String::with_capacity(32);
        for byte in &digest[..16] {
            let _ = write!(tag, "{byte:02x}");
        }
        Self::strong(tag)
    }

    /// Same value, marked weak.
    #[must_use]
    pub fn to_weak(&self) -> Self {
        Self::weak(self.tag.clone())
    }

    /// Both strong and byte-identical.
    pub fn strong_eq(&self, other: &Self) -> bool {
        !self.weak && !other.weak && self.tag == other.tag
    }

    /// Identical values, weakness ignored.
    pub fn weak_eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }

    /// Parse a single quoted tag, e.g. `"abc"` or `W/"abc"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (weak, quoted) = match raw.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let tag = quoted.strip_prefix('"')?.strip_suffix('"')?;
        if tag.contains('"') {
            return None;
        }
        Some(Self {
            weak,
            tag: tag.to_string(),
        })
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.tag)
        } else {
            write!(f, "\"{}\"", self.tag)
        }
    }
}

/// Value of an `If-Match` or `If-None-Match` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagList {
    /// `*`
    Any,
    Tags(Vec<EntityTag>),
}

impl TagList {
    /// Parse a comma-separated list. Unparsable members are skipped.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "*" {
            return Self::Any;
        }
        Self::Tags(raw.split(',').filter_map(EntityTag::parse).collect())
    }

    /// `If-Match` semantics.
    pub fn matches_strong(&self, current: &EntityTag) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|t| t.strong_eq(current)),
        }
    }

    /// `If-None-Match` semantics.
    pub fn matches_weak(&self, current: &EntityTag) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|t| t.weak_eq(current)),
        }
    }
}
