//! Byte range requests (RFC 7233).
//!
//! Parsing and resolution are separate steps: [`parse_range_header`] turns
//! the header into [`RangeSpec`]s, [`resolve_ranges`] validates them against
//! the file size.

use std::fmt;

use thiserror::Error;

/// A validated, inclusive byte range within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive.
    pub end: u64,
}

impl ByteRange {
    /// Returns `None` when `start > end`.
    pub const fn new(start: u64, end: u64) -> Option<Self> {
        if start > end {
            None
        } else {
            Some(Self { start, end })
        }
    }

    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    /// `bytes <start>-<end>/<size>`
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// `Content-Range` value for a 416 response.
pub fn unsatisfied_content_range(size: u64) -> String {
    format!("bytes */{size}")
}

/// One range as written by the client, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `start-end`
    FromTo { start: u64, end: u64 },
    /// `start-`
    From { start: u64 },
    /// `-length`: the last `length` bytes.
    Suffix { length: u64 },
}

impl RangeSpec {
    /// Resolve against `size`. Ends past the file are clamped; ranges that
    /// start past the file, or empty suffixes, are unsatisfiable.
    pub fn resolve(self, size: u64) -> Option<ByteRange> {
        if size == 0 {
            return None;
        }
        let last = size - 1;

        match self {
            Self::FromTo { start, end } => {
                if start > last {
                    return None;
                }
                ByteRange::new(start, end.min(last))
            }
            Self::From { start } => ByteRange::new(start, last),
            Self::Suffix { length } => {
                if length == 0 {
                    return None;
                }
                ByteRange::new(size.saturating_sub(length), last)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("malformed range header: {0}")]
    Malformed(String),

    #[error("unsupported range unit: {0}")]
    UnsupportedUnit(String),

    #[error("too many ranges: {count} > {max}")]
    TooMany { count: usize, max: usize },

    #[error("no range satisfiable for size {size}")]
    NotSatisfiable { size: u64 },
}

/// Parse a `Range` header value such as `bytes=0-99, -50`.
pub fn parse_range_header(raw: &str) -> Result<Vec<RangeSpec>, RangeError> {
    let (unit, set) = raw
        .split_once('=')
        .ok_or_else(|| RangeError::Malformed(raw.to_string()))?;

    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(RangeError::UnsupportedUnit(unit.trim().to_string()));
    }

    let specs = set
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_spec)
        .collect::<Result<Vec<_>, _>>()?;

    if specs.is_empty() {
        return Err(RangeError::Malformed(raw.to_string()));
    }
    Ok(specs)
}

fn parse_spec(part: &str) -> Result<RangeSpec, RangeError> {
    let malformed = || RangeError::Malformed(part.to_string());
    let (start, end) = part.split_once('-').ok_or_else(malformed)?;
    let (start, end) = (start.trim(), end.trim());
    let number = |s: &str| {
        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse::<u64>().map_err(|_| malformed())
        } else {
            Err(malformed())
        }
    };

    match (start.is_empty(), end.is_empty()) {
        (true, true) => Err(malformed()),
        (true, false) => Ok(RangeSpec::Suffix {
            length: number(end)?,
        }),
        (false, true) => Ok(RangeSpec::From {
            start: number(start)?,
        }),
        (false, false) => {
            let (start, end) = (number(start)?, number(end)?);
            if start > end {
                return Err(malformed());
            }
            Ok(RangeSpec::FromTo { start, end })
        }
    }
}

/// Resolve parsed specs against `size`, dropping unsatisfiable members.
///
/// Fails when more than `max_ranges` specs were sent or none of them is
/// satisfiable.
pub fn resolve_ranges(
    specs: &[RangeSpec],
    size: u64,
    max_ranges: usize,
) -> Result<Vec<ByteRange>, RangeError> {
    if specs.len() > max_ranges {
        return Err(RangeError::TooMany {
            count: specs.len(),
            max: max_ranges,
        });
    }

    let ranges: Vec<ByteRange> = specs.iter().filter_map(|s| s.resolve(size)).collect();
    if ranges.is_empty() {
        return Err(RangeError::NotSatisfiable { size });
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(raw: &str, size: u64) -> Result<Vec<ByteRange>, RangeError> {
        resolve_ranges(&parse_range_header(raw)?, size, 16)
    }

    #[test]
    fn first_hundred_bytes() {
        let ranges = resolve("bytes=0-99", 500).unwrap();
        assert_eq!(ranges, vec![ByteRange { start: 0, end: 99 }]);
        assert_eq!(ranges[0].len(), 100);
        assert_eq!(ranges[0].content_range(500), "bytes 0-99/500");
    }

    #[test]
    fn open_and_suffix_ranges() {
        assert_eq!(
            resolve("bytes=450-", 500).unwrap(),
            vec![ByteRange { start: 450, end: 499 }]
        );
        assert_eq!(
            resolve("bytes=-50", 500).unwrap(),
            vec![ByteRange { start: 450, end: 499 }]
        );
        assert_eq!(
            resolve("bytes=-1000", 500).unwrap(),
            vec![ByteRange { start: 0, end: 499 }]
        );
    }

    #[test]
    fn end_past_file_is_clamped() {
        assert_eq!(
            resolve("bytes=400-9999", 500).unwrap(),
            vec![ByteRange { start: 400, end: 499 }]
        );
    }

    #[test]
    fn start_past_file_is_unsatisfiable() {
        assert_eq!(
            resolve("bytes=1000-", 500),
            Err(RangeError::NotSatisfiable { size: 500 })
        );
        assert_eq!(unsatisfied_content_range(500), "bytes */500");
    }

    #[test]
    fn partially_satisfiable_set_keeps_good_ranges() {
        assert_eq!(
            resolve("bytes=0-9, 900-999", 500).unwrap(),
            vec![ByteRange { start: 0, end: 9 }]
        );
    }

    #[test]
    fn malformed_headers() {
        for raw in ["bytes", "bytes=", "bytes=a-b", "bytes=5-1", "bytes=-", "bytes=1-2-3"] {
            assert!(
                matches!(parse_range_header(raw), Err(RangeError::Malformed(_))),
                "{raw}"
            );
        }
        assert!(matches!(
            parse_range_header("items=0-1"),
            Err(RangeError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn too_many_ranges() {
        let specs = parse_range_header("bytes=0-0,1-1,2-2").unwrap();
        assert_eq!(
            resolve_ranges(&specs, 10, 2),
            Err(RangeError::TooMany { count: 3, max: 2 })
        );
    }

    #[test]
    fn empty_file_has_no_satisfiable_range() {
        assert!(resolve("bytes=0-", 0).is_err());
        assert!(resolve("bytes=-5", 0).is_err());
    }
}
