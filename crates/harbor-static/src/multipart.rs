//! `multipart/byteranges` framing for responses carrying several ranges.

use crate::etag::EntityTag;
use crate::range::ByteRange;

/// Framing of a multi-range body: a header before each range and a closing
/// delimiter. The byte ranges themselves are copied from the file by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartLayout {
    boundary: String,
    part_headers: Vec<String>,
    closing: String,
    content_length: u64,
}

impl MultipartLayout {
    pub fn new(boundary: impl Into<String>, content_type: &str, ranges: &[ByteRange], size: u64) -> Self {
        let boundary = boundary.into();
        let part_headers: Vec<String> = ranges
            .iter()
            .map(|range| {
                format!(
                    "\r\n--{boundary}\r\nContent-Type: {content_type}\r\nContent-Range: {}\r\n\r\n",
                    range.content_range(size)
                )
            })
            .collect();
        let closing = format!("\r\n--{boundary}--\r\n");

        let framing: u64 = part_headers
            .iter()
            .chain(std::iter::once(&closing))
            .map(|s| s.len() as u64)
            .sum();
        let payload: u64 = ranges.iter().map(ByteRange::len).sum();

        Self {
            boundary,
            part_headers,
            closing,
            content_length: framing + payload,
        }
    }

    /// Boundary derived from the entity tag so it is stable per version.
    pub fn boundary_for(tag: &EntityTag) -> String {
        format!("harbor-{}", tag.tag)
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` of the whole response.
    pub fn content_type(&self) -> String {
        format!("multipart/byteranges; boundary={}", self.boundary)
    }

    /// Header block preceding range `index`.
    pub fn part_header(&self, index: usize) -> Option<&str> {
        self.part_headers.get(index).map(String::as_str)
    }

    pub fn closing(&self) -> &str {
        &self.closing
    }

    /// Exact body length, framing included.
    pub const fn content_length(&self) -> u64 {
        self.content_length
    }
}
