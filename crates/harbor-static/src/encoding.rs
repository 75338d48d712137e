//! `Accept-Encoding` negotiation and on-the-fly compression.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};

/// Content codings harbor can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncoding {
    Gzip,
    Deflate,
}

impl ContentEncoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    /// Compress `input` completely.
    pub fn encode(self, input: &mut impl Read, level: u32) -> io::Result<Vec<u8>> {
        let level = Compression::new(level.min(9));
        match self {
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), level);
                io::copy(input, &mut encoder)?;
                encoder.finish()
            }
            Self::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), level);
                io::copy(input, &mut encoder)?;
                encoder.flush()?;
                encoder.finish()
            }
        }
    }

    /// Compress the file at `path`.
    pub fn encode_file(self, path: &Path, level: u32) -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        self.encode(&mut file, level)
    }
}

/// Pick the preferred supported coding from an `Accept-Encoding` value.
///
/// Highest q-value wins, gzip before deflate on ties; `q=0` excludes a
/// coding, and `*` stands for any coding not listed explicitly. Returns
/// `None` when identity should be sent.
pub fn negotiate(accept_encoding: &str) -> Option<ContentEncoding> {
    let mut gzip: Option<f32> = None;
    let mut deflate: Option<f32> = None;
    let mut wildcard: Option<f32> = None;

    for item in accept_encoding.split(',') {
        let mut params = item.split(';');
        let coding = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if coding.is_empty() {
            continue;
        }
        let q = params
            .filter_map(|p| p.trim().strip_prefix("q="))
            .find_map(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        match coding.as_str() {
            "gzip" | "x-gzip" => gzip = Some(q),
            "deflate" => deflate = Some(q),
            "*" => wildcard = Some(q),
            _ => {}
        }
    }

    let gzip = gzip.or(wildcard).unwrap_or(0.0);
    let deflate = deflate.or(wildcard).unwrap_or(0.0);

    if gzip <= 0.0 && deflate <= 0.0 {
        None
    } else if gzip >= deflate {
        Some(ContentEncoding::Gzip)
    } else {
        Some(ContentEncoding::Deflate)
    }
}
