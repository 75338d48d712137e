//! The pipeline's view of an inbound request.

use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Method, decoded URL path and headers of a request.
///
/// Deliberately independent of any server framework; the runner converts
/// its native request into this before evaluating the pipeline.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
}

impl ResourceRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add a header. Values that are not valid header text are dropped.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// URL path as received, still percent-encoded.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, joining repeated headers with `, `.
    pub fn header_text(&self, name: &HeaderName) -> Option<String> {
        let mut values = self
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok());
        let first = values.next()?;
        Some(values.fold(first.to_string(), |mut acc, v| {
            acc.push_str(", ");
            acc.push_str(v);
            acc
        }))
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

#[cfg(test)]
mod tests {
    use http::header::{ACCEPT_ENCODING, RANGE};

    use super::*;

    #[test]
    fn repeated_headers_are_joined() {
        let request = ResourceRequest::get("/a.css")
            .with_header(ACCEPT_ENCODING, "gzip")
            .with_header(ACCEPT_ENCODING, "deflate;q=0.5");
        assert_eq!(
            request.header_text(&ACCEPT_ENCODING).as_deref(),
            Some("gzip, deflate;q=0.5")
        );
        assert_eq!(request.header_text(&RANGE), None);
    }
}
