//! Request and response types shared across the workspace.
//!
//! A [`RequestDescriptor`] is the immutable view of one intercepted
//! request; a [`ResponseRecord`] is what the store persists and what the
//! strategies hand back to the caller.

use bytes::Bytes;
use url::Url;

use crate::store::key::compute_cache_key;

/// One intercepted outgoing request.
///
/// Cache identity is `(method, url)` only; header differences never
/// change the cache key.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Uppercase HTTP method, e.g. `GET`.
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Whether the request navigates to a new document (top-level load).
    pub is_navigation: bool,
}

impl RequestDescriptor {
    /// A plain GET request for the given URL.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".to_string(), url, headers: Vec::new(), is_navigation: false }
    }

    /// A top-level navigation GET for the given URL.
    pub fn navigation(url: Url) -> Self {
        Self { is_navigation: true, ..Self::get(url) }
    }

    /// Attach a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value matching `name` (ASCII case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `Accept` header mentions the given substring.
    pub fn accepts(&self, part: &str) -> bool {
        self.header("accept").is_some_and(|v| v.contains(part))
    }

    /// Whether the method is a safe retrieval method (GET or HEAD).
    pub fn is_read_method(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET") || self.method.eq_ignore_ascii_case("HEAD")
    }

    /// Content-addressed store key for this request.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, self.url.as_str())
    }
}

/// One stored or freshly fetched HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// `Bytes` keeps the clone-for-store-and-caller step cheap.
    pub body: Bytes,
}

impl ResponseRecord {
    /// Build a response with a single `Content-Type` header.
    pub fn with_content_type(status: u16, status_text: &str, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.into(),
        }
    }

    /// First header value matching `name` (ASCII case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Content-Type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the status is exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_cache_key_ignores_headers() {
        let bare = RequestDescriptor::get(parse("https://app.example/feed"));
        let with_header = RequestDescriptor::get(parse("https://app.example/feed")).with_header("Accept", "image/png");
        assert_eq!(bare.cache_key(), with_header.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_method() {
        let get = RequestDescriptor::get(parse("https://app.example/feed"));
        let head = RequestDescriptor { method: "HEAD".into(), ..get.clone() };
        assert_ne!(get.cache_key(), head.cache_key());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let req = RequestDescriptor::get(parse("https://app.example/")).with_header("Accept", "text/html");
        assert_eq!(req.header("accept"), Some("text/html"));
        assert_eq!(req.header("ACCEPT"), Some("text/html"));
        assert!(req.accepts("text/html"));
        assert!(!req.accepts("image"));
    }

    #[test]
    fn test_read_method() {
        let url = parse("https://app.example/");
        assert!(RequestDescriptor::get(url.clone()).is_read_method());
        let head = RequestDescriptor { method: "HEAD".into(), ..RequestDescriptor::get(url.clone()) };
        assert!(head.is_read_method());
        let post = RequestDescriptor { method: "POST".into(), ..RequestDescriptor::get(url) };
        assert!(!post.is_read_method());
    }

    #[test]
    fn test_response_content_type() {
        let resp = ResponseRecord::with_content_type(200, "OK", "text/css", "");
        assert_eq!(resp.content_type(), Some("text/css"));
        assert!(resp.is_ok());
        assert!(resp.body.is_empty());
    }
}
