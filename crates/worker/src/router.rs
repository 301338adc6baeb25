//! Request classification.
//!
//! The router is a pure function from request to strategy decision. It is
//! evaluated once per intercepted request, never touches the store, and is
//! total: every request maps to exactly one decision.

use brolly_core::RequestDescriptor;
use url::Url;

/// Strategy decision for one intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Do not intercept; the request passes straight through.
    Ignore,
    /// Same-origin application resource: prefer the network.
    NetworkFirst,
    /// Cross-origin resource (CDN, font host): prefer the store.
    CacheFirst,
}

/// Stateless request classifier.
#[derive(Debug, Clone)]
pub struct Router {
    app_origin: Url,
    telemetry_patterns: Vec<String>,
}

impl Router {
    pub fn new(app_origin: Url, telemetry_patterns: Vec<String>) -> Self {
        Self { app_origin, telemetry_patterns }
    }

    /// Classify a request, in fixed precedence order:
    ///
    /// 1. non-read method (not GET/HEAD) -> ignore
    /// 2. non-network scheme -> ignore
    /// 3. telemetry URL pattern -> ignore
    /// 4. application origin -> network-first
    /// 5. anything else -> cache-first
    pub fn classify(&self, request: &RequestDescriptor) -> Decision {
        if !request.is_read_method() {
            return Decision::Ignore;
        }
        if !matches!(request.url.scheme(), "http" | "https") {
            return Decision::Ignore;
        }
        let url = request.url.as_str();
        if self.telemetry_patterns.iter().any(|p| url.contains(p.as_str())) {
            return Decision::Ignore;
        }
        if request.url.origin() == self.app_origin.origin() {
            Decision::NetworkFirst
        } else {
            Decision::CacheFirst
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::new(
            Url::parse("https://app.example").unwrap(),
            vec!["google-analytics.com".to_string(), "/collect?".to_string()],
        )
    }

    fn get(url: &str) -> RequestDescriptor {
        RequestDescriptor::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_non_read_method_ignored() {
        let mut request = get("https://app.example/api/posts");
        request.method = "POST".to_string();
        assert_eq!(router().classify(&request), Decision::Ignore);
    }

    #[test]
    fn test_non_network_scheme_ignored() {
        let request = get("data:text/plain,hello");
        assert_eq!(router().classify(&request), Decision::Ignore);

        let request = get("chrome-extension://abcdef/script.js");
        assert_eq!(router().classify(&request), Decision::Ignore);
    }

    #[test]
    fn test_telemetry_ignored_even_on_own_origin() {
        let request = get("https://www.google-analytics.com/collect?v=1");
        assert_eq!(router().classify(&request), Decision::Ignore);

        // pattern precedence beats the origin rules
        let request = get("https://app.example/collect?event=view");
        assert_eq!(router().classify(&request), Decision::Ignore);
    }

    #[test]
    fn test_same_origin_network_first() {
        assert_eq!(router().classify(&get("https://app.example/index.html")), Decision::NetworkFirst);
        assert_eq!(router().classify(&get("https://app.example/api/posts?page=2")), Decision::NetworkFirst);
    }

    #[test]
    fn test_cross_origin_cache_first() {
        assert_eq!(router().classify(&get("https://fonts.gstatic.com/s/roboto.woff2")), Decision::CacheFirst);
        assert_eq!(router().classify(&get("http://app.example/index.html")), Decision::CacheFirst); // scheme differs
        assert_eq!(router().classify(&get("https://app.example:8443/index.html")), Decision::CacheFirst); // port differs
    }

    #[test]
    fn test_head_is_read_method() {
        let mut request = get("https://app.example/index.html");
        request.method = "HEAD".to_string();
        assert_eq!(router().classify(&request), Decision::NetworkFirst);
    }
}
