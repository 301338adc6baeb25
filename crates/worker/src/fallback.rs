//! Fallback synthesis.
//!
//! When neither network nor store can satisfy a request, the executors
//! hand the caller a well-formed substitute instead of an error. Each
//! substitute has a fixed shape per cause; none of them is ever written
//! to the store.

use brolly_core::ResponseRecord;

/// Inline placeholder served for image requests that cannot be satisfied.
const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300"><rect width="400" height="300" fill="#e2e2e2"/><text x="200" y="150" font-family="sans-serif" font-size="20" fill="#555555" text-anchor="middle">image unavailable offline</text></svg>"##;

/// Stub body served for third-party scripts so the caller logs instead of
/// throwing on a missing script.
const SCRIPT_STUB: &str = "console.info('brolly: script unavailable offline');\n";

const GENERIC_BODY: &str = "resource unavailable offline\n";

/// Cause of a synthesized response.
///
/// The navigation fallback is not synthesized; it is the stored root
/// document and is served directly from the static store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Inline SVG placeholder for image requests.
    Image,
    /// Empty stylesheet, mainly for unreachable font hosts.
    Stylesheet,
    /// Informational stub for unreachable third-party scripts.
    Script,
    /// Plain-text failure body with the given status code.
    Generic { status: u16 },
}

/// Build the substitute response for a fallback cause.
pub fn synthesize(kind: FallbackKind) -> ResponseRecord {
    match kind {
        FallbackKind::Image => ResponseRecord::with_content_type(200, "OK", "image/svg+xml", PLACEHOLDER_SVG),
        FallbackKind::Stylesheet => ResponseRecord::with_content_type(200, "OK", "text/css", ""),
        FallbackKind::Script => ResponseRecord::with_content_type(200, "OK", "application/javascript", SCRIPT_STUB),
        FallbackKind::Generic { status } => {
            ResponseRecord::with_content_type(status, status_text(status), "text/plain", GENERIC_BODY)
        }
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        408 => "Request Timeout",
        503 => "Service Unavailable",
        _ => "Error",
    }
}
