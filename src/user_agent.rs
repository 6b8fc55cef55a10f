//! Shared User-Agent string for all outbound HTTP traffic.
//!
//! Single source for project URL and UA format so indexing-service and
//! publisher traffic stay consistent and easy to update (RFC 9308).

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/marcora/pdfetch";

/// Default User-Agent for navigator requests (single shared format; no
/// per-finder name in header so traffic is not fingerprintable per site).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("pdfetch/{version} (reprint-archiver; +{PROJECT_UA_URL})")
}
