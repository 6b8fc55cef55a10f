//! Stateful HTTP navigation: fetch a URL, follow in-page links and frames.
//!
//! The [`Navigator`] wraps a shared `reqwest` client with the project's
//! networking policy (timeouts, User-Agent, gzip, redirect following) and
//! exposes the three operations the finder pipeline is built from:
//! [`fetch`](Navigator::fetch), [`follow`](Navigator::follow), and
//! [`follow_frame`](Navigator::follow_frame).

mod page;

pub use page::{Frame, Link, Page};

use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::finder::rules::{FramePattern, LinkPattern};
use crate::user_agent;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Largest response body the navigator will buffer. Publisher pages and
/// article PDFs fit comfortably; anything larger is treated as a fetch
/// failure rather than held in memory.
const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Errors from navigation operations.
///
/// Callers treat [`NotFound`](NavError::NotFound) and
/// [`Fetch`](NavError::Fetch) identically: abandon the current strategy and
/// move on. Neither aborts a resolution.
#[derive(Debug, Error)]
pub enum NavError {
    /// No link or frame on the page matched the selector
    #[error("no matching link or frame on page '{page_url}'")]
    NotFound {
        /// URL of the page that was searched
        page_url: String,
    },

    /// Network failure, DNS failure, timeout, or oversized body
    #[error("fetch failed for '{url}'")]
    Fetch {
        /// The URL that could not be fetched
        url: String,
    },

    /// HTTP client construction failed
    #[error("HTTP client construction failed: {reason}")]
    Client {
        /// Builder error description
        reason: String,
    },
}

/// HTTP client abstraction over publisher pages.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Navigator {
    client: Client,
}

impl Navigator {
    /// Creates a navigator with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Client`] when client construction fails.
    pub fn new() -> Result<Self, NavError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a navigator with explicit connect/read timeouts in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Client`] when client construction fails.
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Self, NavError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .cookie_store(true)
            .build()
            .map_err(|e| NavError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Fetches `url` with a GET, following server-side redirects, and
    /// returns the resulting page.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Fetch`] on network failure, timeout, or a body
    /// exceeding the buffer limit.
    pub async fn fetch(&self, url: &str) -> Result<Page, NavError> {
        let fetch_failed = || NavError::Fetch {
            url: url.to_string(),
        };

        let response = self
            .client
            .get(url)
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await
            .map_err(|error| {
                debug!(url, %error, "fetch failed");
                fetch_failed()
            })?;

        if response.content_length().is_some_and(|len| len > MAX_BODY_BYTES) {
            debug!(url, "response body exceeds buffer limit");
            return Err(fetch_failed());
        }

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|error| {
            debug!(url, %error, "body read failed");
            fetch_failed()
        })?;
        if body.len() as u64 > MAX_BODY_BYTES {
            debug!(url, "response body exceeds buffer limit");
            return Err(fetch_failed());
        }

        Ok(Page::new(final_url, status, content_type, body.to_vec()))
    }

    /// Locates the first link on `page` matching `selector` and fetches it.
    ///
    /// First match wins: when a page carries several candidate links (e.g.
    /// article and supplementary PDFs), the earliest in document order is
    /// taken.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::NotFound`] when no link matches — callers treat
    /// this as "try the next selector/strategy", not a failure. Propagates
    /// [`NavError::Fetch`] from the underlying fetch.
    pub async fn follow(&self, page: &Page, selector: &LinkPattern) -> Result<Page, NavError> {
        let Some(link) = page.links().iter().find(|link| selector.matches(link)) else {
            return Err(NavError::NotFound {
                page_url: page.url.to_string(),
            });
        };
        let target = absolutize(&link.href, &page.url).ok_or_else(|| NavError::NotFound {
            page_url: page.url.to_string(),
        })?;
        debug!(from = %page.url, to = %target, text = %link.text, "following link");
        self.fetch(&target).await
    }

    /// Locates the first frame on `page` matching `selector` and fetches its
    /// source. Same first-match-wins policy as [`follow`](Self::follow).
    ///
    /// # Errors
    ///
    /// Returns [`NavError::NotFound`] when no frame matches; propagates
    /// [`NavError::Fetch`] from the underlying fetch.
    pub async fn follow_frame(&self, page: &Page, selector: &FramePattern) -> Result<Page, NavError> {
        let Some(frame) = page.frames().iter().find(|frame| selector.matches(frame)) else {
            return Err(NavError::NotFound {
                page_url: page.url.to_string(),
            });
        };
        let target = absolutize(&frame.src, &page.url).ok_or_else(|| NavError::NotFound {
            page_url: page.url.to_string(),
        })?;
        debug!(from = %page.url, to = %target, name = %frame.name, "following frame");
        self.fetch(&target).await
    }
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or
/// `https://`; normalizes `//...` to `https:...`; otherwise joins with
/// `base_url`.
#[must_use]
pub fn absolutize(value: &str, base_url: &Url) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_absolutize_absolute_unchanged() {
        let base = Url::parse("https://journal.example.com/toc/").unwrap();
        assert_eq!(
            absolutize("https://other.example.com/p.pdf", &base),
            Some("https://other.example.com/p.pdf".to_string())
        );
    }

    #[test]
    fn test_absolutize_protocol_relative_and_relative() {
        let base = Url::parse("https://journal.example.com/toc/").unwrap();
        assert_eq!(
            absolutize("//cdn.example.com/p.pdf", &base),
            Some("https://cdn.example.com/p.pdf".to_string())
        );
        assert_eq!(
            absolutize("p.pdf", &base),
            Some("https://journal.example.com/toc/p.pdf".to_string())
        );
        assert_eq!(
            absolutize("/root.pdf", &base),
            Some("https://journal.example.com/root.pdf".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_page_with_status_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let nav = Navigator::new().unwrap();
        let page = nav.fetch(&format!("{}/article", server.uri())).await.unwrap();
        assert_eq!(page.status, 200);
        assert!(page.content_type.as_deref().unwrap().contains("text/html"));
        assert!(page.body.starts_with(b"<html>"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fetch_error_with_url() {
        // Nothing listens on this port
        let nav = Navigator::with_timeouts(1, 1).unwrap();
        let err = nav.fetch("http://127.0.0.1:1/nope").await.unwrap_err();
        match err {
            NavError::Fetch { url } => assert!(url.contains("127.0.0.1")),
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_follow_first_match_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/first.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("first", "application/pdf"))
            .mount(&server)
            .await;

        let body = r#"<a href="/first.pdf">PDF</a> <a href="/second.pdf">PDF</a>"#;
        let page = Page::new(
            Url::parse(&server.uri()).unwrap(),
            200,
            Some("text/html".to_string()),
            body.as_bytes().to_vec(),
        );

        let nav = Navigator::new().unwrap();
        let next = nav
            .follow(&page, &LinkPattern::new("pdf", r"\.pdf$"))
            .await
            .unwrap();
        assert_eq!(next.body, b"first");
    }

    #[tokio::test]
    async fn test_follow_not_found_makes_no_request() {
        let server = MockServer::start().await;
        let page = Page::new(
            Url::parse(&server.uri()).unwrap(),
            200,
            Some("text/html".to_string()),
            b"<a href=\"/abs\">Abstract</a>".to_vec(),
        );

        let nav = Navigator::new().unwrap();
        let err = nav
            .follow(&page, &LinkPattern::new("pdf", r"\.pdf$"))
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::NotFound { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_follow_frame_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reprint/body"))
            .respond_with(ResponseTemplate::new(200).set_body_string("frame body"))
            .mount(&server)
            .await;

        let body = r#"<frame name="reprint" src="/reprint/body">"#;
        let page = Page::new(
            Url::parse(&server.uri()).unwrap(),
            200,
            Some("text/html".to_string()),
            body.as_bytes().to_vec(),
        );

        let nav = Navigator::new().unwrap();
        let next = nav
            .follow_frame(&page, &FramePattern::name("reprint"))
            .await
            .unwrap();
        assert_eq!(next.body, b"frame body");
    }
}
