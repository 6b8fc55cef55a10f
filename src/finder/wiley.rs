//! Wiley Interscience finder.
//!
//! Two generations of layout: modern article IDs rewrite straight to the
//! `download.interscience.wiley.com` fulltext endpoint; the older layout
//! needs a "PDF" link hop into a `main` frame carrying `mode=pdf`.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::{FramePattern, LinkPattern, compile_ci_regex};
use super::{Finder, FinderOutcome};

const FULLTEXT_ENDPOINT: &str = "http://download.interscience.wiley.com/cgi-bin/fulltext";

static CGI_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_ci_regex(r"interscience\.wiley\.com/cgi-bin/\w+/(\d+)/"));
static JOURNAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_ci_regex(r"interscience\.wiley\.com/journal/(\d+)/abstract"));
static PDFSTART_LINK: LazyLock<LinkPattern> = LazyLock::new(|| LinkPattern::new("pdf", "pdfstart"));
static MAIN_FRAME: LazyLock<FramePattern> = LazyLock::new(|| FramePattern::new("main", "mode=pdf"));

/// Finder for `interscience.wiley.com` pages.
pub struct WileyFinder;

impl WileyFinder {
    /// Creates the finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for WileyFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Finder for WileyFinder {
    fn name(&self) -> &'static str {
        "wiley"
    }

    fn applies(&self, page: &Page) -> bool {
        page.url
            .as_str()
            .to_ascii_lowercase()
            .contains("interscience.wiley.com")
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        let url = page.url.as_str();
        let article_id = CGI_ID_RE
            .captures(url)
            .or_else(|| JOURNAL_ID_RE.captures(url))
            .map(|caps| caps[1].to_string());

        if let Some(id) = article_id {
            return Ok(FinderOutcome::Url(format!(
                "{FULLTEXT_ENDPOINT}?ID={id}&mode=pdf"
            )));
        }

        // Older layout: PDFSTART link opens a frameset; the PDF lives in the
        // frame named "main".
        let frameset = nav.follow(page, &PDFSTART_LINK).await?;
        let candidate = nav.follow_frame(&frameset, &MAIN_FRAME).await?;
        Ok(match PdfResource::from_page(&candidate) {
            Some(pdf) => FinderOutcome::Pdf(pdf),
            None => FinderOutcome::NotApplicable,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    fn html_page(url: &str) -> Page {
        Page::new(
            Url::parse(url).unwrap(),
            200,
            Some("text/html".to_string()),
            b"<html></html>".to_vec(),
        )
    }

    #[tokio::test]
    async fn test_cgi_bin_layout_rewrites_to_fulltext_endpoint() {
        let finder = WileyFinder::new();
        let nav = Navigator::new().unwrap();
        let page = html_page("http://www3.interscience.wiley.com/cgi-bin/abstract/114803237/ABSTRACT");
        match finder.attempt(&nav, &page).await.unwrap() {
            FinderOutcome::Url(candidate) => assert_eq!(
                candidate,
                "http://download.interscience.wiley.com/cgi-bin/fulltext?ID=114803237&mode=pdf"
            ),
            other => panic!("expected Url outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_journal_abstract_layout_rewrites_to_fulltext_endpoint() {
        let finder = WileyFinder::new();
        let nav = Navigator::new().unwrap();
        let page = html_page("http://www3.interscience.wiley.com/journal/114803237/abstract");
        match finder.attempt(&nav, &page).await.unwrap() {
            FinderOutcome::Url(candidate) => assert!(candidate.contains("ID=114803237")),
            other => panic!("expected Url outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_applies_only_to_interscience() {
        let finder = WileyFinder::new();
        assert!(finder.applies(&html_page(
            "http://www3.interscience.wiley.com/journal/114803237/abstract"
        )));
        assert!(!finder.applies(&html_page("https://journal.example.com/abstract")));
    }
}
