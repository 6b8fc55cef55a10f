//! PubMed Central finder.
//!
//! Article-render URLs rewrite directly to the `picrender` PDF endpoint;
//! other PMC pages carry an explicit `blobtype=pdf` link.

use std::sync::LazyLock;

use async_trait::async_trait;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::{LinkPattern, RewriteRule};
use super::{Finder, FinderOutcome};

static RENDER_REWRITE: LazyLock<RewriteRule> = LazyLock::new(|| {
    RewriteRule::new(
        r"articlerender\.fcgi",
        r"/articlerender\.fcgi\?(?:\S*?&)?artid=(\d+)\S*$",
        "/picrender.fcgi?artid=$1&blobtype=pdf",
    )
});
static BLOBTYPE_LINK: LazyLock<LinkPattern> = LazyLock::new(|| LinkPattern::new("pdf", "blobtype=pdf"));

/// Finder for PubMed Central hosted articles.
pub struct PmcFinder;

impl PmcFinder {
    /// Creates the finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PmcFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Finder for PmcFinder {
    fn name(&self) -> &'static str {
        "pubmed-central"
    }

    fn applies(&self, page: &Page) -> bool {
        let url = page.url.as_str().to_ascii_lowercase();
        url.contains("pubmedcentral") || url.contains("articlerender.fcgi")
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        if let Some(pdf_url) = RENDER_REWRITE.apply(page.url.as_str()) {
            return Ok(FinderOutcome::Url(pdf_url));
        }

        match nav.follow(page, &BLOBTYPE_LINK).await {
            Ok(candidate) => Ok(match PdfResource::from_page(&candidate) {
                Some(pdf) => FinderOutcome::Pdf(pdf),
                None => FinderOutcome::NotApplicable,
            }),
            Err(NavError::NotFound { .. }) => Ok(FinderOutcome::NotApplicable),
            Err(err) => Err(err),
        }
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
    async fn test_articlerender_rewrites_to_picrender() {
        let finder = PmcFinder::new();
        let nav = Navigator::new().unwrap();
        let page = html_page(
            "http://www.pubmedcentral.nih.gov/articlerender.fcgi?artid=1698864&rendertype=abstract",
        );
        match finder.attempt(&nav, &page).await.unwrap() {
            FinderOutcome::Url(candidate) => assert_eq!(
                candidate,
                "http://www.pubmedcentral.nih.gov/picrender.fcgi?artid=1698864&blobtype=pdf"
            ),
            other => panic!("expected Url outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_articlerender_with_leading_params() {
        let finder = PmcFinder::new();
        let nav = Navigator::new().unwrap();
        let page = html_page(
            "http://www.pubmedcentral.nih.gov/articlerender.fcgi?tool=x&artid=1698864",
        );
        match finder.attempt(&nav, &page).await.unwrap() {
            FinderOutcome::Url(candidate) => {
                assert!(candidate.ends_with("/picrender.fcgi?artid=1698864&blobtype=pdf"));
            }
            other => panic!("expected Url outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_applies_to_pmc_hosts() {
        let finder = PmcFinder::new();
        assert!(finder.applies(&html_page(
            "http://www.pubmedcentral.nih.gov/articlerender.fcgi?artid=1698864"
        )));
        assert!(!finder.applies(&html_page("https://journal.example.com/article")));
    }
}
