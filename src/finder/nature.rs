//! Nature Publishing Group finder.
//!
//! `nature.com/doifinder/...` pages link to the article's full text; article
//! URLs themselves rewrite from `/abs|full/<key>.html` to `/pdf/<key>.pdf`.

use std::sync::LazyLock;

use async_trait::async_trait;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::{LinkPattern, RewriteRule};
use super::{Finder, FinderOutcome};

static FULL_TEXT_LINK: LazyLock<LinkPattern> = LazyLock::new(|| LinkPattern::text(r"full\s+text"));
static PDF_REWRITE: LazyLock<RewriteRule> = LazyLock::new(|| {
    RewriteRule::new(
        r"nature\.com",
        r"nature\.com/(\S+)/(?:abs|full)/([\w.-]+)\.html\S*$",
        "nature.com/$1/pdf/$2.pdf",
    )
});

/// Finder for `nature.com` article and doifinder pages.
pub struct NatureFinder;

impl NatureFinder {
    /// Creates the finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NatureFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Finder for NatureFinder {
    fn name(&self) -> &'static str {
        "nature"
    }

    fn applies(&self, page: &Page) -> bool {
        page.url.as_str().to_ascii_lowercase().contains("nature.com")
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        if page
            .url
            .as_str()
            .to_ascii_lowercase()
            .contains("nature.com/doifinder/")
        {
            // Hop to the article, then rewrite its resolved URL.
            let article = nav.follow(page, &FULL_TEXT_LINK).await?;
            let Some(pdf_url) = PDF_REWRITE.apply(article.url.as_str()) else {
                return Ok(FinderOutcome::NotApplicable);
            };
            let candidate = nav.fetch(&pdf_url).await?;
            return Ok(match PdfResource::from_page(&candidate) {
                Some(pdf) => FinderOutcome::Pdf(pdf),
                None => FinderOutcome::NotApplicable,
            });
        }

        match PDF_REWRITE.apply(page.url.as_str()) {
            Some(pdf_url) => Ok(FinderOutcome::Url(pdf_url)),
            None => Ok(FinderOutcome::NotApplicable),
        }
    }
}
