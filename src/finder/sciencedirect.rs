//! Elsevier finder: linking-hub hop plus ScienceDirect article-page scan.
//!
//! The indexing service routes Elsevier articles through
//! `linkinghub.elsevier.com`, whose page links to the real ScienceDirect
//! article; the article page embeds the `sdarticle.pdf` URL in its body.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::{LinkPattern, compile_ci_regex};
use super::{Finder, FinderOutcome};

static SDARTICLE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_ci_regex(r#"https?://[^\s"'<>]*sdarticle\.pdf[^\s"'<>]*"#));
static HUB_LINK: LazyLock<LinkPattern> =
    LazyLock::new(|| LinkPattern::new("sciencedirect", "sciencedirect"));
static SDARTICLE_LINK: LazyLock<LinkPattern> =
    LazyLock::new(|| LinkPattern::href(r"sdarticle\.pdf$"));

/// Finder for `linkinghub.elsevier.com` and `sciencedirect.com` pages.
pub struct ScienceDirectFinder;

impl ScienceDirectFinder {
    /// Creates the finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScienceDirectFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Finder for ScienceDirectFinder {
    fn name(&self) -> &'static str {
        "sciencedirect"
    }

    fn applies(&self, page: &Page) -> bool {
        let url = page.url.as_str().to_ascii_lowercase();
        url.contains("linkinghub.elsevier.com") || url.contains("sciencedirect.com")
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        let hopped;
        let article = if page
            .url
            .as_str()
            .to_ascii_lowercase()
            .contains("linkinghub.elsevier.com")
        {
            hopped = nav.follow(page, &HUB_LINK).await?;
            &hopped
        } else {
            page
        };

        // The article page embeds the absolute PDF URL in its markup.
        if let Some(found) = SDARTICLE_URL_RE.find(&String::from_utf8_lossy(&article.body)) {
            return Ok(FinderOutcome::Url(found.as_str().to_string()));
        }

        match nav.follow(article, &SDARTICLE_LINK).await {
            Ok(candidate) => Ok(match PdfResource::from_page(&candidate) {
                Some(pdf) => FinderOutcome::Pdf(pdf),
                None => FinderOutcome::NotApplicable,
            }),
            Err(NavError::NotFound { .. }) => Ok(FinderOutcome::NotApplicable),
            Err(err) => Err(err),
        }
    }
}
