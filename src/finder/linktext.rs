//! Link-selector finders: platforms recognized by a characteristic link
//! rather than a rewritable URL shape.

use async_trait::async_trait;
use regex::Regex;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::{LinkPattern, compile_ci_regex};
use super::{Finder, FinderOutcome};

/// A finder that follows the first link matching a fixed selector and keeps
/// the result only when it classifies as PDF.
///
/// An optional site guard makes the applicability test URL-based; without
/// one the finder is content-based and `applies` is always true (a no-match
/// scan costs no network).
pub struct LinkTextFinder {
    finder_name: &'static str,
    site: Option<Regex>,
    selector: LinkPattern,
}

impl LinkTextFinder {
    /// Builds a link finder from an optional site guard and a selector.
    #[must_use]
    pub fn new(finder_name: &'static str, site: Option<&str>, selector: LinkPattern) -> Self {
        Self {
            finder_name,
            site: site.map(compile_ci_regex),
            selector,
        }
    }
}

#[async_trait]
impl Finder for LinkTextFinder {
    fn name(&self) -> &'static str {
        self.finder_name
    }

    fn applies(&self, page: &Page) -> bool {
        self.site
            .as_ref()
            .is_none_or(|re| re.is_match(page.url.as_str()))
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        match nav.follow(page, &self.selector).await {
            Ok(candidate) => Ok(match PdfResource::from_page(&candidate) {
                Some(pdf) => FinderOutcome::Pdf(pdf),
                None => FinderOutcome::NotApplicable,
            }),
            Err(NavError::NotFound { .. }) => Ok(FinderOutcome::NotApplicable),
            Err(err) => Err(err),
        }
    }
}

/// Humana Press: reader link carries `task=readnow`.
#[must_use]
pub fn humana() -> LinkTextFinder {
    LinkTextFinder::new("humana-press", None, LinkPattern::href("task=readnow"))
}

/// Ingenta Connect: delivery link carries a pdf mimetype parameter.
#[must_use]
pub fn ingenta() -> LinkTextFinder {
    LinkTextFinder::new("ingenta-connect", None, LinkPattern::href(r"mimetype=[^&\s]*pdf$"))
}

/// Karger: "Article (PDF ...)" link on the article page.
#[must_use]
pub fn karger() -> LinkTextFinder {
    LinkTextFinder::new(
        "karger",
        Some(r"karger\.com"),
        LinkPattern::text(r"Article\s+\(PDF"),
    )
}

/// J-STAGE: "PDF (nnnK)" link on the article page.
#[must_use]
pub fn jstage() -> LinkTextFinder {
    LinkTextFinder::new(
        "jstage",
        Some(r"jstage\.jst\.go\.jp"),
        LinkPattern::text(r"PDF\s+\(\d+"),
    )
}

/// Landes Bioscience: "Download PDF" link with a relative href.
#[must_use]
pub fn landes() -> LinkTextFinder {
    LinkTextFinder::new(
        "landes-bioscience",
        Some(r"landesbioscience\.com"),
        LinkPattern::text(r"Download\s+PDF"),
    )
}

/// Portland Press Biochemical Journal: bare "PDF" link.
#[must_use]
pub fn biochemj() -> LinkTextFinder {
    LinkTextFinder::new(
        "biochemj",
        Some(r"biochemj\.org|biochemsoctrans\.org"),
        LinkPattern::text(r"^PDF$"),
    )
}
