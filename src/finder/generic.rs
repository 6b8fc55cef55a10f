//! Generic pdf-link finder: the deliberate catch-all.
//!
//! Matches any link whose text mentions pdf/full text/reprint and whose href
//! ends in a PDF extension. Placed last in the pipeline so it never shadows
//! a more precise platform rule.

use std::sync::LazyLock;

use async_trait::async_trait;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::LinkPattern;
use super::{Finder, FinderOutcome};

static GENERIC_LINK: LazyLock<LinkPattern> =
    LazyLock::new(|| LinkPattern::new(r"pdf|full[\s-]?text|reprint", r"\.pdf$"));

/// The catch-all pdf-link finder.
pub struct GenericPdfLinkFinder;

impl GenericPdfLinkFinder {
    /// Creates the finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericPdfLinkFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Finder for GenericPdfLinkFinder {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn applies(&self, _page: &Page) -> bool {
        true
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        match nav.follow(page, &GENERIC_LINK).await {
            Ok(candidate) => Ok(match PdfResource::from_page(&candidate) {
                Some(pdf) => FinderOutcome::Pdf(pdf),
                None => FinderOutcome::NotApplicable,
            }),
            Err(NavError::NotFound { .. }) => Ok(FinderOutcome::NotApplicable),
            Err(err) => Err(err),
        }
    }
}
