//! Ordered finder execution with first-success short-circuit.

use tracing::{debug, info};

use crate::classify::PdfResource;
use crate::navigator::{Navigator, Page};

use super::{Finder, FinderOutcome};

/// An ordered collection of finders evaluated strictly in registration
/// order.
///
/// The pipeline stops at the first finder that yields a classified PDF; it
/// does not aggregate or rank candidates. A finder that fails internally is
/// skipped and the scan continues — no single publisher's idiosyncrasies can
/// abort resolution.
pub struct FinderPipeline {
    finders: Vec<Box<dyn Finder>>,
}

impl FinderPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            finders: Vec::new(),
        }
    }

    /// Appends a finder; evaluation order is registration order.
    pub fn register(&mut self, finder: Box<dyn Finder>) {
        debug!(name = finder.name(), "registering finder");
        self.finders.push(finder);
    }

    /// Returns the number of registered finders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.finders.len()
    }

    /// Returns true if no finders are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }

    /// Finder names in evaluation order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.finders.iter().map(|f| f.name()).collect()
    }

    /// Scans `page` with every applicable finder in order and returns the
    /// first classified PDF together with the winning finder's name.
    ///
    /// A [`FinderOutcome::Url`] candidate is fetched and classified here; a
    /// classification mismatch is treated the same as not-applicable and the
    /// scan continues.
    pub async fn scan(&self, nav: &Navigator, page: &Page) -> Option<(PdfResource, &'static str)> {
        for finder in &self.finders {
            if !finder.applies(page) {
                continue;
            }
            debug!(finder = finder.name(), url = %page.url, "trying finder");

            match finder.attempt(nav, page).await {
                Ok(FinderOutcome::Pdf(pdf)) => {
                    info!(finder = finder.name(), url = %pdf.url, "finder located reprint");
                    return Some((pdf, finder.name()));
                }
                Ok(FinderOutcome::Url(candidate)) => match nav.fetch(&candidate).await {
                    Ok(fetched) => {
                        if let Some(pdf) = PdfResource::from_page(&fetched) {
                            info!(finder = finder.name(), url = %pdf.url, "finder located reprint");
                            return Some((pdf, finder.name()));
                        }
                        debug!(
                            finder = finder.name(),
                            candidate, "candidate did not classify as PDF, trying next finder"
                        );
                    }
                    Err(error) => {
                        debug!(finder = finder.name(), %error, "candidate fetch failed, trying next finder");
                    }
                },
                Ok(FinderOutcome::NotApplicable) => {}
                Err(error) => {
                    debug!(finder = finder.name(), %error, "finder failed, trying next");
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for FinderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderPipeline")
            .field("finder_count", &self.finders.len())
            .field("finders", &self.names())
            .finish()
    }
}

impl Default for FinderPipeline {
    fn default() -> Self {
        Self::new()
    }
}
