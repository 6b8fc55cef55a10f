//! Publisher-specific PDF finder strategies and their ordered pipeline.
//!
//! Each publisher platform is represented by one [`Finder`]: a stateless
//! strategy that recognizes its platform from the current page's URL,
//! performs a bounded sequence of navigation steps or a pure URL rewrite,
//! and yields a classified PDF, a candidate URL, or "not applicable."
//!
//! The default pipeline holds finders in a fixed, explicit order — more
//! specific platform matches before broad catch-alls, with the generic
//! pdf-link finder deliberately last so it never shadows a precise rule.

mod frames;
mod generic;
mod linktext;
mod nature;
mod pipeline;
mod pmc;
mod rewrite;
pub mod rules;
mod sciencedirect;
mod wiley;

pub use frames::ReprintFrameFinder;
pub use generic::GenericPdfLinkFinder;
pub use linktext::LinkTextFinder;
pub use nature::NatureFinder;
pub use pipeline::FinderPipeline;
pub use pmc::PmcFinder;
pub use rewrite::RewriteFinder;
pub use sciencedirect::ScienceDirectFinder;
pub use wiley::WileyFinder;

use async_trait::async_trait;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

/// Result of a single finder's attempt on a page.
#[derive(Debug)]
pub enum FinderOutcome {
    /// A classified PDF, ready to persist
    Pdf(PdfResource),
    /// A candidate URL for the pipeline to fetch and classify
    Url(String),
    /// This finder does not recognize the page
    NotApplicable,
}

/// A named, stateless strategy that locates a PDF from a publisher's page.
///
/// Finders never retain state between invocations and have no side effects
/// beyond the network calls they issue through the [`Navigator`]. A finder
/// that fails internally is treated by the pipeline as not applicable; it
/// can never abort a resolution.
#[async_trait]
pub trait Finder: Send + Sync {
    /// Returns the finder's name (e.g. "nature", "generic").
    fn name(&self) -> &'static str;

    /// Cheap applicability test against the current page's URL; no network.
    ///
    /// Content-based finders (frame and generic link scans) return `true`
    /// unconditionally — their no-match case costs nothing because
    /// [`Navigator::follow`] only fetches after a link matches.
    fn applies(&self, page: &Page) -> bool;

    /// Attempts to locate a PDF from `page`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError`] when a navigation step fails; the pipeline
    /// treats this identically to [`FinderOutcome::NotApplicable`].
    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError>;
}

/// Builds the default finder pipeline used by resolution flows.
///
/// Order is deterministic: platform-specific navigation finders first, then
/// the structured rewrite families, then link-text finders, then the broad
/// catch-alls, with the generic pdf-link finder always last.
#[must_use]
pub fn build_default_pipeline() -> FinderPipeline {
    let mut pipeline = FinderPipeline::new();

    pipeline.register(Box::new(ScienceDirectFinder::new()));
    pipeline.register(Box::new(NatureFinder::new()));
    pipeline.register(Box::new(WileyFinder::new()));
    pipeline.register(Box::new(PmcFinder::new()));

    pipeline.register(Box::new(rewrite::springer_link()));
    pipeline.register(Box::new(rewrite::metapress()));
    pipeline.register(Box::new(rewrite::royal_society()));
    pipeline.register(Box::new(rewrite::doi_pdf()));
    pipeline.register(Box::new(rewrite::biomedcentral()));
    pipeline.register(Box::new(rewrite::highwire()));
    pipeline.register(Box::new(rewrite::acs()));
    pipeline.register(Box::new(rewrite::aps()));
    pipeline.register(Box::new(rewrite::plos()));
    pipeline.register(Box::new(rewrite::apa()));
    pipeline.register(Box::new(rewrite::lww()));
    pipeline.register(Box::new(rewrite::ecm()));

    pipeline.register(Box::new(linktext::humana()));
    pipeline.register(Box::new(linktext::ingenta()));
    pipeline.register(Box::new(linktext::karger()));
    pipeline.register(Box::new(linktext::jstage()));
    pipeline.register(Box::new(linktext::landes()));
    pipeline.register(Box::new(linktext::biochemj()));

    pipeline.register(Box::new(rewrite::html_to_pdf()));
    pipeline.register(Box::new(ReprintFrameFinder::new()));
    pipeline.register(Box::new(GenericPdfLinkFinder::new()));

    pipeline
}
