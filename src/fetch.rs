//! Resolution orchestration: identifier → outbound-link page → finder scan →
//! mirror fallback → local store.
//!
//! Per request the flow is a small state machine: the store is probed before
//! any network activity; the indexing service's outbound-link page is
//! fetched and may itself be the PDF; otherwise the finder pipeline scans it
//! in order; and when every finder declines, the central-repository mirror
//! URL — built purely from the identifier's kind — is tried exactly once.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::classify::PdfResource;
use crate::finder::{FinderPipeline, build_default_pipeline};
use crate::ident::Identifier;
use crate::navigator::{NavError, Navigator, Page};
use crate::store::{CatalogEntry, Store, StoreError};

const DEFAULT_EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_MIRROR_BASE: &str = "https://www.pubmedcentral.nih.gov";

/// Finder name recorded when the outbound page itself is the PDF.
const DIRECT_FINDER: &str = "direct";
/// Finder name recorded when the mirror fallback produced the PDF.
const FALLBACK_FINDER: &str = "fallback-mirror";

/// Successful resolution result.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The reprint was already stored; no network activity occurred
    CacheHit(CatalogEntry),
    /// The reprint was fetched and stored during this call
    Fetched {
        /// The new catalog entry
        entry: CatalogEntry,
        /// Name of the finder that located the PDF ("direct" for an
        /// outbound-page hit, "fallback-mirror" for the fallback)
        finder: &'static str,
    },
}

impl FetchOutcome {
    /// The catalog entry regardless of how it was obtained.
    #[must_use]
    pub fn entry(&self) -> &CatalogEntry {
        match self {
            Self::CacheHit(entry) | Self::Fetched { entry, .. } => entry,
        }
    }
}

/// Resolution failure, returned as a value — a failed resolution is a
/// well-formed outcome, never a panic.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every strategy and the fallback failed to produce a PDF
    #[error("no PDF could be located for '{identifier}'")]
    NotFound {
        /// The identifier that could not be resolved
        identifier: Identifier,
        /// Last URL attempted, for diagnostics
        last_url: Option<String>,
    },

    /// The reprint was found but could not be persisted
    #[error("failed to store reprint for '{identifier}'")]
    Store {
        /// The identifier being stored
        identifier: Identifier,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// The local store could not be probed
    #[error(transparent)]
    Probe(#[from] StoreError),
}

/// Orchestrates resolutions against one store.
///
/// Independent requests may run concurrently through a shared `Fetcher`;
/// within one request, finder evaluation is strictly sequential.
pub struct Fetcher {
    navigator: Navigator,
    pipeline: FinderPipeline,
    store: Store,
    eutils_base: String,
    mirror_base: String,
}

impl Fetcher {
    /// Creates a fetcher with the default finder pipeline and service
    /// endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Client`] when the HTTP client cannot be built.
    pub fn new(store: Store) -> Result<Self, NavError> {
        Self::with_base_urls(store, DEFAULT_EUTILS_BASE, DEFAULT_MIRROR_BASE)
    }

    /// Creates a fetcher with custom indexing-service and mirror endpoints
    /// (for tests).
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Client`] when the HTTP client cannot be built.
    pub fn with_base_urls(
        store: Store,
        eutils_base: impl Into<String>,
        mirror_base: impl Into<String>,
    ) -> Result<Self, NavError> {
        Ok(Self {
            navigator: Navigator::new()?,
            pipeline: build_default_pipeline(),
            store,
            eutils_base: eutils_base.into().trim_end_matches('/').to_string(),
            mirror_base: mirror_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// The store this fetcher persists into.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Resolves `id` to a locally stored PDF.
    ///
    /// `source_url` optionally names an already-known article page (the
    /// browser-extension entry path); when absent, the indexing service's
    /// outbound-link page is used for PubMed IDs, and PMC IDs / DOIs go
    /// straight to the mirror fallback.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] when every finder and the fallback
    /// fail; [`FetchError::Store`] when persistence fails after a PDF was
    /// located.
    #[instrument(skip(self), fields(identifier = %id))]
    pub async fn fetch(
        &self,
        id: &Identifier,
        source_url: Option<&str>,
    ) -> Result<FetchOutcome, FetchError> {
        if let Some(entry) = self.store.get(id)? {
            debug!(path = %entry.path.display(), "reprint already stored");
            return Ok(FetchOutcome::CacheHit(entry));
        }

        let mut last_url: Option<String> = None;

        let outbound_url = source_url
            .map(str::to_string)
            .or_else(|| self.outbound_url(id));

        if let Some(outbound_url) = outbound_url {
            last_url = Some(outbound_url.clone());
            match self.navigator.fetch(&outbound_url).await {
                Ok(page) => {
                    last_url = Some(page.url.to_string());
                    if let Some(outcome) = self.scan_page(id, &page).await? {
                        return Ok(outcome);
                    }
                }
                Err(error) => {
                    warn!(%error, "outbound-link page could not be fetched");
                }
            }
        }

        let fallback_url = self.fallback_url(id);
        debug!(url = %fallback_url, "trying mirror fallback");
        last_url = Some(fallback_url.clone());
        if let Ok(page) = self.navigator.fetch(&fallback_url).await
            && let Some(pdf) = PdfResource::from_page(&page)
        {
            return Ok(self.persist(id, &pdf, FALLBACK_FINDER).await?);
        }

        info!("resolution failed; no finder or fallback produced a PDF");
        Err(FetchError::NotFound {
            identifier: id.clone(),
            last_url,
        })
    }

    /// Classifies the outbound page directly, then runs the finder scan.
    async fn scan_page(
        &self,
        id: &Identifier,
        page: &Page,
    ) -> Result<Option<FetchOutcome>, FetchError> {
        if let Some(pdf) = PdfResource::from_page(page) {
            debug!("outbound page is itself the PDF");
            return Ok(Some(self.persist(id, &pdf, DIRECT_FINDER).await?));
        }

        match self.pipeline.scan(&self.navigator, page).await {
            Some((pdf, finder)) => Ok(Some(self.persist(id, &pdf, finder).await?)),
            None => Ok(None),
        }
    }

    async fn persist(
        &self,
        id: &Identifier,
        pdf: &PdfResource,
        finder: &'static str,
    ) -> Result<FetchOutcome, FetchError> {
        let entry = self
            .store
            .put(id, &pdf.bytes)
            .await
            .map_err(|source| FetchError::Store {
                identifier: id.clone(),
                source,
            })?;
        info!(
            finder,
            source_url = %pdf.url,
            path = %entry.path.display(),
            bytes = entry.size,
            "reprint fetched and stored"
        );
        Ok(FetchOutcome::Fetched { entry, finder })
    }

    /// The indexing service's outbound-link page URL; only PubMed IDs have
    /// one.
    fn outbound_url(&self, id: &Identifier) -> Option<String> {
        match id {
            Identifier::Pmid(pmid) => Some(format!(
                "{}/elink.fcgi?dbfrom=pubmed&id={pmid}&retmode=ref&cmd=prlinks",
                self.eutils_base
            )),
            Identifier::Pmcid(_) | Identifier::Doi(_) => None,
        }
    }

    /// The mirror fallback URL, templated per identifier kind.
    fn fallback_url(&self, id: &Identifier) -> String {
        match id {
            Identifier::Pmid(pmid) => format!(
                "{}/picrender.fcgi?pubmedid={pmid}&blobtype=pdf",
                self.mirror_base
            ),
            Identifier::Pmcid(pmcid) => format!(
                "{}/picrender.fcgi?artid={}&blobtype=pdf",
                self.mirror_base,
                pmcid.trim_start_matches("PMC")
            ),
            Identifier::Doi(doi) => format!(
                "{}/picrender.fcgi?doi={}&blobtype=pdf",
                self.mirror_base,
                urlencoding::encode(doi)
            ),
        }
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("store_dir", &self.store.dir())
            .field("eutils_base", &self.eutils_base)
            .field("mirror_base", &self.mirror_base)
            .field("finder_count", &self.pipeline.len())
            .finish_non_exhaustive()
    }
}
