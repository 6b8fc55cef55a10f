//! Data-driven URL-rewrite finder and the per-platform rule catalog.
//!
//! Most publisher platforms expose the PDF at a URL derivable from the
//! abstract/full-text URL by a pure string rewrite. Each such platform is a
//! [`RewriteFinder`] instance built from [`RewriteRule`] values, so the
//! rules stay independently testable and adding a platform is a data change.

use async_trait::async_trait;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::RewriteRule;
use super::{Finder, FinderOutcome};

/// A finder that derives candidate PDF URLs by rewriting the current page's
/// URL through an ordered rule list.
///
/// With a single candidate the rewritten URL is handed back to the pipeline
/// to fetch and classify; with several candidates (platforms with more than
/// one historical PDF endpoint) they are fetched here in order and the first
/// one that classifies as PDF wins.
pub struct RewriteFinder {
    finder_name: &'static str,
    rules: Vec<RewriteRule>,
}

impl RewriteFinder {
    /// Builds a rewrite finder from an ordered rule list.
    #[must_use]
    pub fn new(finder_name: &'static str, rules: Vec<RewriteRule>) -> Self {
        Self { finder_name, rules }
    }

    fn candidates(&self, url: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for rule in &self.rules {
            if let Some(rewritten) = rule.apply(url)
                && !seen.contains(&rewritten)
            {
                seen.push(rewritten);
            }
        }
        seen
    }
}

#[async_trait]
impl Finder for RewriteFinder {
    fn name(&self) -> &'static str {
        self.finder_name
    }

    fn applies(&self, page: &Page) -> bool {
        let url = page.url.as_str();
        self.rules.iter().any(|rule| rule.applies_to(url))
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        let mut candidates = self.candidates(page.url.as_str());

        if candidates.is_empty() {
            return Ok(FinderOutcome::NotApplicable);
        }
        if candidates.len() == 1 {
            return Ok(FinderOutcome::Url(candidates.remove(0)));
        }

        for candidate in candidates {
            if let Ok(fetched) = nav.fetch(&candidate).await
                && let Some(pdf) = PdfResource::from_page(&fetched)
            {
                return Ok(FinderOutcome::Pdf(pdf));
            }
        }
        Ok(FinderOutcome::NotApplicable)
    }
}

/// SpringerLink: `/content/<key>/...` → `/content/<key>/fulltext.pdf`.
#[must_use]
pub fn springer_link() -> RewriteFinder {
    RewriteFinder::new(
        "springer-link",
        vec![RewriteRule::new(
            r"springerlink\.com",
            r"/content/(\w+)(?:/\S*)?$",
            "/content/$1/fulltext.pdf",
        )],
    )
}

/// MetaPress-hosted journals: same fulltext.pdf layout as SpringerLink.
#[must_use]
pub fn metapress() -> RewriteFinder {
    RewriteFinder::new(
        "metapress",
        vec![RewriteRule::new(
            r"metapress\.com",
            r"/content/([^\s/]+)/?$",
            "/content/$1/fulltext.pdf",
        )],
    )
}

/// Royal Society journals: `/content/<key>/` → `/content/<key>/fulltext.pdf`.
#[must_use]
pub fn royal_society() -> RewriteFinder {
    RewriteFinder::new(
        "royal-society",
        vec![RewriteRule::new(
            r"royalsociety\.org",
            r"/content/(\w+)/?$",
            "/content/$1/fulltext.pdf",
        )],
    )
}

/// `/doi/abs|full/<doi>` → `/doi/pdf/<doi>` platforms: MIT Press Journals,
/// Blackwell Synergy, Annual Reviews, Liebert, Expert Reviews. The named
/// hosts are matched first; a host-agnostic rule covers the long tail of
/// sites on the same platform software.
#[must_use]
pub fn doi_pdf() -> RewriteFinder {
    RewriteFinder::new(
        "doi-pdf",
        vec![
            RewriteRule::new(
                r"mitpressjournals\.org|blackwell-synergy\.com|annualreviews\.org|liebertonline\.com|expert-reviews\.com",
                r"/doi/(?:abs|full)/([^\s?]+)\S*$",
                "/doi/pdf/$1",
            ),
            RewriteRule::new(
                r"/doi/(?:abs|full)/",
                r"/doi/(?:abs|full)/([^\s?]+)\S*$",
                "/doi/pdf/$1",
            ),
        ],
    )
}

/// BioMed Central: `/<issn>/<vol>/<page>` → `/content/pdf/<issn>-<vol>-<page>.pdf`.
#[must_use]
pub fn biomedcentral() -> RewriteFinder {
    RewriteFinder::new(
        "biomedcentral",
        vec![RewriteRule::new(
            r"biomedcentral\.com",
            r"biomedcentral\.com/([\w-]+)/(\w+)/(\w+)/?\S*$",
            "biomedcentral.com/content/pdf/$1-$2-$3.pdf",
        )],
    )
}

/// Highwire Press platform (PNAS, Oxford Journals, Science, JBC, ...):
/// several generations of reprint endpoints, tried in order.
#[must_use]
pub fn highwire() -> RewriteFinder {
    RewriteFinder::new(
        "highwire",
        vec![
            RewriteRule::new(
                r"/cgi/content/",
                r"/cgi/content/\w+/([\w/;]+)$",
                "/cgi/reprint/$1.pdf",
            ),
            RewriteRule::new(
                r"/cgi/content/",
                r"/cgi/content/\w+/([\w/;]+)$",
                "/cgi/rapidpdf/$1.pdf",
            ),
            RewriteRule::new(
                r"/cgi/(?:reprint|rapidpdf)/",
                r"/cgi/(reprint|rapidpdf)/([\w/;]+)$",
                "/cgi/$1/$2.pdf",
            ),
            RewriteRule::new(
                r"/content/",
                r"/content/([\w/;]+)/(\d+)(?:\.full|\.abstract)?$",
                "/content/$1/$2.full.pdf",
            ),
        ],
    )
}

/// ACS: `abstract.cgi/.../abs/x.html` → `article.cgi/.../pdf/x.pdf`.
#[must_use]
pub fn acs() -> RewriteFinder {
    RewriteFinder::new(
        "acs",
        vec![RewriteRule::new(
            r"acs\.org",
            r"acs\.org/cgi-bin/(?:abstract|article)\.cgi/([\w/]+)(?:abs|html)/([\w.]+)\.html\S*$",
            "acs.org/cgi-bin/article.cgi/${1}pdf/$2.pdf",
        )],
    )
}

/// APS (Physical Review): `/abstract/<rest>` → `/pdf/<rest>`.
#[must_use]
pub fn aps() -> RewriteFinder {
    RewriteFinder::new(
        "aps",
        vec![RewriteRule::new(
            r"aps\.org",
            r"aps\.org/\w+/(\S+)$",
            "aps.org/pdf/$1",
        )],
    )
}

/// PLoS: `article/info<doi>` → the fetchObjectAttachment PDF endpoint.
#[must_use]
pub fn plos() -> RewriteFinder {
    RewriteFinder::new(
        "plos",
        vec![RewriteRule::new(
            r"(?:plosone|ploscompbiol)\.org",
            r"(plosone|ploscompbiol)\.org/article/info(\S+)$",
            "$1.org/article/fetchObjectAttachment.action?uri=info$2&representation=PDF",
        )],
    )
}

/// APA PsycNET: record page → fulltext PDF viewer URL.
#[must_use]
pub fn apa() -> RewriteFinder {
    RewriteFinder::new(
        "apa",
        vec![RewriteRule::new(
            r"apa\.org/index\.cfm",
            r"(apa\.org/index\.cfm\?)\S*?id=([\d-]+)\S*$",
            "${1}fa=main.showContent&id=$2&view=fulltext&format=pdf",
        )],
    )
}

/// LWW-hosted journals: `abstract|fulltext.<key>.htm` → `pdfhandler.<key>.pdf`.
#[must_use]
pub fn lww() -> RewriteFinder {
    RewriteFinder::new(
        "lww",
        vec![RewriteRule::new(
            r"/(?:abstract|fulltext)\.\S+\.htm",
            r"/(?:abstract|fulltext)\.(\S+)\.htm\S*$",
            "/pdfhandler.$1.pdf",
        )],
    )
}

/// eCM journal: `/journal/papers/<key>.php` → `<key>.pdf`.
#[must_use]
pub fn ecm() -> RewriteFinder {
    RewriteFinder::new(
        "ecm",
        vec![RewriteRule::new(
            r"/journal/papers/",
            r"/journal/papers/(\S+)\.php$",
            "/journal/papers/$1.pdf",
        )],
    )
}

/// Last-resort rewrite: any `.htm(l)` terminal page may hide a sibling
/// `.pdf`. Kept near the end of the pipeline so it never shadows a precise
/// platform rule.
#[must_use]
pub fn html_to_pdf() -> RewriteFinder {
    RewriteFinder::new(
        "html-to-pdf",
        vec![RewriteRule::new(
            r"/\S+\.html?$",
            r"/([^\s/]+)\.html?$",
            "/$1.pdf",
        )],
    )
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

    async fn single_candidate(finder: &RewriteFinder, url: &str) -> String {
        let nav = Navigator::new().unwrap();
        match finder.attempt(&nav, &html_page(url)).await.unwrap() {
            FinderOutcome::Url(candidate) => candidate,
            other => panic!("expected Url outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_springer_link_content_rewrite() {
        let url = "http://www.springerlink.com/content/p440667321125310/?p=eee8d5&pi=1";
        assert_eq!(
            single_candidate(&springer_link(), url).await,
            "http://www.springerlink.com/content/p440667321125310/fulltext.pdf"
        );
    }

    #[tokio::test]
    async fn test_doi_pdf_named_host_and_platform_tail() {
        let url = "http://www.mitpressjournals.org/doi/abs/10.1162/jocn.2007.19.8.1231";
        assert_eq!(
            single_candidate(&doi_pdf(), url).await,
            "http://www.mitpressjournals.org/doi/pdf/10.1162/jocn.2007.19.8.1231"
        );
        // Host-agnostic tail rule, with query string stripped
        let url = "http://www.expert-press.example.com/doi/full/10.1586/14760584.4.3.281?rfr_id=x";
        assert_eq!(
            single_candidate(&doi_pdf(), url).await,
            "http://www.expert-press.example.com/doi/pdf/10.1586/14760584.4.3.281"
        );
    }

    #[tokio::test]
    async fn test_biomedcentral_rewrite() {
        let url = "http://www.biomedcentral.com/1471-2121/8/22";
        assert_eq!(
            single_candidate(&biomedcentral(), url).await,
            "http://www.biomedcentral.com/content/pdf/1471-2121-8-22.pdf"
        );
    }

    #[test]
    fn test_highwire_produces_reprint_then_rapidpdf_candidates() {
        let finder = highwire();
        let candidates =
            finder.candidates("http://www.pnas.org/cgi/content/abstract/100/16/9578");
        assert_eq!(
            candidates,
            vec![
                "http://www.pnas.org/cgi/reprint/100/16/9578.pdf".to_string(),
                "http://www.pnas.org/cgi/rapidpdf/100/16/9578.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn test_highwire_modern_content_layout() {
        let finder = highwire();
        assert_eq!(
            finder.candidates("http://www.pnas.org/content/105/25/8778.abstract"),
            vec!["http://www.pnas.org/content/105/25/8778.full.pdf".to_string()]
        );
        // Already-terminal reprint URLs gain the .pdf suffix once
        assert_eq!(
            finder.candidates("http://hmg.oxfordjournals.org/cgi/reprint/7/5/791"),
            vec!["http://hmg.oxfordjournals.org/cgi/reprint/7/5/791.pdf".to_string()]
        );
        assert!(
            finder
                .candidates("http://hmg.oxfordjournals.org/cgi/reprint/7/5/791.pdf")
                .is_empty(),
            "a URL already ending in .pdf must not be rewritten again"
        );
    }

    #[tokio::test]
    async fn test_acs_and_aps_rewrites() {
        let url = "http://pubs.acs.org/cgi-bin/abstract.cgi/acbcct/2008/3/i08/abs/cb8000793.html";
        assert_eq!(
            single_candidate(&acs(), url).await,
            "http://pubs.acs.org/cgi-bin/article.cgi/acbcct/2008/3/i08/pdf/cb8000793.pdf"
        );
        let url = "http://prola.aps.org/abstract/PRL/v61/i9/p1050_1";
        assert_eq!(
            single_candidate(&aps(), url).await,
            "http://prola.aps.org/pdf/PRL/v61/i9/p1050_1"
        );
    }

    #[tokio::test]
    async fn test_plos_rewrite() {
        let url = "http://www.plosone.org/article/info%3Adoi%2F10.1371%2Fjournal.pone.0003059";
        assert_eq!(
            single_candidate(&plos(), url).await,
            "http://www.plosone.org/article/fetchObjectAttachment.action?uri=info%3Adoi%2F10.1371%2Fjournal.pone.0003059&representation=PDF"
        );
    }

    #[tokio::test]
    async fn test_lww_rewrite() {
        let url = "http://www.jaacap.com/pt/re/jaacap/abstract.00004583-200807000-00004.htm";
        assert_eq!(
            single_candidate(&lww(), url).await,
            "http://www.jaacap.com/pt/re/jaacap/pdfhandler.00004583-200807000-00004.pdf"
        );
    }

    #[test]
    fn test_applies_is_cheap_url_guard() {
        let finder = biomedcentral();
        assert!(finder.applies(&html_page("http://www.biomedcentral.com/1471-2121/8/22")));
        assert!(!finder.applies(&html_page("https://journal.example.com/article")));
    }

    #[tokio::test]
    async fn test_not_applicable_when_no_rule_rewrites() {
        let finder = springer_link();
        let nav = Navigator::new().unwrap();
        // Site matches but the path shape does not
        let page = html_page("http://www.springerlink.com/search?q=x");
        assert!(matches!(
            finder.attempt(&nav, &page).await.unwrap(),
            FinderOutcome::NotApplicable
        ));
    }
}
