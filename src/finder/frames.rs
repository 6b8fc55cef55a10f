//! Frame-based reprint layouts.
//!
//! Several platforms of the same vintage serve the PDF inside a frameset: a
//! "PDF" link opens a page whose `reprint` frame carries the `.pdf` link, or
//! the outbound page itself already holds the frame. Content-based, so
//! applicability cannot be judged from the URL; a no-match scan costs no
//! network.

use std::sync::LazyLock;

use async_trait::async_trait;

use crate::classify::PdfResource;
use crate::navigator::{NavError, Navigator, Page};

use super::rules::{FramePattern, LinkPattern};
use super::{Finder, FinderOutcome};

static REPRINT_LINK: LazyLock<LinkPattern> = LazyLock::new(|| LinkPattern::new("pdf", "reprint"));
static REPRINT_FRAME: LazyLock<FramePattern> = LazyLock::new(|| FramePattern::name("reprint"));
static NAVBAR_FRAME: LazyLock<FramePattern> = LazyLock::new(|| FramePattern::name("navbar"));
static PDF_HREF: LazyLock<LinkPattern> = LazyLock::new(|| LinkPattern::href(r"\.pdf$"));

/// Finder for frameset reprint layouts (JBC-style journals and relatives).
pub struct ReprintFrameFinder;

impl ReprintFrameFinder {
    /// Creates the finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// "PDF" link → frameset → `reprint` frame → `.pdf` link.
    async fn via_reprint_link(
        &self,
        nav: &Navigator,
        page: &Page,
    ) -> Result<Option<PdfResource>, NavError> {
        let frameset = nav.follow(page, &REPRINT_LINK).await?;
        let frame = nav.follow_frame(&frameset, &REPRINT_FRAME).await?;
        let candidate = nav.follow(&frame, &PDF_HREF).await?;
        Ok(PdfResource::from_page(&candidate))
    }

    /// `reprint` frame directly on the current page → `.pdf` link.
    async fn via_frame(
        &self,
        nav: &Navigator,
        page: &Page,
        frame_selector: &FramePattern,
    ) -> Result<Option<PdfResource>, NavError> {
        let frame = nav.follow_frame(page, frame_selector).await?;
        let candidate = nav.follow(&frame, &PDF_HREF).await?;
        Ok(PdfResource::from_page(&candidate))
    }
}

impl Default for ReprintFrameFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Finder for ReprintFrameFinder {
    fn name(&self) -> &'static str {
        "reprint-frame"
    }

    fn applies(&self, _page: &Page) -> bool {
        true
    }

    async fn attempt(&self, nav: &Navigator, page: &Page) -> Result<FinderOutcome, NavError> {
        if let Ok(Some(pdf)) = self.via_reprint_link(nav, page).await {
            return Ok(FinderOutcome::Pdf(pdf));
        }
        if let Ok(Some(pdf)) = self.via_frame(nav, page, &REPRINT_FRAME).await {
            return Ok(FinderOutcome::Pdf(pdf));
        }
        if let Ok(Some(pdf)) = self.via_frame(nav, page, &NAVBAR_FRAME).await {
            return Ok(FinderOutcome::Pdf(pdf));
        }
        Ok(FinderOutcome::NotApplicable)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PDF_BODY: &[u8] = b"%PDF-1.4\nreprint";

    #[tokio::test]
    async fn test_reprint_frame_path_finds_pdf() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reprint/frame"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<html><a href="/reprint/article.pdf">Download</a></html>"#,
                "text/html",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reprint/article.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BODY, "application/pdf"))
            .mount(&server)
            .await;

        let outbound = Page::new(
            Url::parse(&server.uri()).unwrap(),
            200,
            Some("text/html".to_string()),
            format!(r#"<frame name="reprint" src="{}/reprint/frame">"#, server.uri())
                .into_bytes(),
        );

        let finder = ReprintFrameFinder::new();
        let nav = Navigator::new().unwrap();
        match finder.attempt(&nav, &outbound).await.unwrap() {
            FinderOutcome::Pdf(pdf) => assert!(pdf.bytes.starts_with(b"%PDF-1.4")),
            other => panic!("expected Pdf outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_frames_no_links_is_not_applicable() {
        let finder = ReprintFrameFinder::new();
        let nav = Navigator::new().unwrap();
        let page = Page::new(
            Url::parse("https://journal.example.com/article").unwrap(),
            200,
            Some("text/html".to_string()),
            b"<html><body>plain abstract</body></html>".to_vec(),
        );
        assert!(matches!(
            finder.attempt(&nav, &page).await.unwrap(),
            FinderOutcome::NotApplicable
        ));
    }
}
