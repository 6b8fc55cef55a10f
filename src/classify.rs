//! Content classification: the single authoritative "is this actually a PDF"
//! gate.
//!
//! Publisher servers are not trusted to set `Content-Type` correctly, so the
//! verdict is based on the body's magic header alone. Nothing in the crate
//! may persist a file without passing through [`classify`] — enforced by
//! making [`PdfResource`] constructible only from a positive verdict.

use crate::navigator::Page;

/// Leading bytes of every PDF body this system accepts: `%PDF-1.` plus one
/// digit.
const PDF_MAGIC: &[u8] = b"%PDF-1.";

/// Classification verdict for a fetched response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Body begins with the PDF magic header
    Pdf,
    /// Declared or sniffed as an HTML page
    Html,
    /// Neither recognizably PDF nor HTML (including empty/truncated bodies)
    Unknown,
}

/// Classifies a response from its status, declared content type, and body
/// prefix.
///
/// The verdict is `Pdf` only when the body begins with `%PDF-1.` followed by
/// a digit, regardless of the declared content type. A truncated or absent
/// body classifies as `Unknown`; this function never fails.
#[must_use]
pub fn classify(_status: u16, content_type: Option<&str>, body_prefix: &[u8]) -> Verdict {
    if is_pdf_body(body_prefix) {
        return Verdict::Pdf;
    }

    if content_type
        .map(str::to_ascii_lowercase)
        .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
    {
        return Verdict::Html;
    }

    if looks_like_html(body_prefix) {
        return Verdict::Html;
    }

    Verdict::Unknown
}

fn is_pdf_body(body: &[u8]) -> bool {
    body.len() > PDF_MAGIC.len()
        && body.starts_with(PDF_MAGIC)
        && body[PDF_MAGIC.len()].is_ascii_digit()
}

fn looks_like_html(body: &[u8]) -> bool {
    let prefix: Vec<u8> = body
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(16)
        .map(u8::to_ascii_lowercase)
        .collect();
    prefix.starts_with(b"<!doctype") || prefix.starts_with(b"<html")
}

/// A successfully classified PDF: source URL and the full body bytes.
///
/// Produced only by [`PdfResource::from_page`] on a positive classifier
/// verdict; never constructed speculatively.
#[derive(Debug, Clone)]
pub struct PdfResource {
    /// URL the PDF bytes were fetched from
    pub url: String,
    /// Complete PDF body
    pub bytes: Vec<u8>,
}

impl PdfResource {
    /// Classifies `page` and returns a resource when the verdict is `Pdf`.
    #[must_use]
    pub fn from_page(page: &Page) -> Option<Self> {
        match classify(page.status, page.content_type.as_deref(), &page.body) {
            Verdict::Pdf => Some(Self {
                url: page.url.to_string(),
                bytes: page.body.clone(),
            }),
            Verdict::Html | Verdict::Unknown => None,
        }
    }
}
