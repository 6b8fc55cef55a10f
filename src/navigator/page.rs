//! Immutable fetch results with a lazily-parsed link/frame index.

use std::sync::{LazyLock, OnceLock};

use regex::Regex;
use url::Url;

use crate::finder::rules::compile_static_regex;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<a\b[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
});
static FRAME_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<i?frame\b[^>]*>"));
static NAME_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?is)\bname\s*=\s*["']([^"']*)["']"#));
static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?is)\bsrc\s*=\s*["']([^"']*)["']"#));
static TAG_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<[^>]*>"));

/// An anchor extracted from a page body: visible text and raw href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Anchor text with inner tags stripped and whitespace collapsed
    pub text: String,
    /// Raw (possibly relative) href attribute
    pub href: String,
}

/// A frame or iframe extracted from a page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame `name` attribute, empty when absent
    pub name: String,
    /// Raw (possibly relative) `src` attribute
    pub src: String,
}

/// The result of one HTTP fetch.
///
/// A `Page` is immutable; navigation produces a new `Page` rather than
/// mutating the old one. The link and frame indexes are extracted from the
/// body on first access and cached.
#[derive(Debug)]
pub struct Page {
    /// Final resolved URL after server-side redirects
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Declared `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Raw body bytes
    pub body: Vec<u8>,
    links: OnceLock<Vec<Link>>,
    frames: OnceLock<Vec<Frame>>,
}

impl Page {
    /// Builds a page from the parts of a completed fetch.
    #[must_use]
    pub fn new(url: Url, status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            url,
            status,
            content_type,
            body,
            links: OnceLock::new(),
            frames: OnceLock::new(),
        }
    }

    /// Ordered `{text, href}` pairs for every anchor in the body.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        self.links.get_or_init(|| extract_links(&self.body))
    }

    /// Ordered `{name, src}` pairs for every frame/iframe in the body.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        self.frames.get_or_init(|| extract_frames(&self.body))
    }
}

fn extract_links(body: &[u8]) -> Vec<Link> {
    let html = String::from_utf8_lossy(body);
    ANCHOR_RE
        .captures_iter(&html)
        .map(|caps| Link {
            text: strip_tags(&caps[2]),
            href: caps[1].trim().to_string(),
        })
        .collect()
}

fn extract_frames(body: &[u8]) -> Vec<Frame> {
    let html = String::from_utf8_lossy(body);
    FRAME_TAG_RE
        .find_iter(&html)
        .filter_map(|tag| {
            let tag = tag.as_str();
            let src = SRC_ATTR_RE
                .captures(tag)
                .map(|caps| caps[1].trim().to_string())?;
            let name = NAME_ATTR_RE
                .captures(tag)
                .map(|caps| caps[1].trim().to_string())
                .unwrap_or_default();
            Some(Frame { name, src })
        })
        .collect()
}

fn strip_tags(html: &str) -> String {
    let stripped = TAG_STRIP_RE.replace_all(html, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
