//! Declarative pattern rules shared by finders: link/frame selectors and
//! URL-rewrite rules.
//!
//! Each publisher platform is described by data — a URL-match plus either a
//! link/frame selector or a rewrite template — so rules are independently
//! testable and new platforms are added without touching the execution loop.

use regex::{Regex, RegexBuilder};

use crate::navigator::{Frame, Link};

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Compiles a case-insensitive regex at static init; panics on invalid
/// pattern.
pub fn compile_ci_regex(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Selects a link by case-insensitive text and href patterns.
///
/// Both patterns must match when present; a pattern left `None` matches any
/// value.
#[derive(Debug, Clone)]
pub struct LinkPattern {
    text: Option<Regex>,
    href: Option<Regex>,
}

impl LinkPattern {
    /// Builds a selector matching on both anchor text and href.
    #[must_use]
    pub fn new(text: &str, href: &str) -> Self {
        Self {
            text: Some(compile_ci_regex(text)),
            href: Some(compile_ci_regex(href)),
        }
    }

    /// Builds a selector matching on anchor text only.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(compile_ci_regex(text)),
            href: None,
        }
    }

    /// Builds a selector matching on href only.
    #[must_use]
    pub fn href(href: &str) -> Self {
        Self {
            text: None,
            href: Some(compile_ci_regex(href)),
        }
    }

    /// Returns true when `link` satisfies every present pattern.
    #[must_use]
    pub fn matches(&self, link: &Link) -> bool {
        self.text.as_ref().is_none_or(|re| re.is_match(&link.text))
            && self.href.as_ref().is_none_or(|re| re.is_match(&link.href))
    }
}

/// Selects a frame by case-insensitive name and src patterns.
#[derive(Debug, Clone)]
pub struct FramePattern {
    name: Option<Regex>,
    src: Option<Regex>,
}

impl FramePattern {
    /// Builds a selector matching on both frame name and src.
    #[must_use]
    pub fn new(name: &str, src: &str) -> Self {
        Self {
            name: Some(compile_ci_regex(name)),
            src: Some(compile_ci_regex(src)),
        }
    }

    /// Builds a selector matching on frame name only.
    #[must_use]
    pub fn name(name: &str) -> Self {
        Self {
            name: Some(compile_ci_regex(name)),
            src: None,
        }
    }

    /// Returns true when `frame` satisfies every present pattern.
    #[must_use]
    pub fn matches(&self, frame: &Frame) -> bool {
        self.name.as_ref().is_none_or(|re| re.is_match(&frame.name))
            && self.src.as_ref().is_none_or(|re| re.is_match(&frame.src))
    }
}

/// A structured URL-rewrite rule: when `site` matches the page URL and
/// `pattern` matches, the match is replaced with `template` (capture groups
/// as `$1`, `$2`, ...).
#[derive(Debug, Clone)]
pub struct RewriteRule {
    site: Regex,
    pattern: Regex,
    template: &'static str,
}

impl RewriteRule {
    /// Builds a rewrite rule from a site guard, a match pattern, and a
    /// replacement template.
    #[must_use]
    pub fn new(site: &str, pattern: &str, template: &'static str) -> Self {
        Self {
            site: compile_ci_regex(site),
            pattern: compile_ci_regex(pattern),
            template,
        }
    }

    /// Returns true when this rule's site guard matches `url`.
    #[must_use]
    pub fn applies_to(&self, url: &str) -> bool {
        self.site.is_match(url)
    }

    /// Applies the rewrite; `None` when the site guard or the pattern does
    /// not match (the rewritten URL is unchanged input in that case, which is
    /// never a useful candidate).
    #[must_use]
    pub fn apply(&self, url: &str) -> Option<String> {
        if !self.site.is_match(url) || !self.pattern.is_match(url) {
            return None;
        }
        let rewritten = self.pattern.replace(url, self.template).into_owned();
        (rewritten != url).then_some(rewritten)
    }
}
