//! Bibliographic identifier parsing, validation, and canonical forms.
//!
//! An [`Identifier`] is one of three kinds: a PubMed ID (all digits), a
//! PubMed Central ID (`PMC` followed by digits), or a DOI (`10.<registrant>/
//! <suffix>`). Invalid input is rejected here, at parse time, so the rest of
//! the pipeline only ever sees a well-formed identifier.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Regex for bare DOIs: `10.XXXX/suffix`, handling nested registrants like
/// `10.1000.10/example`.
#[allow(clippy::expect_used)]
static DOI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^10\.\d{4,9}(?:\.\d+)*/[^\s<>"']+$"#).expect("DOI regex is valid")
});

#[allow(clippy::expect_used)]
static PMCID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^PMC(\d+)$").expect("PMCID regex is valid"));

/// Errors from identifier parsing.
#[derive(Debug, Clone, Error)]
pub enum IdentError {
    /// Input was empty after trimming
    #[error("empty identifier")]
    Empty,

    /// Input matched no known identifier shape
    #[error("unrecognized identifier '{input}': expected a PubMed ID, PMC ID, or DOI")]
    Unrecognized {
        /// The rejected input
        input: String,
    },
}

/// A validated bibliographic identifier for a single article.
///
/// Immutable once parsed; the inner strings are canonical (PMC IDs
/// uppercased, DOI URL/`doi:` prefixes stripped).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// PubMed ID (numeric string, leading zeros preserved)
    Pmid(String),
    /// PubMed Central ID, canonicalized to `PMC<digits>`
    Pmcid(String),
    /// DOI in `prefix/suffix` shape
    Doi(String),
}

impl Identifier {
    /// Parses an identifier string, accepting bare PMIDs, `PMC` IDs in any
    /// case, and DOIs in bare, `doi:`-prefixed, or `doi.org` URL form.
    ///
    /// # Errors
    ///
    /// Returns [`IdentError`] when the input is empty or matches no known
    /// identifier shape.
    pub fn parse(input: &str) -> Result<Self, IdentError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IdentError::Empty);
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self::Pmid(trimmed.to_string()));
        }

        if let Some(caps) = PMCID_RE.captures(trimmed) {
            return Ok(Self::Pmcid(format!("PMC{}", &caps[1])));
        }

        let candidate = normalize_doi(trimmed);
        if DOI_RE.is_match(&candidate) {
            return Ok(Self::Doi(candidate));
        }

        Err(IdentError::Unrecognized {
            input: trimmed.to_string(),
        })
    }

    /// The canonical identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pmid(value) | Self::Pmcid(value) | Self::Doi(value) => value,
        }
    }

    /// Canonical string made filesystem-safe.
    ///
    /// DOIs contain exactly one `/` at the registrant/suffix boundary, which
    /// is replaced with `_` so the identifier can name a flat file. PMIDs and
    /// PMC IDs are returned unchanged.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.as_str().replace('/', "_")
    }

    /// Reverses [`file_stem`](Self::file_stem): parses a stored file stem
    /// back into an identifier, restoring the DOI slash at the first `_`.
    #[must_use]
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        if let Ok(ident) = Self::parse(stem) {
            return Some(ident);
        }
        // DOI stems carry the slash as '_'; restore at the first underscore.
        let restored = stem.replacen('_', "/", 1);
        Self::parse(&restored).ok()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Identifier {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Strips URL and `doi:` prefixes and URL-decodes the remainder.
fn normalize_doi(input: &str) -> String {
    let mut doi = input.trim();

    for prefix in &[
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
    ] {
        if let Some(stripped) = doi.strip_prefix(prefix) {
            doi = stripped;
            break;
        }
    }

    if doi.is_char_boundary(4) && doi[..4].eq_ignore_ascii_case("doi:") {
        doi = doi[4..].trim_start();
    }

    match urlencoding::decode(doi) {
        Ok(decoded) => decoded.trim().to_string(),
        Err(_) => doi.trim().to_string(),
    }
}
