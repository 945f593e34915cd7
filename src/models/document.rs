//! Rendered documents and the keys they are published and indexed under.

use std::fmt;

/// A markdown document with a front-matter header. Immutable once rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    content: String,
}

impl RenderedDocument {
    pub fn new(content: String) -> Self {
        Self { content }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

/// Composite key of a published document: `{date}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Publication {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Unique identifier or display name of the token
    pub name: String,
}

impl fmt::Display for Publication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date, self.name)
    }
}

/// One link in the index page, derived from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub date: String,
    pub file: String,
}

impl IndexEntry {
    /// Link text: the entry name without a trailing `.md`.
    pub fn title(&self) -> &str {
        self.file.strip_suffix(".md").unwrap_or(&self.file)
    }
}
