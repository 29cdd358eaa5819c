//! Source title resolution
//!
//!     Citation titles are written by a language model, so they rarely match the stored
//!     document names byte for byte: case differs, the extension is dropped or added, a
//!     prefix goes missing. [SourceIndex] resolves a title against the known sources by
//!     comparing normalized titles:
//!
//!         1. exact match after normalization
//!         2. either title contains the other
//!
//!     An unresolved title is not an error. Renderers show a "source not found" chip.

use super::segments::{CitationReference, CitationSegment};
use serde::{Deserialize, Serialize};

const STRIPPED_EXTENSIONS: [&str; 4] = [".pdf", ".docx", ".doc", ".txt"];

/// A document citations can point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    pub title: String,
}

impl SourceEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Known sources with their normalized titles precomputed.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    entries: Vec<(String, SourceEntry)>,
}

impl SourceIndex {
    pub fn new(entries: impl IntoIterator<Item = SourceEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (normalize_title(&entry.title), entry))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the source a cited title refers to. Earlier entries win ties.
    pub fn resolve(&self, title: &str) -> Option<&SourceEntry> {
        let wanted = normalize_title(title);
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(normalized, _)| *normalized == wanted)
            .or_else(|| {
                self.entries.iter().find(|(normalized, _)| {
                    !normalized.is_empty()
                        && (normalized.contains(&wanted) || wanted.contains(normalized.as_str()))
                })
            })
            .map(|(_, entry)| entry)
    }

    pub fn resolve_reference(&self, reference: &CitationReference) -> Option<&SourceEntry> {
        self.resolve(&reference.source_title)
    }

    /// Resolve every source a citation names, in order.
    pub fn resolve_citation<'a>(
        &'a self,
        citation: &'a CitationSegment,
    ) -> impl Iterator<Item = Option<&'a SourceEntry>> + 'a {
        citation
            .references
            .iter()
            .map(move |reference| self.resolve_reference(reference))
    }
}

/// Lowercase, trim and drop a trailing document extension.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let stem = STRIPPED_EXTENSIONS
        .iter()
        .find_map(|ext| lowered.strip_suffix(*ext))
        .unwrap_or(lowered.as_str());
    stem.trim().to_string()
}
