//! Segment model and builder
//!
//!     [build_segments] is the entry point of the crate: it scans the draft text, parses the
//!     page field of every citation and returns a [SegmentSequence] that partitions the input.
//!     Concatenating [Segment::source_text] over the sequence gives back the input exactly.
//!
//!     Segments own their strings. A sequence is built fresh for every call and carries no
//!     reference to the text it came from, so editors simply rebuild it on every change.

use super::pages::{parse_page_spec, PageRef, PageSpec};
use super::scanner::{scan, RawReference, RawToken};
use super::syntax::{MarkerSyntax, DEFAULT_SYNTAX};
use serde::{Deserialize, Serialize};

/// One cited source with the pages cited from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CitationReference {
    pub source_title: String,
    pub pages: PageSpec,
}

impl From<RawReference<'_>> for CitationReference {
    fn from(reference: RawReference<'_>) -> Self {
        Self {
            source_title: reference.source_title.to_string(),
            pages: reference
                .page_raw
                .into_iter()
                .flat_map(parse_page_spec)
                .collect(),
        }
    }
}

/// A citation marker. Most cite one source; `(出處: A P.1, B P.5)` cites two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CitationSegment {
    /// Cited sources in the order written. Never empty when built by the scanner.
    pub references: Vec<CitationReference>,
    /// The marker exactly as written, delimiters included.
    pub raw_span: String,
}

impl CitationSegment {
    /// The first cited source.
    pub fn primary(&self) -> Option<&CitationReference> {
        self.references.first()
    }

    /// Title of the first cited source.
    pub fn source_title(&self) -> &str {
        self.primary().map_or("", |r| r.source_title.as_str())
    }

    /// Pages of the first cited source.
    pub fn pages(&self) -> &[PageRef] {
        self.primary()
            .map(|r| r.pages.pages())
            .unwrap_or_default()
    }

    pub fn is_multi_source(&self) -> bool {
        self.references.len() > 1
    }
}

/// One typed stretch of the draft text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Verbatim prose.
    Text { content: String },
    /// "Implementation suggested" marker. Only the raw marker is kept.
    ImplementationBadge { raw_span: String },
    Citation(CitationSegment),
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text {
            content: content.into(),
        }
    }

    /// The substring of the input this segment was built from.
    pub fn source_text(&self) -> &str {
        match self {
            Segment::Text { content } => content,
            Segment::ImplementationBadge { raw_span } => raw_span,
            Segment::Citation(citation) => &citation.raw_span,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn as_citation(&self) -> Option<&CitationSegment> {
        match self {
            Segment::Citation(citation) => Some(citation),
            _ => None,
        }
    }

    pub fn is_implementation_badge(&self) -> bool {
        matches!(self, Segment::ImplementationBadge { .. })
    }
}

impl From<RawToken<'_>> for Segment {
    fn from(token: RawToken<'_>) -> Self {
        match token {
            RawToken::Text(content) => Segment::text(content),
            RawToken::Implementation { raw_span } => Segment::ImplementationBadge {
                raw_span: raw_span.to_string(),
            },
            RawToken::Citation {
                references,
                raw_span,
            } => Segment::Citation(CitationSegment {
                references: references.into_iter().map(CitationReference::from).collect(),
                raw_span: raw_span.to_string(),
            }),
        }
    }
}

/// Ordered segments covering one draft text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentSequence(Vec<Segment>);

impl SegmentSequence {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Segment> {
        self.0
    }

    pub fn citations(&self) -> impl Iterator<Item = &CitationSegment> + '_ {
        self.0.iter().filter_map(Segment::as_citation)
    }

    pub fn has_implementation_badge(&self) -> bool {
        self.0.iter().any(Segment::is_implementation_badge)
    }

    /// Reassemble the original text.
    pub fn to_source(&self) -> String {
        self.0.iter().map(Segment::source_text).collect()
    }

    /// The prose with every marker removed.
    pub fn plain_text(&self) -> String {
        self.0.iter().filter_map(Segment::as_text).collect()
    }
}

impl IntoIterator for SegmentSequence {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SegmentSequence {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse draft text with the default marker vocabulary.
pub fn build_segments(text: &str) -> SegmentSequence {
    build_segments_with(text, &DEFAULT_SYNTAX)
}

/// Parse draft text with a custom marker vocabulary.
pub fn build_segments_with(text: &str, syntax: &MarkerSyntax) -> SegmentSequence {
    let segments: Vec<Segment> = scan(text, syntax).into_iter().map(Segment::from).collect();
    log::trace!(
        "built {} segments from {} bytes of text",
        segments.len(),
        text.len()
    );
    SegmentSequence(segments)
}
