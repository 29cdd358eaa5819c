//! # citemark
//!
//! Parser for the inline annotations an AI drafting pipeline leaves in proposal prose.
//!
//! Two annotation shapes are recognized:
//!
//!     (建議實作)                      implementation suggested
//!     (出處: 需求說明書.docx P.3-5)    citation of a source document and its pages
//!
//! Everything else is plain text. [`build_segments`] turns raw draft text into a
//! [`SegmentSequence`] whose segments, concatenated, reproduce the input exactly.
//! Parsing is total: malformed markers fall back to text and malformed page tokens
//! fall back to an unknown-page sentinel.
//!
//! Module layout
//!
//!     src/citemark
//!       ├── syntax       Marker vocabulary (delimiters, labels)
//!       ├── pages        Page-spec parsing and rendering
//!       ├── scanner      Leftmost-first marker scan over raw text
//!       ├── segments     Segment model and the public builder
//!       ├── numbering    Citation to `[n]` footnote rewriting
//!       ├── resolve      Reference resolver for citation source titles
//!       └── tag          XML-like debug serialization

pub mod citemark;

pub use citemark::numbering::{number_citations, NumberedReference, NumberedText};
pub use citemark::pages::{parse_page_spec, PageRef, PageSpec, UNKNOWN_PAGE};
pub use citemark::resolve::{normalize_title, SourceEntry, SourceIndex};
pub use citemark::segments::{
    build_segments, build_segments_with, CitationReference, CitationSegment, Segment,
    SegmentSequence,
};
pub use citemark::syntax::{MarkerSyntax, SyntaxError};
