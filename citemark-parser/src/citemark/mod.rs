//! Annotation parsing core.
//!
//!     The pipeline is three stages, leaves first:
//!
//!         pages     "3-5,9" → [3-5, 9]
//!         scanner   raw text → borrowed tokens (text / implementation / citation)
//!         segments  tokens → owned [Segment]s, invoking the page parser per citation
//!
//!     Only [segments::build_segments] is meant as an entry point. The scanner is internal
//!     and works on borrowed slices of the input; the builder copies every slice it keeps,
//!     so a [segments::SegmentSequence] holds no reference into the caller's text.
//!
//!     The remaining modules consume segments: [numbering] rewrites citations to footnote
//!     numbers, [resolve] maps source titles to registry entries and [tag] renders a
//!     debug view.

pub mod numbering;
pub mod pages;
pub mod resolve;
pub(crate) mod scanner;
pub mod segments;
pub mod syntax;
pub mod tag;
