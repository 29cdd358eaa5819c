//! XML-like segment serialization
//!
//! One line per segment, in order, for inspection and tests:
//!
//! ```text
//! <segments>
//!   <text>系統應支援</text>
//!   <citation>(出處: RFP.pdf P.3-5,9)<ref title="RFP.pdf" pages="3-5,9"/></citation>
//!   <implementation-badge>(建議實作)</implementation-badge>
//! </segments>
//! ```
//!
//! Line breaks inside segments are written as `\n` so every segment stays on one line.
//! A citation lists one `<ref/>` per cited source. When a [SourceIndex] is supplied, each
//! `<ref/>` also carries `source="<id>"` or `unresolved="true"`.

use super::resolve::SourceIndex;
use super::segments::{CitationReference, Segment, SegmentSequence};

struct TagSerializer<'a> {
    output: String,
    sources: Option<&'a SourceIndex>,
}

impl<'a> TagSerializer<'a> {
    fn new(sources: Option<&'a SourceIndex>) -> Self {
        Self {
            output: String::new(),
            sources,
        }
    }

    fn serialize(mut self, segments: &SegmentSequence) -> String {
        self.output.push_str("<segments>\n");
        for segment in segments {
            self.output.push_str("  ");
            self.serialize_segment(segment);
            self.output.push('\n');
        }
        self.output.push_str("</segments>");
        self.output
    }

    fn serialize_segment(&mut self, segment: &Segment) {
        let (tag, children) = match segment {
            Segment::Text { .. } => ("text", String::new()),
            Segment::ImplementationBadge { .. } => ("implementation-badge", String::new()),
            Segment::Citation(citation) => {
                let children = citation
                    .references
                    .iter()
                    .map(|reference| self.reference_tag(reference))
                    .collect();
                ("citation", children)
            }
        };
        self.output.push_str(&format!(
            "<{}>{}{}</{}>",
            tag,
            escape(segment.source_text()),
            children,
            tag
        ));
    }

    fn reference_tag(&self, reference: &CitationReference) -> String {
        let mut attributes = format!(
            " title=\"{}\" pages=\"{}\"",
            escape(&reference.source_title),
            reference.pages
        );
        if let Some(sources) = self.sources {
            match sources.resolve_reference(reference) {
                Some(entry) => attributes.push_str(&format!(" source=\"{}\"", escape(&entry.id))),
                None => attributes.push_str(" unresolved=\"true\""),
            }
        }
        format!("<ref{}/>", attributes)
    }
}

/// Serialize segments to the tag format.
pub fn serialize_segments(segments: &SegmentSequence) -> String {
    TagSerializer::new(None).serialize(segments)
}

/// Serialize segments, marking each citation with the source it resolves to.
pub fn serialize_segments_resolved(segments: &SegmentSequence, sources: &SourceIndex) -> String {
    TagSerializer::new(Some(sources)).serialize(segments)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&apos;")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}
