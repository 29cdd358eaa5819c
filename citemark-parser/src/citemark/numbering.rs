//! Footnote numbering for citations.
//!
//! Rewrites a segment sequence as plain text in which every citation is replaced by its
//! `[n]` tags, plus the list of references the numbers point to. Each cited source gets a
//! tag, so `(出處: A P.1, B P.5)` becomes `[1] [2]`. References naming the same source and
//! the same pages share a number; numbers follow first appearance.

use super::pages::PageSpec;
use super::segments::{Segment, SegmentSequence};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A numbered footnote entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedReference {
    pub number: usize,
    pub source_title: String,
    pub pages: PageSpec,
}

/// Text with `[n]` tags in place of citations, and the footnotes they point to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedText {
    pub text: String,
    pub references: Vec<NumberedReference>,
}

/// Replace every citation with footnote tags, numbering sources by first appearance.
pub fn number_citations(segments: &SegmentSequence) -> NumberedText {
    let mut numbered = NumberedText::default();
    let mut seen: HashMap<(&str, String), usize> = HashMap::new();

    for segment in segments {
        match segment {
            Segment::Citation(citation) => {
                let mut tags: Vec<usize> = Vec::new();
                for reference in &citation.references {
                    let key = (reference.source_title.as_str(), reference.pages.to_string());
                    let next = numbered.references.len() + 1;
                    let number = *seen.entry(key).or_insert_with(|| {
                        numbered.references.push(NumberedReference {
                            number: next,
                            source_title: reference.source_title.clone(),
                            pages: reference.pages.clone(),
                        });
                        next
                    });
                    if !tags.contains(&number) {
                        tags.push(number);
                    }
                }
                let tags: Vec<String> = tags.iter().map(|n| format!("[{}]", n)).collect();
                numbered.text.push_str(&tags.join(" "));
            }
            other => numbered.text.push_str(other.source_text()),
        }
    }
    numbered
}
