//! Marker vocabulary
//!
//!     The scanner is driven entirely by a [MarkerSyntax]. The default vocabulary is what the
//!     drafting pipeline emits:
//!
//!         (建議實作)                  implementation marker
//!         (出處: 附件3 P.12)          citation marker
//!         （來源：RFP.xlsx P.3-5）     citation marker, fullwidth punctuation
//!
//!         (出處: A P.1, B P.5)         citation marker naming two sources
//!
//!     Openers and closers are interchangeable between ASCII and fullwidth forms; any opener
//!     may pair with any closer. Labels are matched longest-first so a vocabulary may hold
//!     labels that prefix each other.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared default vocabulary, used by [crate::build_segments].
pub(crate) static DEFAULT_SYNTAX: Lazy<MarkerSyntax> = Lazy::new(MarkerSyntax::default);

/// The literals recognized by the annotation scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSyntax {
    /// Characters that open a marker.
    pub open: Vec<char>,
    /// Characters that close a marker.
    pub close: Vec<char>,
    /// Labels introducing a citation (`出處`, `來源`).
    pub citation_labels: Vec<String>,
    /// Separators between a citation label and the source title (`:`, `：`).
    pub label_separators: Vec<char>,
    /// Labels introducing the page field of a citation (`P.`, `P`).
    pub page_labels: Vec<String>,
    /// Characters separating the sources of a multi-source citation (`、`, `;`).
    /// May be empty, in which case only commas separate sources.
    #[serde(default)]
    pub reference_separators: Vec<char>,
    /// Literal bodies of the implementation marker (`建議實作`).
    pub implementation_labels: Vec<String>,
}

impl Default for MarkerSyntax {
    fn default() -> Self {
        Self {
            open: vec!['(', '（'],
            close: vec![')', '）'],
            citation_labels: vec!["出處".to_string(), "來源".to_string()],
            label_separators: vec![':', '：'],
            page_labels: vec![
                "P.".to_string(),
                "p.".to_string(),
                "P".to_string(),
                "p".to_string(),
            ],
            reference_separators: vec!['、', ';', '；'],
            implementation_labels: vec!["建議實作".to_string()],
        }
    }
}

/// Rejections for a custom vocabulary that the scanner could not honor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("`{field}` must list at least one entry")]
    Empty { field: &'static str },
    #[error("`{field}` contains a blank entry")]
    Blank { field: &'static str },
    #[error("`{field}` entry {value:?} starts with whitespace")]
    LeadingWhitespace { field: &'static str, value: String },
}

impl MarkerSyntax {
    /// Check that every list is populated and no entry is blank or whitespace-led.
    ///
    /// Whitespace-led entries would be swallowed by the padding the scanner skips around
    /// labels, so they could never match.
    pub fn validate(&self) -> Result<(), SyntaxError> {
        check_chars("open", &self.open)?;
        check_chars("close", &self.close)?;
        check_chars("label_separators", &self.label_separators)?;
        check_labels("citation_labels", &self.citation_labels)?;
        check_labels("page_labels", &self.page_labels)?;
        if let Some(ch) = self.reference_separators.iter().find(|ch| ch.is_whitespace()) {
            return Err(SyntaxError::LeadingWhitespace {
                field: "reference_separators",
                value: ch.to_string(),
            });
        }
        check_labels("implementation_labels", &self.implementation_labels)?;
        Ok(())
    }

    pub(crate) fn is_open(&self, ch: char) -> bool {
        self.open.contains(&ch)
    }

    pub(crate) fn is_close(&self, ch: char) -> bool {
        self.close.contains(&ch)
    }

    pub(crate) fn is_label_separator(&self, ch: char) -> bool {
        self.label_separators.contains(&ch)
    }

    pub(crate) fn is_reference_separator(&self, ch: char) -> bool {
        self.reference_separators.contains(&ch)
    }

    /// Byte length of the longest implementation label starting `rest`.
    pub(crate) fn implementation_label_at(&self, rest: &str) -> Option<usize> {
        longest_prefix(&self.implementation_labels, rest)
    }

    /// Byte length of the longest citation label starting `rest`.
    pub(crate) fn citation_label_at(&self, rest: &str) -> Option<usize> {
        longest_prefix(&self.citation_labels, rest)
    }

    /// Byte length of the longest page label starting `rest`.
    pub(crate) fn page_label_at(&self, rest: &str) -> Option<usize> {
        longest_prefix(&self.page_labels, rest)
    }
}

fn longest_prefix(labels: &[String], rest: &str) -> Option<usize> {
    labels
        .iter()
        .filter(|label| !label.is_empty() && rest.starts_with(label.as_str()))
        .map(String::len)
        .max()
}

fn check_chars(field: &'static str, chars: &[char]) -> Result<(), SyntaxError> {
    if chars.is_empty() {
        return Err(SyntaxError::Empty { field });
    }
    if let Some(ch) = chars.iter().find(|ch| ch.is_whitespace()) {
        return Err(SyntaxError::LeadingWhitespace {
            field,
            value: ch.to_string(),
        });
    }
    Ok(())
}

fn check_labels(field: &'static str, labels: &[String]) -> Result<(), SyntaxError> {
    if labels.is_empty() {
        return Err(SyntaxError::Empty { field });
    }
    for label in labels {
        if label.trim().is_empty() {
            return Err(SyntaxError::Blank { field });
        }
        if label.starts_with(char::is_whitespace) {
            return Err(SyntaxError::LeadingWhitespace {
                field,
                value: label.clone(),
            });
        }
    }
    Ok(())
}
