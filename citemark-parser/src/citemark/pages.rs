//! Page-spec parsing
//!
//!     The page field of a citation is free-form: "12", "3-7", "2,5,9", "3-5, 9" or, when the
//!     drafting pipeline misbehaves, something empty or non-numeric. It is normalized into a
//!     [PageSpec], an ordered list of [PageRef]s kept in the order they were written.
//!
//!     Parsing never fails. A piece that is not a page number or a range of page numbers
//!     becomes [PageRef::Unknown], so every citation still renders as a chip even when its
//!     page information is garbage. Repeated pieces are kept; a page spec is a display aid, not
//!     an index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric value of the unknown-page sentinel.
pub const UNKNOWN_PAGE: u32 = 0;

/// Characters separating independent page pieces.
pub(crate) const LIST_SEPARATORS: [char; 2] = [',', '，'];

/// Character separating the ends of a range.
pub(crate) const RANGE_SEPARATOR: char = '-';

/// One piece of a page spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageRef {
    Single { page: u32 },
    /// Inclusive range, `start < end`.
    Range { start: u32, end: u32 },
    /// A token that could not be read as a page number.
    Unknown,
}

impl PageRef {
    /// Build a range, swapping reversed ends and collapsing equal ones to a single page.
    pub fn range(start: u32, end: u32) -> Self {
        if start == UNKNOWN_PAGE || end == UNKNOWN_PAGE {
            return PageRef::Unknown;
        }
        match start.cmp(&end) {
            std::cmp::Ordering::Less => PageRef::Range { start, end },
            std::cmp::Ordering::Equal => PageRef::Single { page: start },
            std::cmp::Ordering::Greater => PageRef::Range {
                start: end,
                end: start,
            },
        }
    }

    /// A single page; page zero is the unknown sentinel.
    pub fn single(page: u32) -> Self {
        if page == UNKNOWN_PAGE {
            PageRef::Unknown
        } else {
            PageRef::Single { page }
        }
    }

    /// First page covered by this piece, or [UNKNOWN_PAGE].
    pub fn first_page(&self) -> u32 {
        match self {
            PageRef::Single { page } => *page,
            PageRef::Range { start, .. } => *start,
            PageRef::Unknown => UNKNOWN_PAGE,
        }
    }

    /// Whether `page` falls inside this piece.
    pub fn contains(&self, page: u32) -> bool {
        match self {
            PageRef::Single { page: p } => *p == page,
            PageRef::Range { start, end } => (*start..=*end).contains(&page),
            PageRef::Unknown => false,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, PageRef::Unknown)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Single { page } => write!(f, "{}", page),
            PageRef::Range { start, end } => write!(f, "{}-{}", start, end),
            PageRef::Unknown => write!(f, "?"),
        }
    }
}

/// Ordered page references of one citation.
///
/// Never empty when produced by [parse_page_spec].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSpec(Vec<PageRef>);

impl PageSpec {
    pub fn new(pages: Vec<PageRef>) -> Self {
        Self(pages)
    }

    pub fn parse(raw: &str) -> Self {
        parse_page_spec(raw)
    }

    pub fn pages(&self) -> &[PageRef] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageRef> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First page of the first piece.
    ///
    /// This is the narrowed view some displays use ("12-15" shown as page 12). The full
    /// structure stays available through [PageSpec::pages].
    pub fn first_page(&self) -> u32 {
        self.0.first().map_or(UNKNOWN_PAGE, PageRef::first_page)
    }

    /// True when no piece carries a usable page number.
    pub fn is_unknown(&self) -> bool {
        self.0.iter().all(PageRef::is_unknown)
    }

    pub fn contains(&self, page: u32) -> bool {
        self.0.iter().any(|piece| piece.contains(page))
    }
}

impl fmt::Display for PageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, piece) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", piece)?;
        }
        Ok(())
    }
}

impl FromIterator<PageRef> for PageSpec {
    fn from_iter<I: IntoIterator<Item = PageRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PageSpec {
    type Item = PageRef;
    type IntoIter = std::vec::IntoIter<PageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PageSpec {
    type Item = &'a PageRef;
    type IntoIter = std::slice::Iter<'a, PageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse the text following a citation's page label.
///
/// Pieces are split on commas. A piece holding a dash is a range and both ends must be
/// page numbers; anything else is a single page. Unreadable pieces, empty ones included,
/// become [PageRef::Unknown].
pub fn parse_page_spec(raw: &str) -> PageSpec {
    let pages = raw.split(&LIST_SEPARATORS[..]).map(parse_piece).collect();
    PageSpec(pages)
}

fn parse_piece(piece: &str) -> PageRef {
    let piece = piece.trim();
    let parsed = match piece.split_once(RANGE_SEPARATOR) {
        Some((start, end)) => match (parse_number(start), parse_number(end)) {
            (Some(start), Some(end)) => PageRef::range(start, end),
            _ => PageRef::Unknown,
        },
        None => parse_number(piece).map_or(PageRef::Unknown, PageRef::single),
    };
    if parsed.is_unknown() {
        log::debug!("page token {:?} normalized to unknown page", piece);
    }
    parsed
}

/// Plain ASCII decimal; signs, fullwidth digits and overflow are rejected.
fn parse_number(token: &str) -> Option<u32> {
    let token = token.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u32>().ok()
}

/// Characters the scanner accepts inside a citation's page field.
pub(crate) fn is_page_char(ch: char) -> bool {
    ch.is_ascii_digit()
        || ch == RANGE_SEPARATOR
        || LIST_SEPARATORS.contains(&ch)
        || (ch.is_whitespace() && !matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(page: u32) -> PageRef {
        PageRef::Single { page }
    }

    #[test]
    fn parses_single_page() {
        assert_eq!(parse_page_spec("12").pages(), &[single(12)]);
    }

    #[test]
    fn parses_range() {
        assert_eq!(
            parse_page_spec("3-5").pages(),
            &[PageRef::Range { start: 3, end: 5 }]
        );
    }

    #[test]
    fn parses_list_in_encounter_order() {
        assert_eq!(
            parse_page_spec("9,2,5").pages(),
            &[single(9), single(2), single(5)]
        );
    }

    #[test]
    fn parses_mixed_list_with_whitespace() {
        assert_eq!(
            parse_page_spec(" 3 - 5 , 9 ").pages(),
            &[PageRef::Range { start: 3, end: 5 }, single(9)]
        );
    }

    #[test]
    fn keeps_repeated_pieces() {
        assert_eq!(parse_page_spec("4,4").pages(), &[single(4), single(4)]);
    }

    #[test]
    fn fullwidth_comma_separates() {
        assert_eq!(parse_page_spec("2，7").pages(), &[single(2), single(7)]);
    }

    #[test]
    fn reversed_range_is_swapped() {
        assert_eq!(
            parse_page_spec("7-3").pages(),
            &[PageRef::Range { start: 3, end: 7 }]
        );
    }

    #[test]
    fn degenerate_range_collapses() {
        assert_eq!(parse_page_spec("6-6").pages(), &[single(6)]);
    }

    #[test]
    fn malformed_inputs_become_unknown() {
        for raw in ["", "-", "abc", "3-", "-4", "1-2-3", "+5", "99999999999", "0"] {
            assert_eq!(
                parse_page_spec(raw).pages(),
                &[PageRef::Unknown],
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn trailing_comma_adds_unknown_piece() {
        assert_eq!(
            parse_page_spec("2,").pages(),
            &[single(2), PageRef::Unknown]
        );
    }

    #[test]
    fn display_joins_pieces() {
        assert_eq!(parse_page_spec("3-5, 9").to_string(), "3-5,9");
        assert_eq!(parse_page_spec("x,2").to_string(), "?,2");
    }

    #[test]
    fn first_page_narrows_to_leading_number() {
        assert_eq!(parse_page_spec("12-15,20").first_page(), 12);
        assert_eq!(parse_page_spec("abc").first_page(), UNKNOWN_PAGE);
        assert_eq!(PageSpec::new(Vec::new()).first_page(), UNKNOWN_PAGE);
    }

    #[test]
    fn contains_checks_ranges() {
        let spec = parse_page_spec("3-5,9");
        assert!(spec.contains(4));
        assert!(spec.contains(9));
        assert!(!spec.contains(6));
        assert!(!spec.contains(UNKNOWN_PAGE));
    }

    #[test]
    fn specs_concatenate_in_order() {
        let spec: PageSpec = ["2", "7-8"].into_iter().flat_map(parse_page_spec).collect();
        assert_eq!(
            spec.pages(),
            &[single(2), PageRef::Range { start: 7, end: 8 }]
        );
    }

    #[test]
    fn page_chars_exclude_line_breaks() {
        assert!(is_page_char('7'));
        assert!(is_page_char(' '));
        assert!(is_page_char('，'));
        assert!(!is_page_char('\n'));
        assert!(!is_page_char('P'));
    }
}
