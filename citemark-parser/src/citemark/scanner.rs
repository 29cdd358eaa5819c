//! Annotation scanner
//!
//!     A single left-to-right pass over the raw text. At every opener the scanner tries the two
//!     marker shapes; the first that fits is emitted and scanning resumes right after it. Text
//!     between markers is emitted as one token, and empty stretches (adjacent markers, markers
//!     at either end) emit nothing.
//!
//!     Shapes, with WS being whitespace other than line breaks:
//!
//!         OPEN WS* IMPLEMENTATION_LABEL WS* CLOSE
//!         OPEN CITATION_LABEL WS* SEPARATOR WS* BODY CLOSE
//!         BODY = TITLE WS+ PAGE_LABEL PAGES, optionally preceded by further references
//!
//!     The title is matched non-greedily: the citation closes at the earliest closer whose
//!     preceding text reads `WS+ PAGE_LABEL PAGES`. Titles may therefore hold brackets, dots
//!     and dashes ("附件(一) 3-需求說明書.docx"). No marker spans a line break, which bounds the
//!     work per opener to the rest of its line.
//!
//!     A body may cite several sources. It is first cut at reference separators (`、`, `;`),
//!     then each piece is read as a comma-joined run of references:
//!
//!         A P.1, B P.5        two references
//!         A P.2, P.7          one reference to A, pages 2 and 7
//!         A P.1, 5            one reference to A, pages 1 and 5
//!
//!     A piece that does not read as references is kept as title text of the next piece.
//!
//!     Anything that does not complete a shape (a half-typed marker, a missing page label, an
//!     unclosed bracket) is left in the surrounding text.
//!
//!     Positions are byte offsets that always sit on char boundaries, so slicing is safe for
//!     multi-byte text.

use super::pages::{is_page_char, LIST_SEPARATORS};
use super::syntax::MarkerSyntax;

/// One cited source inside a citation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawReference<'a> {
    pub source_title: &'a str,
    /// Page fields in the order written; continuations like `, P.7` add one each.
    pub page_raw: Vec<&'a str>,
}

/// A scanned stretch of the input, borrowing from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawToken<'a> {
    Text(&'a str),
    Implementation {
        raw_span: &'a str,
    },
    Citation {
        references: Vec<RawReference<'a>>,
        raw_span: &'a str,
    },
}

/// Scan `text` into tokens whose spans partition it in order.
pub(crate) fn scan<'a>(text: &'a str, syntax: &MarkerSyntax) -> Vec<RawToken<'a>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(ch) = text[pos..].chars().next() {
        if syntax.is_open(ch) {
            if let Some((token, end)) = match_marker(text, pos, ch, syntax) {
                if pos > text_start {
                    tokens.push(RawToken::Text(&text[text_start..pos]));
                }
                log::trace!("marker at {}..{}: {:?}", pos, end, token);
                tokens.push(token);
                pos = end;
                text_start = end;
                continue;
            }
        }
        pos += ch.len_utf8();
    }

    if text_start < text.len() {
        tokens.push(RawToken::Text(&text[text_start..]));
    }
    tokens
}

/// Try both shapes at an opener. Returns the token and the byte offset just past it.
fn match_marker<'a>(
    text: &'a str,
    start: usize,
    open: char,
    syntax: &MarkerSyntax,
) -> Option<(RawToken<'a>, usize)> {
    let body = start + open.len_utf8();
    match_implementation(text, start, body, syntax)
        .or_else(|| match_citation(text, start, body, syntax))
}

fn match_implementation<'a>(
    text: &'a str,
    start: usize,
    body: usize,
    syntax: &MarkerSyntax,
) -> Option<(RawToken<'a>, usize)> {
    let pos = skip_padding(text, body);
    let label_len = syntax.implementation_label_at(&text[pos..])?;
    let pos = skip_padding(text, pos + label_len);
    let close = text[pos..].chars().next().filter(|ch| syntax.is_close(*ch))?;
    let end = pos + close.len_utf8();
    Some((
        RawToken::Implementation {
            raw_span: &text[start..end],
        },
        end,
    ))
}

fn match_citation<'a>(
    text: &'a str,
    start: usize,
    body: usize,
    syntax: &MarkerSyntax,
) -> Option<(RawToken<'a>, usize)> {
    let label_len = syntax.citation_label_at(&text[body..])?;
    let pos = skip_padding(text, body + label_len);
    let separator = text[pos..]
        .chars()
        .next()
        .filter(|ch| syntax.is_label_separator(*ch))?;
    let title_start = skip_padding(text, pos + separator.len_utf8());

    // Walk the rest of the line tracking the latest viable title/page split. A split is
    // viable while everything after its page label is page characters.
    let mut split: Option<(usize, usize)> = None;
    let mut padding_start: Option<usize> = None;
    let mut pos = title_start;

    while let Some(ch) = text[pos..].chars().next() {
        if is_line_break(ch) {
            return None;
        }
        if syntax.is_close(ch) {
            if let Some((title_end, pages_start)) = split {
                let end = pos + ch.len_utf8();
                let references = split_references(&text[title_start..pos], syntax)
                    .unwrap_or_else(|| {
                        vec![RawReference {
                            source_title: &text[title_start..title_end],
                            page_raw: vec![&text[pages_start..pos]],
                        }]
                    });
                let token = RawToken::Citation {
                    references,
                    raw_span: &text[start..end],
                };
                return Some((token, end));
            }
        }
        if let Some(title_end) = padding_start.filter(|end| *end > title_start) {
            if let Some(label_len) = syntax.page_label_at(&text[pos..]) {
                split = Some((title_end, pos + label_len));
                padding_start = None;
                pos += label_len;
                continue;
            }
        }
        if !is_page_char(ch) {
            split = None;
        }
        if ch.is_whitespace() {
            padding_start.get_or_insert(pos);
        } else {
            padding_start = None;
        }
        pos += ch.len_utf8();
    }
    None
}

/// Read a citation body (title through the last page field) as a list of references.
///
/// `None` when the body does not break down cleanly; the caller then keeps it as one
/// reference.
fn split_references<'a>(
    body: &'a str,
    syntax: &MarkerSyntax,
) -> Option<Vec<RawReference<'a>>> {
    let mut references: Vec<RawReference<'a>> = Vec::new();
    let mut piece_start = 0;

    let cuts = body
        .char_indices()
        .filter(|(_, ch)| syntax.is_reference_separator(*ch))
        .map(|(at, ch)| (at, at + ch.len_utf8()))
        .chain(std::iter::once((body.len(), body.len())));

    for (piece_end, next_start) in cuts {
        let Some(items) = read_piece(&body[piece_start..piece_end], syntax) else {
            continue;
        };
        // A bare page field has nothing to inherit a title from yet.
        if references.is_empty() && items.first().is_some_and(|(title, _)| title.is_none()) {
            continue;
        }
        for (title, pages) in items {
            match title {
                Some(source_title) => references.push(RawReference {
                    source_title,
                    page_raw: vec![pages],
                }),
                None => references.last_mut()?.page_raw.push(pages),
            }
        }
        piece_start = next_start;
    }

    if piece_start < body.len() || references.is_empty() {
        return None;
    }
    Some(references)
}

/// Read one separator-free piece as `(title, pages)` pairs. A `None` title continues the
/// previous reference.
///
/// Page labels count only at the start of the piece or after whitespace. A label ends a
/// reference early only when its page field holds a number and runs into a comma; any
/// other label is part of the title. The last label must run to the end of the piece.
fn read_piece<'a>(
    piece: &'a str,
    syntax: &MarkerSyntax,
) -> Option<Vec<(Option<&'a str>, &'a str)>> {
    let mut items = Vec::new();
    let mut title_start = piece.len() - piece.trim_start().len();
    let mut pos = title_start;

    while let Some(ch) = piece[pos..].chars().next() {
        let anchored = pos == title_start
            || piece[..pos].chars().next_back().is_some_and(char::is_whitespace);
        if let Some(label_len) = syntax.page_label_at(&piece[pos..]).filter(|_| anchored) {
            let pages_start = pos + label_len;
            let run_end = piece[pages_start..]
                .find(|c: char| !is_page_char(c))
                .map_or(piece.len(), |offset| pages_start + offset);
            let title = trim_title(&piece[title_start..pos]);

            if run_end == piece.len() {
                items.push((title, &piece[pages_start..]));
                return Some(items);
            }
            let run = piece[pages_start..run_end].trim_end();
            if run.ends_with(&LIST_SEPARATORS[..]) && run.bytes().any(|b| b.is_ascii_digit()) {
                items.push((title, run.trim_end_matches(&LIST_SEPARATORS[..]).trim_end()));
                title_start = run_end;
                pos = run_end;
                continue;
            }
        }
        pos += ch.len_utf8();
    }
    None
}

/// Trim padding and stray list commas from a title; empty means "inherit".
fn trim_title(raw: &str) -> Option<&str> {
    let title = raw.trim().trim_end_matches(&LIST_SEPARATORS[..]).trim_end();
    (!title.is_empty()).then_some(title)
}

/// Advance past whitespace that does not break the line.
fn skip_padding(text: &str, mut pos: usize) -> usize {
    while let Some(ch) = text[pos..].chars().next() {
        if !ch.is_whitespace() || is_line_break(ch) {
            break;
        }
        pos += ch.len_utf8();
    }
    pos
}

fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_default(text: &str) -> Vec<RawToken<'_>> {
        scan(text, &MarkerSyntax::default())
    }

    fn citation<'a>(title: &'a str, pages: &'a str, raw: &'a str) -> RawToken<'a> {
        cites(&[(title, &[pages])], raw)
    }

    fn cites<'a>(references: &[(&'a str, &[&'a str])], raw: &'a str) -> RawToken<'a> {
        RawToken::Citation {
            references: references
                .iter()
                .map(|(title, pages)| RawReference {
                    source_title: *title,
                    page_raw: pages.to_vec(),
                })
                .collect(),
            raw_span: raw,
        }
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(
            scan_default("沒有任何標記的段落。"),
            vec![RawToken::Text("沒有任何標記的段落。")]
        );
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(scan_default("").is_empty());
    }

    #[test]
    fn implementation_marker_between_text() {
        assert_eq!(
            scan_default("foo(建議實作)bar"),
            vec![
                RawToken::Text("foo"),
                RawToken::Implementation {
                    raw_span: "(建議實作)"
                },
                RawToken::Text("bar"),
            ]
        );
    }

    #[test]
    fn implementation_marker_allows_padding_and_mixed_widths() {
        assert_eq!(
            scan_default("（ 建議實作 )"),
            vec![RawToken::Implementation {
                raw_span: "（ 建議實作 )"
            }]
        );
    }

    #[test]
    fn citation_marker_fields() {
        assert_eq!(
            scan_default("見(出處: 附件3 P.12)。"),
            vec![
                RawToken::Text("見"),
                citation("附件3", "12", "(出處: 附件3 P.12)"),
                RawToken::Text("。"),
            ]
        );
    }

    #[test]
    fn fullwidth_citation_with_page_list() {
        assert_eq!(
            scan_default("（來源：RFP.xlsx P.3-5, 9）"),
            vec![citation("RFP.xlsx", "3-5, 9", "（來源：RFP.xlsx P.3-5, 9）")]
        );
    }

    #[test]
    fn title_keeps_punctuation_and_brackets() {
        assert_eq!(
            scan_default("(出處: 附件(一) 3-需求說明書.docx P.7)"),
            vec![citation(
                "附件(一) 3-需求說明書.docx",
                "7",
                "(出處: 附件(一) 3-需求說明書.docx P.7)"
            )]
        );
    }

    #[test]
    fn title_is_shortest_viable() {
        assert_eq!(
            scan_default("(出處: A P.3) B P.4)"),
            vec![citation("A", "3", "(出處: A P.3)"), RawToken::Text(" B P.4)")]
        );
    }

    #[test]
    fn later_page_label_extends_title() {
        assert_eq!(
            scan_default("(出處: A P.x B P.5)"),
            vec![citation("A P.x B", "5", "(出處: A P.x B P.5)")]
        );
    }

    #[test]
    fn empty_page_field_still_matches() {
        assert_eq!(
            scan_default("(出處: A P.)"),
            vec![citation("A", "", "(出處: A P.)")]
        );
    }

    #[test]
    fn adjacent_markers_emit_no_empty_text() {
        assert_eq!(
            scan_default("(出處: A P.1)(出處: B P.2)"),
            vec![
                citation("A", "1", "(出處: A P.1)"),
                citation("B", "2", "(出處: B P.2)"),
            ]
        );
    }

    #[test]
    fn malformed_markers_stay_text() {
        for text in [
            "(出處: 附件3)",
            "(出處 附件3 P.2)",
            "(出處: P.2)",
            "(出處: 附件3 P.2",
            "(出處: 附件3P.2)",
            "(建議實作",
            "(建議 實作)",
            "(出處: 附件3\nP.2)",
        ] {
            assert_eq!(scan_default(text), vec![RawToken::Text(text)], "{:?}", text);
        }
    }

    #[test]
    fn unterminated_marker_does_not_hide_later_marker() {
        assert_eq!(
            scan_default("(出處: 附件3 (建議實作)"),
            vec![
                RawToken::Text("(出處: 附件3 "),
                RawToken::Implementation {
                    raw_span: "(建議實作)"
                },
            ]
        );
    }

    #[test]
    fn lowercase_page_label() {
        assert_eq!(
            scan_default("(出處: 規格書 p. 2)"),
            vec![citation("規格書", " 2", "(出處: 規格書 p. 2)")]
        );
    }

    #[test]
    fn page_label_dot_is_optional() {
        assert_eq!(
            scan_default("(出處: 規格書 P 12)"),
            vec![citation("規格書", " 12", "(出處: 規格書 P 12)")]
        );
        assert_eq!(
            scan_default("(出處: 規格書 p12)"),
            vec![citation("規格書", "12", "(出處: 規格書 p12)")]
        );
    }

    #[test]
    fn comma_starts_a_new_reference() {
        let raw = "(出處：3-需求說明書.docx P.1, RFP.xlsx P.5)";
        assert_eq!(
            scan_default(raw),
            vec![cites(
                &[("3-需求說明書.docx", &["1"]), ("RFP.xlsx", &["5"])],
                raw
            )]
        );
    }

    #[test]
    fn bare_page_label_continues_previous_title() {
        let raw = "(出處：需求說明書 P.2, P.7)";
        assert_eq!(
            scan_default(raw),
            vec![cites(&[("需求說明書", &["2", "7"])], raw)]
        );
    }

    #[test]
    fn trailing_numbers_stay_in_page_list() {
        assert_eq!(
            scan_default("(出處: A P.1, 5)"),
            vec![citation("A", "1, 5", "(出處: A P.1, 5)")]
        );
    }

    #[test]
    fn reference_separators_split_sources() {
        let raw = "(出處: A P.1; B P.5)";
        assert_eq!(
            scan_default(raw),
            vec![cites(&[("A", &["1"]), ("B", &["5"])], raw)]
        );

        let raw = "(出處: 附件一 P.1、附件二 P.2-3)";
        assert_eq!(
            scan_default(raw),
            vec![cites(&[("附件一", &["1"]), ("附件二", &["2-3"])], raw)]
        );

        let raw = "（出處：A P.1；P.4, B P.6）";
        assert_eq!(
            scan_default(raw),
            vec![cites(&[("A", &["1", "4"]), ("B", &["6"])], raw)]
        );
    }

    #[test]
    fn piece_without_pages_stays_in_title() {
        assert_eq!(
            scan_default("(出處: 甲、乙 P.5)"),
            vec![citation("甲、乙", "5", "(出處: 甲、乙 P.5)")]
        );
    }

    #[test]
    fn separators_can_be_switched_off() {
        let syntax = MarkerSyntax {
            reference_separators: Vec::new(),
            ..MarkerSyntax::default()
        };
        assert_eq!(
            scan("(出處: A P.1; B P.5)", &syntax),
            vec![citation("A P.1; B", "5", "(出處: A P.1; B P.5)")]
        );
    }
}
