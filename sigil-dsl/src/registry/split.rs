//! Marker text splitting
//!
//! Splits `name(=fields)?` ahead of any scanning, and splits fields text on
//! top-level separators. Braces nest and quoted strings hide their
//! contents, so a `,` or `=` inside either is never a split point.
//!
//! Offsets are character counts into the surrounding text; scanner
//! positions are character-based, so these feed straight into diagnostics.

use std::str::CharIndices;

/// A fields region: its character offset inside the marker text and the
/// text itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldsText<'a> {
    pub offset: usize,
    pub text: &'a str,
}

/// The three-way split of one raw marker.
///
/// `anonymous` is everything before the first `=`; dropping its final
/// `:`-segment yields the canonical `name`. When the canonical form is the
/// one that resolves, the dropped segment is re-attached as a synthetic
/// leading `key=`, expressed here by slicing the fields region from the
/// segment's own start, which keeps every diagnostic position exact.
#[derive(Debug, Clone)]
pub(crate) struct SplitMarker<'a> {
    pub name: String,
    pub anonymous: String,
    pub canonical_fields: FieldsText<'a>,
    pub anonymous_fields: FieldsText<'a>,
}

pub(crate) fn split_marker(raw: &str) -> SplitMarker<'_> {
    match raw.find('=') {
        None => {
            // The first whitespace-trimmed word is the whole name; any
            // remainder is unkeyed fields text.
            let start = raw.len() - raw.trim_start().len();
            let word_end = raw[start..]
                .find(char::is_whitespace)
                .map(|i| start + i)
                .unwrap_or(raw.len());
            let name = raw[start..word_end].to_string();
            let fields = FieldsText {
                offset: char_len(&raw[..word_end]),
                text: &raw[word_end..],
            };
            SplitMarker {
                name: name.clone(),
                anonymous: name,
                canonical_fields: fields,
                anonymous_fields: fields,
            }
        }
        Some(eq) => {
            let head = &raw[..eq];
            let anonymous = head.trim().to_string();
            let anonymous_fields = FieldsText {
                offset: char_len(&raw[..eq + 1]),
                text: &raw[eq + 1..],
            };
            match head.rfind(':') {
                None => SplitMarker {
                    name: anonymous.clone(),
                    anonymous,
                    canonical_fields: anonymous_fields,
                    anonymous_fields,
                },
                Some(colon) => SplitMarker {
                    name: head[..colon].trim().to_string(),
                    anonymous,
                    canonical_fields: FieldsText {
                        offset: char_len(&raw[..colon + 1]),
                        text: &raw[colon + 1..],
                    },
                    anonymous_fields,
                },
            }
        }
    }
}

/// Byte index of the first top-level `=`, if any.
pub(crate) fn find_top_level_eq(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut iter = text.char_indices();
    while let Some((i, c)) = iter.next() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' => consume_quoted(&mut iter, '"', true),
            '`' => consume_quoted(&mut iter, '`', false),
            '\\' => {
                iter.next();
            }
            '=' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Split fields text on top-level commas. Whitespace-only chunks (from a
/// trailing comma) are dropped. Each chunk carries its character offset.
pub(crate) fn split_top_level_commas(text: &str) -> Vec<(usize, &str)> {
    let mut chunks = Vec::new();
    let mut depth = 0usize;
    let mut chunk_start = 0usize;
    let mut iter = text.char_indices();
    while let Some((i, c)) = iter.next() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' => consume_quoted(&mut iter, '"', true),
            '`' => consume_quoted(&mut iter, '`', false),
            '\\' => {
                iter.next();
            }
            ',' if depth == 0 => {
                push_chunk(text, chunk_start, i, &mut chunks);
                chunk_start = i + 1;
            }
            _ => {}
        }
    }
    push_chunk(text, chunk_start, text.len(), &mut chunks);
    chunks
}

fn push_chunk<'a>(text: &'a str, start: usize, end: usize, chunks: &mut Vec<(usize, &'a str)>) {
    let chunk = &text[start..end];
    if !chunk.trim().is_empty() {
        chunks.push((char_len(&text[..start]), chunk));
    }
}

fn consume_quoted(iter: &mut CharIndices<'_>, quote: char, escapes: bool) {
    while let Some((_, c)) = iter.next() {
        if c == quote {
            break;
        }
        if c == '\\' && escapes {
            iter.next();
        }
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name_only() {
        let split = split_marker("deprecated");
        assert_eq!(split.name, "deprecated");
        assert_eq!(split.anonymous, "deprecated");
        assert_eq!(split.canonical_fields.text, "");
    }

    #[test]
    fn test_split_name_with_unkeyed_remainder() {
        let split = split_marker("deprecated use the v2 endpoint");
        assert_eq!(split.name, "deprecated");
        assert_eq!(split.canonical_fields.text, " use the v2 endpoint");
        assert_eq!(split.canonical_fields.offset, 10);
    }

    #[test]
    fn test_split_simple_keyed_marker() {
        let split = split_marker("import=marker, Pkg=acme/x");
        assert_eq!(split.name, "import");
        assert_eq!(split.anonymous, "import");
        assert_eq!(split.canonical_fields.text, "marker, Pkg=acme/x");
        assert_eq!(split.canonical_fields.offset, 7);
    }

    #[test]
    fn test_split_drops_final_colon_segment_for_canonical_name() {
        let split = split_marker("validate:max=3");
        assert_eq!(split.anonymous, "validate:max");
        assert_eq!(split.name, "validate");
        // The dropped segment re-attaches as a leading `key=`.
        assert_eq!(split.canonical_fields.text, "max=3");
        assert_eq!(split.canonical_fields.offset, 9);
        assert_eq!(split.anonymous_fields.text, "3");
        assert_eq!(split.anonymous_fields.offset, 13);
    }

    #[test]
    fn test_split_multi_segment_name() {
        let split = split_marker("acme:validate:max=3");
        assert_eq!(split.anonymous, "acme:validate:max");
        assert_eq!(split.name, "acme:validate");
    }

    #[test]
    fn test_first_eq_splits_even_inside_values() {
        // Only the first `=` separates name from fields.
        let split = split_marker("kv=a=b");
        assert_eq!(split.name, "kv");
        assert_eq!(split.canonical_fields.text, "a=b");
    }

    #[test]
    fn test_find_top_level_eq_respects_nesting_and_quotes() {
        assert_eq!(find_top_level_eq("a=1"), Some(1));
        assert_eq!(find_top_level_eq("{a=1}"), None);
        assert_eq!(find_top_level_eq("\"a=1\""), None);
        assert_eq!(find_top_level_eq("`a=1`"), None);
        assert_eq!(find_top_level_eq("{x}=1"), Some(3));
        assert_eq!(find_top_level_eq("abc"), None);
    }

    #[test]
    fn test_split_commas_respects_braces() {
        let chunks = split_top_level_commas("Rows={{1,2},{3,4}}, Name=grid");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], (0, "Rows={{1,2},{3,4}}"));
        assert_eq!(chunks[1].1, " Name=grid");
        assert_eq!(chunks[1].0, 19);
    }

    #[test]
    fn test_split_commas_respects_quotes() {
        let chunks = split_top_level_commas(r#"Note="a, b", Max=1"#);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].1, r#"Note="a, b""#);
    }

    #[test]
    fn test_split_commas_drops_empty_chunks() {
        let chunks = split_top_level_commas("a=1, ,b=2,");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].1, "a=1");
        assert_eq!(chunks[1].1, "b=2");
    }

    #[test]
    fn test_chunk_offsets_are_char_counts() {
        let chunks = split_top_level_commas("é=1, b=2");
        assert_eq!(chunks[1].0, 4); // é counts as one character
    }
}
