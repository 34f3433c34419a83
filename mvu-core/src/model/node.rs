//! Node-level reads and writes on a single program line.
//!
//! A MicroVu line is a tag followed by `(Key value)` nodes. These functions
//! locate a node by the first case-insensitive occurrence of its key and
//! slice its value out by delimiter, e.g. `"` for `(Name "1A")` or ` `/`)`
//! for `(InsIdx 12)`.

use crate::error::{ConvertError, Result};
use std::ops::Range;

/// Double quote delimiter used by string-valued nodes.
pub const QUOTE: &str = "\"";

/// Find `needle` in `haystack` at or after byte offset `from`, ignoring ASCII case.
pub fn find_ignore_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if from > hay.len() || needle.len() > hay.len() - from {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    (from..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Check whether `haystack` contains `needle`, ignoring ASCII case.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle, 0).is_some()
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack.get(from..)?.find(needle).map(|i| i + from)
}

/// Return the full `(key ...)` node, parentheses included.
///
/// The node ends at the first `)` after the key, or at the end of the line
/// when there is none.
pub fn get_node<'a>(line: &'a str, key: &str) -> Result<&'a str> {
    let open = format!("({}", key);
    let begin = find_ignore_case(line, &open, 0).ok_or_else(|| ConvertError::NodeNotFound {
        key: key.to_string(),
    })?;
    let end = find_from(line, ")", begin + open.len())
        .map(|i| i + 1)
        .unwrap_or(line.len());
    Ok(line[begin..end].trim())
}

/// Byte range of the trimmed value between `start` and `end` after `key`.
fn value_span(line: &str, key: &str, start: &str, end: &str) -> Result<Range<usize>> {
    let not_found = || ConvertError::NodeNotFound {
        key: key.trim().to_string(),
    };
    let title = find_ignore_case(line, key, 0).ok_or_else(not_found)?;
    let open = find_from(line, start, title + key.len()).ok_or_else(not_found)?;
    let value_start = open + start.len();
    let value_end = find_from(line, end, value_start).unwrap_or(line.len());

    let raw = &line[value_start..value_end];
    let leading = raw.len() - raw.trim_start().len();
    let trimmed_len = raw.trim().len();
    Ok(value_start + leading..value_start + leading + trimmed_len)
}

/// Return the text between `start` and `end` after `key`, trimmed.
///
/// When `end` never occurs the value runs to the end of the line.
pub fn get_node_text<'a>(line: &'a str, key: &str, start: &str, end: &str) -> Result<&'a str> {
    let span = value_span(line, key, start, end)?;
    Ok(&line[span])
}

/// Replace the value `get_node_text` would return with `value`.
///
/// The value is spliced in at the located span, so identical text elsewhere
/// on the line is never touched and repeating the call is a no-op.
pub fn set_node_text(line: &str, key: &str, value: &str, start: &str, end: &str) -> Result<String> {
    let span = value_span(line, key, start, end)?;
    let mut updated = String::with_capacity(line.len() + value.len());
    updated.push_str(&line[..span.start]);
    updated.push_str(value);
    updated.push_str(&line[span.end..]);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FEATURE: &str = r#"Crcl 12 (Name "1A") (PropLabels "Dia") (Txt "note")"#;
    const EXPORT: &str = r#"Prog (ExpFile "C:\Old\a.csv") (AutoExpFile "C:\Old\a.csv") (InsIdx 14) (FldDlm Tab)"#;

    // ==================== find_ignore_case tests ====================

    #[test]
    fn test_find_ignore_case() {
        assert_eq!(find_ignore_case("abc (NAME x)", "(name", 0), Some(4));
        assert_eq!(find_ignore_case("abc", "abcd", 0), None);
        assert_eq!(find_ignore_case("abcabc", "ABC", 1), Some(3));
        assert_eq!(find_ignore_case("abc", "", 2), Some(2));
        assert_eq!(find_ignore_case("abc", "a", 9), None);
    }

    // ==================== get_node tests ====================

    #[test]
    fn test_get_node_full_node() {
        assert_eq!(get_node(EXPORT, "InsIdx").unwrap(), "(InsIdx 14)");
        assert_eq!(get_node(EXPORT, "fldDLM").unwrap(), "(FldDlm Tab)");
    }

    #[test]
    fn test_get_node_unterminated_runs_to_end() {
        assert_eq!(get_node("Cmd (CmdText abc", "CmdText").unwrap(), "(CmdText abc");
    }

    #[test]
    fn test_get_node_missing_is_error() {
        let err = get_node(EXPORT, "AutoRptFileName").unwrap_err();
        assert!(matches!(err, ConvertError::NodeNotFound { key } if key == "AutoRptFileName"));
    }

    // ==================== get_node_text tests ====================

    #[test]
    fn test_get_node_text_quoted() {
        assert_eq!(get_node_text(FEATURE, "(Name ", QUOTE, QUOTE).unwrap(), "1A");
        assert_eq!(get_node_text(FEATURE, "(txt ", QUOTE, QUOTE).unwrap(), "note");
    }

    #[test]
    fn test_get_node_text_space_paren() {
        assert_eq!(get_node_text(EXPORT, "(InsIdx", " ", ")").unwrap(), "14");
    }

    #[test]
    fn test_get_node_text_missing_end_runs_to_end() {
        assert_eq!(get_node_text("Instructions 27", "Instructions", " ", " ").unwrap(), "27");
    }

    #[test]
    fn test_get_node_text_missing_key() {
        assert!(get_node_text(FEATURE, "(Ref ", QUOTE, QUOTE).is_err());
    }

    #[test]
    fn test_get_node_text_missing_start_delimiter() {
        assert!(get_node_text("Crcl (Name 1A)", "(Name ", QUOTE, QUOTE).is_err());
    }

    // ==================== set_node_text tests ====================

    #[test]
    fn test_set_node_text_quoted() {
        let updated = set_node_text(FEATURE, "(Name ", "DIM1A", QUOTE, QUOTE).unwrap();
        assert_eq!(updated, r#"Crcl 12 (Name "DIM1A") (PropLabels "Dia") (Txt "note")"#);
    }

    #[test]
    fn test_set_node_text_space_paren() {
        let updated = set_node_text(EXPORT, "(InsIdx", "9", " ", ")").unwrap();
        assert!(updated.contains("(InsIdx 9)"));
        assert!(!updated.contains("14"));
    }

    #[test]
    fn test_set_node_text_only_touches_located_node() {
        // Both nodes hold the same value; only the AutoExpFile one changes
        let updated = set_node_text(EXPORT, "(AutoExpFile ", "D:\\new.csv", QUOTE, QUOTE).unwrap();
        assert_eq!(
            updated,
            r#"Prog (ExpFile "C:\Old\a.csv") (AutoExpFile "D:\new.csv") (InsIdx 14) (FldDlm Tab)"#
        );
    }

    #[test]
    fn test_set_node_text_is_idempotent() {
        let once = set_node_text(FEATURE, "(Name ", "DIM7B", QUOTE, QUOTE).unwrap();
        let twice = set_node_text(&once, "(Name ", "DIM7B", QUOTE, QUOTE).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_then_get_round_trip() {
        for value in ["", "X", "DIM12.500", "C:\\Users\\Public\\CURL\\in\\1234_OP10_REVA_.csv"] {
            let line = set_node_text(EXPORT, "(AutoExpFile ", value, QUOTE, QUOTE).unwrap();
            assert_eq!(get_node_text(&line, "(AutoExpFile ", QUOTE, QUOTE).unwrap(), value);
        }
    }

    #[test]
    fn test_set_node_text_to_end_of_line() {
        let updated = set_node_text("Instructions 27", "Instructions", "31", " ", " ").unwrap();
        assert_eq!(updated, "Instructions 31");
    }

    #[test]
    fn test_set_node_text_missing_key_is_error() {
        assert!(set_node_text(FEATURE, "(ExpFile ", "x", QUOTE, QUOTE).is_err());
    }
}
