//! Dimension name classification.
//!
//! Operators label features freely (`#12`, `5 3 X`, `ITEM_3B`). Names that
//! identify a drawing balloon are rewritten to `{root}{number}{letter}`;
//! anything ambiguous is left as typed (upper-cased).

use crate::error::ClassificationDefect;
use tracing::{debug, warn};

/// Normalize a feature name to the balloon naming scheme.
///
/// Never fails: a name that cannot be classified comes back upper-cased with
/// a leading `#` removed. Applying the function to its own output with the
/// same root returns that output.
pub fn parse_dimension_name(dimension_name: &str, dimension_root: &str) -> String {
    let upper = dimension_name.to_uppercase();
    let name = upper.strip_prefix('#').unwrap_or(&upper);

    if is_number_like(name) {
        return format!("{}{}", dimension_root, name);
    }
    if is_alphabetic(name) {
        return name.to_string();
    }

    match classify(name, dimension_root) {
        Ok(Some(classified)) => classified,
        Ok(None) => name.to_string(),
        Err(defect @ ClassificationDefect::LetterOutOfRange(_)) => {
            warn!("Keeping dimension name '{}': {}", name, defect);
            name.to_string()
        }
        Err(defect) => {
            debug!("Keeping dimension name '{}': {}", name, defect);
            name.to_string()
        }
    }
}

fn classify(name: &str, root: &str) -> Result<Option<String>, ClassificationDefect> {
    let parts = dimension_parts(name)?;
    let Some(first) = parts.first() else {
        return Ok(None);
    };
    if !is_number_like(first) {
        return Ok(None);
    }

    let classified = match parts.as_slice() {
        [number] => Some(format!("{}{}", root, number)),
        [number, position] => with_position(root, number, position)?,
        [number, position, x] => {
            if x != "X" {
                return Ok(None);
            }
            with_position(root, number, position)?
        }
        [number, sub, position, x] => {
            if x != "X" || !is_digits(number) || is_alphabetic(sub) {
                return Ok(None);
            }
            if is_digits(position) {
                Some(format!("{}{}{}{}", root, number, sub, letter_for(position)?))
            } else if is_single_letter(position) {
                Some(format!("{}{}{}{}", root, number, sub, position))
            } else {
                None
            }
        }
        _ => None,
    };
    Ok(classified)
}

/// `number` followed by a letter position: digits become a letter, a single
/// letter other than `X` is kept.
fn with_position(root: &str, number: &str, position: &str) -> Result<Option<String>, ClassificationDefect> {
    if is_digits(position) {
        return Ok(Some(format!("{}{}{}", root, number, letter_for(position)?)));
    }
    if is_single_letter(position) && position != "X" {
        return Ok(Some(format!("{}{}{}", root, number, position)));
    }
    Ok(None)
}

/// Whether the first whitespace-separated token reads as a non-zero number.
///
/// Names with a space or underscore never qualify. Tokens are trimmed of ASCII
/// punctuation before parsing, zero tokens are skipped and an unparsable
/// token ends the scan.
pub fn is_number_like(text: &str) -> bool {
    if text.contains(' ') || text.contains('_') {
        return false;
    }
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| c.is_ascii_punctuation());
        match token.parse::<f64>() {
            Ok(value) if value != 0.0 => return true,
            Ok(_) => continue,
            Err(_) => return false,
        }
    }
    false
}

/// Split a name into digit runs and the text between them.
///
/// `INSP` and `ITEM` are dropped, `_` and `-` removed from every part, parts
/// trimmed and empty parts discarded, then decimal points joined up.
pub fn dimension_parts(name: &str) -> Result<Vec<String>, ClassificationDefect> {
    let name = name.replace("INSP", "").replace("ITEM", "");

    let mut raw: Vec<&str> = Vec::new();
    let mut start = 0;
    let mut in_digits = None;
    for (i, c) in name.char_indices() {
        let digit = c.is_ascii_digit();
        if in_digits.is_some_and(|d| d != digit) {
            raw.push(&name[start..i]);
            start = i;
        }
        in_digits = Some(digit);
    }
    raw.push(&name[start..]);

    let parts = raw
        .into_iter()
        .map(|part| part.trim().replace(['_', '-'], ""))
        .filter(|part| !part.is_empty())
        .collect();
    collapse_dot_parts(parts)
}

/// Join `["12", ".", "5"]` into `["12.5"]`, left to right.
pub fn collapse_dot_parts(parts: Vec<String>) -> Result<Vec<String>, ClassificationDefect> {
    if parts.first().is_some_and(|p| p == ".") || parts.last().is_some_and(|p| p == ".") {
        return Err(ClassificationDefect::DanglingDot);
    }

    let mut collapsed: Vec<String> = Vec::with_capacity(parts.len());
    let mut iter = parts.into_iter();
    while let Some(part) = iter.next() {
        if part != "." {
            collapsed.push(part);
            continue;
        }
        let prev = collapsed.pop().ok_or(ClassificationDefect::DanglingDot)?;
        let next = iter.next().ok_or(ClassificationDefect::DanglingDot)?;
        collapsed.push(format!("{}.{}", prev, next));
    }
    Ok(collapsed)
}

/// Letter for a 1-based position (`1` -> `A`, `26` -> `Z`).
pub fn letter_for(position: &str) -> Result<char, ClassificationDefect> {
    let n: u32 = position
        .parse()
        .map_err(|_| ClassificationDefect::NotAPosition(position.to_string()))?;
    match n {
        1..=26 => Ok(char::from(b'A' + (n - 1) as u8)),
        _ => Err(ClassificationDefect::LetterOutOfRange(n)),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_alphabetic(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

fn is_single_letter(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}
