//! Ordered, mutable line sequence of one inspection program.

use super::node::contains_ignore_case;
use super::record::line_tag;
use serde::{Deserialize, Serialize};

/// Text encoding a program was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf16Le { bom: bool },
    Utf16Be,
    Utf8 { bom: bool },
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf16Le { bom: false }
    }
}

impl TextEncoding {
    /// Whether the source started with a byte-order mark.
    pub fn has_bom(&self) -> bool {
        match self {
            TextEncoding::Utf16Le { bom } | TextEncoding::Utf8 { bom } => *bom,
            TextEncoding::Utf16Be => true,
        }
    }
}

/// Program lines, without line terminators.
///
/// Line order is execution order. Inserting or deleting a line shifts every
/// later index, so indices taken before an edit must not be reused after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDocument {
    lines: Vec<String>,
}

impl LineDocument {
    /// Create a document from lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Create a document by splitting text on line breaks.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(|s| s.to_string()).collect())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get a line by index.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|s| s.as_str())
    }

    /// Replace a line, returning the previous text.
    pub fn replace_line(&mut self, index: usize, text: impl Into<String>) -> Option<String> {
        let slot = self.lines.get_mut(index)?;
        Some(std::mem::replace(slot, text.into()))
    }

    /// Insert a line before `index`. Indices past the end append.
    pub fn insert_line(&mut self, index: usize, text: impl Into<String>) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, text.into());
    }

    /// Insert a block of lines before `index`, keeping their order.
    pub fn insert_lines(&mut self, index: usize, block: &[String]) {
        for line in block.iter().rev() {
            self.insert_line(index, line.clone());
        }
    }

    /// Append a line.
    pub fn push_line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Remove a line, returning its text.
    pub fn delete_line(&mut self, index: usize) -> Option<String> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    /// Index of the first line containing `text`, ignoring ASCII case.
    pub fn find_first_line_containing(&self, text: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| contains_ignore_case(line, text))
    }

    /// Like [`find_first_line_containing`](Self::find_first_line_containing),
    /// but a match on line 0 (the file header) is not a usable anchor.
    pub fn anchor(&self, text: &str) -> Option<usize> {
        self.find_first_line_containing(text).filter(|&i| i > 0)
    }

    /// Delete the first anchor line containing `text`.
    pub fn delete_first_line_containing(&mut self, text: &str) -> Option<String> {
        let index = self.anchor(text)?;
        self.delete_line(index)
    }

    /// Index of the first line whose leading tag is exactly `tag`.
    pub fn find_line_with_tag(&self, tag: &str) -> Option<usize> {
        self.lines.iter().position(|line| line_tag(line) == tag)
    }

    /// Index of the first line containing `text`, case-sensitive.
    pub fn position_of(&self, text: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(text))
    }

    /// Whether any line contains `text`, case-sensitive.
    pub fn contains_text(&self, text: &str) -> bool {
        self.position_of(text).is_some()
    }

    /// Number of lines containing `text`, case-sensitive.
    pub fn count_lines_containing(&self, text: &str) -> usize {
        self.lines.iter().filter(|line| line.contains(text)).count()
    }

    /// Rewrite expression references `""old""` to `""new""` on every line
    /// where the reference appears after column 0. Returns the number of
    /// lines changed.
    pub fn replace_expression_references(&mut self, old: &str, new: &str) -> usize {
        let old = format!("\"\"{}\"\"", old);
        let new = format!("\"\"{}\"\"", new);
        let mut changed = 0;
        for line in self.lines.iter_mut() {
            if line.find(&old).is_some_and(|col| col > 0) {
                *line = line.replace(&old, &new);
                changed += 1;
            }
        }
        changed
    }

    /// Apply `f` to every line in place.
    pub fn for_each_line_mut(&mut self, mut f: impl FnMut(usize, &mut String)) {
        for (i, line) in self.lines.iter_mut().enumerate() {
            f(i, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> LineDocument {
        LineDocument::from_text(
            "MicroVu InSpec\r\n\
             Instructions 3 (Units MM)\r\n\
             Prog (AutoExpFile \"a.csv\")\r\n\
             Txt 1 (Name \"Created By\")\r\n\
             Crcl 2 (Name \"1A\") (PropLabels \"D\")\r\n",
        )
    }

    #[test]
    fn test_from_text_strips_terminators() {
        let doc = sample();
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.line(1), Some("Instructions 3 (Units MM)"));
    }

    #[test]
    fn test_find_first_line_containing_ignores_case() {
        let doc = sample();
        assert_eq!(doc.find_first_line_containing("autoexpfile"), Some(2));
        assert_eq!(doc.find_first_line_containing("(Name \"Edited"), None);
    }

    #[test]
    fn test_anchor_rejects_header_line() {
        let doc = sample();
        assert_eq!(doc.find_first_line_containing("MicroVu"), Some(0));
        assert_eq!(doc.anchor("MicroVu"), None);
        assert_eq!(doc.anchor("Created"), Some(3));
    }

    #[test]
    fn test_find_line_with_tag() {
        let doc = sample();
        assert_eq!(doc.find_line_with_tag("Instructions"), Some(1));
        assert_eq!(doc.find_line_with_tag("Txt"), Some(3));
        assert_eq!(doc.find_line_with_tag("Calc"), None);
    }

    #[test]
    fn test_insert_shifts_later_indices() {
        let mut doc = sample();
        let before = doc.find_first_line_containing("(Name \"1A\")").unwrap();
        doc.insert_line(2, "Prmt (Name \"JOB\")");
        let after = doc.find_first_line_containing("(Name \"1A\")").unwrap();
        assert_eq!(after, before + 1);
        assert_eq!(doc.line(before), Some("Txt 1 (Name \"Created By\")"));
    }

    #[test]
    fn test_delete_shifts_later_indices() {
        let mut doc = sample();
        let before = doc.find_first_line_containing("(Name \"1A\")").unwrap();
        assert!(doc.delete_first_line_containing("Created By").is_some());
        assert_eq!(doc.find_first_line_containing("(Name \"1A\")"), Some(before - 1));
    }

    #[test]
    fn test_delete_never_removes_header() {
        let mut doc = sample();
        assert_eq!(doc.delete_first_line_containing("MicroVu"), None);
        assert_eq!(doc.len(), 5);
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut doc = sample();
        doc.insert_line(99, "Last");
        assert_eq!(doc.line(5), Some("Last"));
    }

    #[test]
    fn test_insert_lines_keeps_order() {
        let mut doc = sample();
        let block = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        doc.insert_lines(2, &block);
        assert_eq!(&doc.lines()[2..5], &block[..]);
    }

    #[test]
    fn test_replace_expression_references() {
        let mut doc = LineDocument::from_text(
            "Crcl (Name \"1A\")\nCalc (Name \"D\") (Expr \"\"1A\"\" + 1)\nTxt (Txt \"1A\")",
        );
        assert_eq!(doc.replace_expression_references("1A", "DIM1A"), 1);
        assert_eq!(doc.line(0), Some("Crcl (Name \"1A\")"));
        assert_eq!(doc.line(1), Some("Calc (Name \"D\") (Expr \"\"DIM1A\"\" + 1)"));
        assert_eq!(doc.line(2), Some("Txt (Txt \"1A\")"));
    }

    #[test]
    fn test_count_lines_containing() {
        let doc = sample();
        assert_eq!(doc.count_lines_containing("(Name "), 2);
        assert_eq!(doc.count_lines_containing("(name "), 0);
    }

    #[test]
    fn test_encoding_bom() {
        assert!(TextEncoding::Utf16Le { bom: true }.has_bom());
        assert!(!TextEncoding::default().has_bom());
        assert!(TextEncoding::Utf16Be.has_bom());
    }
}
