//! Parsed view of one program line: its tag and top-level nodes.

use crate::error::{ConvertError, Result};
use std::ops::Range;

/// A top-level `(Key value)` node inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<'a> {
    /// Key token right after the opening parenthesis.
    pub key: &'a str,
    /// Raw value text, trimmed, quotes and nested nodes included.
    pub value: &'a str,
    /// Byte range of the whole node, parentheses included.
    pub span: Range<usize>,
}

impl<'a> Node<'a> {
    /// The value without one pair of surrounding double quotes.
    pub fn unquoted(&self) -> &'a str {
        self.value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(self.value)
    }
}

/// A line split into its leading tag and its top-level nodes.
///
/// Parentheses inside double-quoted strings do not open or close nodes, and
/// nested nodes stay part of their parent's value.
#[derive(Debug, Clone)]
pub struct LineRecord<'a> {
    line: &'a str,
    head: &'a str,
    nodes: Vec<Node<'a>>,
}

impl<'a> LineRecord<'a> {
    /// Parse a line.
    pub fn parse(line: &'a str) -> Self {
        let mut nodes = Vec::new();
        let mut depth = 0usize;
        let mut in_quote = false;
        let mut node_start = 0usize;

        for (i, c) in line.char_indices() {
            match c {
                '"' => in_quote = !in_quote,
                '(' if !in_quote => {
                    if depth == 0 {
                        node_start = i;
                    }
                    depth += 1;
                }
                ')' if !in_quote && depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        nodes.push(Self::make_node(line, node_start..i + 1));
                    }
                }
                _ => {}
            }
        }

        // Unterminated trailing node
        if depth > 0 {
            nodes.push(Self::make_node(line, node_start..line.len()));
        }

        let head_end = nodes.first().map(|n| n.span.start).unwrap_or(line.len());
        Self {
            line,
            head: line[..head_end].trim(),
            nodes,
        }
    }

    fn make_node(line: &'a str, span: Range<usize>) -> Node<'a> {
        let inner = &line[span.start + 1..span.end];
        let inner = inner.strip_suffix(')').unwrap_or(inner);
        let key_end = inner
            .find(|c: char| c.is_whitespace() || c == '(' || c == '"')
            .unwrap_or(inner.len());
        Node {
            key: &inner[..key_end],
            value: inner[key_end..].trim(),
            span,
        }
    }

    /// The line this record was parsed from.
    pub fn line(&self) -> &'a str {
        self.line
    }

    /// Everything before the first node, trimmed (e.g. `Sys 1 3`).
    pub fn head(&self) -> &'a str {
        self.head
    }

    /// First token of the line (e.g. `Instructions`, `Calc`, `Txt`).
    pub fn tag(&self) -> &'a str {
        self.head.split_whitespace().next().unwrap_or("")
    }

    /// All top-level nodes in line order.
    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }

    /// First top-level node whose key matches, ignoring ASCII case.
    pub fn node(&self, key: &str) -> Option<&Node<'a>> {
        self.nodes.iter().find(|n| n.key.eq_ignore_ascii_case(key))
    }

    /// Whether a top-level node with this key exists.
    pub fn has_node(&self, key: &str) -> bool {
        self.node(key).is_some()
    }
}

/// Tag of a line without building the full record.
pub fn line_tag(line: &str) -> &str {
    let head_end = line.find('(').unwrap_or(line.len());
    line[..head_end].split_whitespace().next().unwrap_or("")
}

/// Replace the whole `(key ...)` node with `new_node`.
pub fn replace_node(line: &str, key: &str, new_node: &str) -> Result<String> {
    let record = LineRecord::parse(line);
    let node = record.node(key).ok_or_else(|| ConvertError::NodeNotFound {
        key: key.to_string(),
    })?;
    Ok(format!(
        "{}{}{}",
        &line[..node.span.start],
        new_node,
        &line[node.span.end..]
    ))
}

/// Replace the `(key ...)` node with `new_node`, or append it when absent.
pub fn upsert_node(line: &str, key: &str, new_node: &str) -> String {
    match replace_node(line, key, new_node) {
        Ok(updated) => updated,
        Err(_) => format!("{} {}", line.trim_end(), new_node),
    }
}
