//! Feature name occurrence inside a program.

use serde::{Deserialize, Serialize};

/// One feature name and the line it was declared on.
///
/// `index` is only valid until the document is structurally edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionName {
    pub index: usize,
    pub name: String,
}

impl DimensionName {
    /// Create a dimension name. The name is upper-cased.
    pub fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            name: name.to_uppercase(),
        }
    }
}
