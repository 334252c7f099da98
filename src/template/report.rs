//! What a render did, including the non-fatal problems it met.

use std::fmt;

use crate::sheet::cell_ref;

/// A `{key}` token left in the output because no value was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedPlaceholder {
    /// Zero-based row in the output sheet
    pub row: u32,
    pub col: u32,
    pub key: String,
}

impl fmt::Display for UnresolvedPlaceholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} at {}", self.key, cell_ref(self.row, self.col))
    }
}

/// Summary of one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Sheet the anchor row was found in
    pub sheet: String,
    /// Zero-based anchor row
    pub anchor_row: u32,
    /// Rows occupied by line-items in the output, `max(1, items)`
    pub rows_generated: u32,
    /// Further rows containing the marker, left as they were, at their final rows
    pub ignored_anchor_rows: Vec<u32>,
    pub unresolved: Vec<UnresolvedPlaceholder>,
}

impl Report {
    /// Whether anything suspicious happened.
    pub fn has_warnings(&self) -> bool {
        !self.ignored_anchor_rows.is_empty() || !self.unresolved.is_empty()
    }
}

/// Output of a successful render.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The `.xlsx` document
    pub bytes: Vec<u8>,
    pub report: Report,
}
