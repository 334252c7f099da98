//! Anchor row lookup.

use memchr::memmem::Finder;

use super::error::{Result, TemplateError};
use crate::sheet::Sheet;

/// The row a template is expanded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// First row, in row-major order, holding the marker
    pub row: u32,
    /// Later rows also holding it; they are not expanded
    pub extra_rows: Vec<u32>,
}

/// Distinct rows with a text cell containing `marker`, in ascending order.
pub fn matching_rows(sheet: &Sheet, marker: &str) -> Vec<u32> {
    let finder = Finder::new(marker.as_bytes());
    let mut rows: Vec<u32> = Vec::new();

    for ((row, _), cell) in sheet.cells() {
        if rows.last() == Some(&row) {
            continue;
        }
        let Some(text) = cell.as_text() else {
            continue;
        };
        if finder.find(text.as_bytes()).is_some() {
            rows.push(row);
        }
    }

    rows
}

/// Locate the anchor row. The first match wins.
///
/// # Errors
/// [`TemplateError::TemplateNotFound`] when no cell contains the marker.
pub fn locate(sheet: &Sheet, marker: &str) -> Result<Anchor> {
    let mut rows = matching_rows(sheet, marker).into_iter();
    let row = rows.next().ok_or_else(|| TemplateError::TemplateNotFound {
        marker: marker.to_string(),
    })?;
    let extra_rows: Vec<u32> = rows.collect();

    if !extra_rows.is_empty() {
        log::warn!(
            "marker {} found on rows {:?} of sheet '{}'; only row {} is expanded",
            marker,
            extra_rows.iter().map(|r| r + 1).collect::<Vec<_>>(),
            sheet.name(),
            row + 1
        );
    }

    Ok(Anchor { row, extra_rows })
}
