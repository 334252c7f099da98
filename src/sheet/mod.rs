//! In-memory cell grid for a single worksheet.
//!
//! The grid is an address-indexed sparse store of [`Cell`]s plus a bounding
//! [`Range`] that every mutating operation keeps up to date. Rows and columns
//! are zero-based; conversion to `A1` notation happens in [`range`].
//!
//! ```rust
//! use sheetfill::sheet::{Cell, Sheet, StyleRef};
//!
//! let mut sheet = Sheet::new("Hoja1");
//! sheet.set_cell(3, 1, Cell::text("{descripcion}").with_style(StyleRef(5)));
//! sheet.set_cell(5, 0, Cell::text("Total"));
//!
//! sheet.insert_row(4);
//! assert_eq!(sheet.range().to_string(), "A1:B7");
//! assert_eq!(sheet.cell(6, 0).unwrap().as_text(), Some("Total"));
//! ```

pub mod grid;
pub mod range;
pub mod types;

pub use grid::{RowInsertion, RowProps, RowSnapshot, Sheet};
pub use range::{
    Range, cell_ref, column_to_letters, parse_cell_ref, shift_area_ref, shift_sheet_refs, shift_sqref,
};
pub use types::{Cell, CellValue, Formula, StyleRef, format_number};
