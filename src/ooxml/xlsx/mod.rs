//! Excel (.xlsx) spreadsheet support.
//!
//! This module provides loading, editing and saving of worksheet grids in
//! Office Open XML spreadsheets:
//!
//! - `Workbook`: the package, its worksheet list and shared strings
//! - `parsers`: workbook and worksheet XML readers
//! - `writer`: worksheet and shared strings serializers
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetfill::ooxml::xlsx::Workbook;
//! use sheetfill::sheet::Cell;
//!
//! let mut workbook = Workbook::open("plantilla.xlsx")?;
//! let mut sheet = workbook.worksheet(0)?;
//! sheet.set_cell(0, 0, Cell::text("Hola"));
//! workbook.set_worksheet(0, &sheet)?;
//! workbook.save("salida.xlsx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod parsers;
pub mod shared_strings;
pub mod workbook;
pub mod writer;

pub use shared_strings::SharedStrings;
pub use workbook::Workbook;
