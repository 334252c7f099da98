//! Sheetfill - template-driven generation of Excel workbooks
//!
//! A template is an ordinary `.xlsx` file. One row of one sheet carries a
//! marker placeholder (`{descripcion}` by default); rendering a record turns
//! that row into one row per line-item, fills `{key}` placeholders from the
//! record's header everywhere else, and moves everything below the anchor
//! down so nothing is overwritten.
//!
//! # Features
//!
//! - **Style fidelity**: generated rows reuse the template row's style indices,
//!   row attributes and single-row merges; `styles.xml` is never rewritten
//! - **Package preservation**: parts other than the edited worksheet and the
//!   shared strings table are copied byte-for-byte, in their original order
//! - **Reference shifting**: merges, hyperlinks, conditional formats, data
//!   validations, auto-filters and row breaks below the anchor move with it
//! - **Batch rendering**: many records against one template on the rayon pool
//!   (`parallel` feature)
//!
//! # Example
//!
//! ```no_run
//! use sheetfill::fields;
//! use sheetfill::template::{Record, Template, TemplateOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let template = Template::open("albaran.xlsx", TemplateOptions::default())?;
//!
//! let record = Record::new(
//!     fields! { "num_pedido" => "P-100", "cliente" => "ACME" },
//!     vec![
//!         fields! { "descripcion" => "PIEZA A", "nsenv" => "NS-001" },
//!         fields! { "descripcion" => "PIEZA B", "nsenv" => "NS-002" },
//!     ],
//! );
//!
//! let generated = template.render(&record)?;
//! for placeholder in &generated.report.unresolved {
//!     eprintln!("unresolved: {}", placeholder);
//! }
//! std::fs::write("P-100.xlsx", &generated.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Editing a worksheet directly
//!
//! ```no_run
//! use sheetfill::ooxml::xlsx::Workbook;
//! use sheetfill::sheet::Cell;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = Workbook::open("albaran.xlsx")?;
//! let mut sheet = workbook.worksheet(0)?;
//!
//! sheet.insert_row(4);
//! sheet.set_cell(4, 1, Cell::text("Nueva línea"));
//!
//! workbook.set_worksheet(0, &sheet)?;
//! workbook.save("editado.xlsx")?;
//! # Ok(())
//! # }
//! ```

/// In-memory cell grid of a single worksheet
///
/// Cells, row attributes and merged ranges of one sheet, with row insertion
/// that keeps the sheet's declared range in step.
pub mod sheet;

/// OOXML (Office Open XML) package handling
///
/// This module provides the OPC container layer and the SpreadsheetML parts
/// (.xlsx) the generator reads and rewrites.
pub mod ooxml;

/// Template location, placeholder substitution and row expansion
pub mod template;

// Re-export commonly used types for convenience
pub use template::{
    Generated, Record, Report, Template, TemplateError, TemplateOptions, Value, generate,
};
