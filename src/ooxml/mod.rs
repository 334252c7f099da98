//! Office Open XML (OOXML) spreadsheet package handling.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, parts, relationships)
//! 2. **SpreadsheetML** (`xlsx`): Workbook, worksheet and shared strings parts
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetfill::ooxml::xlsx::Workbook;
//!
//! let workbook = Workbook::open("plantilla.xlsx")?;
//! let sheet = workbook.worksheet(0)?;
//! println!("{} spans {}", sheet.name(), sheet.range());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod opc;
pub mod xlsx;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

// Re-export error types
pub use error::{OoxmlError, Result};
