//! XML parsing modules for Excel files.
//!
//! This module contains specialized parsers for different XML files
//! within an Excel workbook (.xlsx).

pub(crate) mod text;
pub mod workbook_parser;
pub mod worksheet_parser;

pub use workbook_parser::{SheetEntry, parse_workbook_xml};
pub use worksheet_parser::parse_worksheet_xml;
