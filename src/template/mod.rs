//! Template-driven workbook generation.
//!
//! A template is an `.xlsx` workbook whose sheet holds one anchor row marked
//! with a placeholder token (`{descripcion}` by default). Rendering a
//! [`Record`] against it:
//!
//! 1. locates the anchor row ([`locator`]),
//! 2. substitutes header fields everywhere except the anchor row ([`substitute`]),
//! 3. expands the anchor row into one row per line-item ([`expand`]),
//! 4. writes the sheet back into the original package.
//!
//! Any failure aborts the render before output bytes exist. Missing values are
//! not failures: their `{key}` tokens stay in the output and are listed in the
//! [`Report`].
//!
//! ```rust,no_run
//! use sheetfill::fields;
//! use sheetfill::template::{Record, Template, TemplateOptions};
//!
//! let template = Template::open("albaran.xlsx", TemplateOptions::default())?;
//! let record = Record::new(
//!     fields! { "num_pedido" => "P-100" },
//!     vec![
//!         fields! { "descripcion" => "PIEZA A", "cantidad" => 2 },
//!         fields! { "descripcion" => "PIEZA B", "cantidad" => 1 },
//!     ],
//! );
//! let generated = template.render(&record)?;
//! std::fs::write("P-100.xlsx", &generated.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod expand;
pub mod locator;
pub mod options;
pub mod report;
pub mod substitute;
pub mod value;

#[cfg(test)]
mod fixtures;

use std::path::Path;
use std::sync::Arc;

pub use error::{Result, TemplateError};
pub use expand::expand;
pub use locator::{Anchor, locate, matching_rows};
pub use options::TemplateOptions;
pub use report::{Generated, Report, UnresolvedPlaceholder};
pub use substitute::{substitute_global, substitute_line, substitute_text};
pub use value::{Fields, HeaderRecord, LineItem, Record, Value};

use crate::ooxml::OoxmlError;
use crate::ooxml::xlsx::Workbook;

/// A validated template, cheap to clone and share between threads.
///
/// Only the template bytes are shared; every render loads its own workbook.
#[derive(Debug, Clone)]
pub struct Template {
    bytes: Arc<[u8]>,
    options: TemplateOptions,
}

impl Template {
    /// Wrap template bytes after checking they load and hold the configured sheet.
    pub fn new<B: Into<Arc<[u8]>>>(bytes: B, options: TemplateOptions) -> Result<Self> {
        options.validate()?;
        let template = Self {
            bytes: bytes.into(),
            options,
        };
        let workbook = Workbook::from_bytes(&template.bytes).map_err(TemplateError::TemplateLoad)?;
        template.sheet_index(&workbook)?;
        Ok(template)
    }

    /// Read a template from disk.
    pub fn open<P: AsRef<Path>>(path: P, options: TemplateOptions) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| TemplateError::TemplateLoad(OoxmlError::Io(e)))?;
        Self::new(bytes, options)
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    fn sheet_index(&self, workbook: &Workbook) -> Result<usize> {
        match &self.options.sheet {
            Some(name) => workbook
                .sheet_index(name)
                .ok_or_else(|| TemplateError::Config(format!("no worksheet named '{}'", name))),
            None if workbook.worksheet_count() > 0 => Ok(0),
            None => Err(TemplateError::TemplateLoad(OoxmlError::SheetNotFound(
                "workbook has no worksheets".to_string(),
            ))),
        }
    }

    /// Render one record into a new workbook.
    ///
    /// # Errors
    /// - [`TemplateError::KeyCollision`] when a key is both a header and a line-item field
    /// - [`TemplateError::TemplateLoad`] when the sheet cannot be read
    /// - [`TemplateError::TemplateNotFound`] when no cell contains the marker
    /// - [`TemplateError::Serialization`] when the workbook cannot be written
    pub fn render(&self, record: &Record) -> Result<Generated> {
        record.check_namespaces()?;

        let mut workbook = Workbook::from_bytes(&self.bytes).map_err(TemplateError::TemplateLoad)?;
        let index = self.sheet_index(&workbook)?;
        let mut sheet = workbook.worksheet(index).map_err(TemplateError::TemplateLoad)?;

        let anchor = locate(&sheet, &self.options.marker)?;
        log::debug!(
            "rendering {} line items at row {} of sheet '{}'",
            record.items.len(),
            anchor.row + 1,
            sheet.name()
        );

        let mut unresolved = substitute_global(&mut sheet, anchor.row, &record.header, &self.options);
        // Header positions were taken before the rows below the anchor moved
        let added = record.items.len().saturating_sub(1) as u32;
        for placeholder in &mut unresolved {
            if placeholder.row > anchor.row {
                placeholder.row += added;
            }
        }
        // Further marker rows all lie below the anchor
        let ignored_anchor_rows: Vec<u32> = anchor.extra_rows.iter().map(|row| row + added).collect();
        unresolved.extend(expand(&mut sheet, anchor.row, &record.items, &self.options));
        unresolved.sort_by_key(|placeholder| (placeholder.row, placeholder.col));

        for placeholder in &unresolved {
            log::debug!("unresolved placeholder {}", placeholder);
        }

        workbook
            .set_worksheet(index, &sheet)
            .map_err(TemplateError::Serialization)?;
        let bytes = workbook.to_bytes().map_err(TemplateError::Serialization)?;

        Ok(Generated {
            bytes,
            report: Report {
                sheet: sheet.name().to_string(),
                anchor_row: anchor.row,
                rows_generated: added + 1,
                ignored_anchor_rows,
                unresolved,
            },
        })
    }

    /// Render many records, each independently of the others.
    ///
    /// With the `parallel` feature the records are rendered on the rayon pool.
    pub fn render_batch(&self, records: &[Record]) -> Vec<Result<Generated>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            records.par_iter().map(|record| self.render(record)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            records.iter().map(|record| self.render(record)).collect()
        }
    }
}

/// Render `items` and `header` into `template` with default options.
pub fn generate(template: &[u8], header: &HeaderRecord, items: &[LineItem]) -> Result<Vec<u8>> {
    let template = Template::new(template, TemplateOptions::default())?;
    let record = Record::new(header.clone(), items.to_vec());
    Ok(template.render(&record)?.bytes)
}
