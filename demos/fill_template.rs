//! Fill an .xlsx template from a YAML record.
//!
//! The record file holds a `header` map and an `items` list:
//!
//! ```yaml
//! header:
//!   num_pedido: P-100
//!   fecha: 2024-05-01
//! items:
//!   - descripcion: PIEZA A
//!     nsenv: NS-001
//!   - descripcion: PIEZA B
//! ```
//!
//! Run with `RUST_LOG=debug` to follow each stage.

use std::path::PathBuf;

use clap::Parser;
use sheetfill::template::{Record, Template, TemplateOptions};

#[derive(Parser)]
#[command(about = "Expand the anchor row of an .xlsx template with a record's line items")]
struct Cli {
    /// Template workbook
    template: PathBuf,
    /// YAML record with `header` and `items`
    record: PathBuf,
    /// Output workbook
    #[arg(short, long, default_value = "salida.xlsx")]
    output: PathBuf,
    /// YAML options (marker, sheet, yes_text, no_text, date_format)
    #[arg(long)]
    options: Option<PathBuf>,
    /// Sheet holding the anchor row, overriding the options file
    #[arg(long)]
    sheet: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut options = match &cli.options {
        Some(path) => TemplateOptions::from_yaml_str(&std::fs::read_to_string(path)?)?,
        None => TemplateOptions::default(),
    };
    if let Some(sheet) = cli.sheet {
        options = options.with_sheet(sheet);
    }

    let record = Record::from_yaml_str(&std::fs::read_to_string(&cli.record)?)?;
    let template = Template::open(&cli.template, options)?;
    let generated = template.render(&record)?;
    std::fs::write(&cli.output, &generated.bytes)?;

    let report = &generated.report;
    log::info!(
        "wrote {} ({} rows at row {} of '{}')",
        cli.output.display(),
        report.rows_generated,
        report.anchor_row + 1,
        report.sheet
    );
    for row in &report.ignored_anchor_rows {
        log::warn!("row {} also holds the marker and was left as is", row + 1);
    }
    for placeholder in &report.unresolved {
        log::warn!("unresolved placeholder {}", placeholder);
    }

    Ok(())
}
