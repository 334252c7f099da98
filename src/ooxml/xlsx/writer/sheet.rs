//! Writer for worksheet parts.
//!
//! The original worksheet XML is streamed through unchanged except for the
//! pieces the grid owns: `<dimension>`, `<sheetData>` and `<mergeCells>`.
//! Range references in hyperlinks, conditional formats, validations, the
//! auto-filter and row breaks are shifted by the sheet's row insertions.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use super::{rewrite_attrs, shift_all, write_element, write_err};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::shared_strings::SharedStrings;
use crate::sheet::{Cell, CellValue, RowInsertion, Sheet, cell_ref, format_number};

/// Rewrite `original` so it reflects the content of `sheet`.
///
/// Text cells are stored as shared strings: cells still carrying their
/// original index keep it, everything else is interned into `sst`.
pub fn write_worksheet(original: &str, sheet: &Sheet, sst: &mut SharedStrings) -> Result<String> {
    let mut reader = Reader::from_str(original);
    let mut writer = Writer::new(Vec::with_capacity(original.len() + sheet.cell_count() * 32));

    let insertions = sheet.insertions();
    let mut in_row_breaks = false;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"sheetData" => {
                        if !is_empty {
                            reader.read_to_end(e.name())?;
                        }
                        let mut xml = String::with_capacity(sheet.cell_count() * 48);
                        write_sheet_data(&mut xml, sheet, sst)?;
                        writer.get_mut().extend_from_slice(xml.as_bytes());
                    },
                    b"mergeCells" => {
                        if !is_empty {
                            reader.read_to_end(e.name())?;
                        }
                        let mut xml = String::new();
                        write_merge_cells(&mut xml, sheet)?;
                        writer.get_mut().extend_from_slice(xml.as_bytes());
                    },
                    b"dimension" => {
                        let range = sheet.range().to_string();
                        let out = rewrite_attrs(e, |key, _| (key == b"ref").then(|| range.clone()))?;
                        write_element(&mut writer, out, is_empty)?;
                    },
                    b"hyperlink" | b"autoFilter" if !insertions.is_empty() => {
                        let out = rewrite_attrs(e, |key, value| {
                            (key == b"ref").then(|| shift_all(value, insertions))
                        })?;
                        write_element(&mut writer, out, is_empty)?;
                    },
                    b"conditionalFormatting" | b"dataValidation" | b"ignoredError"
                    | b"protectedRange"
                        if !insertions.is_empty() =>
                    {
                        let out = rewrite_attrs(e, |key, value| {
                            (key == b"sqref").then(|| shift_all(value, insertions))
                        })?;
                        write_element(&mut writer, out, is_empty)?;
                    },
                    b"brk" if in_row_breaks && !insertions.is_empty() => {
                        let out = rewrite_attrs(e, |key, value| {
                            if key != b"id" {
                                return None;
                            }
                            let id = atoi_simd::parse_pos::<u32, false>(value.as_bytes()).ok()?;
                            Some(shift_break(id, insertions).to_string())
                        })?;
                        write_element(&mut writer, out, is_empty)?;
                    },
                    name => {
                        if name == b"rowBreaks" && !is_empty {
                            in_row_breaks = true;
                        }
                        writer.write_event(event.borrow())?;
                    },
                }
            },
            Event::End(e) => {
                if e.local_name().as_ref() == b"rowBreaks" {
                    in_row_breaks = false;
                }
                writer.write_event(event.borrow())?;
            },
            Event::Eof => break,
            _ => writer.write_event(event.borrow())?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| OoxmlError::InvalidFormat(format!("worksheet output is not UTF-8: {}", e)))
}

/// Shift a row break id (the one-based row the break follows).
fn shift_break(id: u32, insertions: &[RowInsertion]) -> u32 {
    insertions.iter().fold(id, |id, insertion| {
        // Break after row `id` sits before zero-based row `id`
        if id > insertion.at { id + insertion.count } else { id }
    })
}

/// Write `<sheetData>` for every row holding cells or row attributes.
fn write_sheet_data(xml: &mut String, sheet: &Sheet, sst: &mut SharedStrings) -> Result<()> {
    let mut rows: BTreeSet<u32> = sheet.rows().map(|(row, _)| row).collect();
    rows.extend(sheet.cells().map(|((row, _), _)| row));

    if rows.is_empty() {
        xml.push_str("<sheetData/>");
        return Ok(());
    }

    xml.push_str("<sheetData>");
    for row in rows {
        // NOTE: Excel uses 1-based row numbering
        write!(xml, r#"<row r="{}""#, row + 1).map_err(write_err)?;
        if let Some(props) = sheet.row_props(row) {
            for (key, value) in &props.attrs {
                write!(xml, r#" {}="{}""#, key, value).map_err(write_err)?;
            }
        }

        let mut cells = sheet.row_cells(row).peekable();
        if cells.peek().is_none() {
            xml.push_str("/>");
            continue;
        }

        xml.push('>');
        for (col, cell) in cells {
            write_cell(xml, &cell_ref(row, col), cell, sst)?;
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>");

    Ok(())
}

/// Write a single `<c>` element.
fn write_cell(xml: &mut String, reference: &str, cell: &Cell, sst: &mut SharedStrings) -> Result<()> {
    write!(xml, r#"<c r="{}""#, reference).map_err(write_err)?;
    if !cell.style.is_default() {
        write!(xml, r#" s="{}""#, cell.style.0).map_err(write_err)?;
    }

    if let Some(formula) = &cell.formula {
        // Cached value of a formula cell is stored in place, never shared
        match &cell.value {
            CellValue::Text(_) => xml.push_str(r#" t="str""#),
            CellValue::Bool(_) => xml.push_str(r#" t="b""#),
            CellValue::Error(_) => xml.push_str(r#" t="e""#),
            CellValue::Number(_) | CellValue::Empty => {},
        }
        xml.push_str("><f");
        for (key, value) in &formula.attrs {
            write!(xml, r#" {}="{}""#, key, value).map_err(write_err)?;
        }
        if formula.text.is_empty() {
            xml.push_str("/>");
        } else {
            write!(xml, ">{}</f>", formula.text).map_err(write_err)?;
        }
        match &cell.value {
            CellValue::Empty => {},
            CellValue::Text(s) | CellValue::Error(s) => {
                write!(xml, "<v>{}</v>", quick_xml::escape::escape(s.as_str())).map_err(write_err)?;
            },
            CellValue::Number(n) => write!(xml, "<v>{}</v>", format_number(*n)).map_err(write_err)?,
            CellValue::Bool(b) => write!(xml, "<v>{}</v>", if *b { 1 } else { 0 }).map_err(write_err)?,
        }
        xml.push_str("</c>");
        return Ok(());
    }

    match &cell.value {
        CellValue::Empty => xml.push_str("/>"),
        CellValue::Text(s) => {
            let index = match cell.shared_index() {
                Some(index) => index,
                None => sst.intern(s),
            };
            write!(xml, r#" t="s"><v>{}</v></c>"#, index).map_err(write_err)?;
        },
        CellValue::Number(n) => {
            write!(xml, "><v>{}</v></c>", format_number(*n)).map_err(write_err)?;
        },
        CellValue::Bool(b) => {
            write!(xml, r#" t="b"><v>{}</v></c>"#, if *b { 1 } else { 0 }).map_err(write_err)?;
        },
        CellValue::Error(e) => {
            write!(xml, r#" t="e"><v>{}</v></c>"#, quick_xml::escape::escape(e.as_str()))
                .map_err(write_err)?;
        },
    }

    Ok(())
}

/// Write `<mergeCells>`, or nothing when the sheet has no merged ranges.
fn write_merge_cells(xml: &mut String, sheet: &Sheet) -> Result<()> {
    let merges = sheet.merges();
    if merges.is_empty() {
        return Ok(());
    }

    write!(xml, r#"<mergeCells count="{}">"#, merges.len()).map_err(write_err)?;
    for merge in merges {
        write!(xml, r#"<mergeCell ref="{}"/>"#, merge).map_err(write_err)?;
    }
    xml.push_str("</mergeCells>");
    Ok(())
}
