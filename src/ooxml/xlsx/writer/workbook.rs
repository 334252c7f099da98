//! Defined names of the workbook part.
//!
//! Print areas, print titles, filter ranges and user names live in
//! `<definedNames>` as formulas qualified with a sheet name; they are the
//! only references to a worksheet's rows held outside the worksheet itself.

use quick_xml::escape::minimal_escape;
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::parsers::text::{push_escaped, unescape_text};
use crate::sheet::{RowInsertion, shift_sheet_refs};

/// Rewrite `original` with every reference to `sheet` inside a
/// `<definedName>` shifted by `insertions`.
///
/// Names whose formula does not change are written back byte-for-byte.
pub fn write_defined_names(original: &str, sheet: &str, insertions: &[RowInsertion]) -> Result<String> {
    let mut reader = Reader::from_str(original);
    let mut writer = Writer::new(Vec::with_capacity(original.len() + 64));
    let mut formula: Option<String> = None;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) if e.local_name().as_ref() == b"definedName" => {
                formula = Some(String::new());
                writer.write_event(event.borrow())?;
            },
            Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) if formula.is_some() => {
                if let Some(raw) = formula.as_mut() {
                    push_escaped(raw, &event);
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"definedName" => {
                if let Some(raw) = formula.take() {
                    let text = unescape_text(&raw)?;
                    let shifted = insertions.iter().fold(text.clone(), |acc, insertion| {
                        shift_sheet_refs(&acc, sheet, insertion.at, insertion.count)
                    });
                    let escaped = if shifted == text {
                        raw
                    } else {
                        log::debug!("defined name '{}' now '{}'", text, shifted);
                        minimal_escape(shifted.as_str()).into_owned()
                    };
                    writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
                }
                writer.write_event(event.borrow())?;
            },
            Event::Eof => break,
            _ => writer.write_event(event.borrow())?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| OoxmlError::InvalidFormat(format!("workbook output is not UTF-8: {}", e)))
}
