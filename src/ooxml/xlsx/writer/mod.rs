//! Serializers for the workbook parts rewritten on output.

pub mod sheet;
pub mod strings;
pub mod table;
pub mod workbook;

pub use sheet::write_worksheet;
pub use strings::write_shared_strings;
pub use table::write_table;
pub use workbook::write_defined_names;

use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

use crate::ooxml::error::{OoxmlError, Result};
use crate::sheet::{RowInsertion, shift_sqref};

pub(crate) fn write_err(e: std::fmt::Error) -> OoxmlError {
    OoxmlError::Xml(format!("XML write error: {}", e))
}

/// Copy of `e` with attribute values replaced where `replace` returns one.
///
/// `replace` sees the key and the escaped value; its result is written as is.
pub(crate) fn rewrite_attrs<F>(e: &BytesStart<'_>, replace: F) -> Result<BytesStart<'static>>
where
    F: Fn(&[u8], &str) -> Option<String>,
{
    let mut out = e.to_owned();
    out.clear_attributes();

    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        let value = String::from_utf8_lossy(&attr.value);
        match replace(key, &value) {
            Some(new_value) => out.push_attribute((key, new_value.as_bytes())),
            None => out.push_attribute((key, attr.value.as_ref())),
        }
    }

    Ok(out)
}

pub(crate) fn write_element(writer: &mut Writer<Vec<u8>>, e: BytesStart<'_>, is_empty: bool) -> Result<()> {
    if is_empty {
        writer.write_event(Event::Empty(e))?;
    } else {
        writer.write_event(Event::Start(e))?;
    }
    Ok(())
}

/// Replay every insertion over a `ref`/`sqref` value.
pub(crate) fn shift_all(sqref: &str, insertions: &[RowInsertion]) -> String {
    insertions.iter().fold(sqref.to_string(), |acc, insertion| {
        shift_sqref(&acc, insertion.at, insertion.count)
    })
}
