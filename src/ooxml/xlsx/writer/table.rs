//! Table parts (`xl/tables/tableN.xml`).

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use super::{rewrite_attrs, shift_all, write_element};
use crate::ooxml::error::{OoxmlError, Result};
use crate::sheet::RowInsertion;

/// Rewrite a table part with its ranges shifted by `insertions`.
///
/// The table, its auto-filter and its sort state each carry a `ref`; a table
/// the insertion falls inside grows with it.
pub fn write_table(original: &str, insertions: &[RowInsertion]) -> Result<String> {
    let mut reader = Reader::from_str(original);
    let mut writer = Writer::new(Vec::with_capacity(original.len() + 16));

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) | Event::Empty(e)
                if matches!(
                    e.local_name().as_ref(),
                    b"table" | b"autoFilter" | b"sortState" | b"sortCondition"
                ) =>
            {
                let out = rewrite_attrs(e, |key, value| {
                    (key == b"ref").then(|| shift_all(value, insertions))
                })?;
                write_element(&mut writer, out, matches!(event, Event::Empty(_)))?;
            },
            Event::Eof => break,
            _ => writer.write_event(event.borrow())?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| OoxmlError::InvalidFormat(format!("table output is not UTF-8: {}", e)))
}
