//! Parser for Excel workbook.xml files.
//!
//! Only the `<sheets>` list is read: sheet names, ids and the relationship
//! that locates each worksheet part.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::ooxml::error::Result;

// Pre-allocate typical capacity for worksheets
const INITIAL_SHEETS_CAPACITY: usize = 16;

/// A `<sheet>` entry of the workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEntry {
    pub name: String,
    pub sheet_id: u32,
    /// Relationship ID (`r:id`) pointing at the worksheet part
    pub relationship_id: String,
}

/// Parse workbook.xml content to extract sheet entries in workbook order.
pub fn parse_workbook_xml(content: &str) -> Result<Vec<SheetEntry>> {
    let mut sheets = Vec::with_capacity(INITIAL_SHEETS_CAPACITY);
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut sheet_id = None;
                let mut relationship_id = None;

                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key;
                    match (key.prefix().is_some(), key.local_name().as_ref()) {
                        (false, b"name") => name = Some(attr.unescape_value()?.into_owned()),
                        (false, b"sheetId") => {
                            sheet_id = atoi_simd::parse_pos::<u32, false>(&attr.value).ok();
                        },
                        // `r:id`, whatever the relationships namespace prefix is
                        (true, b"id") => {
                            relationship_id = Some(attr.unescape_value()?.into_owned())
                        },
                        _ => {},
                    }
                }

                if let (Some(name), Some(relationship_id)) = (name, relationship_id) {
                    sheets.push(SheetEntry {
                        name,
                        sheet_id: sheet_id.unwrap_or(sheets.len() as u32 + 1),
                        relationship_id,
                    });
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(sheets)
}
