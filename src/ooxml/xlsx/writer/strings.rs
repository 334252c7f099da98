//! Shared strings table serialization.

use std::fmt::Write as FmtWrite;

use super::write_err;
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::xlsx::shared_strings::SharedStrings;

/// Serialize the shared strings table to XML.
///
/// Loaded `<si>` entries are written back unchanged. The `count` attribute
/// (total references across the workbook) is omitted since it is optional
/// and no longer known after rows are added.
pub fn write_shared_strings(sst: &SharedStrings) -> Result<String> {
    let raw_len: usize = sst.items.iter().map(|item| item.raw.len()).sum();
    let mut xml = String::with_capacity(raw_len + 256);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str("\n<sst");
    if !sst.root_attrs.iter().any(|(key, _)| key == "xmlns") {
        write!(xml, r#" xmlns="{}""#, namespace::SML_MAIN).map_err(write_err)?;
    }
    for (key, value) in &sst.root_attrs {
        write!(xml, r#" {}="{}""#, key, value).map_err(write_err)?;
    }
    write!(xml, r#" uniqueCount="{}">"#, sst.len()).map_err(write_err)?;

    for item in &sst.items {
        xml.push_str(&item.raw);
    }

    xml.push_str("</sst>");

    Ok(xml)
}
