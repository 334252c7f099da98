//! The `[Content_Types].xml` part.
//!
//! Defaults map file extensions to content types; overrides map single part
//! names. Both keep their document order so an unchanged part serializes the
//! same way it was read.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;

#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// `(extension, content type)`
    defaults: Vec<(String, String)>,
    /// `(part name, content type)`
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse `[Content_Types].xml`.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let is_default = match e.local_name().as_ref() {
                        b"Default" => Some(true),
                        b"Override" => Some(false),
                        _ => None,
                    };

                    if let Some(is_default) = is_default {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => {
                                    key = Some(attr.unescape_value()?.into_owned())
                                },
                                b"ContentType" => {
                                    content_type = Some(attr.unescape_value()?.into_owned())
                                },
                                _ => {},
                            }
                        }

                        if let (Some(key), Some(ct)) = (key, content_type) {
                            if is_default {
                                types.defaults.push((key, ct));
                            } else {
                                types.overrides.push((key, ct));
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Content types parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type of a part, checking overrides before extension defaults.
    pub fn content_type(&self, partname: &PackURI) -> Option<&str> {
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(partname.as_str()))
        {
            return Some(ct);
        }

        let ext = partname.filename().rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }

    /// Set the override for a part, replacing any existing one.
    pub fn set_override(&mut self, partname: &PackURI, content_type: &str) {
        match self
            .overrides
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(partname.as_str()))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self
                .overrides
                .push((partname.as_str().to_string(), content_type.to_string())),
        }
    }

    /// Remove the override for a part. Returns whether one existed.
    pub fn remove_override(&mut self, partname: &PackURI) -> bool {
        let before = self.overrides.len();
        self.overrides
            .retain(|(name, _)| !name.eq_ignore_ascii_case(partname.as_str()));
        self.overrides.len() != before
    }

    /// Serialize to `[Content_Types].xml`.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + (self.defaults.len() + self.overrides.len()) * 128);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns=""#);
        xml.push_str(namespace::OPC_CONTENT_TYPES);
        xml.push_str(r#"">"#);

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext.as_str()),
                escape(ct.as_str())
            ));
        }
        for (name, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(name.as_str()),
                escape(ct.as_str())
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/>
</Types>"#;

    #[test]
    fn test_lookup() {
        let types = ContentTypes::parse(CONTENT_TYPES.as_bytes()).unwrap();
        let wb = PackURI::new("/xl/workbook.xml").unwrap();
        assert_eq!(types.content_type(&wb), Some(ct::SML_SHEET_MAIN));
        let other = PackURI::new("/docProps/custom.xml").unwrap();
        assert_eq!(types.content_type(&other), Some(ct::XML));
    }

    #[test]
    fn test_edit_overrides() {
        let mut types = ContentTypes::parse(CONTENT_TYPES.as_bytes()).unwrap();
        let calc = PackURI::new("/xl/calcChain.xml").unwrap();
        let sst = PackURI::new("/xl/sharedStrings.xml").unwrap();

        assert!(types.remove_override(&calc));
        assert!(!types.remove_override(&calc));
        types.set_override(&sst, ct::SML_SHARED_STRINGS);

        let reparsed = ContentTypes::parse(types.to_xml().as_bytes()).unwrap();
        assert_eq!(reparsed.content_type(&sst), Some(ct::SML_SHARED_STRINGS));
        assert_eq!(reparsed.content_type(&calc), Some(ct::XML));
    }
}
