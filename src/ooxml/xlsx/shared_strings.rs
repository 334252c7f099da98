//! Shared strings table for Excel files.
//!
//! Every original `<si>` entry is kept byte-for-byte so indices used by other
//! sheets, rich-text runs and phonetic hints survive. New strings are appended
//! at the end of the table.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::parsers::text::{push_escaped, unescape_text};
use crate::ooxml::error::Result;

/// One `<si>` entry.
#[derive(Debug, Clone)]
pub(crate) struct StringItem {
    /// Escaped XML of the whole `<si>` element
    pub(crate) raw: String,
    /// Plain text, runs concatenated, phonetic hints dropped
    pub(crate) text: String,
}

/// Shared strings table for efficient string storage.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    /// Attributes of the `<sst>` root other than the counts, values escaped
    pub(crate) root_attrs: Vec<(String, String)>,
    pub(crate) items: Vec<StringItem>,
    /// Plain (single-run) entries by text, reused when interning
    plain_index: HashMap<String, u32>,
    /// Number of entries present when the table was loaded
    loaded: usize,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `xl/sharedStrings.xml`.
    ///
    /// Elements are matched by local name, so prefixed tables (`<x:si>`)
    /// load the same as unprefixed ones.
    pub fn parse(content: &str) -> Result<Self> {
        let mut sst = SharedStrings::default();
        let mut reader = Reader::from_str(content);

        loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"sst" => {
                    sst.root_attrs = Self::root_attrs(&e)?;
                },
                Event::Empty(e) if e.local_name().as_ref() == b"sst" => {
                    sst.root_attrs = Self::root_attrs(&e)?;
                    break;
                },
                Event::Start(e) if e.local_name().as_ref() == b"si" => {
                    reader.read_to_end(e.name())?;
                    let end = reader.buffer_position() as usize;
                    sst.push_raw(&content[start..end])?;
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    let end = reader.buffer_position() as usize;
                    sst.push_raw(&content[start..end])?;
                },
                Event::Eof => break,
                _ => {},
            }
        }

        sst.loaded = sst.items.len();
        Ok(sst)
    }

    /// Attributes of the `<sst>` start tag, without `count` and `uniqueCount`.
    fn root_attrs(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if key == "count" || key == "uniqueCount" {
                continue;
            }
            attrs.push((key, String::from_utf8_lossy(&attr.value).into_owned()));
        }
        Ok(attrs)
    }

    fn push_raw(&mut self, raw: &str) -> Result<()> {
        let (text, plain) = Self::item_text(raw)?;
        self.push_item(
            StringItem {
                raw: raw.to_string(),
                text,
            },
            plain,
        );
        Ok(())
    }

    /// Text of an `<si>` element (`<t>` contents outside `<rPh>` runs), and
    /// whether it is a single unformatted run with no phonetic data.
    fn item_text(raw: &str) -> Result<(String, bool)> {
        let mut reader = Reader::from_str(raw);
        let mut escaped = String::new();
        let mut in_t = false;
        let mut plain = true;
        let mut phonetic_depth = 0u32;

        loop {
            let event = reader.read_event()?;
            match &event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"t" => in_t = phonetic_depth == 0,
                    b"r" => plain = false,
                    b"rPh" => {
                        plain = false;
                        phonetic_depth += 1;
                    },
                    _ => {},
                },
                Event::Empty(e) if matches!(e.local_name().as_ref(), b"r" | b"rPh") => plain = false,
                Event::End(e) => match e.local_name().as_ref() {
                    b"t" => in_t = false,
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    _ => {},
                },
                Event::Eof => break,
                _ if in_t => push_escaped(&mut escaped, &event),
                _ => {},
            }
        }

        Ok((unescape_text(&escaped)?, plain))
    }

    fn push_item(&mut self, item: StringItem, plain: bool) {
        let index = self.items.len() as u32;
        if plain {
            self.plain_index.entry(item.text.clone()).or_insert(index);
        }
        self.items.push(item);
    }

    /// Get a string by its index.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.items.get(index as usize).map(|item| item.text.as_str())
    }

    /// Index of `text`, appending a plain entry when none exists yet.
    pub fn intern(&mut self, text: &str) -> u32 {
        if let Some(&index) = self.plain_index.get(text) {
            return index;
        }

        let escaped = quick_xml::escape::escape(text);
        let needs_preserve = text.starts_with(char::is_whitespace)
            || text.ends_with(char::is_whitespace)
            || text.contains('\n');
        let raw = if needs_preserve {
            format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escaped)
        } else {
            format!("<si><t>{}</t></si>", escaped)
        };

        let index = self.items.len() as u32;
        self.push_item(
            StringItem {
                raw,
                text: text.to_string(),
            },
            true,
        );
        index
    }

    /// Get the number of strings in the table.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of entries appended since the table was loaded.
    pub fn appended(&self) -> usize {
        self.items.len() - self.loaded
    }
}
