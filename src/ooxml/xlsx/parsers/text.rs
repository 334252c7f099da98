//! Helpers for collecting element text from `quick-xml` events.
//!
//! Text is accumulated in its escaped form (entity references arrive as
//! separate events) and unescaped once the element closes.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;

use crate::ooxml::error::{OoxmlError, Result};

/// Append the escaped form of a text-bearing event to `raw`.
pub(crate) fn push_escaped(raw: &mut String, event: &Event<'_>) {
    match event {
        Event::Text(e) => raw.push_str(&String::from_utf8_lossy(e)),
        Event::GeneralRef(e) => {
            raw.push('&');
            raw.push_str(&String::from_utf8_lossy(e));
            raw.push(';');
        },
        Event::CData(e) => raw.push_str(&escape(String::from_utf8_lossy(e))),
        _ => {},
    }
}

/// Resolve entity and character references.
pub(crate) fn unescape_text(raw: &str) -> Result<String> {
    unescape(raw)
        .map(Cow::into_owned)
        .map_err(|e| OoxmlError::Xml(format!("invalid escape in '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;

    #[test]
    fn test_collects_entities() {
        let mut reader = Reader::from_str("<t>A &amp; B &#233;<![CDATA[<x>]]></t>");
        let mut raw = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                event => push_escaped(&mut raw, &event),
            }
        }
        assert_eq!(unescape_text(&raw).unwrap(), "A & B é<x>");
    }
}
