//! Parser for Excel worksheet XML files.
//!
//! Reads a worksheet part (sheet1.xml, sheet2.xml, ...) into a [`Sheet`]:
//! the declared `<dimension>`, row attributes, every `<c>` element with its
//! style reference and type tag, and merged ranges. Everything else in the
//! part is left for the writer to stream through.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::text::{push_escaped, unescape_text};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::shared_strings::SharedStrings;
use crate::sheet::{Cell, CellValue, Formula, Range, RowProps, Sheet, StyleRef, parse_cell_ref};

// Pre-allocate typical capacities to reduce reallocations
const INITIAL_CELL_CAPACITY: usize = 256;

/// A `<c>` element being read.
#[derive(Default)]
struct CellBuilder {
    row: u32,
    col: u32,
    style: StyleRef,
    cell_type: Option<String>,
    value: String,
    inline: String,
    formula: Option<Formula>,
}

impl CellBuilder {
    fn finish(self, sst: &SharedStrings) -> Result<(u32, u32, Cell)> {
        let mut shared_index = None;
        let value = match self.cell_type.as_deref() {
            Some("s") => {
                let index = atoi_simd::parse_pos::<u32, false>(self.value.trim().as_bytes()).map_err(|_| {
                    OoxmlError::InvalidFormat(format!("bad shared string index '{}'", self.value))
                })?;
                let text = sst.get(index).ok_or_else(|| {
                    OoxmlError::InvalidFormat(format!("shared string {} out of range", index))
                })?;
                shared_index = Some(index);
                CellValue::Text(text.to_string())
            },
            Some("inlineStr") => CellValue::Text(unescape_text(&self.inline)?),
            Some("str") | Some("d") => CellValue::Text(unescape_text(&self.value)?),
            Some("b") => CellValue::Bool(self.value.trim() == "1"),
            Some("e") => CellValue::Error(unescape_text(&self.value)?),
            _ if self.value.trim().is_empty() => CellValue::Empty,
            _ => {
                let n = fast_float2::parse::<f64, _>(self.value.trim()).map_err(|_| {
                    OoxmlError::InvalidFormat(format!("bad numeric value '{}'", self.value))
                })?;
                CellValue::Number(n)
            },
        };

        let cell = Cell {
            formatted: value.display(),
            value,
            style: self.style,
            formula: self.formula,
            shared_index,
        };
        Ok((self.row, self.col, cell))
    }
}

/// Collect an element's attributes as escaped `(key, value)` pairs, skipping `skip`.
fn raw_attrs(e: &BytesStart<'_>, skip: &[&[u8]]) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        if skip.contains(&attr.key.as_ref()) {
            continue;
        }
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attr.value).into_owned(),
        ));
    }
    Ok(attrs)
}

/// Unescaped value of one attribute.
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Parse worksheet XML content into a sheet named `name`.
///
/// # Errors
/// Malformed XML, unreadable cell references, out-of-range shared string
/// indices and non-numeric values in numeric cells are all reported as errors.
pub fn parse_worksheet_xml(name: &str, content: &str, sst: &SharedStrings) -> Result<Sheet> {
    let mut reader = Reader::from_str(content);

    let mut declared: Option<Range> = None;
    let mut cells = Vec::with_capacity(INITIAL_CELL_CAPACITY);
    let mut rows: Vec<(u32, RowProps)> = Vec::new();
    let mut merges = Vec::new();

    let mut next_row = 0u32;
    let mut current_row = 0u32;
    let mut next_col = 0u32;
    let mut cell: Option<CellBuilder> = None;

    let mut in_v = false;
    let mut in_f = false;
    let mut in_is = false;
    let mut in_t = false;
    let mut phonetic_depth = 0u32;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"dimension" => {
                        declared = attr_value(e, b"ref")?.as_deref().and_then(Range::parse);
                    },
                    b"row" => {
                        current_row = match attr_value(e, b"r")? {
                            Some(r) => atoi_simd::parse_pos::<u32, false>(r.as_bytes())
                                .ok()
                                .filter(|&r| r > 0)
                                .map(|r| r - 1)
                                .ok_or_else(|| {
                                    OoxmlError::InvalidFormat(format!("bad row index '{}'", r))
                                })?,
                            None => next_row,
                        };
                        next_row = current_row + 1;
                        next_col = 0;

                        let props = RowProps {
                            attrs: raw_attrs(e, &[b"r", b"spans"])?,
                        };
                        if !props.is_empty() {
                            rows.push((current_row, props));
                        }
                    },
                    b"c" => {
                        let (row, col) = match attr_value(e, b"r")? {
                            Some(r) => parse_cell_ref(&r).ok_or_else(|| {
                                OoxmlError::InvalidFormat(format!("bad cell reference '{}'", r))
                            })?,
                            None => (current_row, next_col),
                        };
                        next_col = col + 1;

                        let style = attr_value(e, b"s")?
                            .and_then(|s| atoi_simd::parse_pos::<u32, false>(s.as_bytes()).ok())
                            .map(StyleRef)
                            .unwrap_or_default();
                        let builder = CellBuilder {
                            row,
                            col,
                            style,
                            cell_type: attr_value(e, b"t")?,
                            ..Default::default()
                        };

                        if is_empty {
                            cells.push(builder.finish(sst)?);
                        } else {
                            cell = Some(builder);
                        }
                    },
                    b"v" => in_v = !is_empty,
                    b"f" => {
                        if let Some(builder) = cell.as_mut() {
                            builder.formula = Some(Formula {
                                attrs: raw_attrs(e, &[])?,
                                text: String::new(),
                            });
                        }
                        in_f = !is_empty;
                    },
                    b"is" => in_is = !is_empty,
                    b"t" if in_is => in_t = !is_empty && phonetic_depth == 0,
                    b"rPh" if !is_empty => phonetic_depth += 1,
                    b"mergeCell" => {
                        if let Some(range) = attr_value(e, b"ref")?.as_deref().and_then(Range::parse) {
                            merges.push(range);
                        }
                    },
                    _ => {},
                }
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(builder) = cell.take() {
                        cells.push(builder.finish(sst)?);
                    }
                },
                b"v" => in_v = false,
                b"f" => in_f = false,
                b"is" => in_is = false,
                b"t" => in_t = false,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                _ => {},
            },
            Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) => {
                if let Some(builder) = cell.as_mut() {
                    if in_v {
                        push_escaped(&mut builder.value, &event);
                    } else if in_f {
                        // Formula text stays escaped; it is written back verbatim
                        if let Some(formula) = builder.formula.as_mut() {
                            push_escaped(&mut formula.text, &event);
                        }
                    } else if in_is && in_t {
                        push_escaped(&mut builder.inline, &event);
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    let range = declared
        .or_else(|| cells.first().map(|(row, col, _)| Range::single(*row, *col)))
        .unwrap_or_else(|| Range::single(0, 0));
    let mut sheet = Sheet::with_range(name, range);

    for (row, col, cell) in cells {
        sheet.set_cell(row, col, cell);
    }
    for (row, props) in rows {
        sheet.set_row_props(row, props);
    }
    for merge in merges {
        sheet.add_merge(merge);
    }

    Ok(sheet)
}
