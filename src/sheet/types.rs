//! Cell types for the sparse grid.

use super::range::Range;

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Cell carries only formatting
    #[default]
    Empty,
    /// String value, whether shared, inline or a formula result
    Text(String),
    /// Numeric value (dates are numbers with a date format)
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Error value such as `#N/A`
    Error(String),
}

impl CellValue {
    /// Borrow the text of a textual value.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Display form of the value as a reader would show it without number formats.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) | CellValue::Error(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
        }
    }
}

/// Index into the workbook's `cellXfs` table.
///
/// Copying a cell copies this index; the style definition itself lives in
/// `xl/styles.xml` and is never duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct StyleRef(pub u32);

impl StyleRef {
    /// The default cell format (`s` attribute omitted).
    pub const DEFAULT: StyleRef = StyleRef(0);

    #[inline]
    pub fn is_default(self) -> bool {
        self.0 == 0
    }
}

/// A formula as stored in the worksheet, kept in its escaped XML form.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// Attributes of the `<f>` element (`t`, `ref`, `si`, ...), values escaped
    pub attrs: Vec<(String, String)>,
    /// Escaped element text, empty for shared-formula followers
    pub text: String,
}

impl Formula {
    /// Shared-formula followers carry no text and depend on their master cell.
    pub fn is_shared_follower(&self) -> bool {
        self.text.is_empty() && self.attrs.iter().any(|(k, v)| k == "t" && v == "shared")
    }

    /// Adjust the `ref` range of a shared master or array formula for
    /// `count` rows inserted before row `at`.
    pub fn insert_rows(&mut self, at: u32, count: u32) {
        for (key, value) in self.attrs.iter_mut() {
            if key != "ref" {
                continue;
            }
            if let Some(mut range) = Range::parse(value) {
                range.insert_rows(at, count);
                *value = range.to_string();
            }
        }
    }
}

/// A populated cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    /// Raw value
    pub value: CellValue,
    /// Display string, kept in sync with textual values
    pub formatted: String,
    /// Style reference
    pub style: StyleRef,
    /// Formula, carried verbatim
    pub formula: Option<Formula>,
    /// Shared-string slot the text was loaded from; cleared when the text changes
    pub(crate) shared_index: Option<u32>,
}

impl Cell {
    /// Create a cell from a value with the default style.
    pub fn new(value: CellValue) -> Self {
        let formatted = value.display();
        Self {
            value,
            formatted,
            ..Default::default()
        }
    }

    /// Create a text cell.
    pub fn text<S: Into<String>>(s: S) -> Self {
        Self::new(CellValue::Text(s.into()))
    }

    /// Create a numeric cell.
    pub fn number(n: f64) -> Self {
        Self::new(CellValue::Number(n))
    }

    /// Set the style reference.
    pub fn with_style(mut self, style: StyleRef) -> Self {
        self.style = style;
        self
    }

    /// Textual value, if any.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Replace the text of the cell, keeping style and dropping the shared-string slot.
    pub fn set_text(&mut self, text: String) {
        self.formatted.clone_from(&text);
        self.value = CellValue::Text(text);
        self.shared_index = None;
    }

    /// Shared-string slot the text was loaded from, if still unchanged.
    #[inline]
    pub fn shared_index(&self) -> Option<u32> {
        self.shared_index
    }
}

/// Format a number in its natural decimal form.
///
/// Whole numbers print without a fractional part (`3`, not `3.0`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        buf.format(n as i64).to_string()
    } else {
        let mut buf = ryu::Buffer::new();
        buf.format(n).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1), "0.1");
    }

    #[test]
    fn test_set_text_drops_shared_slot() {
        let mut cell = Cell::text("{descripcion}").with_style(StyleRef(4));
        cell.shared_index = Some(7);
        cell.set_text("PIEZA A".to_string());

        assert_eq!(cell.as_text(), Some("PIEZA A"));
        assert_eq!(cell.formatted, "PIEZA A");
        assert_eq!(cell.style, StyleRef(4));
        assert_eq!(cell.shared_index(), None);
    }

    #[test]
    fn test_shared_follower() {
        let follower = Formula {
            attrs: vec![("t".into(), "shared".into()), ("si".into(), "0".into())],
            text: String::new(),
        };
        assert!(follower.is_shared_follower());

        let master = Formula {
            attrs: vec![("t".into(), "shared".into()), ("ref".into(), "C2:C5".into())],
            text: "A2*B2".into(),
        };
        assert!(!master.is_shared_follower());
    }

    #[test]
    fn test_formula_ref_follows_inserted_rows() {
        let mut master = Formula {
            attrs: vec![("t".into(), "shared".into()), ("ref".into(), "E6:E7".into()), ("si".into(), "0".into())],
            text: "C6*2".into(),
        };
        master.insert_rows(4, 2);
        assert_eq!(master.attrs[1].1, "E8:E9");
        assert_eq!(master.text, "C6*2");

        let mut straddling = Formula {
            attrs: vec![("t".into(), "shared".into()), ("ref".into(), "E4:E6".into())],
            text: "C4*2".into(),
        };
        straddling.insert_rows(4, 1);
        assert_eq!(straddling.attrs[1].1, "E4:E7");

        let mut above = Formula {
            attrs: vec![("t".into(), "array".into()), ("ref".into(), "D2".into())],
            text: "SUM(A1:A2)".into(),
        };
        above.insert_rows(4, 1);
        assert_eq!(above.attrs[1].1, "D2");
    }
}
