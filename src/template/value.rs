//! Scalar values and the records they are grouped into.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{Result, TemplateError};
use super::options::TemplateOptions;
use crate::sheet::format_number;

/// A scalar substituted into a placeholder.
///
/// Deserialized untagged: booleans and numbers map directly, strings in
/// ISO `YYYY-MM-DD` form become dates and any other string stays text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    /// String form written into the cell.
    pub fn render(&self, options: &TemplateOptions) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Bool(true) => options.yes_text.clone(),
            Value::Bool(false) => options.no_text.clone(),
            Value::Date(d) => d.format(&options.date_format).to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

/// Placeholder name to value.
pub type Fields = BTreeMap<String, Value>;

/// Fields substituted once across the sheet.
pub type HeaderRecord = Fields;

/// Fields of one generated row.
pub type LineItem = Fields;

/// Build a [`Fields`] map from `key => value` pairs.
///
/// ```rust
/// use sheetfill::fields;
///
/// let item = fields! { "descripcion" => "PIEZA A", "cantidad" => 3 };
/// assert_eq!(item.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => { $crate::template::Fields::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::template::Fields::new();
        $(fields.insert(::std::string::String::from($key), $crate::template::Value::from($value));)+
        fields
    }};
}

/// One document to render: header fields plus ordered line-items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    #[serde(default)]
    pub header: HeaderRecord,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Record {
    pub fn new(header: HeaderRecord, items: Vec<LineItem>) -> Self {
        Self { header, items }
    }

    /// Parse a record from YAML.
    ///
    /// ```rust
    /// use sheetfill::template::{Record, Value};
    ///
    /// let record = Record::from_yaml_str(
    ///     "header:\n  num_pedido: P-100\n  fecha: 2024-05-01\nitems:\n  - descripcion: PIEZA A\n    cantidad: 2\n",
    /// )
    /// .unwrap();
    /// assert_eq!(record.header["num_pedido"], Value::Text("P-100".into()));
    /// assert!(matches!(record.header["fecha"], Value::Date(_)));
    /// assert_eq!(record.items[0]["cantidad"], Value::Number(2.0));
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| TemplateError::Config(format!("invalid record YAML: {}", e)))
    }

    /// Reject keys present in both the header and any line-item.
    pub fn check_namespaces(&self) -> Result<()> {
        for item in &self.items {
            if let Some(key) = item.keys().find(|key| self.header.contains_key(*key)) {
                return Err(TemplateError::KeyCollision { key: key.clone() });
            }
        }
        Ok(())
    }
}
