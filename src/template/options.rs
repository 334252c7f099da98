//! Rendering options.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::error::{Result, TemplateError};
use super::substitute::is_placeholder_key;

pub const DEFAULT_MARKER: &str = "{descripcion}";
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// How a template is located and how values are rendered into it.
///
/// Every field has a default, so a YAML document only needs the fields it
/// changes:
///
/// ```rust
/// use sheetfill::template::TemplateOptions;
///
/// let options = TemplateOptions::from_yaml_str("sheet: Albaran\nyes_text: 'Yes'\n").unwrap();
/// assert_eq!(options.marker, "{descripcion}");
/// assert_eq!(options.sheet.as_deref(), Some("Albaran"));
/// assert_eq!(options.yes_text, "Yes");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateOptions {
    /// Placeholder token marking the anchor row
    pub marker: String,
    /// Sheet holding the anchor row; the first worksheet when unset
    pub sheet: Option<String>,
    /// Rendering of `true`
    pub yes_text: String,
    /// Rendering of `false`
    pub no_text: String,
    /// `chrono` format string for dates
    pub date_format: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            sheet: None,
            yes_text: "Sí".to_string(),
            no_text: "No".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl TemplateOptions {
    /// Parse and validate options from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| TemplateError::Config(format!("invalid options YAML: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_sheet<S: Into<String>>(mut self, sheet: S) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Check the marker is a `{name}` placeholder and the date format parses.
    pub fn validate(&self) -> Result<()> {
        if self.marker_key().is_none() {
            return Err(TemplateError::Config(format!(
                "marker '{}' is not a {{name}} placeholder",
                self.marker
            )));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(TemplateError::Config(format!(
                "invalid date format '{}'",
                self.date_format
            )));
        }
        Ok(())
    }

    /// Placeholder key of the marker (`descripcion` for `{descripcion}`).
    pub fn marker_key(&self) -> Option<&str> {
        self.marker
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|key| is_placeholder_key(key))
    }
}
