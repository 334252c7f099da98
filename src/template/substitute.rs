//! `{key}` placeholder substitution.
//!
//! Tokens are resolved in a single left-to-right pass, so text inserted for
//! one token is never scanned again. Tokens whose key has no value are kept
//! verbatim and reported.

use std::borrow::Cow;

use memchr::memchr;
use smallvec::SmallVec;

use super::options::TemplateOptions;
use super::report::UnresolvedPlaceholder;
use super::value::Fields;
use crate::sheet::{Cell, Sheet};

/// Non-empty, no whitespace, no braces.
pub fn is_placeholder_key(key: &str) -> bool {
    !key.is_empty() && !key.chars().any(|c| c.is_whitespace() || c == '{' || c == '}')
}

/// Result of substituting one string.
#[derive(Debug)]
pub struct Substituted<'a> {
    /// Borrowed when no token was replaced
    pub text: Cow<'a, str>,
    /// Keys of tokens left in place
    pub unresolved: SmallVec<[&'a str; 2]>,
}

/// Replace every `{key}` in `text` that has a value in `values`.
pub fn substitute_text<'a>(text: &'a str, values: &Fields, options: &TemplateOptions) -> Substituted<'a> {
    let bytes = text.as_bytes();
    let mut out: Option<String> = None;
    let mut unresolved = SmallVec::new();
    // Start of the text not yet copied to `out`
    let mut copied = 0;
    let mut pos = 0;

    while let Some(open) = memchr(b'{', &bytes[pos..]).map(|i| pos + i) {
        let Some(close) = memchr(b'}', &bytes[open + 1..]).map(|i| open + 1 + i) else {
            break;
        };
        let key = &text[open + 1..close];
        if !is_placeholder_key(key) {
            // A later brace may still open a valid token
            pos = open + 1;
            continue;
        }

        match values.get(key) {
            Some(value) => {
                let buf = out.get_or_insert_with(|| String::with_capacity(text.len() + 16));
                buf.push_str(&text[copied..open]);
                buf.push_str(&value.render(options));
                copied = close + 1;
            },
            None => unresolved.push(key),
        }
        pos = close + 1;
    }

    let text = match out {
        Some(mut buf) => {
            buf.push_str(&text[copied..]);
            Cow::Owned(buf)
        },
        None => Cow::Borrowed(text),
    };
    Substituted { text, unresolved }
}

/// Substitute one cell in place, appending its unresolved tokens to `report`.
///
/// Formula cells are skipped: their text is a cached result.
fn substitute_cell(
    row: u32,
    col: u32,
    cell: &mut Cell,
    values: &Fields,
    options: &TemplateOptions,
    report: &mut Vec<UnresolvedPlaceholder>,
) {
    if cell.formula.is_some() {
        return;
    }
    let new_text = {
        let Some(text) = cell.as_text() else {
            return;
        };
        let result = substitute_text(text, values, options);
        report.extend(result.unresolved.iter().map(|key| UnresolvedPlaceholder {
            row,
            col,
            key: key.to_string(),
        }));
        match result.text {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        }
    };

    if let Some(new_text) = new_text {
        cell.set_text(new_text);
    }
}

/// Substitute header values in every text cell outside `exclude_row`.
pub fn substitute_global(
    sheet: &mut Sheet,
    exclude_row: u32,
    values: &Fields,
    options: &TemplateOptions,
) -> Vec<UnresolvedPlaceholder> {
    let mut unresolved = Vec::new();
    for ((row, col), cell) in sheet.cells_mut() {
        if row != exclude_row {
            substitute_cell(row, col, cell, values, options, &mut unresolved);
        }
    }
    log::debug!(
        "header substitution left {} placeholders unresolved",
        unresolved.len()
    );
    unresolved
}

/// Substitute one line-item's values into the cells of `row`.
pub fn substitute_line<'c, I>(
    row: u32,
    cells: I,
    values: &Fields,
    options: &TemplateOptions,
) -> Vec<UnresolvedPlaceholder>
where
    I: IntoIterator<Item = (u32, &'c mut Cell)>,
{
    let mut unresolved = Vec::new();
    for (col, cell) in cells {
        substitute_cell(row, col, cell, values, options, &mut unresolved);
    }
    unresolved
}
