//! A1-style references and rectangular ranges.
//!
//! Coordinates are zero-based in memory; the conversion to Excel's one-based
//! `A1` notation happens only here.

use std::fmt;

/// Convert a zero-based column index to Excel column letters (0 -> "A", 26 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut n = col + 1;

    while n > 0 {
        n -= 1;
        letters.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    letters.reverse();
    // Only ASCII letters were pushed
    String::from_utf8(letters).unwrap_or_default()
}

/// Format a zero-based `(row, col)` pair as an `A1` reference.
pub fn cell_ref(row: u32, col: u32) -> String {
    let mut s = column_to_letters(col);
    let mut buf = itoa::Buffer::new();
    s.push_str(buf.format(row + 1));
    s
}

/// Parse an `A1` reference (absolute markers allowed) into zero-based `(row, col)`.
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let bytes = reference.as_bytes();
    let mut pos = 0;
    if bytes.first() == Some(&b'$') {
        pos += 1;
    }

    let col_start = pos;
    let mut col = 0u32;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        col = col
            .checked_mul(26)?
            .checked_add((bytes[pos].to_ascii_uppercase() - b'A' + 1) as u32)?;
        pos += 1;
    }
    if pos == col_start {
        return None;
    }

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }
    let row = atoi_simd::parse_pos::<u32, false>(&bytes[pos..]).ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

/// Inclusive rectangular range of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl Range {
    /// Create a range from two corners, normalizing their order.
    pub fn new(row_a: u32, col_a: u32, row_b: u32, col_b: u32) -> Self {
        Self {
            first_row: row_a.min(row_b),
            first_col: col_a.min(col_b),
            last_row: row_a.max(row_b),
            last_col: col_a.max(col_b),
        }
    }

    /// A range covering one cell.
    pub fn single(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    /// Parse `A1` or `A1:C5`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once(':') {
            Some((start, end)) => {
                let (r1, c1) = parse_cell_ref(start)?;
                let (r2, c2) = parse_cell_ref(end)?;
                Some(Self::new(r1, c1, r2, c2))
            },
            None => parse_cell_ref(s).map(|(r, c)| Self::single(r, c)),
        }
    }

    /// Number of rows spanned.
    #[inline]
    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    /// Number of columns spanned.
    #[inline]
    pub fn col_count(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    #[inline]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// Whether the range lies entirely within one row.
    #[inline]
    pub fn is_single_row(&self) -> bool {
        self.first_row == self.last_row
    }

    /// Grow the range so that it covers `(row, col)`.
    pub fn include(&mut self, row: u32, col: u32) {
        self.first_row = self.first_row.min(row);
        self.first_col = self.first_col.min(col);
        self.last_row = self.last_row.max(row);
        self.last_col = self.last_col.max(col);
    }

    /// Adjust the range for `count` rows inserted before row `at`.
    ///
    /// Ranges starting at or below `at` move down; ranges straddling `at`
    /// stretch; ranges entirely above are unchanged.
    pub fn insert_rows(&mut self, at: u32, count: u32) {
        if self.first_row >= at {
            self.first_row += count;
            self.last_row += count;
        } else if self.last_row >= at {
            self.last_row += count;
        }
    }

    /// The same columns moved to another row.
    pub fn on_row(&self, row: u32) -> Self {
        Self {
            first_row: row,
            last_row: row,
            ..*self
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = cell_ref(self.first_row, self.first_col);
        if self.first_row == self.last_row && self.first_col == self.last_col {
            f.write_str(&start)
        } else {
            write!(f, "{}:{}", start, cell_ref(self.last_row, self.last_col))
        }
    }
}

/// Shift a space-separated `sqref` list for rows inserted before `at`.
///
/// Tokens that are not plain cell ranges (whole rows or columns, names) are kept verbatim.
pub fn shift_sqref(sqref: &str, at: u32, count: u32) -> String {
    sqref
        .split_ascii_whitespace()
        .map(|token| match Range::parse(token) {
            Some(mut range) => {
                range.insert_rows(at, count);
                range.to_string()
            },
            None => token.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split one end of an area reference into its column part (with any `$`),
/// whether the row is absolute, and the one-based row if present.
///
/// Accepts `A1`, `$A$1`, `$A` and `$1`.
fn split_row(part: &str) -> Option<(&str, bool, Option<u32>)> {
    let bytes = part.as_bytes();
    let dollar = usize::from(bytes.first() == Some(&b'$'));
    let letters = bytes[dollar..].iter().take_while(|b| b.is_ascii_alphabetic()).count();
    let pos = if letters == 0 { 0 } else { dollar + letters };

    let row_abs = bytes.get(pos) == Some(&b'$');
    let digits = &bytes[pos + usize::from(row_abs)..];
    if digits.is_empty() {
        return (letters > 0 && !row_abs).then_some((&part[..pos], false, None));
    }
    let row = atoi_simd::parse_pos::<u32, false>(digits).ok().filter(|&row| row > 0)?;
    Some((&part[..pos], row_abs, Some(row)))
}

/// Shift an area reference as written in a formula (`$A$1:$D$10`, `B4`,
/// `$3:$5`) for `count` rows inserted before zero-based row `at`.
///
/// Absolute markers are kept. Whole-column references come back unchanged;
/// anything that is not a reference gives `None`.
pub fn shift_area_ref(reference: &str, at: u32, count: u32) -> Option<String> {
    let (start, end) = match reference.split_once(':') {
        Some((start, end)) => (split_row(start)?, Some(split_row(end)?)),
        None => (split_row(reference)?, None),
    };
    let last = end.unwrap_or(start);

    let (first_row, last_row) = match (start.2, last.2) {
        (Some(first), Some(last)) => (first - 1, last - 1),
        (None, None) => return Some(reference.to_string()),
        _ => return None,
    };
    let mut range = Range::new(first_row, 0, last_row, 0);
    range.insert_rows(at, count);

    let mut out = String::with_capacity(reference.len() + 2);
    let mut buf = itoa::Buffer::new();
    out.push_str(start.0);
    if start.1 {
        out.push('$');
    }
    out.push_str(buf.format(range.first_row + 1));
    if let Some((col, row_abs, _)) = end {
        out.push(':');
        out.push_str(col);
        if row_abs {
            out.push('$');
        }
        out.push_str(buf.format(range.last_row + 1));
    }
    Some(out)
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b >= 0x80
}

/// Sheet name written before the `!` at `bang`, unquoted, with its start offset.
fn sheet_before(formula: &str, bang: usize) -> Option<(usize, String)> {
    let bytes = formula.as_bytes();
    if bang > 0 && bytes[bang - 1] == b'\'' {
        let close = bang - 1;
        let mut end = close;
        loop {
            let open = memchr::memrchr(b'\'', &bytes[..end])?;
            // A doubled quote is an escaped quote inside the name
            if open > 0 && bytes[open - 1] == b'\'' {
                end = open - 1;
                continue;
            }
            return Some((open, formula[open + 1..close].replace("''", "'")));
        }
    }

    let start = bytes[..bang]
        .iter()
        .rposition(|&b| !is_name_byte(b))
        .map_or(0, |i| i + 1);
    // External books (`[1]Hoja1!`) and 3-D spans (`Hoja1:Hoja3!`) are left alone
    if start == bang || (start > 0 && matches!(bytes[start - 1], b']' | b':')) {
        return None;
    }
    Some((start, formula[start..bang].to_string()))
}

/// Shift the references to `sheet` inside a formula (as used by defined
/// names) for `count` rows inserted before zero-based row `at`.
///
/// Only references qualified with the sheet's name are touched; string
/// literals are skipped. Sheet names compare case-insensitively.
pub fn shift_sheet_refs(formula: &str, sheet: &str, at: u32, count: u32) -> String {
    let bytes = formula.as_bytes();
    let sheet = sheet.to_lowercase();
    let mut out = String::with_capacity(formula.len() + 4);
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => {
                pos += 1;
                while pos < bytes.len() {
                    if bytes[pos] == b'"' {
                        if bytes.get(pos + 1) == Some(&b'"') {
                            pos += 2;
                            continue;
                        }
                        break;
                    }
                    pos += 1;
                }
                pos += 1;
            },
            b'!' => {
                let bang = pos;
                pos += 1;
                let Some((_, name)) = sheet_before(formula, bang) else {
                    continue;
                };
                if name.to_lowercase() != sheet {
                    continue;
                }

                let end = bang
                    + 1
                    + bytes[bang + 1..]
                        .iter()
                        .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'$' || b == b':')
                        .count();
                if matches!(bytes.get(end), Some(b'!' | b'(' | b'\'')) {
                    continue;
                }
                if let Some(shifted) = shift_area_ref(&formula[bang + 1..end], at, count) {
                    out.push_str(&formula[copied..bang + 1]);
                    out.push_str(&shifted);
                    copied = end;
                }
                pos = end;
            },
            _ => pos += 1,
        }
    }

    out.push_str(&formula[copied..]);
    out
}
