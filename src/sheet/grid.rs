//! Sparse cell grid with an explicitly tracked bounding range.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use super::range::Range;
use super::types::Cell;

/// Attributes of a `<row>` element other than its index (`ht`, `s`, `hidden`, ...).
///
/// Values are kept in their escaped XML form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowProps {
    pub attrs: Vec<(String, String)>,
}

impl RowProps {
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// A block of rows inserted into the sheet, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInsertion {
    /// Zero-based row the new rows start at
    pub at: u32,
    pub count: u32,
}

/// Copy of one row's content taken before the grid is mutated.
#[derive(Debug, Clone, Default)]
pub struct RowSnapshot {
    /// Populated cells by column
    pub cells: SmallVec<[(u32, Cell); 16]>,
    pub props: Option<RowProps>,
    /// Merged ranges lying wholly inside the row
    pub merges: SmallVec<[Range; 2]>,
}

/// A single worksheet held in memory.
///
/// Every populated cell lies within [`Sheet::range`]. Each mutating method
/// updates the range itself; it is never recomputed from the cells.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    /// Cells keyed by `(row, col)`, iterated in row-major order
    cells: BTreeMap<(u32, u32), Cell>,
    rows: BTreeMap<u32, RowProps>,
    merges: Vec<Range>,
    range: Range,
    insertions: Vec<RowInsertion>,
}

impl Sheet {
    /// Create an empty sheet whose range is the single cell `A1`.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self::with_range(name, Range::single(0, 0))
    }

    /// Create an empty sheet with a declared range.
    pub fn with_range<S: Into<String>>(name: S, range: Range) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            rows: BTreeMap::new(),
            merges: Vec::new(),
            range,
            insertions: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared bounding range.
    #[inline]
    pub fn range(&self) -> Range {
        self.range
    }

    #[inline]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    #[inline]
    pub fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.cells.get_mut(&(row, col))
    }

    /// Store a cell, growing the range to cover it.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.range.include(row, col);
        self.cells.insert((row, col), cell);
    }

    /// Number of populated cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All populated cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> {
        self.cells.iter().map(|(&addr, cell)| (addr, cell))
    }

    /// Mutable access to all populated cells in row-major order.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = ((u32, u32), &mut Cell)> {
        self.cells.iter_mut().map(|(&addr, cell)| (addr, cell))
    }

    /// Populated cells of one row, by column.
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells
            .range((row, 0)..=(row, u32::MAX))
            .map(|(&(_, col), cell)| (col, cell))
    }

    /// Mutable access to the populated cells of one row.
    pub fn row_cells_mut(&mut self, row: u32) -> impl Iterator<Item = (u32, &mut Cell)> {
        self.cells
            .range_mut((row, 0)..=(row, u32::MAX))
            .map(|(&(_, col), cell)| (col, cell))
    }

    pub fn row_props(&self, row: u32) -> Option<&RowProps> {
        self.rows.get(&row)
    }

    /// Rows that carry attributes, by index.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &RowProps)> {
        self.rows.iter().map(|(&row, props)| (row, props))
    }

    pub fn set_row_props(&mut self, row: u32, props: RowProps) {
        if props.is_empty() {
            self.rows.remove(&row);
        } else {
            self.rows.insert(row, props);
        }
    }

    /// Merged ranges.
    pub fn merges(&self) -> &[Range] {
        &self.merges
    }

    /// Register a merged range, growing the sheet range to cover it.
    pub fn add_merge(&mut self, range: Range) {
        self.range.include(range.first_row, range.first_col);
        self.range.include(range.last_row, range.last_col);
        self.merges.push(range);
    }

    /// Row blocks inserted since the sheet was loaded.
    pub fn insertions(&self) -> &[RowInsertion] {
        &self.insertions
    }

    /// Copy a row's cells, attributes and single-row merges.
    pub fn snapshot_row(&self, row: u32) -> RowSnapshot {
        RowSnapshot {
            cells: self
                .row_cells(row)
                .map(|(col, cell)| (col, cell.clone()))
                .collect(),
            props: self.rows.get(&row).cloned(),
            merges: self
                .merges
                .iter()
                .filter(|m| m.is_single_row() && m.first_row == row)
                .copied()
                .collect(),
        }
    }

    /// Insert one empty row at `at`, moving every row at or below it down by one.
    ///
    /// The moved rows are detached first and re-inserted bottom row first, so
    /// no destination address can hold a row that has not moved yet. Merges
    /// and the `ref` ranges of shared and array formulas move with the rows.
    /// The range grows by exactly one row.
    pub fn insert_row(&mut self, at: u32) {
        let moved = self.cells.split_off(&(at, 0));
        for ((row, col), cell) in moved.into_iter().rev() {
            self.cells.insert((row + 1, col), cell);
        }

        let moved_rows = self.rows.split_off(&at);
        for (row, props) in moved_rows.into_iter().rev() {
            self.rows.insert(row + 1, props);
        }

        for merge in &mut self.merges {
            merge.insert_rows(at, 1);
        }

        // Shared and array ranges above `at` may reach into the moved rows
        for formula in self.cells.values_mut().filter_map(|cell| cell.formula.as_mut()) {
            formula.insert_rows(at, 1);
        }

        self.range.last_row += 1;

        match self.insertions.last_mut() {
            Some(last) if last.at + last.count == at => last.count += 1,
            _ => self.insertions.push(RowInsertion { at, count: 1 }),
        }
    }

    /// Write a snapshot into `row`, copying style references as they are.
    pub fn paste_row(&mut self, row: u32, snapshot: &RowSnapshot) {
        for (col, cell) in &snapshot.cells {
            self.set_cell(row, *col, cell.clone());
        }
        if let Some(props) = &snapshot.props {
            self.set_row_props(row, props.clone());
        }
        for merge in &snapshot.merges {
            self.add_merge(merge.on_row(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{CellValue, Formula, StyleRef};

    fn filled_sheet() -> Sheet {
        let mut sheet = Sheet::with_range("Hoja1", Range::parse("A1:C6").unwrap());
        for row in 0..6 {
            for col in 0..3 {
                let cell = Cell::text(format!("r{row}c{col}")).with_style(StyleRef(row * 10 + col));
                sheet.set_cell(row, col, cell);
            }
        }
        sheet
    }

    #[test]
    fn test_insert_row_moves_every_row_below() {
        let mut sheet = filled_sheet();
        sheet.insert_row(3);

        assert_eq!(sheet.range().to_string(), "A1:C7");
        assert_eq!(sheet.cell_count(), 18);
        assert!(sheet.cell(3, 0).is_none());
        for row in 0..3 {
            assert_eq!(sheet.cell(row, 1).unwrap().as_text(), Some(format!("r{row}c1").as_str()));
        }
        for row in 3..6 {
            let moved = sheet.cell(row + 1, 2).unwrap();
            assert_eq!(moved.as_text(), Some(format!("r{row}c2").as_str()));
            assert_eq!(moved.style, StyleRef(row * 10 + 2));
        }
    }

    #[test]
    fn test_insert_row_repeatedly_keeps_content() {
        let mut sheet = filled_sheet();
        sheet.insert_row(4);
        sheet.insert_row(5);
        sheet.insert_row(6);

        assert_eq!(sheet.range().row_count(), 9);
        assert_eq!(sheet.cell(7, 0).unwrap().as_text(), Some("r4c0"));
        assert_eq!(sheet.cell(8, 0).unwrap().as_text(), Some("r5c0"));
        assert_eq!(sheet.insertions(), &[RowInsertion { at: 4, count: 3 }]);
    }

    #[test]
    fn test_insert_row_shifts_props_and_merges() {
        let mut sheet = filled_sheet();
        sheet.set_row_props(
            4,
            RowProps {
                attrs: vec![("ht".into(), "30".into())],
            },
        );
        sheet.add_merge(Range::parse("A5:B5").unwrap());
        sheet.add_merge(Range::parse("C1:C6").unwrap());

        sheet.insert_row(2);

        assert!(sheet.row_props(4).is_none());
        assert_eq!(sheet.row_props(5).unwrap().attrs[0].1, "30");
        assert_eq!(sheet.merges()[0].to_string(), "A6:B6");
        assert_eq!(sheet.merges()[1].to_string(), "C1:C7");
    }

    #[test]
    fn test_insert_row_shifts_formula_ranges() {
        let mut sheet = filled_sheet();
        let mut array = Cell::number(3.0);
        array.formula = Some(Formula {
            attrs: vec![("t".into(), "array".into()), ("ref".into(), "D6".into())],
            text: "SUM(A1:A2)".into(),
        });
        sheet.set_cell(5, 3, array);
        let mut master = Cell::number(1.0);
        master.formula = Some(Formula {
            attrs: vec![("t".into(), "shared".into()), ("ref".into(), "E4:E6".into()), ("si".into(), "0".into())],
            text: "A4*2".into(),
        });
        sheet.set_cell(3, 4, master);

        sheet.insert_row(4);

        let array = sheet.cell(6, 3).unwrap().formula.as_ref().unwrap();
        assert_eq!(array.attrs[1], ("ref".to_string(), "D7".to_string()));
        let master = sheet.cell(3, 4).unwrap().formula.as_ref().unwrap();
        assert_eq!(master.attrs[1], ("ref".to_string(), "E4:E7".to_string()));
    }

    #[test]
    fn test_snapshot_and_paste() {
        let mut sheet = filled_sheet();
        sheet.add_merge(Range::parse("A2:B2").unwrap());
        let snapshot = sheet.snapshot_row(1);

        sheet.insert_row(2);
        sheet.paste_row(2, &snapshot);

        assert_eq!(sheet.cell(2, 0).unwrap().as_text(), Some("r1c0"));
        assert_eq!(sheet.cell(2, 2).unwrap().style, StyleRef(12));
        assert!(sheet.merges().iter().any(|m| m.to_string() == "A3:B3"));
    }

    #[test]
    fn test_set_cell_grows_range() {
        let mut sheet = Sheet::new("Hoja1");
        sheet.set_cell(4, 2, Cell::new(CellValue::Bool(true)));
        assert_eq!(sheet.range().to_string(), "A1:C5");
    }
}
