//! Row expansion: one row per line-item at the anchor.

use super::options::TemplateOptions;
use super::report::UnresolvedPlaceholder;
use super::substitute::substitute_line;
use super::value::{Fields, LineItem};
use crate::sheet::{Formula, Range, RowSnapshot, Sheet};

/// Expand the template row at `anchor` into one row per item.
///
/// The first item is substituted in place. Every further item gets a fresh
/// row inserted directly below the previous one, filled from a snapshot of the
/// template row taken before any substitution, so each copy carries the
/// template's style references, row attributes and single-row merges.
///
/// With no items the template row is left as is, placeholders included.
/// Returns the placeholders left unresolved, at their final positions.
pub fn expand(
    sheet: &mut Sheet,
    anchor: u32,
    items: &[LineItem],
    options: &TemplateOptions,
) -> Vec<UnresolvedPlaceholder> {
    let Some((first, rest)) = items.split_first() else {
        log::warn!("no line items; template row {} left unresolved", anchor + 1);
        return substitute_line(anchor, sheet.row_cells_mut(anchor), &Fields::new(), options);
    };

    let snapshot = copy_snapshot(sheet.snapshot_row(anchor), anchor);
    let mut unresolved = substitute_line(anchor, sheet.row_cells_mut(anchor), first, options);

    for (target, item) in (anchor + 1..).zip(rest) {
        sheet.insert_row(target);
        sheet.paste_row(target, &snapshot);
        retarget_arrays(sheet, target);
        unresolved.extend(substitute_line(target, sheet.row_cells_mut(target), item, options));
    }

    log::debug!(
        "expanded row {} into {} rows; sheet now spans {}",
        anchor + 1,
        items.len(),
        sheet.range()
    );
    unresolved
}

/// Adapt a template row snapshot for pasting elsewhere.
fn copy_snapshot(mut snapshot: RowSnapshot, anchor: u32) -> RowSnapshot {
    for (_, cell) in snapshot.cells.iter_mut() {
        if let Some(formula) = cell.formula.take() {
            cell.formula = copy_formula(formula, anchor);
        }
    }
    snapshot
}

/// Formula for a copy of the template row, `None` to keep only the cached value.
///
/// Formula text is copied verbatim. Shared-formula groups cannot span copies:
/// a master becomes a plain formula and its followers keep their value only.
/// An array formula keeps its text when its range lies on the template row.
fn copy_formula(formula: Formula, anchor: u32) -> Option<Formula> {
    let kind = formula
        .attrs
        .iter()
        .find(|(key, _)| key == "t")
        .map(|(_, value)| value.as_str());

    match kind {
        Some("shared") if formula.is_shared_follower() => None,
        Some("shared") => Some(Formula {
            attrs: formula
                .attrs
                .into_iter()
                .filter(|(key, _)| !matches!(key.as_str(), "t" | "ref" | "si"))
                .collect(),
            text: formula.text,
        }),
        Some("array") => {
            let on_anchor = formula
                .attrs
                .iter()
                .find(|(key, _)| key == "ref")
                .and_then(|(_, value)| Range::parse(value))
                .is_some_and(|range| range.is_single_row() && range.first_row == anchor);
            on_anchor.then_some(formula)
        },
        _ => Some(formula),
    }
}

/// Move the ranges of array formulas pasted into `row` onto that row.
fn retarget_arrays(sheet: &mut Sheet, row: u32) {
    for (_, cell) in sheet.row_cells_mut(row) {
        let Some(formula) = cell.formula.as_mut() else {
            continue;
        };
        if !formula.attrs.iter().any(|(key, value)| key == "t" && value == "array") {
            continue;
        }
        for (key, value) in formula.attrs.iter_mut() {
            if key == "ref" {
                if let Some(range) = Range::parse(value) {
                    *value = range.on_row(row).to_string();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::sheet::{Cell, CellValue, StyleRef};

    fn template() -> Sheet {
        let mut sheet = Sheet::with_range("Hoja1", Range::parse("A1:C6").unwrap());
        sheet.set_cell(0, 0, Cell::text("Pedido: {num_pedido}"));
        sheet.set_cell(3, 0, Cell::number(0.0).with_style(StyleRef(7)));
        sheet.set_cell(3, 1, Cell::text("{descripcion}").with_style(StyleRef(8)));
        sheet.set_cell(3, 2, Cell::text("{nsenv}").with_style(StyleRef(9)));
        sheet.set_cell(4, 0, Cell::text("Subtotal"));
        sheet.set_cell(5, 0, Cell::text("Total"));
        sheet
    }

    #[test]
    fn test_two_items() {
        let mut sheet = template();
        let items = vec![
            fields! { "descripcion" => "PIEZA A", "nsenv" => "NS-1" },
            fields! { "descripcion" => "PIEZA B" },
        ];
        let unresolved = expand(&mut sheet, 3, &items, &TemplateOptions::default());

        assert_eq!(sheet.range().to_string(), "A1:C7");
        assert_eq!(sheet.cell(3, 1).unwrap().as_text(), Some("PIEZA A"));
        assert_eq!(sheet.cell(3, 2).unwrap().as_text(), Some("NS-1"));
        assert_eq!(sheet.cell(4, 1).unwrap().as_text(), Some("PIEZA B"));
        assert_eq!(sheet.cell(4, 2).unwrap().as_text(), Some("{nsenv}"));
        assert_eq!(sheet.cell(4, 0).unwrap().style, StyleRef(7));
        assert_eq!(sheet.cell(4, 0).unwrap().value, CellValue::Number(0.0));
        assert_eq!(sheet.cell(5, 0).unwrap().as_text(), Some("Subtotal"));
        assert_eq!(sheet.cell(6, 0).unwrap().as_text(), Some("Total"));
        assert_eq!(unresolved.len(), 1);
        assert_eq!((unresolved[0].row, unresolved[0].col), (4, 2));
    }

    #[test]
    fn test_copies_use_template_text() {
        let mut sheet = template();
        let items = vec![
            fields! { "descripcion" => "{descripcion} A" },
            fields! { "descripcion" => "B" },
            fields! { "descripcion" => "C" },
        ];
        expand(&mut sheet, 3, &items, &TemplateOptions::default());
        let texts: Vec<_> = (3..6).map(|r| sheet.cell(r, 1).unwrap().as_text().unwrap()).collect();
        assert_eq!(texts, vec!["{descripcion} A", "B", "C"]);
    }

    #[test]
    fn test_no_items_keeps_template_row() {
        let mut sheet = template();
        let unresolved = expand(&mut sheet, 3, &[], &TemplateOptions::default());
        assert_eq!(sheet.range().to_string(), "A1:C6");
        assert_eq!(sheet.cell(3, 1).unwrap().as_text(), Some("{descripcion}"));
        assert_eq!(unresolved.len(), 2);
    }

    #[test]
    fn test_single_row_merges_replicated() {
        let mut sheet = template();
        sheet.add_merge(Range::parse("B4:C4").unwrap());
        sheet.add_merge(Range::parse("A6:C6").unwrap());
        let items = vec![fields! {}, fields! {}, fields! {}];
        expand(&mut sheet, 3, &items, &TemplateOptions::default());

        let merges: Vec<String> = sheet.merges().iter().map(|m| m.to_string()).collect();
        assert_eq!(merges, vec!["B4:C4", "A8:C8", "B5:C5", "B6:C6"]);
    }

    #[test]
    fn test_shared_formulas_in_copies() {
        let master = Formula {
            attrs: vec![
                ("t".into(), "shared".into()),
                ("ref".into(), "D4:D5".into()),
                ("si".into(), "0".into()),
            ],
            text: "B4*2".into(),
        };
        let follower = Formula {
            attrs: vec![("t".into(), "shared".into()), ("si".into(), "0".into())],
            text: String::new(),
        };
        let plain = Formula {
            attrs: Vec::new(),
            text: "SUM(A1:A2)".into(),
        };

        assert_eq!(copy_formula(master, 3).unwrap().attrs, Vec::new());
        assert!(copy_formula(follower, 3).is_none());
        assert_eq!(copy_formula(plain.clone(), 3), Some(plain));
    }

    #[test]
    fn test_array_formula_follows_row() {
        let mut sheet = template();
        let mut cell = Cell::number(4.0);
        cell.formula = Some(Formula {
            attrs: vec![("t".into(), "array".into()), ("ref".into(), "D4".into())],
            text: "SUM(A4:C4)".into(),
        });
        sheet.set_cell(3, 3, cell);

        let items = vec![fields! {}, fields! {}];
        expand(&mut sheet, 3, &items, &TemplateOptions::default());

        let copied = sheet.cell(4, 3).unwrap().formula.as_ref().unwrap();
        assert_eq!(copied.attrs[1], ("ref".to_string(), "D5".to_string()));
        let original = sheet.cell(3, 3).unwrap().formula.as_ref().unwrap();
        assert_eq!(original.attrs[1], ("ref".to_string(), "D4".to_string()));
    }
}
