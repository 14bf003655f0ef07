use sheetcmp_engine::model::{ChangeKind, DiffRecord};
use sheetcmp_engine::summary::validate_counts;
use sheetcmp_engine::{
    compare_tables, compare_workbooks, diff_sheet, Cell, CompareConfig, Strategy, Table, Verdict,
    Workbook,
};

fn table(columns: &[&str], grid: Vec<Vec<Cell>>) -> Table {
    Table::from_grid(columns.iter().copied(), grid).unwrap()
}

fn products(n: i32) -> Vec<Vec<Cell>> {
    (1..=n)
        .map(|i| vec![Cell::from(i), Cell::from(format!("Item {i}")), Cell::from(f64::from(i) * 1.25)])
        .collect()
}

const PRODUCT_COLS: [&str; 3] = ["product_id", "description", "price"];

// -------------------------------------------------------------------------
// Identity
// -------------------------------------------------------------------------

#[test]
fn identical_tables_have_no_differences() {
    let t = table(&PRODUCT_COLS, products(6));
    let result = diff_sheet("Products", &t, &t);
    assert_eq!(result.strategy, Strategy::Lcs);
    assert!(result.records.is_empty());
    assert_eq!(result.counts.total(), 0);
}

#[test]
fn identical_tables_under_key_matching() {
    let t = table(&PRODUCT_COLS, products(6));
    let out = sheetcmp_engine::matcher::match_by_key(&t, &t, &["product_id".to_string()]);
    assert!(out.ops.is_empty());
    assert_eq!((out.added, out.removed, out.modified), (0, 0, 0));
}

// -------------------------------------------------------------------------
// Positional alignment
// -------------------------------------------------------------------------

#[test]
fn appended_row_is_single_trailing_addition() {
    let t1 = table(&PRODUCT_COLS, products(5));
    let t2 = table(&PRODUCT_COLS, products(6));
    let result = diff_sheet("Products", &t1, &t2);

    assert_eq!(result.strategy, Strategy::Lcs);
    assert_eq!((result.counts.added, result.counts.removed), (1, 0));
    match result.records.last() {
        Some(DiffRecord::Added { row }) => assert_eq!(row.get("product_id"), &Cell::from(6)),
        other => panic!("expected trailing addition, got {other:?}"),
    }
}

#[test]
fn positional_path_does_not_report_modifications() {
    // 1 of 10 rows edited: ratio 0.2 stays positional, edit shows as -/+ pair
    let t1 = table(&PRODUCT_COLS, products(10));
    let mut grid = products(10);
    grid[4][2] = Cell::from(99.0);
    let t2 = table(&PRODUCT_COLS, grid);

    let result = diff_sheet("Products", &t1, &t2);
    assert_eq!(result.strategy, Strategy::Lcs);
    assert_eq!(result.counts.modified, 0);
    let kinds: Vec<ChangeKind> = result.records.iter().map(DiffRecord::kind).collect();
    assert_eq!(kinds, vec![ChangeKind::Removed, ChangeKind::Added]);
}

#[test]
fn reconciliation_holds_on_positional_path() {
    let t1 = table(&["a", "b"], vec![
        vec!["x".into(), 1.into()],
        vec!["y".into(), 2.into()],
        vec!["z".into(), 3.into()],
        vec!["w".into(), 4.into()],
    ]);
    let t2 = table(&["a", "b"], vec![
        vec!["x".into(), 1.into()],
        vec!["q".into(), 9.into()],
        vec!["z".into(), 3.into()],
        vec!["w".into(), 4.into()],
        vec!["v".into(), 5.into()],
    ]);
    let result = diff_sheet("S", &t1, &t2);
    // no identifier-like columns: always positional
    assert_eq!(result.strategy, Strategy::Lcs);
    assert_eq!(
        validate_counts(result.rows1, result.rows2, result.counts.added, result.counts.removed),
        Verdict::Ok
    );
}

// -------------------------------------------------------------------------
// Strategy switch
// -------------------------------------------------------------------------

#[test]
fn pure_reordering_switches_to_key_matching() {
    let t1 = table(&PRODUCT_COLS, products(8));
    let mut grid = products(8);
    grid.reverse();
    let t2 = table(&PRODUCT_COLS, grid);

    let result = diff_sheet("Products", &t1, &t2);
    assert!(result.divergence_ratio > 0.3, "ratio {}", result.divergence_ratio);
    assert!(matches!(result.strategy, Strategy::KeyMatch { .. }));
    assert_eq!(result.counts.added, 0);
    assert_eq!(result.counts.removed, 0);
    assert_eq!(result.counts.modified, 0);
    assert!(result.records.is_empty());
}

#[test]
fn reordering_without_key_columns_stays_positional() {
    let grid: Vec<Vec<Cell>> = (0..6).map(|i| vec![Cell::from(i % 2), Cell::from(i)]).collect();
    let mut reversed = grid.clone();
    reversed.reverse();
    let t1 = table(&["flag", "amount"], grid);
    let t2 = table(&["flag", "amount"], reversed);

    let result = diff_sheet("S", &t1, &t2);
    assert_eq!(result.strategy, Strategy::Lcs);
    assert_eq!(result.counts.added, result.counts.removed);
    assert!(result.counts.added > 0);
}

#[test]
fn reconciliation_on_key_path_with_duplicates() {
    // Duplicate keys on both sides, uneven multiplicity.
    let t1 = table(&["id", "v"], vec![
        vec![1.into(), "a".into()],
        vec![1.into(), "b".into()],
        vec![2.into(), "c".into()],
        vec![3.into(), "d".into()],
        vec![4.into(), "e".into()],
    ]);
    let t2 = table(&["id", "v"], vec![
        vec![4.into(), "e".into()],
        vec![1.into(), "z".into()],
        vec![5.into(), "f".into()],
        vec![1.into(), "y".into()],
        vec![1.into(), "x".into()],
        vec![3.into(), "d".into()],
    ]);
    let result = diff_sheet("S", &t1, &t2);
    assert!(matches!(result.strategy, Strategy::KeyMatch { .. }));
    assert_eq!(result.counts.modified, 2);
    assert_eq!(result.counts.added, 2);
    assert_eq!(result.counts.removed, 1);
    // each table2 row is matched or added, each table1 row matched or removed
    assert_eq!(
        validate_counts(result.rows1, result.rows2, result.counts.added, result.counts.removed),
        Verdict::Ok
    );
}

// -------------------------------------------------------------------------
// End-to-end
// -------------------------------------------------------------------------

#[test]
fn end_to_end_people() {
    let t1 = table(&["id", "name"], vec![
        vec![1.into(), "Alice".into()],
        vec![2.into(), "Bob".into()],
    ]);
    let t2 = table(&["id", "name"], vec![
        vec![1.into(), "alice".into()],
        vec![3.into(), "Carol".into()],
    ]);
    let result = diff_sheet("People", &t1, &t2);

    match &result.strategy {
        Strategy::KeyMatch { key_columns } => assert!(key_columns.contains(&"id".to_string())),
        other => panic!("expected key matching, got {other}"),
    }
    assert_eq!(result.counts.modified, 0, "case-only change normalizes away");
    assert_eq!(result.counts.added, 1);
    assert_eq!(result.counts.removed, 1);
    assert_eq!(result.total(), 2);

    match &result.records[..] {
        [DiffRecord::Added { row: added }, DiffRecord::Removed { row: removed }] => {
            assert_eq!(added.get("name"), &Cell::from("Carol"));
            assert_eq!(removed.get("name"), &Cell::from("Bob"));
        }
        other => panic!("unexpected records {other:?}"),
    }
}

#[test]
fn modified_rows_carry_after_values_and_changed_columns() {
    let t1 = table(&["sku", "price", "stock"], vec![
        vec!["A".into(), 1.0.into(), 5.into()],
        vec!["B".into(), 2.0.into(), 5.into()],
    ]);
    let t2 = table(&["sku", "price", "stock"], vec![
        vec!["B".into(), 2.5.into(), 5.into()],
        vec!["A".into(), 1.0.into(), 4.into()],
    ]);
    let result = diff_sheet("Stock", &t1, &t2);
    assert_eq!(result.counts.modified, 2);
    assert_eq!(result.records[0].changed_columns(), ["price"]);
    assert_eq!(result.records[0].display_row().get("price"), &Cell::from(2.5));
    assert_eq!(result.records[1].changed_columns(), ["stock"]);
}

// -------------------------------------------------------------------------
// Ignore columns
// -------------------------------------------------------------------------

#[test]
fn ignored_columns_never_surface() {
    let t1 = table(&["id", "v", "updated_at"], vec![
        vec![1.into(), "a".into(), "mon".into()],
        vec![2.into(), "b".into(), "mon".into()],
    ]);
    let t2 = table(&["id", "v", "updated_at"], vec![
        vec![1.into(), "a".into(), "tue".into()],
        vec![2.into(), "b".into(), "tue".into()],
        vec![3.into(), "c".into(), "tue".into()],
    ]);

    // without ignoring, every row differs
    let noisy = diff_sheet("S", &t1, &t2);
    assert!(noisy.counts.total() > 1);

    let config = CompareConfig::default().with_ignored(["updated_at"]);
    let result = compare_tables("S", &t1, &t2, &config);
    assert_eq!(result.columns, vec!["id", "v"]);
    assert_eq!(result.counts.added, 1);
    assert_eq!(result.counts.total(), 1);
    assert!((result.divergence_ratio - 0.5).abs() < 1e-12);
    for record in &result.records {
        assert!(record.display_row().columns().all(|c| c != "updated_at"));
    }
}

#[test]
fn ignored_identifier_is_not_a_key() {
    let t1 = table(&["row_id", "v"], vec![vec![1.into(), "a".into()], vec![2.into(), "b".into()]]);
    let t2 = table(&["row_id", "v"], vec![vec![2.into(), "b".into()], vec![1.into(), "a".into()]]);
    let config = CompareConfig::default().with_ignored(["row_id"]);
    let result = compare_tables("S", &t1, &t2, &config);
    assert_eq!(result.strategy, Strategy::Lcs);
}

// -------------------------------------------------------------------------
// Workbooks
// -------------------------------------------------------------------------

#[test]
fn workbook_compares_common_sheets_in_first_order() {
    let mut book1 = Workbook::new();
    book1.insert("Zeta", table(&PRODUCT_COLS, products(3)));
    book1.insert("Only1", table(&PRODUCT_COLS, products(3)));
    book1.insert("Alpha", table(&PRODUCT_COLS, products(3)));

    let mut book2 = Workbook::new();
    book2.insert("Alpha", table(&PRODUCT_COLS, products(4)));
    book2.insert("Zeta", table(&PRODUCT_COLS, products(3)));
    book2.insert("Only2", table(&PRODUCT_COLS, products(1)));

    let diff = compare_workbooks(&book1, &book2, &CompareConfig::default());
    let names: Vec<&str> = diff.sheets.iter().map(|s| s.sheet.as_str()).collect();
    assert_eq!(names, ["Zeta", "Alpha"]);

    assert!(diff.has_differences());
    assert_eq!(diff.summary.len(), 1, "unchanged sheets get no summary row");
    assert_eq!(diff.summary[0].sheet, "Alpha");
    assert_eq!(diff.summary[0].rows1, 3);
    assert_eq!(diff.summary[0].rows2, 4);
    assert_eq!(diff.summary[0].verdict, Verdict::Ok);
}

#[test]
fn no_common_sheets_is_empty_result() {
    let mut book1 = Workbook::new();
    book1.insert("A", table(&PRODUCT_COLS, products(2)));
    let mut book2 = Workbook::new();
    book2.insert("B", table(&PRODUCT_COLS, products(2)));

    let diff = compare_workbooks(&book1, &book2, &CompareConfig::default());
    assert!(diff.sheets.is_empty());
    assert!(diff.summary.is_empty());
    assert!(!diff.has_differences());
}

#[test]
fn empty_sheet_against_populated_sheet() {
    let t1 = table(&PRODUCT_COLS, vec![]);
    let t2 = table(&PRODUCT_COLS, products(3));
    let result = diff_sheet("S", &t1, &t2);
    assert_eq!(result.divergence_ratio, 0.0);
    assert_eq!(result.strategy, Strategy::Lcs);
    assert_eq!(result.counts.added, 3);
}
