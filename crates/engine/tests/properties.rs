// Property-based tests for normalization and row alignment.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use sheetcmp_engine::lcs::align;
use sheetcmp_engine::model::EditOp;
use sheetcmp_engine::summary::validate_counts;
use sheetcmp_engine::{diff_sheet, normalize, Cell, Table, Verdict};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        1 => Just(Cell::Null),
        3 => "[a-zA-Z \t\n\u{00A0}\u{200B}\u{FEFF}]{0,12}".prop_map(Cell::Text),
        1 => any::<String>().prop_map(Cell::Text),
        3 => any::<f64>().prop_map(Cell::Number),
        2 => (-1000i64..1000).prop_map(Cell::from),
        1 => "[A-Za-z0-9 :-]{0,20}".prop_map(Cell::Other),
    ]
}

/// Small alphabet so generated sequences share elements.
fn arb_seq(max: usize) -> impl Strategy<Value = Vec<(u8, char)>> {
    proptest::collection::vec((0u8..4, prop_oneof![Just('a'), Just('b')]), 0..max)
}

/// Rows over a small alphabet. `code` looks like a key column, so larger
/// or shuffled inputs exercise the key-matching path too.
fn arb_rows(max: usize) -> impl Strategy<Value = Vec<Vec<Cell>>> {
    proptest::collection::vec(
        (0i64..6, prop_oneof![Just("a"), Just("b"), Just("B ")])
            .prop_map(|(n, s)| vec![Cell::from(n), Cell::from(s)]),
        0..max,
    )
}

fn table(grid: Vec<Vec<Cell>>) -> Table {
    Table::from_grid(["code", "tag"], grid).unwrap()
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn normalize_is_idempotent(cell in arb_cell()) {
        let once = normalize(&cell);
        prop_assert_eq!(normalize(&Cell::Text(once.clone())), once);
    }

    #[test]
    fn normalized_text_has_no_edge_or_double_spaces(s in any::<String>()) {
        let n = normalize(&Cell::Text(s));
        prop_assert!(!n.starts_with(' ') && !n.ends_with(' '));
        prop_assert!(!n.contains("  "));
    }

    #[test]
    fn integral_numbers_render_as_integers(n in -1_000_000_000i64..1_000_000_000) {
        prop_assert_eq!(normalize(&Cell::from(n)), n.to_string());
    }
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn edit_script_reconciles(left in arb_seq(12), right in arb_seq(12)) {
        let a = align(&left, &right);
        prop_assert_eq!(left.len() + a.added - a.removed, right.len());
        prop_assert_eq!(a.matched + a.removed, left.len());
        prop_assert_eq!(a.matched + a.added, right.len());
    }

    #[test]
    fn edit_script_preserves_relative_order(left in arb_seq(12), right in arb_seq(12)) {
        let a = align(&left, &right);
        let removed: Vec<usize> = a.ops.iter().filter_map(|op| match op {
            EditOp::Removed(i) => Some(*i),
            _ => None,
        }).collect();
        let added: Vec<usize> = a.ops.iter().filter_map(|op| match op {
            EditOp::Added(j) => Some(*j),
            _ => None,
        }).collect();
        prop_assert!(removed.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(added.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn self_comparison_is_empty(rows in arb_rows(16)) {
        let t = table(rows);
        let result = diff_sheet("S", &t, &t);
        prop_assert!(result.records.is_empty());
        prop_assert_eq!(result.counts.total(), 0);
    }

    #[test]
    fn sheet_records_match_counts(left in arb_rows(12), right in arb_rows(12)) {
        let result = diff_sheet("S", &table(left), &table(right));
        prop_assert_eq!(result.records.len(), result.counts.added + result.counts.removed + result.counts.modified);
        prop_assert_eq!(
            validate_counts(result.rows1, result.rows2, result.counts.added, result.counts.removed),
            Verdict::Ok
        );
    }
}
