use std::collections::{HashMap, VecDeque};

use crate::model::{EditOp, Row, Table};
use crate::normalize::normalize;
use crate::signature::{row_signatures, signatures_over, Signature};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMatchOutput {
    /// Added/modified ops in `table2` order, then removed ops in `table1` order.
    pub ops: Vec<EditOp>,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

/// Match rows by key signature instead of position.
///
/// Rows of `table2` are visited in order. A row whose key occurs in `table1`
/// takes the earliest unconsumed `table1` row with that key (duplicate keys
/// pair off in encounter order); if the whole rows differ it becomes a
/// modification, otherwise it is dropped as unchanged. A key not found in
/// `table1` makes the row an addition. Leftover `table1` rows are removals.
pub fn match_by_key(table1: &Table, table2: &Table, key_columns: &[String]) -> KeyMatchOutput {
    let mut index: HashMap<Signature, VecDeque<usize>> = HashMap::new();
    for (idx, key) in signatures_over(table1, key_columns).into_iter().enumerate() {
        index.entry(key).or_default().push_back(idx);
    }

    let full1 = row_signatures(table1);
    let full2 = row_signatures(table2);
    let keys2 = signatures_over(table2, key_columns);

    let mut consumed = vec![false; table1.len()];
    let mut out = KeyMatchOutput::default();

    for (idx2, key) in keys2.iter().enumerate() {
        match index.get_mut(key).and_then(VecDeque::pop_front) {
            Some(idx1) => {
                consumed[idx1] = true;
                if full1[idx1] != full2[idx2] {
                    out.ops.push(EditOp::Modified {
                        before: idx1,
                        after: idx2,
                        changed_columns: changed_columns(
                            &table1.rows()[idx1],
                            &table2.rows()[idx2],
                            table1.columns(),
                        ),
                    });
                    out.modified += 1;
                }
            }
            None => {
                out.ops.push(EditOp::Added(idx2));
                out.added += 1;
            }
        }
    }

    for (idx1, _) in consumed.iter().enumerate().filter(|(_, used)| !**used) {
        out.ops.push(EditOp::Removed(idx1));
        out.removed += 1;
    }

    out
}

/// Columns (in `columns` order) whose normalized values differ.
pub fn changed_columns(before: &Row, after: &Row, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| normalize(before.get(c)) != normalize(after.get(c)))
        .cloned()
        .collect()
}
