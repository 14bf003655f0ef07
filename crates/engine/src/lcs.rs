//! Order-preserving row alignment (longest common subsequence).
//!
//! Rows are compared through whole-row signatures. Rows that differ in a
//! single cell are not paired up as "modified"; they come out as a
//! removed/added pair.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::EditOp;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    /// Added/removed operations in the relative order of both inputs.
    pub ops: Vec<EditOp>,
    pub added: usize,
    pub removed: usize,
    /// Length of the common subsequence.
    pub matched: usize,
}

/// Minimal edit script turning `left` into `right`.
///
/// Backtracking runs from the end of both sequences: equal elements are
/// matched diagonally; otherwise an element of `right` is taken as added
/// when `dp[i][j-1] >= dp[i-1][j]`, else an element of `left` is removed.
/// That tie-break fixes which of several equal-length scripts is returned.
pub fn align<T: Eq + Hash>(left: &[T], right: &[T]) -> Alignment {
    let (left_ids, right_ids) = intern(left, right);

    // The backtrack matches a shared tail diagonally before consulting the
    // table, so the tail never needs a table entry.
    let mut m = left_ids.len();
    let mut n = right_ids.len();
    while m > 0 && n > 0 && left_ids[m - 1] == right_ids[n - 1] {
        m -= 1;
        n -= 1;
    }
    let tail = left_ids.len() - m;

    let table = LengthTable::build(&left_ids[..m], &right_ids[..n]);

    let mut ops = Vec::new();
    let mut matched = tail;
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && left_ids[i - 1] == right_ids[j - 1] {
            matched += 1;
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table.get(i, j - 1) >= table.get(i - 1, j)) {
            ops.push(EditOp::Added(j - 1));
            j -= 1;
        } else {
            ops.push(EditOp::Removed(i - 1));
            i -= 1;
        }
    }
    ops.reverse();

    let added = ops.iter().filter(|op| matches!(op, EditOp::Added(_))).count();
    Alignment {
        removed: ops.len() - added,
        added,
        matched,
        ops,
    }
}

/// Replace each element by a small id so the DP loop compares integers.
fn intern<T: Eq + Hash>(left: &[T], right: &[T]) -> (Vec<u32>, Vec<u32>) {
    let mut ids: HashMap<&T, u32> = HashMap::with_capacity(left.len() + right.len());
    let mut id_of = |item| {
        let next = ids.len() as u32;
        *ids.entry(item).or_insert(next)
    };
    let left_ids = left.iter().map(&mut id_of).collect();
    let right_ids = right.iter().map(&mut id_of).collect();
    (left_ids, right_ids)
}

/// Row-major `(m+1) x (n+1)` table of common-subsequence lengths.
struct LengthTable {
    width: usize,
    cells: Vec<u32>,
}

impl LengthTable {
    fn build(left: &[u32], right: &[u32]) -> Self {
        let width = right.len() + 1;
        let mut cells = vec![0u32; (left.len() + 1) * width];
        for i in 1..=left.len() {
            for j in 1..=right.len() {
                cells[i * width + j] = if left[i - 1] == right[j - 1] {
                    cells[(i - 1) * width + (j - 1)] + 1
                } else {
                    cells[(i - 1) * width + j].max(cells[i * width + (j - 1)])
                };
            }
        }
        Self { width, cells }
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.width + j]
    }
}
