use crate::model::{Row, Table};
use crate::normalize::normalize;

/// Normalized values of a row over a fixed column list, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(Vec<String>);

impl Signature {
    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn signature(row: &Row, columns: &[String]) -> Signature {
    Signature(row.project(columns).map(normalize).collect())
}

/// Whole-row signatures over the table's own columns.
pub fn row_signatures(table: &Table) -> Vec<Signature> {
    signatures_over(table, table.columns())
}

pub fn signatures_over(table: &Table, columns: &[String]) -> Vec<Signature> {
    table.rows().iter().map(|row| signature(row, columns)).collect()
}
