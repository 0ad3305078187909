//! Query Fields
//!
//! The ordered list of selected fields (the result columns) and the
//! operations that add and remove them. Result rows are kept aligned with
//! the field list: column `i` of every row belongs to `fields[i]`.

use ddb_core::{DdbError, DdbResult, SortDirection};
use serde::{Deserialize, Serialize};

use crate::sorts;

/// One result cell, as delivered by the result fetch
pub type Cell = serde_json::Value;

/// One result row, aligned with the field list
pub type Row = Vec<Cell>;

/// A selected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    /// `__`-joined path from the query's model
    pub path: String,
    /// Sort direction, `None` when the field is not sorted
    pub sort: Option<SortDirection>,
    /// Rank among sorted fields, 0 being the primary sort key
    ///
    /// Present exactly when `sort` is.
    pub priority: Option<usize>,
}

impl FieldSelection {
    /// Create an unsorted field
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sort: None,
            priority: None,
        }
    }

    /// Create a sorted field
    pub fn sorted(path: impl Into<String>, direction: SortDirection, priority: usize) -> Self {
        Self {
            path: path.into(),
            sort: Some(direction),
            priority: Some(priority),
        }
    }

    /// Check if the field takes part in sorting
    pub fn is_sorted(&self) -> bool {
        self.sort.is_some()
    }

    /// Render as a fields-segment entry: `path`, `path+N` or `path-N`
    pub fn to_segment(&self) -> String {
        match (self.sort, self.priority) {
            (Some(direction), Some(priority)) => {
                format!("{}{}{}", self.path, direction.sign(), priority)
            }
            _ => self.path.clone(),
        }
    }
}

/// An empty cell, used for columns that have not been fetched yet
pub fn empty_cell() -> Cell {
    Cell::String(String::new())
}

/// Append an unsorted field and an empty column to every row
pub fn add_field(
    fields: &[FieldSelection],
    data: &[Row],
    path: &str,
) -> (Vec<FieldSelection>, Vec<Row>) {
    let mut new_fields = fields.to_vec();
    new_fields.push(FieldSelection::new(path));

    let new_data = data
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.push(empty_cell());
            row
        })
        .collect();

    (new_fields, new_data)
}

/// Remove the field at `index` and its column from every row
///
/// A sorted field gives up its priority first, so the remaining priorities
/// stay gap-free.
pub fn remove_field(
    fields: &[FieldSelection],
    data: &[Row],
    index: usize,
) -> DdbResult<(Vec<FieldSelection>, Vec<Row>)> {
    let removed = fields
        .get(index)
        .ok_or_else(|| DdbError::index_out_of_range("fields", index, fields.len()))?;

    let mut new_fields = fields.to_vec();
    if let Some(priority) = removed.priority {
        sorts::close_priority_gap(&mut new_fields, priority);
    }
    new_fields.remove(index);

    let new_data = data
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if index < row.len() {
                row.remove(index);
            }
            row
        })
        .collect();

    Ok((new_fields, new_data))
}

/// Check that every row has one cell per field
pub fn check_alignment(fields: &[FieldSelection], data: &[Row]) -> DdbResult<()> {
    match data.iter().position(|row| row.len() != fields.len()) {
        Some(row) => Err(DdbError::ColumnMismatch {
            row,
            expected: fields.len(),
            found: data[row].len(),
        }),
        None => Ok(()),
    }
}

/// Paths of all selected fields
pub fn paths(fields: &[FieldSelection]) -> Vec<&str> {
    fields.iter().map(|f| f.path.as_str()).collect()
}
