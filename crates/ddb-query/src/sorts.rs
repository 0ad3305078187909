//! Query Sort Orders
//!
//! Multi-column sorting lives on the field list itself: each sorted field
//! carries a direction and a priority. Priorities of the sorted fields are
//! always exactly `0..k` for `k` sorted fields.
//!
//! Toggling a field cycles it through none -> ascending -> descending ->
//! none. Whenever the toggle leaves the field sorted, it becomes the primary
//! sort key (priority 0) and every other sorted field moves back one place,
//! even if the field was already sorted with a lower rank. The most recently
//! touched column always wins.

use ddb_core::{DdbError, DdbResult, SortDirection};

use crate::fields::FieldSelection;

/// A resolved sort key, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey<'a> {
    pub path: &'a str,
    pub direction: SortDirection,
}

/// Advance the sort of `fields[index]` one step and renumber priorities
pub fn toggle_sort(fields: &[FieldSelection], index: usize) -> DdbResult<Vec<FieldSelection>> {
    let field = fields
        .get(index)
        .ok_or_else(|| DdbError::index_out_of_range("fields", index, fields.len()))?;
    let new_sort = SortDirection::cycle(field.sort);
    let mut new_fields = fields.to_vec();

    // move any later sort fields forward
    if field.sort.is_some() {
        if let Some(priority) = field.priority {
            close_priority_gap(&mut new_fields, priority);
        }
    }

    match new_sort {
        Some(_) => {
            // everyone else moves back, the toggled field goes to the front
            for f in new_fields.iter_mut() {
                if let Some(p) = f.priority {
                    f.priority = Some(p + 1);
                }
            }
            new_fields[index] = FieldSelection {
                sort: new_sort,
                priority: Some(0),
                ..field.clone()
            };
        }
        None => {
            new_fields[index] = FieldSelection {
                sort: None,
                priority: None,
                ..field.clone()
            };
        }
    }

    Ok(new_fields)
}

/// Toggle `fields[index]` until it reaches `target`
///
/// Each step goes through [`toggle_sort`], so reaching a sort makes the field
/// the primary key. Already being at `target` is a no-op.
pub fn sort_to(
    fields: &[FieldSelection],
    index: usize,
    target: Option<SortDirection>,
) -> DdbResult<Vec<FieldSelection>> {
    let mut current = fields.to_vec();
    // the cycle has three states, so two steps reach any target
    for _ in 0..2 {
        let field = current
            .get(index)
            .ok_or_else(|| DdbError::index_out_of_range("fields", index, fields.len()))?;
        if field.sort == target {
            break;
        }
        current = toggle_sort(&current, index)?;
    }
    Ok(current)
}

/// Decrement every priority greater than `removed`
pub fn close_priority_gap(fields: &mut [FieldSelection], removed: usize) {
    for f in fields.iter_mut() {
        if let Some(p) = f.priority {
            if p > removed {
                f.priority = Some(p - 1);
            }
        }
    }
}

/// Number of sorted fields
pub fn sorted_count(fields: &[FieldSelection]) -> usize {
    fields.iter().filter(|f| f.is_sorted()).count()
}

/// Check the priority invariant: sorted fields hold exactly `0..k`, unsorted none
pub fn has_dense_priorities(fields: &[FieldSelection]) -> bool {
    if fields.iter().any(|f| f.sort.is_some() != f.priority.is_some()) {
        return false;
    }
    let mut priorities: Vec<usize> = fields.iter().filter_map(|f| f.priority).collect();
    priorities.sort_unstable();
    priorities.iter().enumerate().all(|(i, p)| i == *p)
}

/// Restore the priority invariant
///
/// Sorted fields are ranked by their current priority, ties broken by
/// position (a sorted field with no priority ranks last). Returns whether
/// anything changed.
pub fn renumber_priorities(fields: &mut [FieldSelection]) -> bool {
    let mut ranked: Vec<(usize, usize)> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_sorted())
        .map(|(i, f)| (f.priority.unwrap_or(usize::MAX), i))
        .collect();
    ranked.sort_unstable();

    let mut changed = false;
    for f in fields.iter_mut().filter(|f| !f.is_sorted()) {
        changed |= f.priority.take().is_some();
    }
    for (rank, (_, index)) in ranked.into_iter().enumerate() {
        if fields[index].priority != Some(rank) {
            fields[index].priority = Some(rank);
            changed = true;
        }
    }
    changed
}

/// Sorted fields in priority order
pub fn sort_keys(fields: &[FieldSelection]) -> Vec<SortKey<'_>> {
    let mut keyed: Vec<(usize, SortKey<'_>)> = fields
        .iter()
        .filter_map(|f| match (f.sort, f.priority) {
            (Some(direction), Some(priority)) => Some((
                priority,
                SortKey {
                    path: f.path.as_str(),
                    direction,
                },
            )),
            _ => None,
        })
        .collect();
    keyed.sort_by_key(|(priority, _)| *priority);
    keyed.into_iter().map(|(_, key)| key).collect()
}

/// The primary sort key, if any field is sorted
pub fn primary(fields: &[FieldSelection]) -> Option<SortKey<'_>> {
    sort_keys(fields).into_iter().next()
}
