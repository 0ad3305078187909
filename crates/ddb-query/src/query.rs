//! Query State
//!
//! The value object describing one query: which model, which fields (with
//! their sort), which filters, the cached result rows and the row limit.
//! A state is never edited in place by the engines. Each transition yields a
//! [`StatePatch`] that the owner merges into a fresh state.

use ddb_core::{DdbError, DdbResult, SortDirection, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};

use crate::fields::{self, FieldSelection, Row};
use crate::filters::FilterEntry;
use crate::sorts;

/// A query under construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    pub model: String,
    pub fields: Vec<FieldSelection>,
    pub filters: Vec<FilterEntry>,
    /// Result rows, one cell per field
    #[serde(default)]
    pub data: Vec<Row>,
    /// Maximum number of rows to fetch, at least 1
    pub limit: u32,
}

/// Partial replacement of a [`QueryState`]
///
/// `None` members leave the corresponding part of the state untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub model: Option<String>,
    pub fields: Option<Vec<FieldSelection>>,
    pub filters: Option<Vec<FilterEntry>>,
    pub data: Option<Vec<Row>>,
    pub limit: Option<u32>,
}

impl StatePatch {
    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.fields.is_none()
            && self.filters.is_none()
            && self.data.is_none()
            && self.limit.is_none()
    }
}

impl QueryState {
    /// Create an empty query on `model` with the default limit
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_limit(model, DEFAULT_LIMIT)
    }

    /// Create an empty query on `model` with the given limit
    pub fn with_limit(model: impl Into<String>, limit: u32) -> Self {
        Self {
            model: model.into(),
            fields: vec![],
            filters: vec![],
            data: vec![],
            limit: limit.max(1),
        }
    }

    /// Apply a patch, producing the next state
    pub fn merged(&self, patch: StatePatch) -> Self {
        Self {
            model: patch.model.unwrap_or_else(|| self.model.clone()),
            fields: patch.fields.unwrap_or_else(|| self.fields.clone()),
            filters: patch.filters.unwrap_or_else(|| self.filters.clone()),
            data: patch.data.unwrap_or_else(|| self.data.clone()),
            limit: patch.limit.unwrap_or(self.limit),
        }
    }

    /// Parse a raw limit and return the updated state
    pub fn set_limit(&self, raw: &str) -> DdbResult<Self> {
        Ok(Self {
            limit: parse_limit(raw)?,
            ..self.clone()
        })
    }

    /// Check if any fields are selected
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Check if any filters are set
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Check if any field is sorted
    pub fn has_custom_sort(&self) -> bool {
        self.fields.iter().any(FieldSelection::is_sorted)
    }

    /// Sorted field paths with their directions, primary first
    pub fn sort_order(&self) -> Vec<(&str, SortDirection)> {
        sorts::sort_keys(&self.fields)
            .into_iter()
            .map(|key| (key.path, key.direction))
            .collect()
    }

    /// Whether `shown_rows` rows means the limit cut the result short
    pub fn limit_reached(&self, shown_rows: usize) -> bool {
        shown_rows >= self.limit as usize
    }

    /// Check the structural invariants: row width and priority density
    pub fn validate(&self) -> DdbResult<()> {
        fields::check_alignment(&self.fields, &self.data)?;
        if !sorts::has_dense_priorities(&self.fields) {
            return Err(DdbError::MalformedFields {
                segment: self
                    .fields
                    .iter()
                    .map(FieldSelection::to_segment)
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }
        Ok(())
    }
}

/// Parse a user-supplied row limit
///
/// Non-numeric text is rejected; numbers below 1 are raised to 1.
pub fn parse_limit(raw: &str) -> DdbResult<u32> {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) if n < 1 => Ok(1),
        Ok(n) => Ok(u32::try_from(n).unwrap_or(u32::MAX)),
        Err(_) => Err(DdbError::InvalidLimit {
            raw: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    #[test]
    fn test_new_state() {
        let state = QueryState::new("person");
        assert_eq!(state.model, "person");
        assert_eq!(state.limit, DEFAULT_LIMIT);
        assert!(!state.has_fields());
        assert!(!state.has_filters());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_with_limit_never_zero() {
        assert_eq!(QueryState::with_limit("person", 0).limit, 1);
    }

    #[test]
    fn test_merge_patch() {
        let state = fixtures::sorted_state();
        let patch = StatePatch {
            filters: Some(vec![]),
            limit: Some(5),
            ..Default::default()
        };
        let next = state.merged(patch);

        assert_eq!(next.fields, state.fields);
        assert!(next.filters.is_empty());
        assert_eq!(next.limit, 5);
        assert_eq!(next.model, "person");
        // the original is untouched
        assert_eq!(state.filters.len(), 1);
    }

    #[test]
    fn test_empty_patch() {
        assert!(StatePatch::default().is_empty());
        let state = fixtures::sorted_state();
        assert_eq!(state.merged(StatePatch::default()), state);
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit("250").unwrap(), 250);
        assert_eq!(parse_limit(" 7 ").unwrap(), 7);
        assert_eq!(parse_limit("0").unwrap(), 1);
        assert_eq!(parse_limit("-12").unwrap(), 1);
        assert_eq!(parse_limit("99999999999").unwrap(), u32::MAX);
        assert_eq!(
            parse_limit("ten").unwrap_err(),
            DdbError::InvalidLimit { raw: "ten".into() }
        );
        assert!(parse_limit("").is_err());
    }

    #[test]
    fn test_set_limit_rejects_without_change() {
        let state = fixtures::sorted_state();
        assert!(state.set_limit("many").is_err());
        assert_eq!(state.set_limit("50").unwrap().limit, 50);
    }

    #[test]
    fn test_limit_reached() {
        let state = QueryState::with_limit("person", 2);
        assert!(!state.limit_reached(1));
        assert!(state.limit_reached(2));
    }

    #[test]
    fn test_sort_order() {
        let state = fixtures::sorted_state();
        assert!(state.has_custom_sort());
        assert_eq!(
            state.sort_order(),
            vec![("name", SortDirection::Asc), ("age", SortDirection::Desc)]
        );
    }

    #[test]
    fn test_validate_detects_misaligned_rows() {
        let state = QueryState {
            data: vec![vec![json!("Ada")]],
            ..fixtures::sorted_state()
        };
        assert_eq!(state.validate().unwrap_err().error_code(), "column_mismatch");
    }

    #[test]
    fn test_validate_detects_priority_gap() {
        let mut state = fixtures::sorted_state();
        state.fields[1].priority = Some(2);
        assert_eq!(state.validate().unwrap_err().error_code(), "malformed_fields");
    }
}
