//! Core error types for the data browser
//!
//! Every failure the query core can report is a variant of [`DdbError`].
//! Filter value validity is not represented here: those messages come from
//! an external validator and travel through state as plain strings.

use thiserror::Error;

/// Core error type for all query-state operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DdbError {
    #[error("Unknown model: {model}")]
    UnknownModel { model: String },

    #[error("Unknown path '{path}' on model {model}: no field or relation named '{segment}'")]
    UnknownPath {
        model: String,
        path: String,
        segment: String,
    },

    #[error("Field '{path}' has unknown type '{type_name}'")]
    UnknownType { path: String, type_name: String },

    #[error("Lookup '{lookup}' is not valid for field '{path}'")]
    UnknownLookup { path: String, lookup: String },

    #[error("Field '{path}' cannot be filtered on")]
    NotFilterable { path: String },

    #[error("Field '{path}' has no type and cannot be shown as a column")]
    NotSelectable { path: String },

    #[error("Index {index} out of range for {collection} (len {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid row limit: {raw:?}")]
    InvalidLimit { raw: String },

    #[error("Malformed fields segment: {segment:?}")]
    MalformedFields { segment: String },

    #[error("Malformed filter segment: {segment:?}")]
    MalformedFilter { segment: String },

    #[error("Row {row} has {found} columns, expected {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DdbError {
    /// Build an [`DdbError::UnknownPath`] error
    pub fn unknown_path(
        model: impl Into<String>,
        path: impl Into<String>,
        segment: impl Into<String>,
    ) -> Self {
        Self::UnknownPath {
            model: model.into(),
            path: path.into(),
            segment: segment.into(),
        }
    }

    /// Build an [`DdbError::IndexOutOfRange`] error
    pub fn index_out_of_range(collection: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            collection,
            index,
            len,
        }
    }

    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DdbError::UnknownModel { .. } => "unknown_model",
            DdbError::UnknownPath { .. } => "unknown_path",
            DdbError::UnknownType { .. } => "unknown_type",
            DdbError::UnknownLookup { .. } => "unknown_lookup",
            DdbError::NotFilterable { .. } => "not_filterable",
            DdbError::NotSelectable { .. } => "not_selectable",
            DdbError::IndexOutOfRange { .. } => "index_out_of_range",
            DdbError::InvalidLimit { .. } => "invalid_limit",
            DdbError::MalformedFields { .. } => "malformed_fields",
            DdbError::MalformedFilter { .. } => "malformed_filter",
            DdbError::ColumnMismatch { .. } => "column_mismatch",
            DdbError::Config(_) => "configuration_error",
        }
    }

    /// Whether the error stems from the schema rather than from the query
    ///
    /// Schema errors usually mean the loaded config is stale.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DdbError::UnknownModel { .. } | DdbError::UnknownPath { .. } | DdbError::UnknownType { .. }
        )
    }
}
