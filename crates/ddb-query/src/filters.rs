//! Query Filters
//!
//! A filter is a `path`, a lookup valid for the path's type, and a raw value
//! string. Values are not checked here: an external validator may attach an
//! error message to each filter by position, and that message rides along
//! unchanged until the validator replaces it.

use ddb_core::{DdbError, DdbResult};
use ddb_schema::{resolve_field, resolve_type, QueryConfig, TypeMeta, PATH_SEPARATOR};
use serde::{Deserialize, Serialize};

use crate::serializer;

/// A single filter condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterEntry {
    /// `__`-joined path from the query's model
    pub path: String,
    /// Lookup name, e.g. `equals`, `gte`, `is_null`
    pub lookup: String,
    /// Raw value as typed by the user
    pub value: String,
    /// Message from the external validator, if the value was rejected
    #[serde(default)]
    pub error_message: Option<String>,
}

impl FilterEntry {
    /// Create a filter with no error message
    pub fn new(path: impl Into<String>, lookup: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            lookup: lookup.into(),
            value: value.into(),
            error_message: None,
        }
    }

    /// Query-string key: `path__lookup`
    pub fn key(&self) -> String {
        format!("{}{}{}", self.path, PATH_SEPARATOR, self.lookup)
    }

    /// Check if the external validator rejected this filter
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Resolve the type of a filterable path
fn filter_type<'a>(config: &'a QueryConfig, model: &str, path: &str) -> DdbResult<&'a TypeMeta> {
    let field = resolve_field(config, model, path)?;
    if !field.is_filterable() {
        return Err(DdbError::NotFilterable {
            path: path.to_string(),
        });
    }
    resolve_type(config, path, field)
}

/// Build a filter for `path` with its type's default lookup and value
pub fn new_filter(config: &QueryConfig, model: &str, path: &str) -> DdbResult<FilterEntry> {
    let type_meta = filter_type(config, model, path)?;
    let (lookup, lookup_meta) = type_meta
        .default_lookup_meta()
        .ok_or_else(|| DdbError::NotFilterable {
            path: path.to_string(),
        })?;
    Ok(FilterEntry::new(path, lookup, lookup_meta.default_value.clone()))
}

/// Check that `lookup` is offered by the type at `path`
pub fn validate_lookup(config: &QueryConfig, model: &str, path: &str, lookup: &str) -> DdbResult<()> {
    let type_meta = filter_type(config, model, path)?;
    if type_meta.has_lookup(lookup) {
        Ok(())
    } else {
        Err(DdbError::UnknownLookup {
            path: path.to_string(),
            lookup: lookup.to_string(),
        })
    }
}

/// Append a filter on `path` with default lookup and value
pub fn add_filter(
    config: &QueryConfig,
    model: &str,
    filters: &[FilterEntry],
    path: &str,
) -> DdbResult<Vec<FilterEntry>> {
    let mut new_filters = filters.to_vec();
    new_filters.push(new_filter(config, model, path)?);
    Ok(new_filters)
}

/// Remove the filter at `index`, keeping the others in order
pub fn remove_filter(filters: &[FilterEntry], index: usize) -> DdbResult<Vec<FilterEntry>> {
    check_index(filters, index)?;
    let mut new_filters = filters.to_vec();
    new_filters.remove(index);
    Ok(new_filters)
}

/// Replace the value of the filter at `index`
pub fn set_filter_value(
    filters: &[FilterEntry],
    index: usize,
    value: impl Into<String>,
) -> DdbResult<Vec<FilterEntry>> {
    check_index(filters, index)?;
    let mut new_filters = filters.to_vec();
    new_filters[index].value = value.into();
    Ok(new_filters)
}

/// Replace the lookup of the filter at `index`
///
/// The value is kept as is. Use [`validate_lookup`] first when the lookup
/// comes from untrusted input.
pub fn set_filter_lookup(
    filters: &[FilterEntry],
    index: usize,
    lookup: impl Into<String>,
) -> DdbResult<Vec<FilterEntry>> {
    check_index(filters, index)?;
    let mut new_filters = filters.to_vec();
    new_filters[index].lookup = lookup.into();
    Ok(new_filters)
}

/// Attach validator messages by position
///
/// Filters beyond the end of `errors` are cleared; extra messages are ignored.
pub fn set_error_messages(filters: &[FilterEntry], errors: &[Option<String>]) -> Vec<FilterEntry> {
    filters
        .iter()
        .enumerate()
        .map(|(i, f)| FilterEntry {
            error_message: errors.get(i).cloned().flatten(),
            ..f.clone()
        })
        .collect()
}

/// The model's default filters, parsed from its filter segment
///
/// Every key is checked like a filter read from a URL.
pub fn default_filters(config: &QueryConfig, model: &str) -> DdbResult<Vec<FilterEntry>> {
    let segment = &config.model(model)?.default_filters;
    Ok(serializer::parse_filters(config, model, segment)?.filters)
}

fn check_index(filters: &[FilterEntry], index: usize) -> DdbResult<()> {
    if index < filters.len() {
        Ok(())
    } else {
        Err(DdbError::index_out_of_range("filters", index, filters.len()))
    }
}
