//! Query Serialization
//!
//! Wire format of a query:
//!
//! - fields segment: `path[(+|-)priority]`, comma separated, e.g. `name+0,age-1,born`
//! - filter segment: `path__lookup=value` pairs, form-url-encoded and `&`-joined
//! - media URL: `{origin}{base}query/{model}/{fields}.{csv|json}?{filters}`
//! - save URL: `{origin}{admin}?model=..&fields=..&query=..`
//!
//! Parsing goes the other way and checks every path against the schema.

use ddb_core::{DdbError, DdbResult, SortDirection};
use ddb_schema::{resolve_column, QueryConfig, PATH_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

use crate::fields::FieldSelection;
use crate::filters::{self, FilterEntry};
use crate::query::{parse_limit, QueryState};
use crate::sorts;

/// Query-string key carrying the row limit
pub const LIMIT_KEY: &str = "limit";

/// The three strings that identify a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParts {
    pub model: String,
    /// Fields segment
    pub fields: String,
    /// Filter segment
    pub query: String,
}

impl QueryParts {
    /// Form-url-encode as `model=..&fields=..&query=..`
    pub fn to_form_urlencoded(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("model", &self.model)
            .append_pair("fields", &self.fields)
            .append_pair("query", &self.query)
            .finish()
    }
}

/// Download formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Csv,
    Json,
}

impl MediaKind {
    /// File extension used in the media URL
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Parse from an extension
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render the fields segment
pub fn fields_segment(fields: &[FieldSelection]) -> String {
    fields
        .iter()
        .map(FieldSelection::to_segment)
        .collect::<Vec<_>>()
        .join(",")
}

/// Render the filter segment
pub fn filter_segment(filters: &[FilterEntry]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for filter in filters {
        serializer.append_pair(&filter.key(), &filter.value);
    }
    serializer.finish()
}

/// The model, fields segment and filter segment of a state
pub fn to_query_string_parts(state: &QueryState) -> QueryParts {
    QueryParts {
        model: state.model.clone(),
        fields: fields_segment(&state.fields),
        query: filter_segment(&state.filters),
    }
}

/// Link that downloads the query's results as CSV or JSON
pub fn media_url(origin: &str, config: &QueryConfig, state: &QueryState, kind: MediaKind) -> String {
    let parts = to_query_string_parts(state);
    format!(
        "{}{}query/{}/{}.{}?{}",
        origin,
        config.base_url,
        parts.model,
        parts.fields,
        kind.extension(),
        parts.query
    )
}

/// Link that hands the query to the view persistence endpoint
pub fn save_url(origin: &str, config: &QueryConfig, state: &QueryState) -> String {
    format!(
        "{}{}?{}",
        origin,
        config.admin_url,
        to_query_string_parts(state).to_form_urlencoded()
    )
}

/// Parse a fields segment
///
/// Every path must resolve on `model` to a typed field. Priorities that are
/// not exactly `0..k` are renumbered, keeping their relative order.
pub fn parse_fields(config: &QueryConfig, model: &str, segment: &str) -> DdbResult<Vec<FieldSelection>> {
    let mut fields = segment
        .split(',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let field = parse_field_entry(entry)?;
            resolve_column(config, model, &field.path)?;
            Ok(field)
        })
        .collect::<DdbResult<Vec<_>>>()?;

    if sorts::renumber_priorities(&mut fields) {
        tracing::warn!(segment, "Renumbered sort priorities in fields segment");
    }
    Ok(fields)
}

fn parse_field_entry(entry: &str) -> DdbResult<FieldSelection> {
    let malformed = || DdbError::MalformedFields {
        segment: entry.to_string(),
    };

    match entry.rfind(['+', '-']) {
        Some(at) => {
            let (path, suffix) = entry.split_at(at);
            let mut chars = suffix.chars();
            let direction = chars
                .next()
                .and_then(SortDirection::from_sign)
                .ok_or_else(malformed)?;
            let digits = chars.as_str();
            if path.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let priority = digits.parse().map_err(|_| malformed())?;
            Ok(FieldSelection::sorted(path, direction, priority))
        }
        None => Ok(FieldSelection::new(entry)),
    }
}

/// Filters and limit read from a filter segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilters {
    pub filters: Vec<FilterEntry>,
    /// Set when the segment carried a `limit` pair
    pub limit: Option<u32>,
}

/// Parse a filter segment
///
/// Each key is split at its last `__` into path and lookup; the lookup must
/// be offered by the path's type. A `limit` pair sets the row limit.
pub fn parse_filters(config: &QueryConfig, model: &str, segment: &str) -> DdbResult<ParsedFilters> {
    let mut parsed = ParsedFilters::default();

    for (key, value) in form_urlencoded::parse(segment.as_bytes()) {
        if key == LIMIT_KEY {
            parsed.limit = Some(parse_limit(&value)?);
            continue;
        }
        let (path, lookup) = key
            .rsplit_once(PATH_SEPARATOR)
            .filter(|(path, lookup)| !path.is_empty() && !lookup.is_empty())
            .ok_or_else(|| DdbError::MalformedFilter {
                segment: format!("{}={}", key, value),
            })?;
        filters::validate_lookup(config, model, path, lookup)?;
        parsed
            .filters
            .push(FilterEntry::new(path, lookup, value.into_owned()));
    }

    Ok(parsed)
}

impl QueryState {
    /// Rebuild a state from its wire parts
    ///
    /// A `limit` pair inside the filter segment wins over `limit`.
    pub fn from_parts(config: &QueryConfig, parts: &QueryParts, limit: u32) -> DdbResult<Self> {
        config.model(&parts.model)?;
        let fields = parse_fields(config, &parts.model, &parts.fields)?;
        let parsed = parse_filters(config, &parts.model, &parts.query)?;

        Ok(Self {
            fields,
            filters: parsed.filters,
            ..Self::with_limit(parts.model.clone(), parsed.limit.unwrap_or(limit))
        })
    }

    /// Wire parts of this state
    pub fn to_parts(&self) -> QueryParts {
        to_query_string_parts(self)
    }
}
