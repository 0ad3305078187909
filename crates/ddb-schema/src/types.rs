//! Standard Types
//!
//! The type table a Django-style backend exposes: which lookups each field
//! type supports, which lookup and sort a new filter or column starts with,
//! and the starting value for each lookup's value type.
//!
//! Backends normally ship this table inside the schema document; this module
//! builds the same table locally for tests, fixtures and tools.

use chrono::Datelike;
use ddb_core::SortDirection;
use std::collections::BTreeMap;

use crate::registry::{LookupMeta, TypeMeta, ValueKind};

/// Type names known to the catalog
pub mod names {
    pub const STRING: &str = "string";
    pub const HTML: &str = "html";
    pub const STRING_CHOICE: &str = "stringchoice";
    pub const STRING_ARRAY: &str = "stringarray";
    pub const NUMBER: &str = "number";
    pub const NUMBER_CHOICE: &str = "numberchoice";
    pub const NUMBER_ARRAY: &str = "numberarray";
    pub const YEAR: &str = "year";
    pub const DURATION: &str = "duration";
    pub const DATETIME: &str = "datetime";
    pub const DATE: &str = "date";
    pub const WEEKDAY: &str = "weekday";
    pub const MONTH: &str = "month";
    pub const BOOLEAN: &str = "boolean";
    pub const IS_NULL: &str = "isnull";
    pub const REGEX: &str = "regex";
    pub const JSON: &str = "json";
    pub const JSON_FIELD: &str = "jsonfield";
    pub const UNKNOWN: &str = "unknown";

    /// Every catalog type
    pub const ALL: &[&str] = &[
        STRING,
        HTML,
        STRING_CHOICE,
        STRING_ARRAY,
        NUMBER,
        NUMBER_CHOICE,
        NUMBER_ARRAY,
        YEAR,
        DURATION,
        DATETIME,
        DATE,
        WEEKDAY,
        MONTH,
        BOOLEAN,
        IS_NULL,
        REGEX,
        JSON,
        JSON_FIELD,
        UNKNOWN,
    ];
}

use names::*;

const STRING_LOOKUPS: &[(&str, &str)] = &[
    ("equals", STRING),
    ("contains", STRING),
    ("starts_with", STRING),
    ("ends_with", STRING),
    ("regex", REGEX),
    ("not_equals", STRING),
    ("not_contains", STRING),
    ("not_starts_with", STRING),
    ("not_ends_with", STRING),
    ("not_regex", REGEX),
    ("is_null", BOOLEAN),
];

const NUMBER_LOOKUPS: &[(&str, &str)] = &[
    ("equals", NUMBER),
    ("not_equals", NUMBER),
    ("gt", NUMBER),
    ("gte", NUMBER),
    ("lt", NUMBER),
    ("lte", NUMBER),
    ("is_null", BOOLEAN),
];

/// Lookups of a type, in declaration order, as (lookup name, value type name)
fn lookups_for(type_name: &str) -> Vec<(&'static str, &'static str)> {
    match type_name {
        STRING | HTML => STRING_LOOKUPS.to_vec(),
        STRING_CHOICE => with_overrides(STRING_LOOKUPS, STRING_CHOICE),
        NUMBER => NUMBER_LOOKUPS.to_vec(),
        NUMBER_CHOICE => with_overrides(NUMBER_LOOKUPS, NUMBER_CHOICE),
        YEAR => ordered_comparisons(YEAR),
        DURATION => ordered_comparisons(DURATION),
        DATETIME => ordered_comparisons(DATETIME),
        DATE => ordered_comparisons(DATE),
        WEEKDAY => vec![("equals", WEEKDAY), ("not_equals", WEEKDAY)],
        MONTH => vec![("equals", MONTH), ("not_equals", MONTH)],
        BOOLEAN => vec![
            ("equals", BOOLEAN),
            ("not_equals", BOOLEAN),
            ("is_null", BOOLEAN),
        ],
        IS_NULL => vec![("equals", BOOLEAN)],
        JSON => vec![
            ("is_null", BOOLEAN),
            ("has_key", STRING),
            ("field_equals", JSON_FIELD),
            ("not_has_key", STRING),
            ("not_field_equals", JSON_FIELD),
        ],
        STRING_ARRAY => array_lookups(STRING_CHOICE),
        NUMBER_ARRAY => array_lookups(NUMBER_CHOICE),
        UNKNOWN => vec![("is_null", BOOLEAN)],
        _ => vec![],
    }
}

/// Choice types compare equality against a choice, everything else as the base type
fn with_overrides(
    base: &[(&'static str, &'static str)],
    choice: &'static str,
) -> Vec<(&'static str, &'static str)> {
    base.iter()
        .map(|&(lookup, value_type)| match lookup {
            "equals" | "not_equals" => (lookup, choice),
            _ => (lookup, value_type),
        })
        .collect()
}

fn ordered_comparisons(value_type: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("equals", value_type),
        ("not_equals", value_type),
        ("gt", value_type),
        ("gte", value_type),
        ("lt", value_type),
        ("lte", value_type),
        ("is_null", BOOLEAN),
    ]
}

fn array_lookups(element: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("contains", element),
        ("length", NUMBER),
        ("not_contains", element),
        ("not_length", NUMBER),
        ("is_null", BOOLEAN),
    ]
}

/// Value a filter of this value type starts with
pub fn default_value(value_type: &str) -> String {
    match value_type {
        STRING | HTML => String::new(),
        NUMBER => "0".to_string(),
        YEAR => chrono::Utc::now().year().to_string(),
        DATETIME => "now".to_string(),
        DATE => "today".to_string(),
        WEEKDAY => "Monday".to_string(),
        MONTH => "January".to_string(),
        BOOLEAN | IS_NULL => "true".to_string(),
        REGEX => ".*".to_string(),
        JSON_FIELD => "|".to_string(),
        _ => String::new(),
    }
}

/// Value editor kind for a value type
pub fn value_kind(value_type: &str) -> ValueKind {
    match value_type {
        BOOLEAN | IS_NULL => ValueKind::Boolean,
        WEEKDAY => ValueKind::Weekday,
        MONTH => ValueKind::Month,
        NUMBER => ValueKind::Number,
        NUMBER_CHOICE => ValueKind::NumberChoice,
        STRING_CHOICE => ValueKind::StringChoice,
        YEAR => ValueKind::Year,
        JSON_FIELD => ValueKind::JsonField,
        _ => ValueKind::Text,
    }
}

/// Sort a new column of this type starts with
pub fn default_sort(type_name: &str) -> Option<SortDirection> {
    match type_name {
        YEAR | DATETIME | DATE | WEEKDAY | MONTH => Some(SortDirection::Asc),
        _ => None,
    }
}

/// Build the metadata of one catalog type
pub fn type_meta(type_name: &str) -> TypeMeta {
    let declared = lookups_for(type_name);
    let lookups = declared
        .iter()
        .map(|&(lookup, value_type)| {
            (
                lookup.to_string(),
                LookupMeta {
                    value_kind: value_kind(value_type),
                    default_value: default_value(value_type),
                },
            )
        })
        .collect();

    TypeMeta {
        lookups,
        default_lookup: declared.first().map(|(lookup, _)| lookup.to_string()),
        default_sort: default_sort(type_name),
        sorted_lookups: declared.iter().map(|(lookup, _)| lookup.to_string()).collect(),
    }
}

/// The full catalog, keyed by type name
pub fn standard_types() -> BTreeMap<String, TypeMeta> {
    names::ALL
        .iter()
        .map(|name| (name.to_string(), type_meta(name)))
        .collect()
}
