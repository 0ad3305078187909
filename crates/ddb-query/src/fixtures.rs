//! Shared test schema: people with an address in a city.

use ddb_schema::{standard_types, FieldMeta, ModelFields, QueryConfig};

use crate::fields::FieldSelection;
use crate::filters::FilterEntry;
use crate::query::QueryState;
use ddb_core::SortDirection;

pub const ORIGIN: &str = "https://data.example.com";

pub fn config() -> QueryConfig {
    QueryConfig::new("/app/", "/admin/data_browser/view/add/")
        .with_types(standard_types())
        .with_model(
            "person",
            ModelFields::default()
                .with_field("name", FieldMeta::concrete("Name", "string"))
                .with_field("age", FieldMeta::concrete("Age", "number"))
                .with_field("born", FieldMeta::concrete("Born", "date"))
                .with_field("is_active", FieldMeta::concrete("Active", "boolean"))
                .with_field("notes", FieldMeta::concrete("Notes", "unknown"))
                .with_fk("address", FieldMeta::relation("Address", "address"))
                .with_default_filter("is_active", "equals", "true"),
        )
        .with_model(
            "address",
            ModelFields::default()
                .with_field("street", FieldMeta::concrete("Street", "string"))
                .with_fk("city", FieldMeta::relation("City", "city")),
        )
        .with_model(
            "city",
            ModelFields::default()
                .with_field("name", FieldMeta::concrete("Name", "string"))
                .with_field("founded", FieldMeta::concrete("Founded", "year")),
        )
}

/// `name` ascending (primary), `age` descending (secondary), one `age__gte=18` filter
pub fn sorted_state() -> QueryState {
    QueryState {
        fields: vec![
            FieldSelection::sorted("name", SortDirection::Asc, 0),
            FieldSelection::sorted("age", SortDirection::Desc, 1),
        ],
        filters: vec![FilterEntry::new("age", "gte", "18")],
        ..QueryState::new("person")
    }
}
