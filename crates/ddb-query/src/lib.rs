//! # ddb-query
//!
//! Query state and its transitions for the data browser.
//!
//! A query is a model, an ordered list of fields (some of them sorted), an
//! ordered list of filters, the result rows and a row limit. The engines in
//! this crate compute the next state from the current one; nothing is
//! mutated in place.
//!
//! ## Structure
//!
//! - `fields` - Field selection and row alignment
//! - `sorts` - Multi-column sort priorities
//! - `filters` - Filter conditions and lookup validation
//! - `query` - The query state and partial updates
//! - `command` - Commands and the reducer that applies them
//! - `serializer` - Query strings, media URLs and save URLs
//! - `view` - Saved view payloads
//! - `builder` - Fluent API for constructing queries
//!
//! ## Example
//!
//! ```
//! use ddb_query::{media_url, Command, MediaKind, QueryBuilder, QueryReducer};
//! use ddb_schema::{standard_types, FieldMeta, ModelFields, QueryConfig};
//!
//! let config = QueryConfig::new("/", "/admin/view/add/")
//!     .with_types(standard_types())
//!     .with_model(
//!         "book",
//!         ModelFields::default()
//!             .with_field("title", FieldMeta::concrete("Title", "string"))
//!             .with_field("pages", FieldMeta::concrete("Pages", "number")),
//!     );
//!
//! let state = QueryBuilder::new(&config, "book")
//!     .fields(["title", "pages"])
//!     .filter("pages", "gt", "300")
//!     .build()
//!     .unwrap();
//!
//! // sorting the second column makes it the primary key
//! let state = QueryReducer::new(&config)
//!     .apply(&state, Command::ToggleSort { index: 1 })
//!     .unwrap();
//!
//! assert_eq!(
//!     media_url("https://example.org", &config, &state, MediaKind::Csv),
//!     "https://example.org/query/book/title,pages+0.csv?pages__gt=300"
//! );
//! ```

pub mod builder;
pub mod command;
pub mod fields;
pub mod filters;
pub mod query;
pub mod serializer;
pub mod sorts;
pub mod view;

#[cfg(test)]
mod fixtures;

// Re-exports for convenience
pub use builder::QueryBuilder;
pub use command::{Command, QueryReducer};
pub use fields::{Cell, FieldSelection, Row};
pub use filters::FilterEntry;
pub use query::{parse_limit, QueryState, StatePatch};
pub use serializer::{
    media_url, parse_fields, parse_filters, save_url, to_query_string_parts, MediaKind, ParsedFilters,
    QueryParts,
};
pub use sorts::SortKey;
pub use view::SavedView;
