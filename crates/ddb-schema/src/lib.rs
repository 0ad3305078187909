//! # ddb-schema
//!
//! Schema metadata for the data browser.
//!
//! ## Structure
//!
//! - `registry` - The schema document: models, fields, relations, types and lookups
//! - `resolver` - Walking `__`-joined paths through relations to field metadata
//! - `types` - The standard type catalog
//!
//! ## Example
//!
//! ```
//! use ddb_schema::{resolve_path_type, standard_types, FieldMeta, ModelFields, QueryConfig};
//!
//! let config = QueryConfig::new("/data_browser/", "/admin/views/add/")
//!     .with_types(standard_types())
//!     .with_model(
//!         "person",
//!         ModelFields::default().with_field("name", FieldMeta::concrete("Name", "string")),
//!     );
//!
//! let string = resolve_path_type(&config, "person", "name").unwrap();
//! assert_eq!(string.default_lookup.as_deref(), Some("equals"));
//! ```

pub mod registry;
pub mod resolver;
pub mod types;

// Re-exports for convenience
pub use registry::{FieldMeta, LookupMeta, ModelFields, QueryConfig, TypeMeta, ValueKind};
pub use resolver::{
    join_path, resolve, resolve_column, resolve_field, resolve_path_type, resolve_type, split_path, walk,
    FieldEntry, ResolvedField, PATH_SEPARATOR,
};
pub use types::standard_types;
