//! Schema Registry
//!
//! Read-only metadata describing what can be queried: per model, its fields
//! and foreign-key relations; per type, its lookups and defaults. The
//! document is produced by the backend and deserialized once per session.

use ddb_core::{DdbError, DdbResult, SortDirection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use url::form_urlencoded;

use crate::resolver::PATH_SEPARATOR;

/// Kind of value a lookup expects, used to pick a value editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Boolean,
    Weekday,
    Month,
    Number,
    NumberChoice,
    StringChoice,
    Year,
    JsonField,
    /// Free text; also the fallback for kinds this crate does not know
    #[serde(other)]
    Text,
}

/// A lookup operator as offered for one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupMeta {
    /// Value kind the lookup compares against
    #[serde(rename = "type")]
    pub value_kind: ValueKind,
    /// Value a new filter with this lookup starts with
    #[serde(default)]
    pub default_value: String,
}

/// Lookups and defaults of one field type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    pub lookups: BTreeMap<String, LookupMeta>,
    /// `None` for types that cannot be filtered on
    #[serde(default)]
    pub default_lookup: Option<String>,
    #[serde(default)]
    pub default_sort: Option<SortDirection>,
    /// Lookup names in display order
    #[serde(default)]
    pub sorted_lookups: Vec<String>,
}

impl TypeMeta {
    /// Get the metadata of a lookup
    pub fn lookup(&self, name: &str) -> Option<&LookupMeta> {
        self.lookups.get(name)
    }

    /// Check whether a lookup is valid for this type
    pub fn has_lookup(&self, name: &str) -> bool {
        self.lookups.contains_key(name)
    }

    /// The default lookup together with its metadata
    pub fn default_lookup_meta(&self) -> Option<(&str, &LookupMeta)> {
        let name = self.default_lookup.as_deref()?;
        self.lookups.get(name).map(|meta| (name, meta))
    }

    /// Lookup names in display order
    ///
    /// Falls back to key order when the document carries no explicit order.
    pub fn lookup_names(&self) -> Vec<&str> {
        if self.sorted_lookups.is_empty() {
            self.lookups.keys().map(String::as_str).collect()
        } else {
            self.sorted_lookups.iter().map(String::as_str).collect()
        }
    }
}

/// One field or relation of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub pretty_name: String,
    /// Backed by a real column, so it can be filtered on
    #[serde(default)]
    pub concrete: bool,
    /// Type name, a key into [`QueryConfig::types`]
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    /// Related model for relations that can be traversed
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fks: BTreeMap<String, FieldMeta>,
}

impl FieldMeta {
    /// Create a concrete field of the given type
    pub fn concrete(pretty_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            pretty_name: pretty_name.into(),
            concrete: true,
            type_name: Some(type_name.into()),
            model: None,
            fks: BTreeMap::new(),
        }
    }

    /// Create a traversable relation to another model
    pub fn relation(pretty_name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            pretty_name: pretty_name.into(),
            concrete: false,
            type_name: None,
            model: Some(model.into()),
            fks: BTreeMap::new(),
        }
    }

    /// Check if the field has a type and so can be shown as a column
    pub fn is_selectable(&self) -> bool {
        self.type_name.is_some()
    }

    /// Check if the field can carry a filter
    pub fn is_filterable(&self) -> bool {
        self.concrete && self.type_name.is_some()
    }

    /// Check if the field leads to another model
    pub fn is_relation(&self) -> bool {
        self.model.is_some()
    }
}

/// Fields and relations of one model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFields {
    pub fields: BTreeMap<String, FieldMeta>,
    #[serde(default)]
    pub fks: BTreeMap<String, FieldMeta>,
    /// Field names in display order
    #[serde(default)]
    pub sorted_fields: Vec<String>,
    /// Filters applied when the model is opened, as a filter segment
    /// (`path__lookup=value&...`)
    #[serde(default)]
    pub default_filters: String,
}

impl ModelFields {
    /// Add a concrete field (builder pattern)
    pub fn with_field(mut self, name: impl Into<String>, field: FieldMeta) -> Self {
        let name = name.into();
        self.sorted_fields.push(name.clone());
        self.fields.insert(name, field);
        self
    }

    /// Add a relation; it is listed among the fields and registered as a foreign key
    pub fn with_fk(mut self, name: impl Into<String>, field: FieldMeta) -> Self {
        let name = name.into();
        self.sorted_fields.push(name.clone());
        self.fks.insert(name.clone(), field.clone());
        self.fields.insert(name, field);
        self
    }

    /// Add a default filter (builder pattern)
    ///
    /// The pair is form-url-encoded onto the end of the default filter segment.
    pub fn with_default_filter(mut self, path: &str, lookup: &str, value: &str) -> Self {
        let mut segment = form_urlencoded::Serializer::for_suffix(
            std::mem::take(&mut self.default_filters),
            0,
        );
        segment.append_pair(&format!("{}{}{}", path, PATH_SEPARATOR, lookup), value);
        self.default_filters = segment.finish();
        self
    }

    /// Field names in display order
    ///
    /// Falls back to key order when the document carries no explicit order.
    pub fn field_names(&self) -> Vec<&str> {
        if self.sorted_fields.is_empty() {
            self.fields.keys().map(String::as_str).collect()
        } else {
            self.sorted_fields
                .iter()
                .filter(|name| self.fields.contains_key(name.as_str()))
                .map(String::as_str)
                .collect()
        }
    }

    /// Get a relation by name, from `fks` first and then from relation-typed fields
    pub fn relation(&self, name: &str) -> Option<&FieldMeta> {
        self.fks
            .get(name)
            .or_else(|| self.fields.get(name).filter(|f| f.is_relation()))
    }
}

/// The whole schema document for a browsing session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    pub all_model_fields: BTreeMap<String, ModelFields>,
    pub types: BTreeMap<String, TypeMeta>,
    /// Mount point of the browser, with trailing slash (e.g. `/data_browser/`)
    #[serde(default)]
    pub base_url: String,
    /// Endpoint that receives a query to persist as a view
    #[serde(default)]
    pub admin_url: String,
    /// Model names in display order
    #[serde(default)]
    pub sorted_models: Vec<String>,
}

impl QueryConfig {
    /// Create an empty config mounted at the given URLs
    pub fn new(base_url: impl Into<String>, admin_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            admin_url: admin_url.into(),
            ..Default::default()
        }
    }

    /// Parse the JSON schema document
    pub fn from_json(json: &str) -> DdbResult<Self> {
        serde_json::from_str(json).map_err(|e| DdbError::Config(format!("invalid schema: {}", e)))
    }

    /// Read and parse a schema document from disk
    pub fn from_path(path: &Path) -> DdbResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DdbError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            models = config.all_model_fields.len(),
            types = config.types.len(),
            "Loaded schema"
        );
        Ok(config)
    }

    /// Add a model (builder pattern)
    pub fn with_model(mut self, name: impl Into<String>, fields: ModelFields) -> Self {
        let name = name.into();
        self.sorted_models.push(name.clone());
        self.all_model_fields.insert(name, fields);
        self
    }

    /// Replace the type table (builder pattern)
    pub fn with_types(mut self, types: BTreeMap<String, TypeMeta>) -> Self {
        self.types = types;
        self
    }

    /// Get a model's fields
    pub fn model(&self, name: &str) -> DdbResult<&ModelFields> {
        self.all_model_fields
            .get(name)
            .ok_or_else(|| DdbError::UnknownModel {
                model: name.to_string(),
            })
    }

    /// Check whether a model exists
    pub fn has_model(&self, name: &str) -> bool {
        self.all_model_fields.contains_key(name)
    }

    /// Get a type by name
    pub fn type_meta(&self, name: &str) -> Option<&TypeMeta> {
        self.types.get(name)
    }

    /// Model names in display order
    pub fn model_names(&self) -> Vec<&str> {
        if self.sorted_models.is_empty() {
            self.all_model_fields.keys().map(String::as_str).collect()
        } else {
            self.sorted_models.iter().map(String::as_str).collect()
        }
    }
}
