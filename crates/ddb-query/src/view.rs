//! Saved Views
//!
//! The payload stored by the view persistence endpoint. A view is a named
//! query: the three wire parts plus the row limit.

use ddb_core::{DdbResult, DEFAULT_LIMIT};
use ddb_schema::QueryConfig;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::query::QueryState;
use crate::serializer::{to_query_string_parts, QueryParts};

/// A stored query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedView {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
    pub model: String,
    #[serde(default)]
    pub fields: String,
    #[serde(default)]
    pub query: String,
    /// Row limit, coerced to at least 1 when loaded
    #[serde(default = "default_limit", deserialize_with = "deserialize_limit")]
    pub limit: u32,
}

impl SavedView {
    /// Capture a state under `name`
    pub fn from_state(state: &QueryState, name: impl Into<String>) -> Self {
        let QueryParts { model, fields, query } = to_query_string_parts(state);
        Self {
            name: name.into(),
            description: String::new(),
            public: false,
            model,
            fields,
            query,
            limit: state.limit,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the view as public
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Wire parts of the stored query
    pub fn parts(&self) -> QueryParts {
        QueryParts {
            model: self.model.clone(),
            fields: self.fields.clone(),
            query: self.query.clone(),
        }
    }

    /// Path of the HTML rendering of this view, relative to the app root
    pub fn link(&self) -> String {
        let separator = if self.query.is_empty() { "" } else { "&" };
        format!(
            "/query/{}/{}.html?{}{}limit={}",
            self.model, self.fields, self.query, separator, self.limit
        )
    }

    /// Reparse the stored query against the schema
    pub fn to_state(&self, config: &QueryConfig) -> DdbResult<QueryState> {
        QueryState::from_parts(config, &self.parts(), self.limit)
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Accept a number or numeric string; anything else becomes 1
fn deserialize_limit<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let limit = match &raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(1),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(1),
        _ => 1,
    };
    Ok(u32::try_from(limit.max(1)).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    #[test]
    fn test_from_state() {
        let view = SavedView::from_state(&fixtures::sorted_state(), "Adults")
            .with_description("Everyone of age")
            .public();
        assert_eq!(view.model, "person");
        assert_eq!(view.fields, "name+0,age-1");
        assert_eq!(view.query, "age__gte=18");
        assert_eq!(view.limit, 1000);
        assert!(view.public);
    }

    #[test]
    fn test_link() {
        let view = SavedView::from_state(&fixtures::sorted_state(), "Adults");
        assert_eq!(view.link(), "/query/person/name+0,age-1.html?age__gte=18&limit=1000");

        let bare = SavedView::from_state(&QueryState::with_limit("city", 10), "Cities");
        assert_eq!(bare.link(), "/query/city/.html?limit=10");
    }

    #[test]
    fn test_limit_coercion() {
        let cases = [
            (json!(25), 25),
            (json!("40"), 40),
            (json!("lots"), 1),
            (json!(0), 1),
            (json!(-3), 1),
            (json!(null), 1),
            (json!(12.7), 12),
        ];
        for (limit, expected) in cases {
            let view: SavedView = serde_json::from_value(json!({
                "name": "v",
                "model": "person",
                "limit": limit,
            }))
            .unwrap();
            assert_eq!(view.limit, expected, "{}", limit);
        }
    }

    #[test]
    fn test_missing_limit_uses_default() {
        let view: SavedView = serde_json::from_value(json!({
            "name": "v",
            "model": "person",
        }))
        .unwrap();
        assert_eq!(view.limit, DEFAULT_LIMIT);
        assert_eq!(view.fields, "");
    }

    #[test]
    fn test_to_state() {
        let config = fixtures::config();
        let state = fixtures::sorted_state();
        let view = SavedView::from_state(&state, "Adults");
        assert_eq!(view.to_state(&config).unwrap(), state);

        let broken = SavedView {
            fields: "name,shoe_size".into(),
            ..view
        };
        assert_eq!(broken.to_state(&config).unwrap_err().error_code(), "unknown_path");
    }
}
