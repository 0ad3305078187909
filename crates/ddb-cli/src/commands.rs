//! Subcommand implementations
//!
//! Each function takes the loaded schema and returns what should be printed,
//! so the output can be checked without a terminal.

use anyhow::{Context, Result};
use ddb_core::BrowserSettings;
use ddb_query::{
    media_url, save_url, Command, MediaKind, QueryParts, QueryReducer, QueryState, SavedView,
};
use ddb_schema::{resolve_type, walk, QueryConfig};
use serde::Serialize;

/// Everything `ddb urls` reports about a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlReport {
    pub model: String,
    pub fields: String,
    pub query: String,
    pub limit: u32,
    pub csv_url: String,
    pub json_url: String,
    pub save_url: String,
    pub view_link: String,
}

impl UrlReport {
    fn from_state(origin: &str, config: &QueryConfig, state: &QueryState) -> Self {
        let parts = state.to_parts();
        Self {
            csv_url: media_url(origin, config, state, MediaKind::Csv),
            json_url: media_url(origin, config, state, MediaKind::Json),
            save_url: save_url(origin, config, state),
            view_link: SavedView::from_state(state, "").link(),
            model: parts.model,
            fields: parts.fields,
            query: parts.query,
            limit: state.limit,
        }
    }

    /// Plain text rendering, one `key: value` line per entry
    pub fn to_text(&self) -> String {
        [
            ("model", self.model.clone()),
            ("fields", self.fields.clone()),
            ("query", self.query.clone()),
            ("limit", self.limit.to_string()),
            ("csv", self.csv_url.clone()),
            ("json", self.json_url.clone()),
            ("save", self.save_url.clone()),
            ("view", self.view_link.clone()),
        ]
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Model names in display order
pub fn models(config: &QueryConfig) -> Vec<String> {
    config.model_names().into_iter().map(String::from).collect()
}

/// One line per reachable field: path, type (or target model) and filterability
pub fn fields(config: &QueryConfig, model: &str, depth: usize) -> Result<Vec<String>> {
    let entries = walk(config, model, depth)?;
    entries
        .iter()
        .map(|entry| {
            let line = match &entry.field.model {
                Some(target) if entry.field.is_relation() => {
                    format!("{}\t-> {}", entry.path, target)
                }
                _ => {
                    let type_meta = resolve_type(config, &entry.path, entry.field)?;
                    let filter = if entry.field.is_filterable() && !type_meta.lookups.is_empty() {
                        "filterable"
                    } else {
                        "-"
                    };
                    let type_name = entry.field.type_name.as_deref().unwrap_or("?");
                    format!("{}\t{}\t{}", entry.path, type_name, filter)
                }
            };
            Ok(line)
        })
        .collect()
}

/// Parse a query, apply `ops` in order and describe the result
pub fn urls(
    settings: &BrowserSettings,
    origin: &str,
    config: &QueryConfig,
    parts: &QueryParts,
    limit: Option<&str>,
    ops: Vec<Command>,
) -> Result<UrlReport> {
    let mut state = QueryState::from_parts(config, parts, settings.default_limit)
        .with_context(|| format!("cannot parse query on {}", parts.model))?;
    if let Some(raw) = limit {
        state = state.set_limit(raw)?;
    }

    let reducer = QueryReducer::new(config).with_default_limit(settings.default_limit);
    let state = reducer.apply_all(&state, ops)?;
    Ok(UrlReport::from_state(origin, config, &state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddb_schema::{standard_types, FieldMeta, ModelFields};

    fn config() -> QueryConfig {
        QueryConfig::new("/", "/admin/views/add/")
            .with_types(standard_types())
            .with_model(
                "book",
                ModelFields::default()
                    .with_field("title", FieldMeta::concrete("Title", "string"))
                    .with_field("pages", FieldMeta::concrete("Pages", "number"))
                    .with_fk("author", FieldMeta::relation("Author", "author")),
            )
            .with_model(
                "author",
                ModelFields::default().with_field("name", FieldMeta::concrete("Name", "string")),
            )
    }

    fn parts(fields: &str, query: &str) -> QueryParts {
        QueryParts {
            model: "book".into(),
            fields: fields.into(),
            query: query.into(),
        }
    }

    #[test]
    fn test_models() {
        assert_eq!(models(&config()), vec!["book", "author"]);
    }

    #[test]
    fn test_fields_listing() {
        let lines = fields(&config(), "book", 1).unwrap();
        assert!(lines.contains(&"title\tstring\tfilterable".to_string()));
        assert!(lines.contains(&"author\t-> author".to_string()));
        assert!(lines.contains(&"author__name\tstring\tfilterable".to_string()));

        let shallow = fields(&config(), "book", 0).unwrap();
        assert!(!shallow.iter().any(|l| l.starts_with("author__")));
    }

    #[test]
    fn test_urls_applies_ops() {
        let settings = BrowserSettings::default();
        let report = urls(
            &settings,
            "https://books.example",
            &config(),
            &parts("title+0", ""),
            Some("20"),
            vec![
                Command::AddField { path: "pages".into() },
                Command::ToggleSort { index: 1 },
                Command::AddFilter { path: "pages".into() },
                Command::SetFilterValue {
                    index: 0,
                    value: "100".into(),
                },
            ],
        )
        .unwrap();

        assert_eq!(report.fields, "title+1,pages+0");
        assert_eq!(report.query, "pages__equals=100");
        assert_eq!(report.limit, 20);
        assert_eq!(
            report.csv_url,
            "https://books.example/query/book/title+1,pages+0.csv?pages__equals=100"
        );
        assert_eq!(report.view_link, "/query/book/title+1,pages+0.html?pages__equals=100&limit=20");
        assert!(report.to_text().starts_with("model: book\nfields: title+1,pages+0"));
    }

    #[test]
    fn test_urls_reports_unknown_path() {
        let settings = BrowserSettings::default();
        let err = urls(&settings, "", &config(), &parts("isbn", ""), None, vec![]).unwrap_err();
        let cause = err.downcast_ref::<ddb_core::DdbError>().unwrap();
        assert_eq!(cause.error_code(), "unknown_path");
    }
}
