//! Query Builder
//!
//! Fluent API for constructing queries. Every step goes through the
//! [`QueryReducer`], so a built query satisfies the same invariants as one
//! assembled command by command. The first failing step is kept and returned
//! from [`QueryBuilder::build`]; later steps are skipped.

use ddb_core::{DdbResult, SortDirection};
use ddb_schema::QueryConfig;

use crate::command::{Command, QueryReducer};
use crate::query::QueryState;
use crate::sorts;

/// Builder for constructing queries fluently
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    reducer: QueryReducer<'a>,
    state: DdbResult<QueryState>,
}

impl<'a> QueryBuilder<'a> {
    /// Start an empty query on `model`
    pub fn new(config: &'a QueryConfig, model: &str) -> Self {
        let reducer = QueryReducer::new(config);
        Self {
            state: reducer.initial_state(model),
            reducer,
        }
    }

    /// Apply any command
    pub fn command(mut self, command: Command) -> Self {
        self.state = self
            .state
            .and_then(|state| self.reducer.apply(&state, command));
        self
    }

    /// Add an unsorted field
    pub fn field(self, path: impl Into<String>) -> Self {
        self.command(Command::AddField { path: path.into() })
    }

    /// Add several unsorted fields
    pub fn fields<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().fold(self, |builder, path| builder.field(path))
    }

    /// Add a field sorted the way its type sorts by default
    pub fn default_sorted_field(self, path: impl Into<String>) -> Self {
        self.command(Command::AddFieldWithDefaultSort { path: path.into() })
    }

    /// Add a field and make it the primary sort key
    pub fn sort_by(mut self, path: impl Into<String>, direction: SortDirection) -> Self {
        self = self.field(path);
        self.state = self.state.and_then(|state| {
            let index = state.fields.len().saturating_sub(1);
            let fields = sorts::sort_to(&state.fields, index, Some(direction))?;
            Ok(QueryState { fields, ..state })
        });
        self
    }

    /// Add an ascending primary sort on `path`
    pub fn sort_by_asc(self, path: impl Into<String>) -> Self {
        self.sort_by(path, SortDirection::Asc)
    }

    /// Add a descending primary sort on `path`
    pub fn sort_by_desc(self, path: impl Into<String>) -> Self {
        self.sort_by(path, SortDirection::Desc)
    }

    /// Add a filter with an explicit lookup and value
    pub fn filter(self, path: impl Into<String>, lookup: impl Into<String>, value: impl Into<String>) -> Self {
        let builder = self.command(Command::AddFilter { path: path.into() });
        let index = match &builder.state {
            Ok(state) => state.filters.len().saturating_sub(1),
            Err(_) => return builder,
        };
        builder
            .command(Command::SetFilterLookup {
                index,
                lookup: lookup.into(),
            })
            .command(Command::SetFilterValue {
                index,
                value: value.into(),
            })
    }

    /// Add the model's default filters
    pub fn default_filters(self) -> Self {
        self.command(Command::ApplyDefaultFilters)
    }

    /// Set the row limit from user input
    pub fn limit(self, raw: impl Into<String>) -> Self {
        self.command(Command::SetLimit { raw: raw.into() })
    }

    /// Finish, returning the first error if any step failed
    pub fn build(self) -> DdbResult<QueryState> {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSelection;
    use crate::filters::FilterEntry;
    use crate::fixtures;
    use crate::serializer::to_query_string_parts;

    #[test]
    fn test_builder_basic() {
        let config = fixtures::config();
        let state = QueryBuilder::new(&config, "person")
            .fields(["name", "address__city__name"])
            .build()
            .unwrap();

        assert_eq!(state.model, "person");
        assert_eq!(
            state.fields,
            vec![FieldSelection::new("name"), FieldSelection::new("address__city__name")]
        );
        assert!(!state.has_custom_sort());
    }

    #[test]
    fn test_builder_with_sorts() {
        let config = fixtures::config();
        let state = QueryBuilder::new(&config, "person")
            .sort_by_desc("age")
            .sort_by_asc("name")
            .build()
            .unwrap();

        // the last sort added is primary
        assert_eq!(to_query_string_parts(&state).fields, "age-1,name+0");
    }

    #[test]
    fn test_builder_default_sort() {
        let config = fixtures::config();
        let state = QueryBuilder::new(&config, "person")
            .default_sorted_field("name")
            .default_sorted_field("born")
            .build()
            .unwrap();

        assert_eq!(state.fields[0], FieldSelection::new("name"));
        assert_eq!(state.fields[1], FieldSelection::sorted("born", SortDirection::Asc, 0));
    }

    #[test]
    fn test_builder_with_filters() {
        let config = fixtures::config();
        let state = QueryBuilder::new(&config, "person")
            .default_filters()
            .filter("age", "gte", "18")
            .limit("50")
            .build()
            .unwrap();

        assert_eq!(
            state.filters,
            vec![
                FilterEntry::new("is_active", "equals", "true"),
                FilterEntry::new("age", "gte", "18"),
            ]
        );
        assert_eq!(state.limit, 50);
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let config = fixtures::config();
        let err = QueryBuilder::new(&config, "person")
            .field("shoe_size")
            .filter("age", "regex", "1")
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "unknown_path");

        let err = QueryBuilder::new(&config, "planet").field("name").build().unwrap_err();
        assert_eq!(err.error_code(), "unknown_model");
    }

    #[test]
    fn test_builder_rejects_bad_lookup() {
        let config = fixtures::config();
        let err = QueryBuilder::new(&config, "person")
            .filter("age", "regex", "1")
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "unknown_lookup");
    }
}
