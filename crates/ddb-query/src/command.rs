//! Query Commands
//!
//! Every user intent is a [`Command`] value. [`QueryReducer`] turns a command
//! and the current state into a [`StatePatch`] (or applies it directly), so
//! each transition is a pure function that can be tested on its own. The
//! owner of the state applies one command at a time.

use ddb_core::{DdbResult, DEFAULT_LIMIT};
use ddb_schema::{resolve_column, resolve_type, QueryConfig};
use serde::{Deserialize, Serialize};

use crate::fields::{self, Row};
use crate::filters;
use crate::query::{parse_limit, QueryState, StatePatch};
use crate::sorts;

/// A single state transition request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Switch to another model, clearing fields, filters and rows
    SetModel { model: String },
    /// Append an unsorted field
    AddField { path: String },
    /// Append a field sorted the way its type sorts by default
    AddFieldWithDefaultSort { path: String },
    RemoveField { index: usize },
    /// Cycle the sort of a field: none, ascending, descending
    ToggleSort { index: usize },
    /// Append a filter with its type's default lookup and value
    AddFilter { path: String },
    RemoveFilter { index: usize },
    SetFilterValue { index: usize, value: String },
    SetFilterLookup { index: usize, lookup: String },
    /// Append the model's default filters
    ApplyDefaultFilters,
    /// Validator messages, one per filter position
    SetFilterErrors { errors: Vec<Option<String>> },
    /// Rows delivered by the result fetch
    SetData { rows: Vec<Row> },
    /// Row limit as typed by the user
    SetLimit { raw: String },
}

impl Command {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetModel { .. } => "set_model",
            Command::AddField { .. } => "add_field",
            Command::AddFieldWithDefaultSort { .. } => "add_field_with_default_sort",
            Command::RemoveField { .. } => "remove_field",
            Command::ToggleSort { .. } => "toggle_sort",
            Command::AddFilter { .. } => "add_filter",
            Command::RemoveFilter { .. } => "remove_filter",
            Command::SetFilterValue { .. } => "set_filter_value",
            Command::SetFilterLookup { .. } => "set_filter_lookup",
            Command::ApplyDefaultFilters => "apply_default_filters",
            Command::SetFilterErrors { .. } => "set_filter_errors",
            Command::SetData { .. } => "set_data",
            Command::SetLimit { .. } => "set_limit",
        }
    }
}

/// Applies commands against a schema
#[derive(Debug, Clone, Copy)]
pub struct QueryReducer<'a> {
    config: &'a QueryConfig,
    default_limit: u32,
}

impl<'a> QueryReducer<'a> {
    /// Create a reducer using the default row limit for new models
    pub fn new(config: &'a QueryConfig) -> Self {
        Self {
            config,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Set the row limit a model switch resets to
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// The schema this reducer resolves paths against
    pub fn config(&self) -> &'a QueryConfig {
        self.config
    }

    /// A fresh state on `model`
    pub fn initial_state(&self, model: &str) -> DdbResult<QueryState> {
        self.config.model(model)?;
        Ok(QueryState::with_limit(model, self.default_limit))
    }

    /// Compute the patch a command produces
    pub fn patch(&self, state: &QueryState, command: Command) -> DdbResult<StatePatch> {
        let config = self.config;
        let model = state.model.as_str();

        let patch = match command {
            Command::SetModel { model } => {
                config.model(&model)?;
                StatePatch {
                    model: Some(model),
                    fields: Some(vec![]),
                    filters: Some(vec![]),
                    data: Some(vec![]),
                    limit: Some(self.default_limit),
                }
            }
            Command::AddField { path } => {
                resolve_column(config, model, &path)?;
                let (new_fields, data) = fields::add_field(&state.fields, &state.data, &path);
                StatePatch {
                    fields: Some(new_fields),
                    data: Some(data),
                    ..Default::default()
                }
            }
            Command::AddFieldWithDefaultSort { path } => {
                let field = resolve_column(config, model, &path)?;
                let default_sort = resolve_type(config, &path, field)?.default_sort;
                let (new_fields, data) = fields::add_field(&state.fields, &state.data, &path);
                let added = new_fields.len() - 1;
                StatePatch {
                    fields: Some(sorts::sort_to(&new_fields, added, default_sort)?),
                    data: Some(data),
                    ..Default::default()
                }
            }
            Command::RemoveField { index } => {
                let (new_fields, data) = fields::remove_field(&state.fields, &state.data, index)?;
                StatePatch {
                    fields: Some(new_fields),
                    data: Some(data),
                    ..Default::default()
                }
            }
            Command::ToggleSort { index } => StatePatch {
                fields: Some(sorts::toggle_sort(&state.fields, index)?),
                ..Default::default()
            },
            Command::AddFilter { path } => StatePatch {
                filters: Some(filters::add_filter(config, model, &state.filters, &path)?),
                ..Default::default()
            },
            Command::RemoveFilter { index } => StatePatch {
                filters: Some(filters::remove_filter(&state.filters, index)?),
                ..Default::default()
            },
            Command::SetFilterValue { index, value } => StatePatch {
                filters: Some(filters::set_filter_value(&state.filters, index, value)?),
                ..Default::default()
            },
            Command::SetFilterLookup { index, lookup } => {
                let updated = filters::set_filter_lookup(&state.filters, index, lookup)?;
                let entry = &updated[index];
                filters::validate_lookup(config, model, &entry.path, &entry.lookup)?;
                StatePatch {
                    filters: Some(updated),
                    ..Default::default()
                }
            }
            Command::ApplyDefaultFilters => {
                let mut new_filters = state.filters.clone();
                new_filters.extend(filters::default_filters(config, model)?);
                StatePatch {
                    filters: Some(new_filters),
                    ..Default::default()
                }
            }
            Command::SetFilterErrors { errors } => StatePatch {
                filters: Some(filters::set_error_messages(&state.filters, &errors)),
                ..Default::default()
            },
            Command::SetData { rows } => {
                fields::check_alignment(&state.fields, &rows)?;
                StatePatch {
                    data: Some(rows),
                    ..Default::default()
                }
            }
            Command::SetLimit { raw } => StatePatch {
                limit: Some(parse_limit(&raw)?),
                ..Default::default()
            },
        };

        Ok(patch)
    }

    /// Apply a command, producing the next state
    ///
    /// On error the caller keeps its current state; nothing is half-applied.
    pub fn apply(&self, state: &QueryState, command: Command) -> DdbResult<QueryState> {
        let name = command.name();
        let next = state.merged(self.patch(state, command)?);
        tracing::debug!(
            command = name,
            model = %next.model,
            fields = next.fields.len(),
            filters = next.filters.len(),
            rows = next.data.len(),
            limit = next.limit,
            "Applied query command"
        );
        Ok(next)
    }

    /// Apply several commands in order, stopping at the first error
    pub fn apply_all(
        &self,
        state: &QueryState,
        commands: impl IntoIterator<Item = Command>,
    ) -> DdbResult<QueryState> {
        commands
            .into_iter()
            .try_fold(state.clone(), |current, command| self.apply(&current, command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSelection;
    use crate::filters::FilterEntry;
    use crate::fixtures;
    use ddb_core::{DdbError, SortDirection};
    use proptest::prelude::*;
    use serde_json::json;

    fn add(path: &str) -> Command {
        Command::AddField { path: path.into() }
    }

    #[test]
    fn test_initial_state() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config).with_default_limit(50);
        let state = reducer.initial_state("person").unwrap();
        assert_eq!(state.limit, 50);
        assert_eq!(
            reducer.initial_state("robot").unwrap_err().error_code(),
            "unknown_model"
        );
    }

    #[test]
    fn test_add_and_sort_fields() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = reducer
            .apply_all(
                &QueryState::new("person"),
                [
                    add("name"),
                    add("age"),
                    Command::ToggleSort { index: 0 },
                    Command::ToggleSort { index: 1 },
                    Command::ToggleSort { index: 1 },
                ],
            )
            .unwrap();

        assert_eq!(state.fields[0], FieldSelection::sorted("name", SortDirection::Asc, 1));
        assert_eq!(state.fields[1], FieldSelection::sorted("age", SortDirection::Desc, 0));
    }

    #[test]
    fn test_add_field_rejects_unknown_path() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let err = reducer
            .apply(&QueryState::new("person"), add("address__zip"))
            .unwrap_err();
        assert_eq!(err, DdbError::unknown_path("person", "address__zip", "zip"));
    }

    #[test]
    fn test_add_field_rejects_bare_relation() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = QueryState::new("person");
        let expected = DdbError::NotSelectable {
            path: "address".into(),
        };

        assert_eq!(reducer.apply(&state, add("address")).unwrap_err(), expected);
        assert_eq!(
            reducer
                .apply(&state, Command::AddFieldWithDefaultSort { path: "address".into() })
                .unwrap_err(),
            expected
        );
    }

    #[test]
    fn test_add_field_with_default_sort() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = reducer
            .apply_all(
                &QueryState::new("person"),
                [
                    add("name"),
                    Command::ToggleSort { index: 0 },
                    Command::AddFieldWithDefaultSort { path: "born".into() },
                    Command::AddFieldWithDefaultSort { path: "age".into() },
                ],
            )
            .unwrap();

        assert_eq!(state.fields[1], FieldSelection::sorted("born", SortDirection::Asc, 0));
        assert_eq!(state.fields[0].priority, Some(1));
        assert_eq!(state.fields[2], FieldSelection::new("age"));
    }

    #[test]
    fn test_set_model_resets() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = QueryState {
            limit: 7,
            ..fixtures::sorted_state()
        };
        let next = reducer
            .apply(&state, Command::SetModel { model: "city".into() })
            .unwrap();
        assert_eq!(next, QueryState::new("city"));

        let err = reducer
            .apply(&state, Command::SetModel { model: "robot".into() })
            .unwrap_err();
        assert_eq!(err.error_code(), "unknown_model");
    }

    #[test]
    fn test_filter_commands() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = reducer
            .apply_all(
                &QueryState::new("person"),
                [
                    Command::AddFilter { path: "age".into() },
                    Command::SetFilterLookup {
                        index: 0,
                        lookup: "gte".into(),
                    },
                    Command::SetFilterValue {
                        index: 0,
                        value: "18".into(),
                    },
                    Command::ApplyDefaultFilters,
                ],
            )
            .unwrap();

        assert_eq!(
            state.filters,
            vec![
                FilterEntry::new("age", "gte", "18"),
                FilterEntry::new("is_active", "equals", "true"),
            ]
        );

        let state = reducer
            .apply(&state, Command::RemoveFilter { index: 0 })
            .unwrap();
        assert_eq!(state.filters.len(), 1);
        assert_eq!(state.filters[0].path, "is_active");
    }

    #[test]
    fn test_set_filter_lookup_rejects_invalid() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = reducer
            .apply(&QueryState::new("person"), Command::AddFilter { path: "age".into() })
            .unwrap();
        let err = reducer
            .apply(
                &state,
                Command::SetFilterLookup {
                    index: 0,
                    lookup: "starts_with".into(),
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "unknown_lookup");
    }

    #[test]
    fn test_filter_errors_survive_edits() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = reducer
            .apply_all(
                &QueryState::new("person"),
                [
                    Command::AddFilter { path: "age".into() },
                    Command::SetFilterErrors {
                        errors: vec![Some("could not convert string to float".into())],
                    },
                    Command::SetFilterValue {
                        index: 0,
                        value: "x".into(),
                    },
                ],
            )
            .unwrap();
        assert!(state.filters[0].has_error());
    }

    #[test]
    fn test_set_data_checks_width() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = fixtures::sorted_state();

        let next = reducer
            .apply(
                &state,
                Command::SetData {
                    rows: vec![vec![json!("Ada"), json!(36)]],
                },
            )
            .unwrap();
        assert_eq!(next.data.len(), 1);

        let err = reducer
            .apply(
                &state,
                Command::SetData {
                    rows: vec![vec![json!("Ada")]],
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "column_mismatch");
    }

    #[test]
    fn test_set_limit() {
        let config = fixtures::config();
        let reducer = QueryReducer::new(&config);
        let state = fixtures::sorted_state();

        let next = reducer
            .apply(&state, Command::SetLimit { raw: "25".into() })
            .unwrap();
        assert_eq!(next.limit, 25);

        let err = reducer
            .apply(&state, Command::SetLimit { raw: "lots".into() })
            .unwrap_err();
        assert_eq!(err, DdbError::InvalidLimit { raw: "lots".into() });
    }

    #[test]
    fn test_command_serde() {
        let command: Command =
            serde_json::from_str(r#"{"command": "toggle_sort", "index": 2}"#).unwrap();
        assert_eq!(command, Command::ToggleSort { index: 2 });
        assert_eq!(command.name(), "toggle_sort");

        let json = serde_json::to_value(&Command::ApplyDefaultFilters).unwrap();
        assert_eq!(json, json!({"command": "apply_default_filters"}));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Remove(usize),
        Toggle(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3).prop_map(Op::Add),
            (0usize..8).prop_map(Op::Remove),
            (0usize..8).prop_map(Op::Toggle),
        ]
    }

    proptest! {
        #[test]
        fn prop_rows_stay_aligned(ops in prop::collection::vec(op(), 0..40)) {
            let config = fixtures::config();
            let reducer = QueryReducer::new(&config);
            let paths = ["name", "age", "address__city__name"];
            let mut state = QueryState {
                data: vec![vec![], vec![], vec![]],
                ..QueryState::new("person")
            };

            for op in ops {
                let command = match op {
                    Op::Add(i) => add(paths[i]),
                    Op::Remove(i) if !state.fields.is_empty() => Command::RemoveField {
                        index: i % state.fields.len(),
                    },
                    Op::Toggle(i) if !state.fields.is_empty() => Command::ToggleSort {
                        index: i % state.fields.len(),
                    },
                    _ => continue,
                };
                state = reducer.apply(&state, command).unwrap();

                prop_assert!(state.data.iter().all(|row| row.len() == state.fields.len()));
                prop_assert!(sorts::has_dense_priorities(&state.fields));
            }
        }
    }
}
