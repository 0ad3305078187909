//! Path Resolution
//!
//! A path is a `__`-joined list of names. Every name but the last is a
//! relation hop into another model; the last names a field of the model
//! reached by the hops.

use ddb_core::{DdbError, DdbResult};

use crate::registry::{FieldMeta, ModelFields, QueryConfig, TypeMeta};

/// Separator between path components
pub const PATH_SEPARATOR: &str = "__";

/// A field reached from a root model
#[derive(Debug, Clone, Copy)]
pub struct ResolvedField<'a> {
    /// Model that owns the terminal field
    pub model: &'a str,
    pub field: &'a FieldMeta,
}

/// A field listed by [`walk`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry<'a> {
    pub path: String,
    /// Pretty names of every component, root first
    pub pretty_path: Vec<&'a str>,
    pub field: &'a FieldMeta,
    /// Relation depth of the entry (0 for the root model's own fields)
    pub depth: usize,
}

/// Split a path into its components
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR).collect()
}

/// Join components into a path
pub fn join_path<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// Resolve a path to the terminal field's metadata
pub fn resolve_field<'a>(
    config: &'a QueryConfig,
    model: &str,
    path: &str,
) -> DdbResult<&'a FieldMeta> {
    resolve(config, model, path).map(|resolved| resolved.field)
}

/// Resolve a path that is to be shown as a result column
///
/// Fails with `NotSelectable` when the terminal field has no type, as bare
/// relations do.
pub fn resolve_column<'a>(
    config: &'a QueryConfig,
    model: &str,
    path: &str,
) -> DdbResult<&'a FieldMeta> {
    let field = resolve_field(config, model, path)?;
    if !field.is_selectable() {
        return Err(DdbError::NotSelectable {
            path: path.to_string(),
        });
    }
    Ok(field)
}

/// Resolve a path, also reporting which model owns the terminal field
pub fn resolve<'a>(
    config: &'a QueryConfig,
    model: &str,
    path: &str,
) -> DdbResult<ResolvedField<'a>> {
    let parts = split_path(path);
    let (last, hops) = parts
        .split_last()
        .ok_or_else(|| DdbError::unknown_path(model, path, ""))?;

    let mut current = config
        .all_model_fields
        .get_key_value(model)
        .ok_or_else(|| DdbError::UnknownModel {
            model: model.to_string(),
        })?;

    for hop in hops {
        let related = current
            .1
            .relation(hop)
            .and_then(|fk| fk.model.as_deref())
            .ok_or_else(|| DdbError::unknown_path(model, path, *hop))?;
        current = config
            .all_model_fields
            .get_key_value(related)
            .ok_or_else(|| DdbError::UnknownModel {
                model: related.to_string(),
            })?;
        tracing::trace!(hop = %hop, model = %related, "Followed relation");
    }

    let field = current
        .1
        .fields
        .get(*last)
        .ok_or_else(|| DdbError::unknown_path(model, path, *last))?;

    Ok(ResolvedField {
        model: current.0.as_str(),
        field,
    })
}

/// Look up the type of a resolved field
///
/// `path` is only used to describe the failure.
pub fn resolve_type<'a>(
    config: &'a QueryConfig,
    path: &str,
    field: &FieldMeta,
) -> DdbResult<&'a TypeMeta> {
    let type_name = field.type_name.as_deref().unwrap_or_default();
    config
        .type_meta(type_name)
        .ok_or_else(|| DdbError::UnknownType {
            path: path.to_string(),
            type_name: type_name.to_string(),
        })
}

/// Resolve a path straight to its type
pub fn resolve_path_type<'a>(
    config: &'a QueryConfig,
    model: &str,
    path: &str,
) -> DdbResult<&'a TypeMeta> {
    let field = resolve_field(config, model, path)?;
    resolve_type(config, path, field)
}

/// List every field reachable from `model` through at most `max_depth` relation hops
///
/// Entries come out depth-first in display order, each relation followed by
/// the fields of its target model.
pub fn walk<'a>(
    config: &'a QueryConfig,
    model: &str,
    max_depth: usize,
) -> DdbResult<Vec<FieldEntry<'a>>> {
    let root = config.model(model)?;
    let mut entries = Vec::new();
    walk_into(
        config,
        root,
        &mut Vec::new(),
        &mut Vec::new(),
        0,
        max_depth,
        &mut entries,
    );
    Ok(entries)
}

fn walk_into<'a>(
    config: &'a QueryConfig,
    fields: &'a ModelFields,
    prefix: &mut Vec<&'a str>,
    pretty_prefix: &mut Vec<&'a str>,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<FieldEntry<'a>>,
) {
    for name in fields.field_names() {
        let Some((name, field)) = fields.fields.get_key_value(name) else {
            continue;
        };
        prefix.push(name.as_str());
        pretty_prefix.push(field.pretty_name.as_str());

        out.push(FieldEntry {
            path: join_path(prefix.as_slice()),
            pretty_path: pretty_prefix.clone(),
            field,
            depth,
        });

        if depth < max_depth {
            let target = field
                .model
                .as_deref()
                .and_then(|m| config.all_model_fields.get(m));
            if let Some(target) = target {
                walk_into(config, target, prefix, pretty_prefix, depth + 1, max_depth, out);
            }
        }

        prefix.pop();
        pretty_prefix.pop();
    }
}
