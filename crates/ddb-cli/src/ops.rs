//! Operation parsing
//!
//! `--op` values are `kind:argument` pairs that map onto query commands.

use ddb_query::Command;

/// Parse one `--op` value
pub fn parse_op(raw: &str) -> Result<Command, String> {
    let (kind, arg) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected KIND:ARG, got {:?}", raw))?;

    let command = match kind {
        "add-field" => Command::AddField { path: arg.to_string() },
        "add-sorted-field" => Command::AddFieldWithDefaultSort { path: arg.to_string() },
        "remove-field" => Command::RemoveField { index: index(arg)? },
        "toggle-sort" => Command::ToggleSort { index: index(arg)? },
        "add-filter" => Command::AddFilter { path: arg.to_string() },
        "remove-filter" => Command::RemoveFilter { index: index(arg)? },
        "filter-value" => {
            let (i, value) = assignment(arg)?;
            Command::SetFilterValue {
                index: i,
                value: value.to_string(),
            }
        }
        "filter-lookup" => {
            let (i, lookup) = assignment(arg)?;
            Command::SetFilterLookup {
                index: i,
                lookup: lookup.to_string(),
            }
        }
        "default-filters" => Command::ApplyDefaultFilters,
        "limit" => Command::SetLimit { raw: arg.to_string() },
        "model" => Command::SetModel { model: arg.to_string() },
        other => return Err(format!("unknown operation {:?}", other)),
    };
    Ok(command)
}

fn index(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("expected an index, got {:?}", raw))
}

fn assignment(raw: &str) -> Result<(usize, &str), String> {
    let (i, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got {:?}", raw))?;
    Ok((index(i)?, value))
}
