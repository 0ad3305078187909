//! ddb command line
//!
//! Loads settings and the schema document, then runs one subcommand.

use anyhow::{Context, Result};
use ddb_core::BrowserSettings;
use ddb_query::QueryParts;
use ddb_schema::{standard_types, QueryConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod commands;
mod ops;

use args::{Cli, Command};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    // Load configuration
    let settings = match &cli.settings {
        Some(path) => BrowserSettings::from_file(path)?,
        None => BrowserSettings::from_env().unwrap_or_else(|e| {
            eprintln!("Failed to load settings from env: {}, using defaults", e);
            BrowserSettings::default()
        }),
    };

    init_tracing(&settings.log_filter);

    let origin = cli
        .origin
        .as_deref()
        .map(|o| o.trim_end_matches('/'))
        .unwrap_or_else(|| settings.origin())
        .to_string();
    let schema_path = cli
        .schema
        .clone()
        .or_else(|| settings.schema_path.clone())
        .context("no schema given: pass --schema or set DDB_SCHEMA_PATH")?;

    let mut config = QueryConfig::from_path(&schema_path)?;
    if config.types.is_empty() {
        info!("Schema has no type table, using the standard types");
        config.types = standard_types();
    }

    match cli.command {
        Command::Models => {
            for model in commands::models(&config) {
                println!("{}", model);
            }
        }
        Command::Fields { model, depth } => {
            for line in commands::fields(&config, &model, depth)? {
                println!("{}", line);
            }
        }
        Command::Urls {
            model,
            fields,
            query,
            limit,
            ops,
            json,
        } => {
            let parts = QueryParts {
                model,
                fields,
                query,
            };
            let report =
                commands::urls(&settings, &origin, &config, &parts, limit.as_deref(), ops)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.to_text());
            }
        }
    }

    Ok(())
}

/// Initialize structured logging on stderr
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();
}
