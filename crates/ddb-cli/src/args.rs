//! CLI argument definitions using clap
//!
//! Commands:
//! - ddb models
//! - ddb fields <model> [--depth N]
//! - ddb urls <model> [--fields SEG] [--query SEG] [--limit N] [--op OP]... [--json]

use clap::{Parser, Subcommand};
use ddb_query::Command as QueryCommand;
use std::path::PathBuf;

use crate::ops::parse_op;

/// ddb - build and inspect data browser queries
#[derive(Parser, Debug)]
#[command(name = "ddb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the schema JSON document
    #[arg(long, global = true, env = "DDB_SCHEMA_PATH")]
    pub schema: Option<PathBuf>,

    /// Origin prefixed to generated links
    #[arg(long, global = true, env = "DDB_ORIGIN")]
    pub origin: Option<String>,

    /// Settings file (toml, json or yaml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List models in display order
    Models,

    /// List the field paths reachable from a model
    Fields {
        model: String,

        /// How many relations to follow
        #[arg(long, default_value_t = 1)]
        depth: usize,
    },

    /// Parse a query, apply operations and print its links
    Urls {
        model: String,

        /// Fields segment, e.g. `name+0,age-1`
        #[arg(long, default_value = "")]
        fields: String,

        /// Filter segment, e.g. `age__gte=18`
        #[arg(long, default_value = "")]
        query: String,

        /// Row limit
        #[arg(long)]
        limit: Option<String>,

        /// Operation to apply, in order (e.g. `toggle-sort:0`, `filter-value:1=42`)
        #[arg(long = "op", value_parser = parse_op)]
        ops: Vec<QueryCommand>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
