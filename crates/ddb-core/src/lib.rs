//! # ddb-core
//!
//! Core types shared by the data browser crates:
//! - The error type and its result alias
//! - Value types shared across crates (sort direction)
//! - Process settings (origin, schema location, row limit, log filter)

pub mod error;
pub mod result;
pub mod config;
pub mod types;

pub use error::*;
pub use result::*;
pub use types::*;
pub use config::{BrowserSettings, DEFAULT_LIMIT};
