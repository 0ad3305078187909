//! Result type alias

use crate::error::DdbError;

/// Standard Result type for query-state operations
pub type DdbResult<T> = Result<T, DdbError>;
