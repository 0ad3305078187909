//! Common value types shared across crates

use serde::{Deserialize, Serialize};

/// Sort direction
///
/// A field with no sort is represented as `Option::<SortDirection>::None`
/// wherever sorting is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[serde(rename = "asc")]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    #[serde(rename = "dsc")]
    Desc,
}

impl SortDirection {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "dsc" | "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Convert to the string used in the schema document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "dsc",
        }
    }

    /// Sign used in the fields segment of a query string
    pub fn sign(&self) -> char {
        match self {
            Self::Asc => '+',
            Self::Desc => '-',
        }
    }

    /// Inverse of [`SortDirection::sign`]
    pub fn from_sign(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Asc),
            '-' => Some(Self::Desc),
            _ => None,
        }
    }

    /// Next state in the sort cycle: none -> asc -> desc -> none
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Asc),
            Some(Self::Asc) => Some(Self::Desc),
            Some(Self::Desc) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("DSC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("sideways"), None);
    }

    #[test]
    fn test_sort_cycle() {
        assert_eq!(SortDirection::cycle(None), Some(SortDirection::Asc));
        assert_eq!(
            SortDirection::cycle(Some(SortDirection::Asc)),
            Some(SortDirection::Desc)
        );
        assert_eq!(SortDirection::cycle(Some(SortDirection::Desc)), None);
    }

    #[test]
    fn test_sign_round_trip() {
        for dir in [SortDirection::Asc, SortDirection::Desc] {
            assert_eq!(SortDirection::from_sign(dir.sign()), Some(dir));
        }
        assert_eq!(SortDirection::from_sign('*'), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SortDirection::Desc).unwrap(), "\"dsc\"");
        let parsed: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(parsed, SortDirection::Asc);
    }
}
