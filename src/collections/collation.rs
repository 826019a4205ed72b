//! Collation
//!
//! String comparison strategies for the text operators (starts-with, ends-with, contains,
//! does-not-contain) and for title sorting. The matcher is handed one explicitly; nothing reads
//! process-wide locale state.

use std::{cmp::Ordering, fmt};

use serde::Deserialize;

/// A string comparison strategy.
pub trait Collation: fmt::Debug {
    /// Whether `haystack` starts with `needle`.
    fn starts_with(&self, haystack: &str, needle: &str) -> bool;

    /// Whether `haystack` ends with `needle`.
    fn ends_with(&self, haystack: &str, needle: &str) -> bool;

    /// Whether `haystack` contains `needle`.
    fn contains(&self, haystack: &str, needle: &str) -> bool;

    /// Ordering used for alphabetical sorting.
    fn compare(&self, left: &str, right: &str) -> Ordering;
}

/// Case-insensitive comparison using locale-neutral Unicode lowercase folding.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitive;

impl CaseInsensitive {
    fn fold(value: &str) -> String {
        value.to_lowercase()
    }
}

impl Collation for CaseInsensitive {
    fn starts_with(&self, haystack: &str, needle: &str) -> bool {
        Self::fold(haystack).starts_with(&Self::fold(needle))
    }

    fn ends_with(&self, haystack: &str, needle: &str) -> bool {
        Self::fold(haystack).ends_with(&Self::fold(needle))
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        Self::fold(haystack).contains(&Self::fold(needle))
    }

    fn compare(&self, left: &str, right: &str) -> Ordering {
        Self::fold(left)
            .cmp(&Self::fold(right))
            .then_with(|| left.cmp(right))
    }
}

/// Byte-wise, case-sensitive comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordinal;

impl Collation for Ordinal {
    fn starts_with(&self, haystack: &str, needle: &str) -> bool {
        haystack.starts_with(needle)
    }

    fn ends_with(&self, haystack: &str, needle: &str) -> bool {
        haystack.ends_with(needle)
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        haystack.contains(needle)
    }

    fn compare(&self, left: &str, right: &str) -> Ordering {
        left.cmp(right)
    }
}

/// Built-in collations, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollationKind {
    /// See [`CaseInsensitive`]
    #[default]
    CaseInsensitive,

    /// See [`Ordinal`]
    Ordinal,
}

impl Collation for CollationKind {
    fn starts_with(&self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::CaseInsensitive => CaseInsensitive.starts_with(haystack, needle),
            Self::Ordinal => Ordinal.starts_with(haystack, needle),
        }
    }

    fn ends_with(&self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::CaseInsensitive => CaseInsensitive.ends_with(haystack, needle),
            Self::Ordinal => Ordinal.ends_with(haystack, needle),
        }
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::CaseInsensitive => CaseInsensitive.contains(haystack, needle),
            Self::Ordinal => Ordinal.contains(haystack, needle),
        }
    }

    fn compare(&self, left: &str, right: &str) -> Ordering {
        match self {
            Self::CaseInsensitive => CaseInsensitive.compare(left, right),
            Self::Ordinal => Ordinal.compare(left, right),
        }
    }
}
