//! Engine Configuration
//!
//! Matcher and calculator settings read from YAML. Every key is optional; an empty document
//! yields the defaults.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    collections::{
        collation::CollationKind,
        matcher::{
            AnyMatch, CollectionMatcher, ConditionErrorPolicy, MatcherOptions,
            UnsupportedOperatorPolicy,
        },
    },
    discounts::calculator::{DiscountCalculator, UnsupportedPolicy},
};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,

        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The YAML did not describe a configuration
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Collection matcher settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherConfig {
    /// String comparison for text operators and title sorting
    pub collation: CollationKind,

    /// Match-any duplicate handling
    pub any_match: AnyMatch,

    /// What to do with a condition whose operand does not parse
    pub on_error: ConditionErrorPolicy,

    /// What to do with an operator the subject does not define
    pub on_unsupported: UnsupportedOperatorPolicy,
}

/// Discount calculator settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscountConfig {
    /// What to do with discounts that need an unsupported feature
    pub unsupported: UnsupportedPolicy,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Matcher settings
    pub matcher: MatcherConfig,

    /// Calculator settings
    pub discounts: DiscountConfig,
}

impl EngineConfig {
    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or [`ConfigError::Yaml`] if it
    /// is not a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse a configuration from YAML. Blank input yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed YAML or an unknown key.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_norway::from_str(yaml)?)
    }

    /// A matcher built from these settings.
    pub fn matcher(&self) -> CollectionMatcher {
        CollectionMatcher::new(self.matcher.collation).with_options(MatcherOptions {
            any_match: self.matcher.any_match,
            on_error: self.matcher.on_error,
            on_unsupported: self.matcher.on_unsupported,
        })
    }

    /// A calculator built from these settings.
    pub fn calculator(&self) -> DiscountCalculator {
        DiscountCalculator::new(self.discounts.unsupported)
    }
}
