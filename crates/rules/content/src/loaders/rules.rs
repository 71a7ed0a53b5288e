//! Rule file loader.
//!
//! Loads declarative rules from RON data files. Rule files carry a format
//! version: version 1 predates link traversals on entity scopes, so a
//! version-1 payload simply deserializes with no link fields. A missing
//! field means "no link traversal", never an error. Files newer than the
//! supported format are rejected.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use rules_core::Rule;
use rules_core::error::{ErrorSeverity, RuleError};

/// The rule file format this build reads and writes.
///
/// Version 2 added the optional `link_name`/`use_first_link` pair on entity
/// scopes.
pub const FORMAT_VERSION: u32 = 2;

/// On-disk shape of one rule file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    pub version: u32,
    pub rules: Vec<Rule>,
}

/// Errors raised while loading rule files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse {file}")]
    Parse {
        file: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("{file} uses rule format {found}, newer than supported {supported}")]
    UnsupportedVersion {
        file: String,
        found: u32,
        supported: u32,
    },

    #[error("{file} defines rule `{name}` more than once")]
    DuplicateRule { file: String, name: String },
}

impl RuleError for LoadError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "LOAD_PARSE",
            Self::UnsupportedVersion { .. } => "LOAD_UNSUPPORTED_VERSION",
            Self::DuplicateRule { .. } => "LOAD_DUPLICATE_RULE",
        }
    }
}

/// Registry of loaded rules, keyed by rule name.
#[derive(Clone, Debug, Default)]
pub struct RuleLibrary {
    rules: HashMap<String, Rule>,
}

impl RuleLibrary {
    /// Loads the embedded rule data files.
    pub fn load() -> Result<Self, LoadError> {
        let mut library = Self::default();
        library.merge_str("sentry.ron", include_str!("../../data/rules/sentry.ron"))?;
        Ok(library)
    }

    /// Parses one rule file and merges its rules into the library.
    pub fn merge_str(&mut self, file: &str, text: &str) -> Result<(), LoadError> {
        let parsed: RuleFile = ron::from_str(text).map_err(|source| LoadError::Parse {
            file: file.to_owned(),
            source,
        })?;
        if parsed.version > FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                file: file.to_owned(),
                found: parsed.version,
                supported: FORMAT_VERSION,
            });
        }
        debug!(file, version = parsed.version, rules = parsed.rules.len(), "loaded rule file");
        for rule in parsed.rules {
            if self.rules.contains_key(&rule.name) {
                return Err(LoadError::DuplicateRule {
                    file: file.to_owned(),
                    name: rule.name,
                });
            }
            self.rules.insert(rule.name.clone(), rule);
        }
        Ok(())
    }

    /// Parses one rule file into a fresh library.
    pub fn from_str(file: &str, text: &str) -> Result<Self, LoadError> {
        let mut library = Self::default();
        library.merge_str(file, text)?;
        Ok(library)
    }

    /// Gets a rule by name.
    ///
    /// # Panics
    ///
    /// Panics if the rule is not loaded.
    pub fn get(&self, name: &str) -> &Rule {
        self.rules
            .get(name)
            .unwrap_or_else(|| panic!("rule not found: {name}"))
    }

    pub fn find(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
