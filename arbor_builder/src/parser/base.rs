use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::api::{Flag, Shape, TypedValue, ValueError};
use crate::config::{ConfigReadError, ConfigReader, SearchResult};
use crate::lookup::Environment;
use crate::matcher::{FlagToken, TokenizeError};
use crate::model::UpdatedBy;
use crate::parser::Available;
use crate::prelude::Native;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Failure to parse an argument vector against the app.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The argument vector is malformed.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// A path word names neither a section nor a command.
    #[error("expected section or command, got '{0}', try --help")]
    UnknownPath(String),

    /// A path word follows the command.
    #[error("unexpected '{word}' after command '{command}'")]
    TrailingPath {
        /// The matched command.
        command: String,
        /// The extra word.
        word: String,
    },

    /// A flag name or alias is declared twice along the path.
    #[error("flag '{0}' collides with another flag or alias")]
    FlagCollision(String),

    /// A source supplied a value the flag rejects.
    #[error("invalid value for flag '{name}' from {updated_by}: {source}")]
    InvalidValue {
        /// The flag.
        name: String,
        /// The source of the value.
        updated_by: UpdatedBy,
        /// The underlying failure.
        source: ValueError,
    },

    /// A scalar flag was passed on the command line more than once.
    #[error("flag '{0}' passed multiple times")]
    MultipleScalar(String),

    /// An aggregated config path was declared for a non-slice flag.
    #[error("flag '{name}' must be a slice to read aggregated config path '{path}'")]
    AggregatedNonSlice {
        /// The flag.
        name: String,
        /// Its config path.
        path: String,
    },

    /// The config source could not be opened or queried.
    #[error(transparent)]
    ConfigRead(#[from] ConfigReadError),

    /// Required flags remained unset.
    #[error("missing required flags: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// Flags on the command line that are not legal at the matched node.
    #[error("unrecognized flags: {}", .0.join(", "))]
    UnrecognizedFlags(Vec<String>),
}

/// The working state of one resolution pass.
#[derive(Debug)]
pub(crate) struct ParseState {
    flag_tokens: Vec<FlagToken>,
    values: BTreeMap<String, TypedValue>,
    unset: BTreeSet<String>,
}

impl ParseState {
    pub(crate) fn new(flag_tokens: Vec<FlagToken>) -> Self {
        Self {
            flag_tokens,
            values: BTreeMap::default(),
            unset: BTreeSet::default(),
        }
    }

    pub(crate) fn value(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    /// Resolve `name` once, by precedence: command line, config, environment, default.
    pub(crate) fn resolve(
        &mut self,
        name: &str,
        flag: &Flag,
        config: Option<&dyn ConfigReader>,
        env: &dyn Environment,
    ) -> Result<(), ParseError> {
        if self.values.contains_key(name) || self.unset.contains(name) {
            return Ok(());
        }

        let value = self.resolve_value(name, flag, config, env)?;
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Resolved '{name}' from {}.", value.updated_by());
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    fn resolve_value(
        &mut self,
        name: &str,
        flag: &Flag,
        config: Option<&dyn ConfigReader>,
        env: &dyn Environment,
    ) -> Result<TypedValue, ParseError> {
        let invalid = |updated_by: UpdatedBy| {
            move |source: ValueError| ParseError::InvalidValue {
                name: name.to_string(),
                updated_by,
                source,
            }
        };
        let mut value = flag.empty_value();
        let matching: Vec<String> = self
            .flag_tokens
            .iter_mut()
            .filter(|token| token.name == name || Some(token.name.as_str()) == flag.alias_name())
            .map(|token| {
                token.consumed = true;
                token.value.clone()
            })
            .collect();

        if flag.value_spec().shape() == Shape::Scalar && matching.len() > 1 {
            return Err(ParseError::MultipleScalar(name.to_string()));
        }

        let mut sentinel_seen = false;

        for raw in &matching {
            if flag.sentinel() == Some(raw.as_str()) {
                value = flag.empty_value();
                sentinel_seen = true;
            } else {
                value
                    .update(raw, UpdatedBy::Flag)
                    .map_err(invalid(UpdatedBy::Flag))?;
            }
        }

        if value.is_set() {
            return Ok(value);
        }

        if sentinel_seen {
            self.unset.insert(name.to_string());
            return Ok(value);
        }

        if let (Some(reader), Some(path)) = (config, flag.config_key()) {
            match reader.search(path)? {
                Some(SearchResult::Single(iface)) => {
                    value
                        .replace_from_interface(&iface, UpdatedBy::Config)
                        .map_err(invalid(UpdatedBy::Config))?;
                }
                Some(SearchResult::Aggregated(items)) => {
                    if flag.value_spec().shape() != Shape::Slice {
                        return Err(ParseError::AggregatedNonSlice {
                            name: name.to_string(),
                            path: path.to_string(),
                        });
                    }

                    for item in &items {
                        value
                            .append_from_interface(item, UpdatedBy::Config)
                            .map_err(invalid(UpdatedBy::Config))?;
                    }
                }
                None => {}
            }

            if value.is_set() {
                return Ok(value);
            }
        }

        for variable in flag.env_var_names() {
            if let Some(raw) = env.lookup(variable) {
                value
                    .update(&raw, UpdatedBy::EnvVar)
                    .map_err(invalid(UpdatedBy::EnvVar))?;
                return Ok(value);
            }
        }

        if value.has_default() {
            value
                .replace_from_default(UpdatedBy::Default)
                .map_err(invalid(UpdatedBy::Default))?;
        }

        Ok(value)
    }

    /// Names of command line flags no legal flag consumed, in argument order.
    pub(crate) fn unrecognized(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::default();

        for token in self.flag_tokens.iter().filter(|token| !token.consumed) {
            if !names.contains(&token.name) {
                names.push(token.name.clone());
            }
        }

        names
    }

    pub(crate) fn missing_required(&self, available: &Available<'_>) -> Vec<String> {
        available
            .iter()
            .filter(|(name, available_flag)| {
                available_flag.flag().is_required()
                    && !self
                        .values
                        .get(name.as_str())
                        .map(TypedValue::is_set)
                        .unwrap_or(false)
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub(crate) fn into_values(self) -> FlagValues {
        FlagValues {
            values: self.values,
            unset: self.unset,
        }
    }
}

/// The resolved value of every flag legal at the matched node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagValues {
    values: BTreeMap<String, TypedValue>,
    unset: BTreeSet<String>,
}

impl FlagValues {
    /// The value of flag `name`.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    /// Which source set flag `name` ([`UpdatedBy::Unset`] for unknown flags).
    pub fn updated_by(&self, name: &str) -> UpdatedBy {
        self.values
            .get(name)
            .map(TypedValue::updated_by)
            .unwrap_or(UpdatedBy::Unset)
    }

    /// Whether any source set flag `name`.
    pub fn is_set(&self, name: &str) -> bool {
        self.updated_by(name) != UpdatedBy::Unset
    }

    /// Whether flag `name` was cleared by its unset sentinel.
    pub fn is_explicitly_unset(&self, name: &str) -> bool {
        self.unset.contains(name)
    }

    /// The scalar value of flag `name`.
    pub fn scalar<T: Native>(&self, name: &str) -> Option<T> {
        self.values.get(name).and_then(TypedValue::scalar::<T>)
    }

    /// The slice value of flag `name`; empty when unset.
    pub fn slice<T: Native>(&self, name: &str) -> Option<Vec<T>> {
        self.values.get(name).and_then(TypedValue::slice::<T>)
    }

    /// The dict value of flag `name`; empty when unset.
    pub fn dict<T: Native>(&self, name: &str) -> Option<BTreeMap<String, T>> {
        self.values.get(name).and_then(TypedValue::dict::<T>)
    }

    /// Every flag and its value, by name.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypedValue)> {
        self.values.iter()
    }
}
