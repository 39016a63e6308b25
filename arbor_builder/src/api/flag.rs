use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::{TypedValue, ValueSpec};

/// Flags by canonical name.
pub type FlagMap = BTreeMap<String, Flag>;

/// A named, typed parameter definition.
///
/// The definition is immutable once registered; every parse works on a fresh value instantiated from it.
///
/// ### Example
/// ```
/// # use arbor_builder as arbor;
/// use arbor::{Flag, Slice};
///
/// let flag = Flag::new("Subreddits to read.", Slice::<String>::new())
///     .alias("-s")
///     .config_path("subreddits[].name")
///     .env_vars(["GRABBIT_SUBREDDITS"])
///     .unset_sentinel("UNSET");
///
/// assert_eq!(flag.alias_name(), Some("-s"));
/// assert!(!flag.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct Flag {
    pub(crate) help: String,
    pub(crate) alias: Option<String>,
    pub(crate) config_path: Option<String>,
    pub(crate) env_vars: Vec<String>,
    pub(crate) required: bool,
    pub(crate) unset_sentinel: Option<String>,
    pub(crate) value: Arc<ValueSpec>,
}

impl Flag {
    /// Create a flag with help text and a value definition.
    pub fn new(help: impl Into<String>, value: impl Into<ValueSpec>) -> Self {
        Self {
            help: help.into(),
            alias: None,
            config_path: None,
            env_vars: Vec::default(),
            required: false,
            unset_sentinel: None,
            value: Arc::new(value.into()),
        }
    }

    /// Set the short alias (ex: `-v`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias.replace(alias.into());
        self
    }

    /// Set the config path queried during resolution (ex: `server.port`, `items[].name`).
    pub fn config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path.replace(path.into());
        self
    }

    /// Set the environment variables consulted, in order.
    pub fn env_vars<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.env_vars = names.into_iter().map(Into::into).collect();
        self
    }

    /// Require the flag to be resolved by some source.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the command line value that clears anything accumulated so far.
    pub fn unset_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.unset_sentinel.replace(sentinel.into());
        self
    }

    /// Help text.
    pub fn help_text(&self) -> &str {
        &self.help
    }

    /// The short alias, if any.
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The config path, if any.
    pub fn config_key(&self) -> Option<&str> {
        self.config_path.as_deref()
    }

    /// Environment variables to consult, in order.
    pub fn env_var_names(&self) -> &[String] {
        &self.env_vars
    }

    /// Whether the flag must resolve to a value.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The value that clears this flag on the command line, if any.
    pub fn sentinel(&self) -> Option<&str> {
        self.unset_sentinel.as_deref()
    }

    /// The value's kind, shape, default and choices.
    pub fn value_spec(&self) -> &ValueSpec {
        &self.value
    }

    /// A fresh, unset value instance for this flag.
    pub fn empty_value(&self) -> TypedValue {
        TypedValue::empty(&self.value)
    }
}
