use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

mod json;

pub use json::JsonConfigReader;

/// The marker suffix projecting a key across every element of an array (ex: `items[].name`).
pub const PROJECTION_SUFFIX: &str = "[]";

/// What a config path resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// The path resolved to one structured value.
    Single(Value),
    /// The path contained a projection, resolving to one value per array element.
    Aggregated(Vec<Value>),
}

/// Failure to open or query a config source.
#[derive(Debug, Error)]
pub enum ConfigReadError {
    /// The config source could not be read.
    #[error("cannot read config '{}': {source}", .path.display())]
    Io {
        /// The config file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The config source is not well formed.
    #[error("malformed config: {0}")]
    Malformed(String),

    /// The search path is not well formed.
    #[error("invalid config path '{0}'")]
    InvalidPath(String),
}

/// A structured config source queried by path.
pub trait ConfigReader {
    /// Look up `path` (dot-separated keys).
    ///
    /// A well formed path that is absent from the source is `Ok(None)`, not an error.
    fn search(&self, path: &str) -> Result<Option<SearchResult>, ConfigReadError>;
}

/// Opens a [`ConfigReader`] from the config flag's resolved path.
pub type ConfigReaderFactory =
    Arc<dyn Fn(&Path) -> Result<Box<dyn ConfigReader>, ConfigReadError> + Send + Sync>;

/// The segments of a config path, split around an optional projection.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ConfigPath<'a> {
    pub prefix: Vec<&'a str>,
    pub projection: Option<(&'a str, &'a str)>,
}

impl<'a> ConfigPath<'a> {
    pub(crate) fn parse(path: &'a str) -> Result<Self, ConfigReadError> {
        let segments: Vec<&str> = path.split('.').collect();
        let invalid = || ConfigReadError::InvalidPath(path.to_string());

        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(invalid());
        }

        let projected: Vec<usize> = segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| segment.ends_with(PROJECTION_SUFFIX))
            .map(|(i, _)| i)
            .collect();

        match projected.as_slice() {
            [] => Ok(Self {
                prefix: segments,
                projection: None,
            }),
            [i] if segments.len() >= 2 && *i == segments.len() - 2 => {
                let key = segments[*i]
                    .strip_suffix(PROJECTION_SUFFIX)
                    .filter(|key| !key.is_empty())
                    .ok_or_else(invalid)?;
                Ok(Self {
                    prefix: segments[..*i].to_vec(),
                    projection: Some((key, segments[*i + 1])),
                })
            }
            _ => Err(invalid()),
        }
    }
}
