use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigPath, ConfigReadError, ConfigReader, ConfigReaderFactory, SearchResult};

/// A [`ConfigReader`] over a JSON document.
///
/// ### Example
/// ```
/// # use arbor_builder as arbor;
/// use arbor::{ConfigReader, JsonConfigReader, SearchResult};
/// use serde_json::json;
///
/// let reader = JsonConfigReader::from_value(json!({
///     "subreddits": [{"name": "rust"}, {"name": "programming"}],
/// }));
///
/// assert_eq!(
///     reader.search("subreddits[].name").unwrap(),
///     Some(SearchResult::Aggregated(vec![json!("rust"), json!("programming")])),
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonConfigReader {
    document: Value,
}

impl JsonConfigReader {
    /// Read a JSON file; a file that does not exist reads as an empty document.
    pub fn open(path: &Path) -> Result<Self, ConfigReadError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::from_value(Value::Null));
            }
            Err(error) => {
                return Err(ConfigReadError::Io {
                    path: path.to_path_buf(),
                    source: error,
                });
            }
        };

        Self::from_json(&content)
    }

    /// Parse a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigReadError> {
        let document = serde_json::from_str(content)
            .map_err(|error| ConfigReadError::Malformed(error.to_string()))?;
        Ok(Self::from_value(document))
    }

    /// Wrap an already decoded JSON document.
    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    /// A factory opening JSON files, for [`AppBuilder::config_flag`](crate::AppBuilder::config_flag).
    pub fn factory() -> ConfigReaderFactory {
        Arc::new(|path: &Path| {
            JsonConfigReader::open(path).map(|reader| Box::new(reader) as Box<dyn ConfigReader>)
        })
    }
}

impl ConfigReader for JsonConfigReader {
    fn search(&self, path: &str) -> Result<Option<SearchResult>, ConfigReadError> {
        let config_path = ConfigPath::parse(path)?;
        let mut current = &self.document;

        for key in &config_path.prefix {
            match current.get(key) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }

        match config_path.projection {
            None => Ok(Some(SearchResult::Single(current.clone()))),
            Some((array_key, key)) => match current.get(array_key) {
                None => Ok(None),
                Some(Value::Array(items)) => Ok(Some(SearchResult::Aggregated(
                    items
                        .iter()
                        .filter_map(|item| item.get(key))
                        .cloned()
                        .collect(),
                ))),
                Some(_) => Err(ConfigReadError::Malformed(format!(
                    "'{array_key}' in '{path}' is not an array"
                ))),
            },
        }
    }
}
