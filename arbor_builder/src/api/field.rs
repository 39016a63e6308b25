use std::collections::BTreeMap;

use crate::api::{Content, Primitive, Shape, ValueSpec};
use crate::prelude::Native;

/// A flag value holding a single `T` (updates replace).
#[derive(Debug, Clone)]
pub struct Scalar<T> {
    default: Option<T>,
    choices: Vec<T>,
}

impl<T: Native> Scalar<T> {
    /// Create a scalar value without a default or choices.
    pub fn new() -> Self {
        Self {
            default: None,
            choices: Vec::default(),
        }
    }

    /// Set the value applied when no other source does.
    pub fn default_value(mut self, value: T) -> Self {
        self.default.replace(value);
        self
    }

    /// Restrict accepted values to `choices`.
    pub fn choices(mut self, choices: impl IntoIterator<Item = T>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }
}

impl<T: Native> Default for Scalar<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Native> From<Scalar<T>> for ValueSpec {
    fn from(value: Scalar<T>) -> Self {
        ValueSpec::new(
            T::KIND,
            Shape::Scalar,
            value
                .default
                .map(|item| Content::Scalar(Some(item.into_primitive()))),
            primitives(value.choices),
        )
    }
}

/// A flag value holding an ordered sequence of `T` (updates append).
#[derive(Debug, Clone)]
pub struct Slice<T> {
    default: Option<Vec<T>>,
    choices: Vec<T>,
}

impl<T: Native> Slice<T> {
    /// Create a slice value without a default or choices.
    pub fn new() -> Self {
        Self {
            default: None,
            choices: Vec::default(),
        }
    }

    /// Set the sequence applied when no other source does.
    pub fn default_value(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.default.replace(values.into_iter().collect());
        self
    }

    /// Restrict accepted elements to `choices`.
    pub fn choices(mut self, choices: impl IntoIterator<Item = T>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }
}

impl<T: Native> Default for Slice<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Native> From<Slice<T>> for ValueSpec {
    fn from(value: Slice<T>) -> Self {
        ValueSpec::new(
            T::KIND,
            Shape::Slice,
            value
                .default
                .map(|items| Content::Slice(primitives(items))),
            primitives(value.choices),
        )
    }
}

/// A flag value holding a string-keyed map of `T` (updates insert `KEY=VALUE`).
#[derive(Debug, Clone)]
pub struct Dict<T> {
    default: Option<BTreeMap<String, T>>,
    choices: Vec<T>,
}

impl<T: Native> Dict<T> {
    /// Create a dict value without a default or choices.
    pub fn new() -> Self {
        Self {
            default: None,
            choices: Vec::default(),
        }
    }

    /// Set the entries applied when no other source does.
    pub fn default_value<K: Into<String>>(
        mut self,
        entries: impl IntoIterator<Item = (K, T)>,
    ) -> Self {
        self.default.replace(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        );
        self
    }

    /// Restrict accepted entry values to `choices`.
    pub fn choices(mut self, choices: impl IntoIterator<Item = T>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }
}

impl<T: Native> Default for Dict<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Native> From<Dict<T>> for ValueSpec {
    fn from(value: Dict<T>) -> Self {
        ValueSpec::new(
            T::KIND,
            Shape::Dict,
            value.default.map(|entries| {
                Content::Dict(
                    entries
                        .into_iter()
                        .map(|(key, item)| (key, item.into_primitive()))
                        .collect(),
                )
            }),
            primitives(value.choices),
        )
    }
}

fn primitives<T: Native>(items: Vec<T>) -> Vec<Primitive> {
    items.into_iter().map(Native::into_primitive).collect()
}
