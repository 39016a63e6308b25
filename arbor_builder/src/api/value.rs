use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::api::{Kind, Primitive};
use crate::model::UpdatedBy;
use crate::prelude::Native;

/// The container shape of a flag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single value; updates replace it.
    Scalar,
    /// An ordered sequence; updates append to it.
    Slice,
    /// A string-keyed map; updates insert `KEY=VALUE` entries.
    Dict,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Shape::Scalar => "scalar",
            Shape::Slice => "slice",
            Shape::Dict => "dict",
        };
        write!(f, "{name}")
    }
}

/// The content held by a flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// At most one value.
    Scalar(Option<Primitive>),
    /// Values in update order.
    Slice(Vec<Primitive>),
    /// Values by key.
    Dict(BTreeMap<String, Primitive>),
}

impl Content {
    pub(crate) fn empty(shape: Shape) -> Self {
        match shape {
            Shape::Scalar => Content::Scalar(None),
            Shape::Slice => Content::Slice(Vec::default()),
            Shape::Dict => Content::Dict(BTreeMap::default()),
        }
    }

    /// The shape of this content.
    pub fn shape(&self) -> Shape {
        match self {
            Content::Scalar(_) => Shape::Scalar,
            Content::Slice(_) => Shape::Slice,
            Content::Dict(_) => Shape::Dict,
        }
    }

    /// Whether no value is held.
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Scalar(item) => item.is_none(),
            Content::Slice(items) => items.is_empty(),
            Content::Dict(entries) => entries.is_empty(),
        }
    }

    /// The printable form of each held value (dict entries render as `KEY=VALUE`).
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            Content::Scalar(item) => item.iter().map(ToString::to_string).collect(),
            Content::Slice(items) => items.iter().map(ToString::to_string).collect(),
            Content::Dict(entries) => entries
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect(),
        }
    }

    fn primitives(&self) -> Vec<&Primitive> {
        match self {
            Content::Scalar(item) => item.iter().collect(),
            Content::Slice(items) => items.iter().collect(),
            Content::Dict(entries) => entries.values().collect(),
        }
    }
}

/// Failure to apply an input to a flag value.
#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    /// The input could not be converted into the value's kind.
    #[error("cannot convert '{raw}' to {kind}")]
    Conversion {
        /// The offending input.
        raw: String,
        /// The expected kind.
        kind: Kind,
    },

    /// The converted input is outside the value's choices.
    #[error("'{value}' is not one of the choices [{}]", .choices.join(", "))]
    Choice {
        /// The offending value.
        value: String,
        /// The permitted choices.
        choices: Vec<String>,
    },

    /// A dict input was not of the form `KEY=VALUE`.
    #[error("'{0}' is not of the form KEY=VALUE")]
    MalformedKeyValue(String),

    /// Only slices may be appended to element by element.
    #[error("cannot append to a {0} value")]
    NotAggregatable(Shape),
}

/// The immutable definition of a flag's value: its kind, shape, default and choices.
///
/// A `ValueSpec` is the prototype every parse instantiates a fresh [`TypedValue`] from.
/// Build one with [`Scalar`](crate::Scalar), [`Slice`](crate::Slice) or [`Dict`](crate::Dict).
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    kind: Kind,
    shape: Shape,
    default: Option<Content>,
    choices: Vec<Primitive>,
}

impl ValueSpec {
    pub(crate) fn new(
        kind: Kind,
        shape: Shape,
        default: Option<Content>,
        choices: Vec<Primitive>,
    ) -> Self {
        Self {
            kind,
            shape,
            default,
            choices,
        }
    }

    /// The primitive kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The container shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The predefined default, if any.
    pub fn default(&self) -> Option<&Content> {
        self.default.as_ref()
    }

    /// The permitted values; empty means anything of the kind is accepted.
    pub fn choices(&self) -> &[Primitive] {
        &self.choices
    }

    /// A short human description, ex: `int`, `string slice`, `duration dict`.
    pub fn description(&self) -> String {
        match self.shape {
            Shape::Scalar => self.kind.to_string(),
            Shape::Slice => format!("{} slice", self.kind),
            Shape::Dict => format!("{} dict", self.kind),
        }
    }

    fn check_choice(&self, primitive: &Primitive) -> Result<(), ValueError> {
        if self.choices.is_empty() || self.choices.contains(primitive) {
            Ok(())
        } else {
            Err(ValueError::Choice {
                value: primitive.to_string(),
                choices: self.choices.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

/// One flag's value during a single parse, along with which source set it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    spec: Arc<ValueSpec>,
    content: Content,
    updated_by: UpdatedBy,
}

impl TypedValue {
    pub(crate) fn empty(spec: &Arc<ValueSpec>) -> Self {
        Self {
            spec: Arc::clone(spec),
            content: Content::empty(spec.shape),
            updated_by: UpdatedBy::Unset,
        }
    }

    /// Apply a wire string: scalars replace, slices append, dicts insert a `KEY=VALUE` entry.
    pub fn update(&mut self, raw: &str, updated_by: UpdatedBy) -> Result<(), ValueError> {
        match self.spec.shape {
            Shape::Scalar | Shape::Slice => {
                let primitive = Primitive::parse(self.spec.kind, raw)?;
                self.spec.check_choice(&primitive)?;
                self.store(None, primitive);
            }
            Shape::Dict => {
                let (key, value) = raw
                    .split_once('=')
                    .filter(|(key, _)| !key.is_empty())
                    .ok_or_else(|| ValueError::MalformedKeyValue(raw.to_string()))?;
                let primitive = Primitive::parse(self.spec.kind, value)?;
                self.spec.check_choice(&primitive)?;
                self.store(Some(key.to_string()), primitive);
            }
        }

        self.updated_by = updated_by;
        Ok(())
    }

    /// Apply a structured value: scalars replace, slices replace from an array, dicts insert from an object.
    pub fn replace_from_interface(
        &mut self,
        iface: &Value,
        updated_by: UpdatedBy,
    ) -> Result<(), ValueError> {
        match (self.spec.shape, iface) {
            (Shape::Scalar, _) => {
                let primitive = self.convert(iface)?;
                self.content = Content::Scalar(Some(primitive));
            }
            (Shape::Slice, Value::Array(items)) => {
                let primitives = items
                    .iter()
                    .map(|item| self.convert(item))
                    .collect::<Result<Vec<Primitive>, ValueError>>()?;
                self.content = Content::Slice(primitives);
            }
            (Shape::Dict, Value::Object(entries)) => {
                let primitives = entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.convert(item)?)))
                    .collect::<Result<Vec<(String, Primitive)>, ValueError>>()?;

                for (key, primitive) in primitives {
                    self.store(Some(key), primitive);
                }
            }
            _ => {
                return Err(ValueError::Conversion {
                    raw: iface.to_string(),
                    kind: self.spec.kind,
                });
            }
        }

        self.updated_by = updated_by;
        Ok(())
    }

    /// Append a single structured element; only slices support this.
    pub fn append_from_interface(
        &mut self,
        iface: &Value,
        updated_by: UpdatedBy,
    ) -> Result<(), ValueError> {
        if self.spec.shape != Shape::Slice {
            return Err(ValueError::NotAggregatable(self.spec.shape));
        }

        let primitive = self.convert(iface)?;
        self.store(None, primitive);
        self.updated_by = updated_by;
        Ok(())
    }

    /// Copy the predefined default into the value.
    /// Without a default this changes nothing but the provenance; check [`TypedValue::has_default`] first.
    pub fn replace_from_default(&mut self, updated_by: UpdatedBy) -> Result<(), ValueError> {
        if let Some(default) = &self.spec.default {
            for primitive in default.primitives() {
                self.spec.check_choice(primitive)?;
            }

            self.content = default.clone();
        }

        self.updated_by = updated_by;
        Ok(())
    }

    /// Whether a default was predefined.
    pub fn has_default(&self) -> bool {
        self.spec.default.is_some()
    }

    /// The current content.
    pub fn get(&self) -> &Content {
        &self.content
    }

    /// Which source last set the value.
    pub fn updated_by(&self) -> UpdatedBy {
        self.updated_by
    }

    /// Whether any source has set the value.
    pub fn is_set(&self) -> bool {
        self.updated_by != UpdatedBy::Unset
    }

    /// The printable form of each permitted choice.
    pub fn choices(&self) -> Vec<String> {
        self.spec.choices.iter().map(ToString::to_string).collect()
    }

    /// A short human description of the value's kind and shape.
    pub fn description(&self) -> String {
        self.spec.description()
    }

    /// The definition this value was instantiated from.
    pub fn spec(&self) -> &ValueSpec {
        &self.spec
    }

    /// The scalar content as `T`, if set and of `T`'s kind.
    pub fn scalar<T: Native>(&self) -> Option<T> {
        match &self.content {
            Content::Scalar(Some(primitive)) => T::from_primitive(primitive),
            _ => None,
        }
    }

    /// The slice content as `Vec<T>`, if of `T`'s kind.
    pub fn slice<T: Native>(&self) -> Option<Vec<T>> {
        match &self.content {
            Content::Slice(items) => items.iter().map(T::from_primitive).collect(),
            _ => None,
        }
    }

    /// The dict content as `BTreeMap<String, T>`, if of `T`'s kind.
    pub fn dict<T: Native>(&self) -> Option<BTreeMap<String, T>> {
        match &self.content {
            Content::Dict(entries) => entries
                .iter()
                .map(|(key, value)| T::from_primitive(value).map(|value| (key.clone(), value)))
                .collect(),
            _ => None,
        }
    }

    fn convert(&self, iface: &Value) -> Result<Primitive, ValueError> {
        let primitive = Primitive::from_interface(self.spec.kind, iface)?;
        self.spec.check_choice(&primitive)?;
        Ok(primitive)
    }

    fn store(&mut self, key: Option<String>, primitive: Primitive) {
        match (&mut self.content, key) {
            (Content::Scalar(item), _) => {
                item.replace(primitive);
            }
            (Content::Slice(items), _) => items.push(primitive),
            (Content::Dict(entries), Some(key)) => {
                entries.insert(key, primitive);
            }
            (Content::Dict(_), None) => {
                unreachable!("internal error - dict entries must be stored under a key")
            }
        }
    }
}
