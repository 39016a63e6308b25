//! Traits which, typically, may be imported without concern: `use arbor::prelude::*`.
use crate::api::{Kind, Primitive};

/// Behaviour for a native Rust type that a flag value may hold.
// Needs to be imported in order to build `Scalar`, `Slice` or `Dict` values over the type.
pub trait Native: Sized + Clone {
    /// The primitive kind backing this type.
    const KIND: Kind;

    /// Wrap this value as its primitive payload.
    fn into_primitive(self) -> Primitive;

    /// Unwrap a primitive payload, if it is of this type's kind.
    fn from_primitive(primitive: &Primitive) -> Option<Self>;
}
