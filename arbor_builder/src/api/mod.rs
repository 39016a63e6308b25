mod core;
mod field;
mod flag;
mod primitive;
mod value;

pub use self::core::*;
pub use field::*;
pub use flag::*;
pub use primitive::*;
pub use value::*;
