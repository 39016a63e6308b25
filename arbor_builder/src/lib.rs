//! Builder module for `arbor`.
//! See [documentation root](https://docs.rs/arbor/latest/arbor/index.html) for full details.
#![warn(missing_docs)]
mod api;
mod config;
mod constant;
mod lookup;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use config::*;
pub use constant::{
    COMPLETION_QUERY, DEFAULT_HELP_ALIAS, DEFAULT_HELP_COMMAND, DEFAULT_HELP_NAME,
    EXIT_ACTION_ERROR, EXIT_PARSE_ERROR, FLAG_PREFIX,
};
pub use lookup::*;
pub use model::*;
pub use parser::{
    App, Available, AvailableFlag, ConsoleInterface, Dispatch, FlagValues, HelpContext, Node,
    ParseError, ParseResult, UserInterface, ValidationError,
};
pub use matcher::TokenizeError;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
