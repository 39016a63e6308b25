mod base;
mod completion;
mod interface;
mod middleware;
mod printer;
mod tree;
mod validate;

pub use base::{FlagValues, ParseError};
pub(crate) use base::ParseState;
pub(crate) use completion::complete;
pub use interface::{ConsoleInterface, UserInterface};
#[cfg(test)]
pub(crate) use interface::util;
pub use middleware::{App, Dispatch, HelpContext, ParseResult};
pub(crate) use printer::{default_help, detailed_help, outline_help};
pub use tree::{Available, AvailableFlag, Node};
pub(crate) use tree::resolve_tree;
pub use validate::ValidationError;
pub(crate) use validate::validate;
