mod model;
mod tokenizer;

pub use model::TokenizeError;
pub(crate) use model::{FlagToken, Tokens};
pub(crate) use tokenizer::{tokenize, Tokenizer};
