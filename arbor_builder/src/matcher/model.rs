use thiserror::Error;

/// One `(name-or-alias, value)` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FlagToken {
    pub name: String,
    pub value: String,
    pub consumed: bool,
}

impl FlagToken {
    pub(crate) fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            consumed: false,
        }
    }
}

/// The tokenized argument vector.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Tokens {
    pub path: Vec<String>,
    pub flags: Vec<FlagToken>,
    pub help_requested: bool,
}

/// A malformed argument vector.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
    /// A flag ended the argument vector without a value.
    #[error("flag '{0}' requires a value")]
    MissingValue(String),

    /// More than one token followed a help flag.
    #[error("help flags take at most one argument, got an extra '{0}'")]
    HelpOverflow(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum State {
    AwaitingPathOrFlag,
    HelpFlagSeen(String),
    HelpValueSeen,
    FlagSeen(String),
}
