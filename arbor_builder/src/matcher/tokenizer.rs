use crate::constant::FLAG_PREFIX;
use crate::matcher::model::*;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Splits arguments into a path and flag/value pairs, one token of lookahead at a time.
#[derive(Debug)]
pub(crate) struct Tokenizer<'h> {
    help_names: &'h [String],
    state: State,
    tokens: Tokens,
}

impl<'h> Tokenizer<'h> {
    pub(crate) fn new(help_names: &'h [String]) -> Self {
        Self {
            help_names,
            state: State::AwaitingPathOrFlag,
            tokens: Tokens::default(),
        }
    }

    pub(crate) fn feed(&mut self, token: &str) -> Result<(), TokenizeError> {
        let state = std::mem::replace(&mut self.state, State::AwaitingPathOrFlag);
        self.state = match state {
            State::AwaitingPathOrFlag => {
                if self.help_names.iter().any(|name| name == token) {
                    self.tokens.help_requested = true;
                    State::HelpFlagSeen(token.to_string())
                } else if token.starts_with(FLAG_PREFIX) {
                    State::FlagSeen(token.to_string())
                } else {
                    self.tokens.path.push(token.to_string());
                    State::AwaitingPathOrFlag
                }
            }
            State::HelpFlagSeen(name) => {
                self.tokens.flags.push(FlagToken::new(name, token));
                State::HelpValueSeen
            }
            State::HelpValueSeen => {
                self.state = State::HelpValueSeen;
                return Err(TokenizeError::HelpOverflow(token.to_string()));
            }
            State::FlagSeen(name) => {
                self.tokens.flags.push(FlagToken::new(name, token));
                State::AwaitingPathOrFlag
            }
        };

        Ok(())
    }

    /// The flag waiting on its value, if any.
    pub(crate) fn pending_flag(&self) -> Option<&str> {
        match &self.state {
            State::FlagSeen(name) | State::HelpFlagSeen(name) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn path(&self) -> &[String] {
        &self.tokens.path
    }

    pub(crate) fn close(self) -> Result<Tokens, TokenizeError> {
        match self.state {
            State::FlagSeen(name) => Err(TokenizeError::MissingValue(name)),
            _ => Ok(self.tokens),
        }
    }
}

pub(crate) fn tokenize(args: &[&str], help_names: &[String]) -> Result<Tokens, TokenizeError> {
    let mut tokenizer = Tokenizer::new(help_names);

    for token in args {
        tokenizer.feed(token)?;
    }

    let tokens = tokenizer.close()?;
    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Tokenized path={:?}, flags={}, help={}.",
            tokens.path,
            tokens.flags.len(),
            tokens.help_requested
        );
    }
    Ok(tokens)
}
