/// Which source last set a flag's value during a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatedBy {
    /// No source applied.
    Unset,
    /// The value's predefined default.
    Default,
    /// An environment variable.
    EnvVar,
    /// A command line flag.
    Flag,
    /// A config file.
    Config,
}

impl std::fmt::Display for UpdatedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UpdatedBy::Unset => "unset",
            UpdatedBy::Default => "default",
            UpdatedBy::EnvVar => "envvar",
            UpdatedBy::Flag => "flag",
            UpdatedBy::Config => "config",
        };
        write!(f, "{label}")
    }
}

/// Where a legal flag comes from, relative to the resolved tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagScope {
    /// An app-wide flag, or one inherited from a section along the path.
    Inherited,
    /// A flag local to the matched command.
    Command,
}
