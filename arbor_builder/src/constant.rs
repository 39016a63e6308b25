/// Every flag name and alias starts with this marker; section and command names never do.
pub const FLAG_PREFIX: char = '-';

/// The name of the help flag, unless overridden.
pub const DEFAULT_HELP_NAME: &str = "--help";
/// The alias of the help flag, unless overridden.
pub const DEFAULT_HELP_ALIAS: &str = "-h";
/// The help command used when `--help` is passed without a value.
pub const DEFAULT_HELP_COMMAND: &str = "default";
pub(crate) const DETAILED_HELP_COMMAND: &str = "detailed";
pub(crate) const OUTLINE_HELP_COMMAND: &str = "outline";

pub(crate) const VERSION_COMMAND: &str = "version";

/// A leading argument equal to this switches the app into completion-query mode.
pub const COMPLETION_QUERY: &str = "__complete";

/// Exit code for any parse (usage) error.
pub const EXIT_PARSE_ERROR: i32 = 64;
/// Exit code for an action that returned an error.
pub const EXIT_ACTION_ERROR: i32 = 1;
