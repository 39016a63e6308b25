//! `arbor` is a declarative command line parser for tree shaped programs.
//!
//! A program is described as a tree of *sections* and *commands*.
//! Sections group related sections and commands; commands are the leaves, each bound to an action.
//! Every level of the tree may declare *flags*, which are inherited by everything below that level.
//! Each flag has a typed value:
//! * *Scalar*: a single value, where repeating the flag on the command line is an error.
//! * *Slice*: an ordered list, where each repetition appends.
//! * *Dict*: a string keyed map, where each repetition supplies one `key=value` entry.
//!
//! A flag's value resolves from the first source that provides one:
//! 1. the command line,
//! 2. the config file (via a dotted config path, such as `output.dir`),
//! 3. the environment (the first set variable of the flag's list),
//! 4. the flag's default.
//!
//! A flag with an *unset sentinel* may be cleared on the command line.
//! The value after the final sentinel occurrence is what remains (`-s a -s - -s c` resolves to `[c]`),
//! and a flag left cleared by its sentinel does not fall back to the config, environment or default.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/grabbit.rs")]
//! ```
//!
//! ```console
//! $ grabbit download -s rust -s - -s programming -o /tmp/images
//! downloading r/programming into /tmp/images
//!
//! $ grabbit download
//! Parse error: missing required flags: --subreddits
//! ```
//!
//! # Config files
//! The config flag names a JSON document, read by [`JsonConfigReader`].
//! Config paths are dotted keys into that document.
//! A `key[]` segment projects over an array, aggregating the remaining path from each element;
//! aggregated results may only feed slice flags.
//! For example, `subreddits[].name` against `{"subreddits": [{"name": "rust"}, {"name": "golang"}]}` yields `[rust, golang]`.
//! Other formats plug in by implementing [`ConfigReader`].
//!
//! # Help and completion
//! The help flag (`--help`/`-h` by default) may be followed by one value selecting the help format:
//! `default`, `detailed` (every flag's sources and resolved value) or `outline` (the whole tree).
//! Additional help commands may be registered via [`AppBuilder::help_command`].
//!
//! Running the program with [`COMPLETION_QUERY`] as the first argument prints completion candidates for the remaining words,
//! one `kind<TAB>name<TAB>description` line each, for shell completion scripts to consume.
//!
//! # Features
//! * `tracing_debug`: emit `tracing` debug events while tokenizing, resolving and dispatching.
#![warn(missing_docs)]

pub use arbor_builder::*;
