use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use crate::api::{ActionResult, Command, Context, FlagMap, HelpCommand, Section};
use crate::config::{ConfigReader, ConfigReaderFactory};
use crate::constant::*;
use crate::lookup::{Environment, ProcessEnvironment};
use crate::matcher::tokenize;
use crate::parser::{
    complete, resolve_tree, Available, ConsoleInterface, FlagValues, Node, ParseError,
    ParseState, UserInterface,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The configured application.
/// Built via [`AppBuilder::build`](crate::AppBuilder::build).
///
/// The definition tree is read-only; every parse works on its own state.
pub struct App {
    name: String,
    root: Section,
    global_flags: FlagMap,
    help_flag_name: String,
    help_commands: BTreeMap<String, HelpCommand>,
    config: Option<(String, ConfigReaderFactory)>,
}

/// What a parse dispatches to.
#[derive(Debug, Clone)]
pub enum Dispatch<'a> {
    /// Run the matched command's action.
    Command(&'a Command),
    /// Run the named help command.
    Help(String),
}

/// A fully resolved invocation.
#[derive(Debug)]
pub struct ParseResult<'a> {
    path: Vec<String>,
    node: Node<'a>,
    available: Available<'a>,
    values: FlagValues,
    dispatch: Dispatch<'a>,
}

impl<'a> ParseResult<'a> {
    /// The section/command words of the invocation.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The node the path resolved to.
    pub fn node(&self) -> Node<'a> {
        self.node
    }

    /// The flags legal at the node.
    pub fn available(&self) -> &Available<'a> {
        &self.available
    }

    /// The resolved flag values.
    pub fn values(&self) -> &FlagValues {
        &self.values
    }

    /// The dispatch target.
    pub fn dispatch(&self) -> &Dispatch<'a> {
        &self.dispatch
    }
}

/// What a [`HelpCommand`] sees: the app and the resolved invocation.
pub struct HelpContext<'a> {
    app: &'a App,
    result: &'a ParseResult<'a>,
    interface: &'a dyn UserInterface,
}

impl<'a> HelpContext<'a> {
    pub(crate) fn new(
        app: &'a App,
        result: &'a ParseResult<'a>,
        interface: &'a dyn UserInterface,
    ) -> Self {
        Self {
            app,
            result,
            interface,
        }
    }

    /// The app's name.
    pub fn app_name(&self) -> &str {
        self.app.name()
    }

    /// The help flag's canonical name.
    pub fn help_flag_name(&self) -> &str {
        self.app.help_flag_name()
    }

    /// The section/command path words.
    pub fn path(&self) -> &[String] {
        self.result.path()
    }

    /// The node the path ended on.
    pub fn node(&self) -> Node<'a> {
        self.result.node()
    }

    /// Every flag legal at the node.
    pub fn available(&self) -> &Available<'a> {
        self.result.available()
    }

    /// The resolved flag values.
    pub fn values(&self) -> &FlagValues {
        self.result.values()
    }

    /// Write a message to the user.
    pub fn print(&self, message: impl Into<String>) {
        self.interface.print(message.into());
    }
}

impl App {
    pub(crate) fn new(
        name: String,
        root: Section,
        global_flags: FlagMap,
        help_flag_name: String,
        help_commands: BTreeMap<String, HelpCommand>,
        config: Option<(String, ConfigReaderFactory)>,
    ) -> Self {
        Self {
            name,
            root,
            global_flags,
            help_flag_name,
            help_commands,
            config,
        }
    }

    /// The program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root section.
    pub fn root(&self) -> &Section {
        &self.root
    }

    /// The app-wide flags (including the help and config flags).
    pub fn global_flags(&self) -> &FlagMap {
        &self.global_flags
    }

    /// The help flag's canonical name.
    pub fn help_flag_name(&self) -> &str {
        &self.help_flag_name
    }

    /// The registered help command names, sorted.
    pub fn help_command_names(&self) -> impl Iterator<Item = &str> {
        self.help_commands.keys().map(String::as_str)
    }

    /// The config flag's canonical name, if one was designated.
    pub fn config_flag_name(&self) -> Option<&str> {
        self.config.as_ref().map(|(name, _)| name.as_str())
    }

    pub(crate) fn help_names(&self) -> Vec<String> {
        let mut names = vec![self.help_flag_name.clone()];

        if let Some(alias) = self
            .global_flags
            .get(&self.help_flag_name)
            .and_then(|flag| flag.alias_name())
        {
            names.push(alias.to_string());
        }

        names
    }

    /// Parse `args` (without the program name) into a resolved invocation.
    ///
    /// Flags resolve by precedence: command line, config file, environment, default.
    /// The config flag resolves first (without the config file) since its value opens the config file.
    pub fn parse<'a>(
        &'a self,
        args: &[&str],
        env: &dyn Environment,
    ) -> Result<ParseResult<'a>, ParseError> {
        let tokens = tokenize(args, &self.help_names())?;
        let tree = resolve_tree(&self.global_flags, &self.root, &tokens.path)?;
        let mut state = ParseState::new(tokens.flags);
        let reader = self.open_config(&mut state, &tree.available, env)?;

        for (name, available_flag) in &tree.available {
            state.resolve(name, available_flag.flag(), reader.as_deref(), env)?;
        }

        let unrecognized = state.unrecognized();

        if !unrecognized.is_empty() {
            return Err(ParseError::UnrecognizedFlags(unrecognized));
        }

        let help_requested = tokens.help_requested || matches!(tree.node, Node::Section(_));

        if !help_requested {
            let missing = state.missing_required(&tree.available);

            if !missing.is_empty() {
                return Err(ParseError::MissingRequired(missing));
            }
        }

        let values = state.into_values();
        let dispatch = match tree.node {
            Node::Command(command) if !help_requested => Dispatch::Command(command),
            _ => Dispatch::Help(
                values
                    .scalar::<String>(&self.help_flag_name)
                    .unwrap_or_else(|| DEFAULT_HELP_COMMAND.to_string()),
            ),
        };
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Dispatching {dispatch:?}.");
        }

        Ok(ParseResult {
            path: tokens.path,
            node: tree.node,
            available: tree.available,
            values,
            dispatch,
        })
    }

    fn open_config(
        &self,
        state: &mut ParseState,
        available: &Available<'_>,
        env: &dyn Environment,
    ) -> Result<Option<Box<dyn ConfigReader>>, ParseError> {
        let (name, factory) = match &self.config {
            Some(config) => config,
            None => return Ok(None),
        };
        let flag = match available.get(name) {
            Some(available_flag) => available_flag.flag(),
            None => return Ok(None),
        };
        state.resolve(name, flag, None, env)?;

        match state.value(name).and_then(|value| value.scalar::<PathBuf>()) {
            Some(path) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Opening config '{}'.", path.display());
                }
                Ok(Some(factory(path.as_path())?))
            }
            None => Ok(None),
        }
    }

    /// Parse `args` and dispatch: run the command's action, or the requested help command.
    ///
    /// When the first argument is the completion query marker, completion candidates are printed instead.
    /// On failure, the error is printed and `Err` carries the exit code
    /// ([`EXIT_PARSE_ERROR`] for parse errors, [`EXIT_ACTION_ERROR`] for failed actions).
    pub fn run_tokens(
        &self,
        args: &[&str],
        env: &dyn Environment,
        interface: &dyn UserInterface,
    ) -> Result<(), i32> {
        if args.first() == Some(&COMPLETION_QUERY) {
            for candidate in complete(self, &args[1..]) {
                interface.print(candidate.to_string());
            }

            return Ok(());
        }

        let result = match self.parse(args, env) {
            Ok(result) => result,
            Err(error) => {
                interface.print_error(format!("Parse error: {error}"));
                return Err(EXIT_PARSE_ERROR);
            }
        };

        let outcome: ActionResult = match result.dispatch() {
            Dispatch::Command(command) => {
                let context = Context::new(&self.name, result.path(), result.values(), interface);
                (command.action())(&context)
            }
            Dispatch::Help(choice) => match self.help_commands.get(choice) {
                Some(help) => help(&HelpContext::new(self, &result, interface)),
                None => {
                    interface.print_error(format!("Parse error: unknown help command '{choice}'"));
                    return Err(EXIT_PARSE_ERROR);
                }
            },
        };

        outcome.map_err(|error| {
            interface.print_error(format!("Error: {error}"));
            EXIT_ACTION_ERROR
        })
    }

    /// Run the app against the process arguments, environment and console.
    /// On failure, exits with the error code (via [`std::process::exit`]).
    pub fn run(&self) {
        let args: Vec<String> = env::args().skip(1).collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        if let Err(code) = self.run_tokens(&args, &ProcessEnvironment, &ConsoleInterface::default())
        {
            std::process::exit(code);
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("global_flags", &self.global_flags)
            .field("help_flag_name", &self.help_flag_name)
            .field(
                "help_commands",
                &self.help_commands.keys().collect::<Vec<&String>>(),
            )
            .field("config_flag_name", &self.config_flag_name())
            .finish()
    }
}
