use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;

use crate::api::{Flag, FlagMap, Scalar};
use crate::config::ConfigReaderFactory;
use crate::constant::*;
use crate::parser::{
    default_help, detailed_help, outline_help, validate, App, FlagValues, HelpContext,
    UserInterface, ValidationError,
};

/// The error an [`Action`] may fail with.
pub type ActionError = Box<dyn Error + Send + Sync>;

/// The outcome of an [`Action`].
pub type ActionResult = Result<(), ActionError>;

/// The function a [`Command`] executes once its flags are resolved.
pub type Action = Arc<dyn Fn(&Context<'_>) -> ActionResult + Send + Sync>;

/// The function rendering one help command (selected via the help flag's value).
pub type HelpCommand = Arc<dyn Fn(&HelpContext<'_>) -> ActionResult + Send + Sync>;

/// What an [`Action`] sees of its invocation.
pub struct Context<'a> {
    app_name: &'a str,
    path: &'a [String],
    flags: &'a FlagValues,
    interface: &'a dyn UserInterface,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        app_name: &'a str,
        path: &'a [String],
        flags: &'a FlagValues,
        interface: &'a dyn UserInterface,
    ) -> Self {
        Self {
            app_name,
            path,
            flags,
            interface,
        }
    }

    /// The program name.
    pub fn app_name(&self) -> &str {
        self.app_name
    }

    /// The section/command words that led to this command.
    pub fn path(&self) -> &[String] {
        self.path
    }

    /// The resolved flag values.
    pub fn flags(&self) -> &FlagValues {
        self.flags
    }

    /// Write a message to the user.
    pub fn print(&self, message: impl Into<String>) {
        self.interface.print(message.into());
    }

    /// Write an error message to the user.
    pub fn print_error(&self, message: impl Into<String>) {
        self.interface.print_error(message.into());
    }
}

/// A leaf of the command tree, bound to an [`Action`] and its local flags.
///
/// ### Example
/// ```
/// # use arbor_builder as arbor;
/// use arbor::{Command, Flag, Scalar};
///
/// let command = Command::new("Say hello.", |ctx| {
///     let name: String = ctx.flags().scalar("--name").unwrap_or_default();
///     ctx.print(format!("hello {name}"));
///     Ok(())
/// })
/// .flag("--name", Flag::new("Who to greet.", Scalar::<String>::new()));
///
/// assert!(command.flags().contains_key("--name"));
/// ```
#[derive(Clone)]
pub struct Command {
    help: String,
    long_help: Option<String>,
    footer: Option<String>,
    action: Action,
    flags: FlagMap,
}

impl Command {
    /// Create a command with short help text and its action.
    pub fn new(
        help: impl Into<String>,
        action: impl Fn(&Context<'_>) -> ActionResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            help: help.into(),
            long_help: None,
            footer: None,
            action: Arc::new(action),
            flags: FlagMap::default(),
        }
    }

    /// Document the command in full sentence/paragraph format.
    /// If repeated, only the final value applies.
    pub fn long_help(mut self, long_help: impl Into<String>) -> Self {
        self.long_help.replace(long_help.into());
        self
    }

    /// Text printed after the command's help.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer.replace(footer.into());
        self
    }

    /// Add a command-local flag.
    ///
    /// Panics if `name` is already registered on this command.
    pub fn flag(mut self, name: impl Into<String>, flag: Flag) -> Self {
        insert_unique(&mut self.flags, name.into(), flag, "flag");
        self
    }

    /// Short help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Long help text, if any.
    pub fn long_help_text(&self) -> Option<&str> {
        self.long_help.as_deref()
    }

    /// Footer text, if any.
    pub fn footer_text(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// Flags declared at this level.
    pub fn flags(&self) -> &FlagMap {
        &self.flags
    }

    pub(crate) fn action(&self) -> &Action {
        &self.action
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("help", &self.help)
            .field("long_help", &self.long_help)
            .field("footer", &self.footer)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// A namespace of the command tree.
///
/// Its flags are inherited by every descendant section and command.
#[derive(Debug, Clone)]
pub struct Section {
    help: String,
    long_help: Option<String>,
    footer: Option<String>,
    flags: FlagMap,
    sections: BTreeMap<String, Section>,
    commands: BTreeMap<String, Command>,
}

impl Section {
    /// Create an empty section with short help text.
    pub fn new(help: impl Into<String>) -> Self {
        Self {
            help: help.into(),
            long_help: None,
            footer: None,
            flags: FlagMap::default(),
            sections: BTreeMap::default(),
            commands: BTreeMap::default(),
        }
    }

    /// Document the section in full sentence/paragraph format.
    /// If repeated, only the final value applies.
    pub fn long_help(mut self, long_help: impl Into<String>) -> Self {
        self.long_help.replace(long_help.into());
        self
    }

    /// Text printed after the section's help.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer.replace(footer.into());
        self
    }

    /// Add a flag inherited by every descendant.
    ///
    /// Panics if `name` is already registered on this section.
    pub fn flag(mut self, name: impl Into<String>, flag: Flag) -> Self {
        insert_unique(&mut self.flags, name.into(), flag, "flag");
        self
    }

    /// Add a child section.
    ///
    /// Panics if a child section `name` is already registered.
    pub fn section(mut self, name: impl Into<String>, section: Section) -> Self {
        insert_unique(&mut self.sections, name.into(), section, "section");
        self
    }

    /// Add a child command.
    ///
    /// Panics if a child command `name` is already registered.
    pub fn command(mut self, name: impl Into<String>, command: Command) -> Self {
        insert_unique(&mut self.commands, name.into(), command, "command");
        self
    }

    /// Short help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Long help text, if any.
    pub fn long_help_text(&self) -> Option<&str> {
        self.long_help.as_deref()
    }

    /// Footer text, if any.
    pub fn footer_text(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// Flags declared at this level.
    pub fn flags(&self) -> &FlagMap {
        &self.flags
    }

    /// Child sections by name.
    pub fn sections(&self) -> &BTreeMap<String, Section> {
        &self.sections
    }

    /// Child commands by name.
    pub fn commands(&self) -> &BTreeMap<String, Command> {
        &self.commands
    }
}

fn insert_unique<T>(map: &mut BTreeMap<String, T>, name: String, item: T, label: &str) {
    if map.contains_key(&name) {
        panic!("cannot register {label} '{name}' more than once");
    }

    map.insert(name, item);
}

/// The application builder.
///
/// ### Example
/// ```
/// # use arbor_builder as arbor;
/// use arbor::{AppBuilder, Command, Flag, Scalar, Section};
/// use std::collections::HashMap;
///
/// let app = AppBuilder::new(
///     "program",
///     Section::new("My program.").command(
///         "hello",
///         Command::new("Say hello.", |ctx| {
///             ctx.print("hello");
///             Ok(())
///         })
///         .flag("--loud", Flag::new("Shout.", Scalar::<bool>::new())),
///     ),
/// )
/// .build_app()
/// .unwrap();
///
/// let result = app.parse(&["hello", "--loud", "true"], &HashMap::<String, String>::new()).unwrap();
/// assert_eq!(result.values().scalar::<bool>("--loud"), Some(true));
/// ```
pub struct AppBuilder {
    name: String,
    version: Option<String>,
    root: Section,
    global_flags: FlagMap,
    help_flag: Option<(String, Flag)>,
    help_commands: BTreeMap<String, HelpCommand>,
    config: Option<(String, ConfigReaderFactory)>,
    validate: bool,
}

impl AppBuilder {
    /// Create an app over the `root` section, with the built-in help commands.
    pub fn new(name: impl Into<String>, root: Section) -> Self {
        let mut help_commands: BTreeMap<String, HelpCommand> = BTreeMap::default();
        help_commands.insert(DEFAULT_HELP_COMMAND.to_string(), Arc::new(default_help));
        help_commands.insert(DETAILED_HELP_COMMAND.to_string(), Arc::new(detailed_help));
        help_commands.insert(OUTLINE_HELP_COMMAND.to_string(), Arc::new(outline_help));

        Self {
            name: name.into(),
            version: None,
            root,
            global_flags: FlagMap::default(),
            help_flag: None,
            help_commands,
            config: None,
            validate: true,
        }
    }

    /// Add a root `version` command printing `version`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    /// Add a flag available everywhere in the tree.
    ///
    /// Panics if `name` is already a global flag.
    pub fn global_flag(mut self, name: impl Into<String>, flag: Flag) -> Self {
        insert_unique(&mut self.global_flags, name.into(), flag, "flag");
        self
    }

    /// Replace the default help flag (`--help`/`-h`).
    /// The flag must be a string scalar whose default is one of its choices, and whose choices are the help command names.
    pub fn help_flag(mut self, name: impl Into<String>, flag: Flag) -> Self {
        self.help_flag.replace((name.into(), flag));
        self
    }

    /// Register (or replace) a help command selectable via the help flag's value.
    pub fn help_command(
        mut self,
        name: impl Into<String>,
        help: impl Fn(&HelpContext<'_>) -> ActionResult + Send + Sync + 'static,
    ) -> Self {
        self.help_commands.insert(name.into(), Arc::new(help));
        self
    }

    /// Designate a global flag whose value is the config file opened via `factory`.
    /// The flag must be a path scalar.
    pub fn config_flag(
        mut self,
        name: impl Into<String>,
        flag: Flag,
        factory: ConfigReaderFactory,
    ) -> Self {
        let name = name.into();
        insert_unique(&mut self.global_flags, name.clone(), flag, "flag");
        self.config.replace((name, factory));
        self
    }

    /// Skip structural validation when building.
    pub fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Build the app as a Result.
    /// This finalizes the configuration and runs structural validation (unless skipped).
    pub fn build_app(self) -> Result<App, ValidationError> {
        let AppBuilder {
            name,
            version,
            mut root,
            mut global_flags,
            help_flag,
            help_commands,
            config,
            validate: should_validate,
        } = self;

        let (help_name, help_flag) = help_flag.unwrap_or_else(|| {
            let choices = help_commands.keys().cloned().collect::<Vec<String>>();
            let flag = Flag::new(
                "Print help; the value selects the help format.",
                Scalar::<String>::new()
                    .default_value(DEFAULT_HELP_COMMAND.to_string())
                    .choices(choices),
            )
            .alias(DEFAULT_HELP_ALIAS);
            (DEFAULT_HELP_NAME.to_string(), flag)
        });
        insert_unique(&mut global_flags, help_name.clone(), help_flag, "flag");

        if let Some(version) = version {
            if !root.commands().contains_key(VERSION_COMMAND) {
                root = root.command(
                    VERSION_COMMAND,
                    Command::new("Print the version.", move |ctx| {
                        ctx.print(version.clone());
                        Ok(())
                    }),
                );
            }
        }

        let app = App::new(name, root, global_flags, help_name, help_commands, config);

        if should_validate {
            validate(&app)?;
        }

        Ok(app)
    }

    /// Build the app.
    /// If validation fails, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> App {
        match self.build_app() {
            Ok(app) => app,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Slice;
    use crate::parser::Node;
    use std::collections::HashMap;

    fn noop() -> Command {
        Command::new("noop", |_| Ok(()))
    }

    #[test]
    fn section_builder() {
        // Setup
        let section = Section::new("root")
            .long_help("long")
            .footer("foot")
            .flag("--a", Flag::new("a", Scalar::<bool>::new()))
            .section("s", Section::new("s").command("c", noop()))
            .command("c", noop());

        // Verify
        assert_eq!(section.help(), "root");
        assert_eq!(section.long_help_text(), Some("long"));
        assert_eq!(section.footer_text(), Some("foot"));
        assert!(section.flags().contains_key("--a"));
        assert!(section.sections().contains_key("s"));
        assert!(section.commands().contains_key("c"));
    }

    #[test]
    #[should_panic(expected = "cannot register command 'c' more than once")]
    fn section_duplicate_command() {
        let _ = Section::new("root").command("c", noop()).command("c", noop());
    }

    #[test]
    #[should_panic(expected = "cannot register flag '--a' more than once")]
    fn command_duplicate_flag() {
        let _ = noop()
            .flag("--a", Flag::new("a", Scalar::<bool>::new()))
            .flag("--a", Flag::new("a", Scalar::<bool>::new()));
    }

    #[test]
    #[should_panic(expected = "cannot register section 's' more than once")]
    fn section_duplicate_section() {
        let _ = Section::new("root")
            .section("s", Section::new("s"))
            .section("s", Section::new("s"));
    }

    #[test]
    fn build_default_help_flag() {
        // Execute
        let app = AppBuilder::new("program", Section::new("root").command("c", noop()))
            .build_app()
            .unwrap();

        // Verify
        let help = app.global_flags().get(DEFAULT_HELP_NAME).unwrap();
        assert_eq!(help.alias_name(), Some(DEFAULT_HELP_ALIAS));
        let mut value = help.empty_value();
        value
            .replace_from_default(crate::model::UpdatedBy::Default)
            .unwrap();
        assert_eq!(value.scalar::<String>(), Some(DEFAULT_HELP_COMMAND.to_string()));
        assert_eq!(value.choices(), vec!["default", "detailed", "outline"]);
    }

    #[test]
    fn build_version() {
        // Setup
        let app = AppBuilder::new("program", Section::new("root").command("c", noop()))
            .version("1.2.3")
            .build_app()
            .unwrap();

        // Execute
        let result = app.parse(&["version"], &HashMap::<String, String>::new()).unwrap();

        // Verify
        assert_matches!(result.node(), Node::Command(_));
        assert_eq!(result.path(), &["version".to_string()]);
    }

    #[test]
    fn build_version_keeps_existing() {
        let app = AppBuilder::new(
            "program",
            Section::new("root").command("version", Command::new("mine", |_| Ok(()))),
        )
        .version("1.2.3")
        .build_app()
        .unwrap();

        assert_eq!(
            app.root().commands().get("version").unwrap().help(),
            "mine"
        );
    }

    #[test]
    fn build_invalid() {
        let result = AppBuilder::new("program", Section::new("root"))
            .global_flag("--x", Flag::new("x", Slice::<String>::new()))
            .build_app();
        assert_matches!(result, Err(ValidationError::LeafSection { .. }));
    }

    #[test]
    fn build_skip_validation() {
        let result = AppBuilder::new("program", Section::new("root"))
            .skip_validation()
            .build_app();
        assert_matches!(result, Ok(_));
    }
}
