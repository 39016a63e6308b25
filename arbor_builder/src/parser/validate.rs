use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;

use crate::api::{FlagMap, Kind, Section, Shape};
use crate::constant::FLAG_PREFIX;
use crate::parser::App;

/// A structural defect in the app definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The designated help flag is not a global flag.
    #[error("help flag '{0}' is not registered")]
    MissingHelpFlag(String),

    /// The help flag is not a string scalar with a default among its choices.
    #[error("help flag '{0}' must be a string scalar whose default is one of its choices")]
    HelpFlagShape(String),

    /// The help flag's choices differ from the registered help commands.
    #[error("help flag '{name}' choices [{}] must equal the help commands [{}]", .actual.join(", "), .expected.join(", "))]
    HelpChoices {
        /// The help flag.
        name: String,
        /// The registered help commands.
        expected: Vec<String>,
        /// The help flag's choices.
        actual: Vec<String>,
    },

    /// The designated config flag is not a global flag.
    #[error("config flag '{0}' is not registered")]
    MissingConfigFlag(String),

    /// The config flag is not a path scalar.
    #[error("config flag '{0}' must be a path scalar")]
    ConfigFlagShape(String),

    /// A section or command name starts with the flag prefix.
    #[error("'{name}' under '{path}' must not start with '-'")]
    NameStartsWithPrefix {
        /// The parent section.
        path: String,
        /// The offending name.
        name: String,
    },

    /// A section without children.
    #[error("section '{path}' must have at least one section or command")]
    LeafSection {
        /// The section.
        path: String,
    },

    /// A name used for both a child section and a child command.
    #[error("'{name}' under '{path}' names both a section and a command")]
    NameCollision {
        /// The parent section.
        path: String,
        /// The offending name.
        name: String,
    },

    /// A flag name or alias that does not start with the flag prefix.
    #[error("flag '{name}' under '{path}' must start with '-'")]
    FlagPrefix {
        /// Where the flag is declared.
        path: String,
        /// The offending name or alias.
        name: String,
    },

    /// A flag name or alias declared twice along one path.
    #[error("flag '{name}' under '{path}' is declared more than once")]
    FlagCollision {
        /// Where the duplicate is declared.
        path: String,
        /// The offending name or alias.
        name: String,
    },
}

/// Check the app's help flag, config flag and tree.
pub(crate) fn validate(app: &App) -> Result<(), ValidationError> {
    validate_help_flag(app)?;
    validate_config_flag(app)?;

    let mut queue: VecDeque<(Vec<&str>, &Section, BTreeSet<String>)> = VecDeque::default();
    let global = declare(&BTreeSet::default(), app.global_flags(), app.name())?;
    queue.push_back((vec![app.name()], app.root(), global));

    while let Some((path, section, inherited)) = queue.pop_front() {
        let location = path.join(" ");
        let inherited = declare(&inherited, section.flags(), &location)?;

        if section.sections().is_empty() && section.commands().is_empty() {
            return Err(ValidationError::LeafSection { path: location });
        }

        for name in section.sections().keys().chain(section.commands().keys()) {
            if name.starts_with(FLAG_PREFIX) {
                return Err(ValidationError::NameStartsWithPrefix {
                    path: location,
                    name: name.clone(),
                });
            }
        }

        for (name, command) in section.commands() {
            if section.sections().contains_key(name) {
                return Err(ValidationError::NameCollision {
                    path: location,
                    name: name.clone(),
                });
            }

            declare(&inherited, command.flags(), &format!("{location} {name}"))?;
        }

        for (name, child) in section.sections() {
            let mut child_path = path.clone();
            child_path.push(name);
            queue.push_back((child_path, child, inherited.clone()));
        }
    }

    Ok(())
}

fn validate_help_flag(app: &App) -> Result<(), ValidationError> {
    let name = app.help_flag_name();
    let flag = app
        .global_flags()
        .get(name)
        .ok_or_else(|| ValidationError::MissingHelpFlag(name.to_string()))?;
    let spec = flag.value_spec();
    let default_in_choices = match spec.default() {
        Some(default) => default
            .to_strings()
            .iter()
            .all(|value| spec.choices().iter().any(|choice| &choice.to_string() == value)),
        None => false,
    };

    if spec.kind() != Kind::Str || spec.shape() != Shape::Scalar || !default_in_choices {
        return Err(ValidationError::HelpFlagShape(name.to_string()));
    }

    let expected: Vec<String> = app.help_command_names().map(ToString::to_string).collect();
    let mut actual: Vec<String> = spec.choices().iter().map(ToString::to_string).collect();
    actual.sort();
    actual.dedup();

    if expected != actual {
        return Err(ValidationError::HelpChoices {
            name: name.to_string(),
            expected,
            actual,
        });
    }

    Ok(())
}

fn validate_config_flag(app: &App) -> Result<(), ValidationError> {
    if let Some(name) = app.config_flag_name() {
        let flag = app
            .global_flags()
            .get(name)
            .ok_or_else(|| ValidationError::MissingConfigFlag(name.to_string()))?;
        let spec = flag.value_spec();

        if spec.kind() != Kind::Path || spec.shape() != Shape::Scalar {
            return Err(ValidationError::ConfigFlagShape(name.to_string()));
        }
    }

    Ok(())
}

/// Extend the declared names and aliases with `flags`, checking prefix and uniqueness.
fn declare(
    declared: &BTreeSet<String>,
    flags: &FlagMap,
    path: &str,
) -> Result<BTreeSet<String>, ValidationError> {
    let mut declared = declared.clone();

    for (name, flag) in flags {
        for identifier in std::iter::once(name.as_str()).chain(flag.alias_name()) {
            if !identifier.starts_with(FLAG_PREFIX) {
                return Err(ValidationError::FlagPrefix {
                    path: path.to_string(),
                    name: identifier.to_string(),
                });
            }

            if !declared.insert(identifier.to_string()) {
                return Err(ValidationError::FlagCollision {
                    path: path.to_string(),
                    name: identifier.to_string(),
                });
            }
        }
    }

    Ok(declared)
}
