use std::collections::BTreeMap;

use crate::api::{Command, Flag, FlagMap, Section};
use crate::model::FlagScope;
use crate::parser::ParseError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The tree node a path resolved to.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// The path ended on a section (including the root).
    Section(&'a Section),
    /// The path ended on a command.
    Command(&'a Command),
}

/// A flag legal at the resolved node.
#[derive(Debug, Clone, Copy)]
pub struct AvailableFlag<'a> {
    flag: &'a Flag,
    scope: FlagScope,
}

impl<'a> AvailableFlag<'a> {
    pub(crate) fn new(flag: &'a Flag, scope: FlagScope) -> Self {
        Self { flag, scope }
    }

    /// The flag definition.
    pub fn flag(&self) -> &'a Flag {
        self.flag
    }

    /// Whether the flag is inherited or local to the command.
    pub fn scope(&self) -> FlagScope {
        self.scope
    }
}

/// Legal flags by canonical name.
pub type Available<'a> = BTreeMap<String, AvailableFlag<'a>>;

/// Canonical flag names by alias.
pub(crate) type Aliases = BTreeMap<String, String>;

#[derive(Debug)]
pub(crate) struct TreeResolution<'a> {
    pub node: Node<'a>,
    pub available: Available<'a>,
    pub aliases: Aliases,
}

/// Walk `path` from `root`, accumulating the flags legal along the way.
pub(crate) fn resolve_tree<'a>(
    global_flags: &'a FlagMap,
    root: &'a Section,
    path: &[String],
) -> Result<TreeResolution<'a>, ParseError> {
    let (available, aliases) = merge(
        &Available::default(),
        &Aliases::default(),
        global_flags,
        FlagScope::Inherited,
    )?;
    let (mut available, mut aliases) = merge(&available, &aliases, root.flags(), FlagScope::Inherited)?;
    let mut node = Node::Section(root);
    let mut command_name: Option<&str> = None;

    for word in path {
        let section = match node {
            Node::Section(section) => section,
            Node::Command(_) => {
                return Err(ParseError::TrailingPath {
                    command: command_name.unwrap_or_default().to_string(),
                    word: word.clone(),
                });
            }
        };

        if let Some(command) = section.commands().get(word) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Descending into command '{word}'.");
            }
            (available, aliases) = merge(&available, &aliases, command.flags(), FlagScope::Command)?;
            node = Node::Command(command);
            command_name.replace(word);
        } else if let Some(child) = section.sections().get(word) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Descending into section '{word}'.");
            }
            (available, aliases) = merge(&available, &aliases, child.flags(), FlagScope::Inherited)?;
            node = Node::Section(child);
        } else {
            return Err(ParseError::UnknownPath(word.clone()));
        }
    }

    Ok(TreeResolution {
        node,
        available,
        aliases,
    })
}

/// Produce new maps extending `available` and `aliases` with `flags`.
fn merge<'a>(
    available: &Available<'a>,
    aliases: &Aliases,
    flags: &'a FlagMap,
    scope: FlagScope,
) -> Result<(Available<'a>, Aliases), ParseError> {
    let mut available = available.clone();
    let mut aliases = aliases.clone();

    for (name, flag) in flags {
        if available.contains_key(name) || aliases.contains_key(name) {
            return Err(ParseError::FlagCollision(name.clone()));
        }

        if let Some(alias) = flag.alias_name() {
            if available.contains_key(alias) || aliases.contains_key(alias) || alias == name {
                return Err(ParseError::FlagCollision(alias.to_string()));
            }

            aliases.insert(alias.to_string(), name.clone());
        }

        available.insert(name.clone(), AvailableFlag::new(flag, scope));
    }

    Ok((available, aliases))
}
