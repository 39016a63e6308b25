use crate::api::Kind;
use crate::constant::FLAG_PREFIX;
use crate::matcher::Tokenizer;
use crate::parser::{resolve_tree, App, Node};

/// One completion candidate, printed as `type<TAB>name<TAB>description`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    kind: &'static str,
    name: String,
    description: String,
}

impl Candidate {
    fn new(kind: &'static str, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.kind, self.name, self.description)
    }
}

/// Candidates for the last of `words` (the partial word), given the words before it.
///
/// Malformed or unresolvable input yields no candidates.
pub(crate) fn complete(app: &App, words: &[&str]) -> Vec<Candidate> {
    let (partial, preceding) = match words.split_last() {
        Some((partial, preceding)) => (*partial, preceding),
        None => ("", words),
    };
    let help_names = app.help_names();
    let mut tokenizer = Tokenizer::new(&help_names);

    for word in preceding {
        if tokenizer.feed(word).is_err() {
            return Vec::default();
        }
    }

    let tree = match resolve_tree(app.global_flags(), app.root(), tokenizer.path()) {
        Ok(tree) => tree,
        Err(_) => return Vec::default(),
    };

    if let Some(pending) = tokenizer.pending_flag() {
        let canonical = tree
            .aliases
            .get(pending)
            .map(String::as_str)
            .unwrap_or(pending);
        let spec = match tree.available.get(canonical) {
            Some(available_flag) => available_flag.flag().value_spec(),
            None => return Vec::default(),
        };
        let mut choices: Vec<String> = spec.choices().iter().map(ToString::to_string).collect();

        if choices.is_empty() && spec.kind() == Kind::Bool {
            choices = vec!["true".to_string(), "false".to_string()];
        }

        return choices
            .into_iter()
            .filter(|choice| choice.starts_with(partial))
            .map(|choice| Candidate::new("value", choice, spec.description()))
            .collect();
    }

    let mut candidates = Vec::default();

    if partial.starts_with(FLAG_PREFIX) {
        for (name, available_flag) in &tree.available {
            let flag = available_flag.flag();

            if name.starts_with(partial) {
                candidates.push(Candidate::new("flag", name, flag.help_text()));
            }

            if let Some(alias) = flag.alias_name().filter(|alias| alias.starts_with(partial)) {
                candidates.push(Candidate::new("flag", alias, flag.help_text()));
            }
        }
    } else if let Node::Section(section) = tree.node {
        for (name, child) in section.sections() {
            if name.starts_with(partial) {
                candidates.push(Candidate::new("section", name, child.help()));
            }
        }

        for (name, command) in section.commands() {
            if name.starts_with(partial) {
                candidates.push(Candidate::new("command", name, command.help()));
            }
        }
    }

    candidates
}
