use terminal_size::{terminal_size, Width};

use crate::api::{ActionResult, Section, TypedValue};
use crate::model::FlagScope;
use crate::parser::{AvailableFlag, HelpContext, Node};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PaddingWidth(pub usize);

#[derive(Debug, Clone, Copy)]
pub(crate) struct LeftWidth(pub usize);

#[derive(Debug, Clone, Copy)]
pub(crate) struct MiddleWidth(pub usize);

#[derive(Debug, Clone, Copy)]
pub(crate) struct TotalWidth(pub usize);

/// Renders a left column and a word-wrapped middle column.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// Target 95% of the total width.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Fits three average (5 letter) words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;
const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;
const OUTLINE_INDENT: usize = 2;

impl ColumnRenderer {
    /// Produce a renderer fitting the middle column into `total_width` where possible.
    pub(crate) fn guided(
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
        total_width: TotalWidth,
    ) -> Self {
        let non_middle = left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle.0, MINIMUM_MIDDLE_WIDTH);

        if guided_middle + non_middle <= target_total_width {
            Self::new(padding, left, MiddleWidth(guided_middle))
        } else if non_middle < total_width.0 {
            let calculated_middle =
                std::cmp::max(total_width.0 - non_middle, MINIMUM_MIDDLE_WIDTH);
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} fit within the total {total_width:?}.  Selecting middle: {calculated_middle}.");
            }
            Self::new(padding, left, MiddleWidth(calculated_middle))
        } else {
            Self::new(padding, left, MiddleWidth(MINIMUM_MIDDLE_WIDTH))
        }
    }

    pub(crate) fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = format!("{:width$}", "", width = self.padding.0);
        let left_column_width = self.left.0;
        let middle_column_width = self.middle.0.saturating_sub(indent).max(2);
        let mut out: Vec<String> = chunk(middle, middle_column_width)
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let left = if i == 0 { left } else { "" };
                format!("{:indent$}{left:left_column_width$}{padding}{part}", "")
            })
            .collect();

        if out.is_empty() {
            out.push(
                format!("{:indent$}{left:left_column_width$}", "")
                    .trim_end()
                    .to_string(),
            );
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|word| !word.is_empty()) {
        let word: Vec<char> = word.chars().collect();

        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, &word);
        } else if current.chars().count() + word.len() + 1 <= width {
            current.push(' ');
            current.extend(word.iter());
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, &word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &[char]) {
    let increment = width - 1;
    let mut left = 0;
    let mut right = increment;

    while right + 1 < word.len() {
        lines.push(format!("{}-", word[left..right].iter().collect::<String>()));
        left += increment;
        right += increment;
    }

    current.extend(word[left..].iter());
}

/// Renders the built-in help formats.
#[derive(Debug)]
pub(crate) struct Printer {
    terminal_width: Option<usize>,
}

#[derive(Debug)]
struct Block {
    title: String,
    rows: Vec<(String, String)>,
}

impl Printer {
    pub(crate) fn terminal() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(terminal_width)
    }

    pub(crate) fn new(terminal_width: Option<usize>) -> Self {
        Self { terminal_width }
    }

    pub(crate) fn default_help(&self, context: &HelpContext<'_>) -> String {
        self.help(context, false)
    }

    pub(crate) fn detailed_help(&self, context: &HelpContext<'_>) -> String {
        self.help(context, true)
    }

    fn help(&self, context: &HelpContext<'_>, detailed: bool) -> String {
        let (help, long_help, footer) = match context.node() {
            Node::Section(section) => (section.help(), section.long_help_text(), section.footer_text()),
            Node::Command(command) => (command.help(), command.long_help_text(), command.footer_text()),
        };
        let mut lines = vec![usage(context), String::default()];
        lines.push(long_help.unwrap_or(help).to_string());

        let mut blocks = Vec::default();

        if let Node::Section(section) = context.node() {
            blocks.push(Block {
                title: "sections:".to_string(),
                rows: section
                    .sections()
                    .iter()
                    .map(|(name, child)| (name.clone(), child.help().to_string()))
                    .collect(),
            });
            blocks.push(Block {
                title: "commands:".to_string(),
                rows: section
                    .commands()
                    .iter()
                    .map(|(name, command)| (name.clone(), command.help().to_string()))
                    .collect(),
            });
        }

        for (title, scope) in [
            ("flags:", FlagScope::Command),
            ("inherited flags:", FlagScope::Inherited),
        ] {
            let mut rows = Vec::default();

            for (name, available_flag) in context
                .available()
                .iter()
                .filter(|(_, available_flag)| available_flag.scope() == scope)
            {
                rows.push((flag_grammar(name, available_flag), flag_summary(available_flag)));

                if detailed {
                    let value = context.values().get(name);
                    rows.extend(
                        flag_details(available_flag, value)
                            .into_iter()
                            .map(|detail| (String::default(), detail)),
                    );
                }
            }

            let title = match context.node() {
                Node::Section(_) => "flags:",
                Node::Command(_) => title,
            };
            blocks.push(Block {
                title: title.to_string(),
                rows,
            });
        }

        lines.extend(self.render_blocks(blocks));

        if let Some(footer) = footer {
            lines.push(String::default());
            lines.push(footer.to_string());
        }

        lines.join("\n")
    }

    pub(crate) fn outline_help(&self, context: &HelpContext<'_>) -> String {
        let mut rows = Vec::default();

        match context.node() {
            Node::Section(section) => outline_rows(section, 0, &mut rows),
            Node::Command(command) => {
                let name = context.path().last().cloned().unwrap_or_default();
                rows.push((name, command.help().to_string()));
            }
        }

        let mut lines = vec![std::iter::once(context.app_name().to_string())
            .chain(context.path().iter().cloned())
            .collect::<Vec<String>>()
            .join(" ")];
        lines.extend(self.render_rows(&rows));
        lines.join("\n")
    }

    fn renderer(&self, rows: &[(String, String)]) -> ColumnRenderer {
        let left = rows
            .iter()
            .map(|(left, _)| left.chars().count())
            .max()
            .unwrap_or(0);
        let middle = rows
            .iter()
            .map(|(_, middle)| middle.chars().count() + MAIN_INDENT)
            .max()
            .unwrap_or(0);
        let padding = PaddingWidth(PADDING_WIDTH);

        match self.terminal_width {
            Some(total) => {
                ColumnRenderer::guided(padding, LeftWidth(left), MiddleWidth(middle), TotalWidth(total))
            }
            None => ColumnRenderer::new(
                padding,
                LeftWidth(left),
                MiddleWidth(std::cmp::max(middle, MINIMUM_MIDDLE_WIDTH)),
            ),
        }
    }

    fn render_rows(&self, rows: &[(String, String)]) -> Vec<String> {
        let renderer = self.renderer(rows);
        rows.iter()
            .flat_map(|(left, middle)| renderer.render(MAIN_INDENT, left, middle))
            .collect()
    }

    fn render_blocks(&self, blocks: Vec<Block>) -> Vec<String> {
        let all_rows: Vec<(String, String)> = blocks
            .iter()
            .flat_map(|block| block.rows.iter().cloned())
            .collect();
        let renderer = self.renderer(&all_rows);
        let mut lines = Vec::default();

        for block in blocks.into_iter().filter(|block| !block.rows.is_empty()) {
            lines.push(String::default());
            lines.push(block.title);

            for (left, middle) in &block.rows {
                lines.extend(renderer.render(MAIN_INDENT, left, middle));
            }
        }

        lines
    }
}

fn usage(context: &HelpContext<'_>) -> String {
    let mut parts = vec!["usage:".to_string(), context.app_name().to_string()];
    parts.extend(context.path().iter().cloned());

    if let Node::Section(section) = context.node() {
        match (section.sections().is_empty(), section.commands().is_empty()) {
            (false, false) => parts.push("<section|command>".to_string()),
            (false, true) => parts.push("<section>".to_string()),
            (true, false) => parts.push("<command>".to_string()),
            (true, true) => {}
        }
    }

    parts.push("[flags]".to_string());
    parts.join(" ")
}

fn flag_grammar(name: &str, available_flag: &AvailableFlag<'_>) -> String {
    let flag = available_flag.flag();
    let description = flag.value_spec().description();

    match flag.alias_name() {
        Some(alias) => format!("{alias}, {name} <{description}>"),
        None => format!("{name} <{description}>"),
    }
}

fn flag_summary(available_flag: &AvailableFlag<'_>) -> String {
    let flag = available_flag.flag();
    let mut summary = flag.help_text().to_string();

    if let Some(default) = flag.value_spec().default() {
        summary.push_str(&format!(" (default: {})", default.to_strings().join(", ")));
    }

    if flag.is_required() {
        summary.push_str(" [required]");
    }

    summary
}

fn flag_details(available_flag: &AvailableFlag<'_>, value: Option<&TypedValue>) -> Vec<String> {
    let flag = available_flag.flag();
    let mut details = Vec::default();

    if !flag.value_spec().choices().is_empty() {
        details.push(format!(
            "choices: {}",
            flag.value_spec()
                .choices()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        ));
    }

    if !flag.env_var_names().is_empty() {
        details.push(format!("env: {}", flag.env_var_names().join(", ")));
    }

    if let Some(path) = flag.config_key() {
        details.push(format!("config: {path}"));
    }

    if let Some(sentinel) = flag.sentinel() {
        details.push(format!("unset with: {sentinel}"));
    }

    if let Some(value) = value {
        let rendered = value.get().to_strings();
        let rendered = if rendered.is_empty() {
            "<none>".to_string()
        } else {
            rendered.join(", ")
        };
        details.push(format!("value: {rendered} ({})", value.updated_by()));
    }

    details
}

fn outline_rows(section: &Section, depth: usize, rows: &mut Vec<(String, String)>) {
    let indent = depth * OUTLINE_INDENT;

    for (name, child) in section.sections() {
        rows.push((format!("{:indent$}{name}", ""), child.help().to_string()));
        outline_rows(child, depth + 1, rows);
    }

    for (name, command) in section.commands() {
        rows.push((format!("{:indent$}{name}", ""), command.help().to_string()));
    }
}

pub(crate) fn default_help(context: &HelpContext<'_>) -> ActionResult {
    context.print(Printer::terminal().default_help(context));
    Ok(())
}

pub(crate) fn detailed_help(context: &HelpContext<'_>) -> ActionResult {
    context.print(Printer::terminal().detailed_help(context));
    Ok(())
}

pub(crate) fn outline_help(context: &HelpContext<'_>) -> ActionResult {
    context.print(Printer::terminal().outline_help(context));
    Ok(())
}
