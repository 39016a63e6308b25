use arbor::*;
use assert_matches::assert_matches;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct Captured {
    messages: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl UserInterface for Captured {
    fn print(&self, message: String) {
        self.messages.borrow_mut().push(message);
    }

    fn print_error(&self, message: String) {
        self.errors.borrow_mut().push(message);
    }
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("grabbit.json");
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn grabbit(seen: Arc<Mutex<Vec<String>>>) -> App {
    AppBuilder::new(
        "grabbit",
        Section::new("Grab images from subreddits.")
            .flag(
                "--verbose",
                Flag::new("Verbose output.", Scalar::<bool>::new().default_value(false))
                    .alias("-v"),
            )
            .command(
                "download",
                Command::new("Download the top posts.", move |ctx| {
                    let subreddits = ctx.flags().slice::<String>("--subreddits").unwrap_or_default();
                    seen.lock().unwrap().extend(subreddits);
                    Ok(())
                })
                .flag(
                    "--subreddits",
                    Flag::new("Subreddits.", Slice::<String>::new())
                        .alias("-s")
                        .config_path("subreddits[].name")
                        .env_vars(["GRABBIT_SUBREDDITS"])
                        .unset_sentinel("-")
                        .required(),
                )
                .flag(
                    "--limit",
                    Flag::new("Posts per subreddit.", Scalar::<i64>::new().default_value(10))
                        .config_path("limit")
                        .env_vars(["GRABBIT_LIMIT", "LIMIT"]),
                ),
            )
            .section(
                "cache",
                Section::new("Manage the cache.").command(
                    "clear",
                    Command::new("Clear the cache.", |ctx| {
                        ctx.print("cleared");
                        Ok(())
                    }),
                ),
            ),
    )
    .version("1.2.3")
    .config_flag(
        "--config",
        Flag::new("Configuration file.", Scalar::<PathBuf>::new()).env_vars(["GRABBIT_CONFIG"]),
        JsonConfigReader::factory(),
    )
    .build_app()
    .unwrap()
}

fn app() -> App {
    grabbit(Arc::new(Mutex::new(Vec::default())))
}

#[test]
fn cli_beats_config_env_and_default() {
    // Setup
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"limit": 5, "subreddits": [{"name": "rust"}]}"#);
    let app = app();
    let env = env(&[("GRABBIT_LIMIT", "7")]);

    // Execute
    let result = app
        .parse(&["download", "--config", &config, "--limit", "3"], &env)
        .unwrap();

    // Verify
    assert_eq!(result.values().scalar::<i64>("--limit"), Some(3));
    assert_eq!(result.values().updated_by("--limit"), UpdatedBy::Flag);
    assert_eq!(result.values().slice::<String>("--subreddits"), Some(vec!["rust".to_string()]));
    assert_eq!(result.values().updated_by("--subreddits"), UpdatedBy::Config);
}

#[test]
fn config_beats_env() {
    // Setup
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"limit": 5, "subreddits": [{"name": "rust"}]}"#);
    let app = app();
    let env = env(&[("GRABBIT_CONFIG", &config), ("LIMIT", "7")]);

    // Execute
    let result = app.parse(&["download"], &env).unwrap();

    // Verify
    assert_eq!(result.values().scalar::<i64>("--limit"), Some(5));
    assert_eq!(result.values().updated_by("--limit"), UpdatedBy::Config);
    assert_eq!(result.values().updated_by("--config"), UpdatedBy::EnvVar);
}

#[test]
fn first_env_var_wins_then_default() {
    // Setup
    let app = app();

    // Execute
    let from_env = app
        .parse(
            &["download", "-s", "rust"],
            &env(&[("GRABBIT_LIMIT", "4"), ("LIMIT", "8")]),
        )
        .unwrap();
    let from_default = app
        .parse(&["download", "-s", "rust"], &HashMap::<String, String>::new())
        .unwrap();

    // Verify
    assert_eq!(from_env.values().scalar::<i64>("--limit"), Some(4));
    assert_eq!(from_default.values().scalar::<i64>("--limit"), Some(10));
    assert_eq!(from_default.values().updated_by("--limit"), UpdatedBy::Default);
}

#[test]
fn aggregated_config_path() {
    // Setup
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"{"subreddits": [{"name": "rust"}, {"other": 1}, {"name": "golang"}]}"#,
    );
    let app = app();

    // Execute
    let result = app
        .parse(&["download", "--config", &config], &HashMap::<String, String>::new())
        .unwrap();

    // Verify
    assert_eq!(
        result.values().slice::<String>("--subreddits"),
        Some(vec!["rust".to_string(), "golang".to_string()])
    );
}

#[test]
fn aggregated_config_path_requires_slice() {
    // Setup
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"items": [{"n": 1}, {"n": 2}]}"#);
    let app = AppBuilder::new(
        "program",
        Section::new("root").command(
            "c",
            Command::new("c", |_| Ok(())).flag(
                "--n",
                Flag::new("n", Scalar::<i64>::new()).config_path("items[].n"),
            ),
        ),
    )
    .config_flag(
        "--config",
        Flag::new("config", Scalar::<PathBuf>::new()),
        JsonConfigReader::factory(),
    )
    .build_app()
    .unwrap();

    // Execute
    let error = app
        .parse(&["c", "--config", &config], &HashMap::<String, String>::new())
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::AggregatedNonSlice { name, path } => {
        assert_eq!(name, "--n");
        assert_eq!(path, "items[].n");
    });
}

#[test]
fn scalar_repeated_on_cli() {
    // Setup
    let app = app();

    // Execute
    let error = app
        .parse(
            &["download", "-s", "rust", "--limit", "1", "--limit", "2"],
            &HashMap::<String, String>::new(),
        )
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::MultipleScalar(name) => {
        assert_eq!(name, "--limit");
    });
}

#[test]
fn oversized_duration_is_invalid_value() {
    // Setup
    let app = AppBuilder::new(
        "program",
        Section::new("root").command(
            "c",
            Command::new("c", |_| Ok(()))
                .flag("--d", Flag::new("d", Scalar::<Duration>::new())),
        ),
    )
    .build_app()
    .unwrap();

    // Execute
    let error = app
        .parse(
            &["c", "--d", "94522879700260684295381835.9h"],
            &HashMap::<String, String>::new(),
        )
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::InvalidValue { name, updated_by, source } => {
        assert_eq!(name, "--d");
        assert_eq!(updated_by, UpdatedBy::Flag);
        assert_matches!(source, ValueError::Conversion { .. });
    });
}

#[test]
fn slice_accumulates_across_name_and_alias() {
    // Setup
    let app = app();

    // Execute
    let result = app
        .parse(
            &["download", "-s", "a", "--subreddits", "b", "-s", "c"],
            &HashMap::<String, String>::new(),
        )
        .unwrap();

    // Verify
    assert_eq!(
        result.values().slice::<String>("--subreddits"),
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
}

#[test]
fn sentinel_clears_earlier_values() {
    // Setup
    let app = app();

    // Execute
    let result = app
        .parse(
            &["download", "-s", "a", "-s", "b", "-s", "-", "-s", "c", "-s", "d"],
            &HashMap::<String, String>::new(),
        )
        .unwrap();

    // Verify
    assert_eq!(
        result.values().slice::<String>("--subreddits"),
        Some(vec!["c".to_string(), "d".to_string()])
    );
}

#[test]
fn sentinel_blocks_lower_sources() {
    // Setup
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"subreddits": [{"name": "rust"}]}"#);
    let app = app();
    let env = env(&[("GRABBIT_SUBREDDITS", "golang")]);

    // Execute
    let error = app
        .parse(&["download", "--config", &config, "-s", "a", "-s", "-"], &env)
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::MissingRequired(names) => {
        assert_eq!(names, vec!["--subreddits".to_string()]);
    });
}

#[test]
fn required_satisfied_by_aggregated_config() {
    // Setup
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"subreddits": [{"name": "rust"}]}"#);
    let app = app();

    // Execute
    let result = app.parse(&["download", "--config", &config], &HashMap::<String, String>::new());

    // Verify
    assert_matches!(result, Ok(_));
}

#[test]
fn empty_aggregation_leaves_required_missing() {
    // Setup
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"subreddits": []}"#);
    let app = app();

    // Execute
    let error = app
        .parse(&["download", "--config", &config], &HashMap::<String, String>::new())
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::MissingRequired(_));
}

#[test]
fn inherited_flags_after_command() {
    // Setup
    let app = app();

    // Execute
    let result = app
        .parse(&["download", "-v", "true", "-s", "rust"], &HashMap::<String, String>::new())
        .unwrap();

    // Verify
    assert_eq!(result.values().scalar::<bool>("--verbose"), Some(true));
    assert_matches!(result.dispatch(), Dispatch::Command(_));
}

#[test]
fn flag_from_another_branch_is_unrecognized() {
    // Setup
    let app = app();

    // Execute
    let error = app
        .parse(&["cache", "clear", "--limit", "3"], &HashMap::<String, String>::new())
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::UnrecognizedFlags(names) => {
        assert_eq!(names, vec!["--limit".to_string()]);
    });
}

#[test]
fn unknown_and_trailing_path_words() {
    // Setup
    let app = app();
    let env = HashMap::<String, String>::new();

    // Execute
    let unknown = app.parse(&["cache", "prune"], &env).unwrap_err();
    let trailing = app.parse(&["download", "extra", "-s", "rust"], &env).unwrap_err();

    // Verify
    assert_matches!(unknown, ParseError::UnknownPath(word) => {
        assert_eq!(word, "prune");
    });
    assert_matches!(trailing, ParseError::TrailingPath { command, word } => {
        assert_eq!(command, "download");
        assert_eq!(word, "extra");
    });
}

#[test]
fn parsing_is_repeatable() {
    // Setup
    let app = app();
    let env = env(&[("GRABBIT_LIMIT", "4")]);
    let args = ["download", "-s", "a", "-s", "b"];

    // Execute
    let first = app.parse(&args, &env).unwrap();
    let second = app.parse(&args, &env).unwrap();

    // Verify
    assert_eq!(first.path(), second.path());
    assert_eq!(
        first.values().slice::<String>("--subreddits"),
        second.values().slice::<String>("--subreddits")
    );
    assert_eq!(
        first.values().scalar::<i64>("--limit"),
        second.values().scalar::<i64>("--limit")
    );
}

#[test]
fn help_skips_required_flags() {
    // Setup
    let app = app();

    // Execute
    let result = app
        .parse(&["download", "--help"], &HashMap::<String, String>::new())
        .unwrap();

    // Verify
    assert_matches!(result.dispatch(), Dispatch::Help(choice) => {
        assert_eq!(choice, DEFAULT_HELP_COMMAND);
    });
}

#[test]
fn help_value_overflow() {
    // Setup
    let app = app();

    // Execute
    let error = app
        .parse(&["-h", "detailed", "download"], &HashMap::<String, String>::new())
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::Tokenize(TokenizeError::HelpOverflow(word)) => {
        assert_eq!(word, "download");
    });
}

#[test]
fn run_tokens_dispatches_action() {
    // Setup
    let seen = Arc::new(Mutex::new(Vec::default()));
    let app = grabbit(seen.clone());
    let interface = Captured::default();

    // Execute
    let outcome = app.run_tokens(
        &["download", "-s", "rust"],
        &HashMap::<String, String>::new(),
        &interface,
    );

    // Verify
    assert_eq!(outcome, Ok(()));
    assert_eq!(*seen.lock().unwrap(), vec!["rust".to_string()]);
}

#[test]
fn run_tokens_parse_error_exit_code() {
    // Setup
    let app = app();
    let interface = Captured::default();

    // Execute
    let outcome = app.run_tokens(&["download"], &HashMap::<String, String>::new(), &interface);

    // Verify
    assert_eq!(outcome, Err(EXIT_PARSE_ERROR));
    let errors = interface.errors.borrow();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Parse error: "), "{}", errors[0]);
    assert!(errors[0].contains("--subreddits"), "{}", errors[0]);
}

#[test]
fn run_tokens_action_error_exit_code() {
    // Setup
    let app = AppBuilder::new(
        "program",
        Section::new("root").command("fail", Command::new("Fails.", |_| Err("boom".into()))),
    )
    .build_app()
    .unwrap();
    let interface = Captured::default();

    // Execute
    let outcome = app.run_tokens(&["fail"], &HashMap::<String, String>::new(), &interface);

    // Verify
    assert_eq!(outcome, Err(EXIT_ACTION_ERROR));
    assert_eq!(*interface.errors.borrow(), vec!["Error: boom".to_string()]);
}

#[test]
fn run_tokens_help_and_version() {
    // Setup
    let app = app();
    let env = HashMap::<String, String>::new();
    let help = Captured::default();
    let version = Captured::default();

    // Execute
    let help_outcome = app.run_tokens(&["cache"], &env, &help);
    let version_outcome = app.run_tokens(&["version"], &env, &version);

    // Verify
    assert_eq!(help_outcome, Ok(()));
    assert!(help.messages.borrow().join("\n").contains("clear"));
    assert_eq!(version_outcome, Ok(()));
    assert_eq!(*version.messages.borrow(), vec!["1.2.3".to_string()]);
}

#[test]
fn run_tokens_completion() {
    // Setup
    let app = app();
    let interface = Captured::default();

    // Execute
    let outcome = app.run_tokens(
        &[COMPLETION_QUERY, "download", "--verbose", ""],
        &HashMap::<String, String>::new(),
        &interface,
    );

    // Verify
    assert_eq!(outcome, Ok(()));
    let names: Vec<String> = interface
        .messages
        .borrow()
        .iter()
        .map(|line| line.split('\t').nth(1).unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["true".to_string(), "false".to_string()]);
}

#[test]
fn validation_rejects_collisions() {
    // Setup
    let builder = AppBuilder::new(
        "program",
        Section::new("root")
            .flag("--verbose", Flag::new("v", Scalar::<bool>::new()).alias("-v"))
            .command(
                "c",
                Command::new("c", |_| Ok(())).flag(
                    "--version-check",
                    Flag::new("x", Scalar::<bool>::new()).alias("-v"),
                ),
            ),
    );

    // Execute
    let error = builder.build_app().unwrap_err();

    // Verify
    assert_matches!(error, ValidationError::FlagCollision { name, .. } => {
        assert_eq!(name, "-v");
    });
}

#[test]
fn missing_required_flags_reported_together() {
    // Setup
    let app = AppBuilder::new(
        "program",
        Section::new("root").command(
            "c",
            Command::new("c", |_| Ok(()))
                .flag("--a", Flag::new("a", Scalar::<String>::new()).required())
                .flag("--b", Flag::new("b", Slice::<i64>::new()).required())
                .flag("--c", Flag::new("c", Scalar::<String>::new())),
        ),
    )
    .build_app()
    .unwrap();

    // Execute
    let error = app
        .parse(&["c"], &HashMap::<String, String>::new())
        .unwrap_err();

    // Verify
    assert_matches!(error, ParseError::MissingRequired(names) => {
        assert_eq!(names, vec!["--a".to_string(), "--b".to_string()]);
    });
}

#[test]
fn ambiguous_tree_rejected() {
    // Setup
    let colliding = AppBuilder::new(
        "program",
        Section::new("root")
            .command("x", Command::new("x", |_| Ok(())))
            .section("x", Section::new("x").command("y", Command::new("y", |_| Ok(())))),
    );
    let leaf = AppBuilder::new(
        "program",
        Section::new("root")
            .command("x", Command::new("x", |_| Ok(())))
            .section("empty", Section::new("Nothing here.")),
    );

    // Execute
    let colliding = colliding.build_app().unwrap_err();
    let leaf = leaf.build_app().unwrap_err();

    // Verify
    assert_eq!(
        colliding,
        ValidationError::NameCollision {
            path: "program".to_string(),
            name: "x".to_string(),
        }
    );
    assert_eq!(
        leaf,
        ValidationError::LeafSection {
            path: "program empty".to_string(),
        }
    );
}

#[test]
fn sentinel_mid_command_line_keeps_later_values() {
    // Setup
    let seen = Arc::new(Mutex::new(Vec::default()));
    let app = grabbit(seen.clone());
    let interface = Captured::default();

    // Execute
    let outcome = app.run_tokens(
        &["download", "-s", "rust", "-s", "-", "-s", "programming"],
        &HashMap::<String, String>::new(),
        &interface,
    );

    // Verify
    assert_eq!(outcome, Ok(()));
    assert_eq!(*seen.lock().unwrap(), vec!["programming".to_string()]);
}
