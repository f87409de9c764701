use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use optree_core::*;

#[derive(Default)]
struct Root {
    help: bool,
    all_help: bool,
    color: bool,
    debug: bool,
    args: Vec<String>,
}

#[derive(Default)]
struct Sprinkles {
    kind: i64,
    count: i64,
}

#[derive(Default)]
struct Cat {
    sprinkles: Sprinkles,
    help: bool,
    count: i64,
    prefix: String,
    kind: i64,
    input: String,
    secret: bool,
    files: Vec<String>,
}

#[derive(Default)]
struct Version {
    help: bool,
    all_help: bool,
    args: Vec<String>,
}

/// Values seen by handlers, for assertions after dispatch.
#[derive(Debug, Default, Clone, PartialEq)]
struct Seen {
    count: i64,
    prefix: String,
    kind: i64,
    sprinkle_count: i64,
    input: String,
    secret: bool,
    files: Vec<String>,
    parent_debug: Option<bool>,
    root_args: Vec<String>,
}

fn sprinkles() -> OptionGroup<Sprinkles> {
    OptionGroup::new()
        .with_option(
            Opt::new("sprinkle_type", "sprinkle-type", slot!(Sprinkles, kind))
                .with_help("The type of sprinkles to output."),
        )
        .with_option(
            Opt::new("sprinkle_count", "sprinkle-count", slot!(Sprinkles, count))
                .with_help("The number of sprinkles to output.")
                .with_default("10"),
        )
}

fn cat(seen: Rc<RefCell<Seen>>) -> CommandSpec<Cat> {
    CommandSpec::new()
        .with_help("Usage: {{.Command}} [options] filename [filename] ...")
        .with_summary("Output the content of a file or files.")
        .with_group(sprinkles(), slot!(Cat, sprinkles))
        .with_option(Opt::help_switch(slot!(Cat, help)))
        .with_option(
            Opt::new("count", "c,count", slot!(Cat, count))
                .with_help("The number of times to output each file.")
                .with_default("env:COUNT,1"),
        )
        .with_option(
            Opt::new("prefix", "p,prefix", slot!(Cat, prefix))
                .with_help("Prefix to output before each filename, if any.")
                .with_default("## "),
        )
        .with_option(
            Opt::new("sprinkle_type", "sprinkle-type", slot!(Cat, kind))
                .with_help("The type of sprinkles to output (overridden).")
                .with_default("1"),
        )
        .with_option(
            Opt::new("input", "input", slot!(Cat, input))
                .with_help("Extra input file.")
                .with_requirement("file")
                .with_default("env:INPUT"),
        )
        .with_option(Opt::new("secret", "secret", slot!(Cat, secret)).hidden())
        .with_args(slot!(Cat, files))
        .with_handler(move |cat, invocation| {
            *seen.borrow_mut() = Seen {
                count: cat.count,
                prefix: cat.prefix.clone(),
                kind: cat.kind,
                sprinkle_count: cat.sprinkles.count,
                input: cat.input.clone(),
                secret: cat.secret,
                files: cat.files.clone(),
                parent_debug: invocation.parent::<Root>().map(|root| root.debug),
                root_args: invocation
                    .parent::<Root>()
                    .map(|root| root.args.clone())
                    .unwrap_or_default(),
            };
            if cat.files.is_empty() { 1 } else { 0 }
        })
}

fn version() -> CommandSpec<Version> {
    let only = CommandSpec::<Version>::new()
        .with_help("Usage: {{.Command}}\n\nOutputs the version number only.")
        .with_summary("Output the version number only.")
        .with_option(Opt::help_switch(slot!(Version, help)))
        .with_handler(|_, invocation| {
            let _ = writeln!(invocation.stdout(), "1.2.3");
            0
        });
    let hidden = CommandSpec::<Version>::new()
        .with_help("Usage: {{.Command}}\n\nA hidden subcommand.")
        .with_summary("A hidden subcommand.")
        .with_option(Opt::help_switch(slot!(Version, help)))
        .with_handler(|_, invocation| {
            let _ = writeln!(invocation.stdout(), "hidden 1.2.3");
            0
        });
    CommandSpec::new()
        .with_help("Usage: {{.Command}}\n\nOutputs the program's version.")
        .with_summary("Output the version of the program.")
        .with_option(Opt::help_switch(slot!(Version, help)))
        .with_option(Opt::all_help_switch(slot!(Version, all_help)))
        .with_args(slot!(Version, args))
        .with_handler(|version, invocation| {
            if !version.args.is_empty() {
                return 1;
            }
            let _ = writeln!(invocation.stdout(), "Version 1.2.3");
            0
        })
        .with_subcommand("only", only)
        .with_hidden_subcommand("hidden", hidden)
}

fn root(seen: Rc<RefCell<Seen>>) -> CommandSpec<Root> {
    CommandSpec::new()
        .with_help("Usage: {{.Command}} [options] subcommand [subcommand] ...")
        .with_option(Opt::help_switch(slot!(Root, help)))
        .with_option(Opt::all_help_switch(slot!(Root, all_help)))
        .with_option(
            Opt::new("color", "color", slot!(Root, color))
                .with_help("Controls color output; use --no-color to disable.")
                .with_default("terminal"),
        )
        .with_option(
            Opt::new("debug", "v,debug", slot!(Root, debug))
                .with_help("Output debug information.")
                .with_default("env:DEBUG"),
        )
        .with_args(slot!(Root, args))
        .with_handler(|_, _| 1)
        .with_subcommand("cat", cat(seen))
        .with_subcommand("version", version())
}

const WIDTH: usize = 120;

struct Harness {
    seen: Rc<RefCell<Seen>>,
    root: CommandSpec<Root>,
    stdout: SharedBuffer,
    stderr: SharedBuffer,
    ctx: Context,
}

impl Harness {
    fn new(env: MockEnv) -> Self {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let stdout = SharedBuffer::new();
        let stderr = SharedBuffer::new();
        let ctx = Context::builder()
            .stdout(stdout.clone())
            .stderr(stderr.clone())
            .env(env)
            .terminal(FixedTerminal {
                is_terminal: false,
                width: WIDTH,
            })
            .build();
        Self {
            root: root(Rc::clone(&seen)),
            seen,
            stdout,
            stderr,
            ctx,
        }
    }

    fn run(&mut self, tokens: &[&str]) -> i32 {
        let args: Vec<String> = std::iter::once("prog")
            .chain(tokens.iter().copied())
            .map(str::to_string)
            .collect();
        run_with_args(&mut self.root, &mut self.ctx, &args).expect("tree is well formed")
    }

    fn seen(&self) -> Seen {
        self.seen.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// Values and defaults
// ---------------------------------------------------------------------------

#[test]
fn integer_option_reaches_handler() {
    #[derive(Default)]
    struct IntCli {
        int: i64,
    }

    let called = Rc::new(RefCell::new(None));
    let record = Rc::clone(&called);
    let mut cli = CommandSpec::<IntCli>::new()
        .with_option(Opt::new("int", "int", slot!(IntCli, int)))
        .with_handler(move |cli, _| {
            *record.borrow_mut() = Some(cli.int);
            0
        });
    let mut ctx = Context::builder().stdout(SharedBuffer::new()).build();
    let args: Vec<String> = ["test", "--int", "1"].iter().map(|s| s.to_string()).collect();
    assert_eq!(run_with_args(&mut cli, &mut ctx, &args), Ok(0));
    assert_eq!(*called.borrow(), Some(1));
}

#[test]
fn count_default_chain() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "a.txt"]), 0);
    assert_eq!(harness.seen().count, 1);

    let mut harness = Harness::new(MockEnv::from_pairs([("COUNT", "5")]));
    assert_eq!(harness.run(&["cat", "a.txt"]), 0);
    assert_eq!(harness.seen().count, 5);

    let mut harness = Harness::new(MockEnv::from_pairs([("COUNT", "5")]));
    assert_eq!(harness.run(&["cat", "--count", "9", "a.txt"]), 0);
    assert_eq!(harness.seen().count, 9);
}

#[test]
fn bad_environment_value_aborts_level() {
    let mut harness = Harness::new(MockEnv::from_pairs([("COUNT", "lots")]));
    assert_eq!(harness.run(&["cat", "a.txt"]), 1);
    assert_eq!(
        harness.stderr.contents(),
        "invalid integer \"lots\" for option \"-c\" via $COUNT\n"
    );
    assert_eq!(harness.stdout.contents(), "");
    assert_eq!(harness.seen(), Seen::default());
}

#[test]
fn own_option_overrides_group_option() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "--sprinkle-type", "3", "a.txt"]), 0);
    let seen = harness.seen();
    assert_eq!(seen.kind, 3);
    assert_eq!(seen.sprinkle_count, 10);
    assert_eq!(seen.prefix, "## ");
}

#[test]
fn boolean_negation_and_parent_access() {
    let mut harness = Harness::new(MockEnv::from_pairs([("DEBUG", "true")]));
    assert_eq!(harness.run(&["cat", "a.txt"]), 0);
    assert_eq!(harness.seen().parent_debug, Some(true));

    let mut harness = Harness::new(MockEnv::from_pairs([("DEBUG", "true")]));
    assert_eq!(harness.run(&["--no-debug", "cat", "a.txt"]), 0);
    assert_eq!(harness.seen().parent_debug, Some(false));
}

#[test]
fn missing_value_is_reported() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "a.txt", "--prefix"]), 1);
    assert_eq!(harness.stderr.contents(), "no value given for option \"--prefix\"\n");
    assert_eq!(harness.seen(), Seen::default());
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

#[test]
fn requirement_applies_to_every_origin() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let missing = missing.to_str().unwrap();

    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "--input", missing, "a.txt"]), 1);
    let from_cli = harness.stderr.contents();

    let mut harness = Harness::new(MockEnv::from_pairs([("INPUT", missing)]));
    assert_eq!(harness.run(&["cat", "a.txt"]), 1);
    let from_env = harness.stderr.contents();

    assert_eq!(from_cli, from_env);
    assert_eq!(from_cli, format!("--input {missing:?} is not a file\n"));
}

#[test]
fn requirement_accepts_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, "hello").unwrap();
    let input = input.to_str().unwrap();

    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "--input", input, "a.txt"]), 0);
    assert_eq!(harness.seen().input, input);

    let mut harness = Harness::new(MockEnv::new());
    let dir_path = dir.path().to_str().unwrap();
    assert_eq!(harness.run(&["cat", "--input", dir_path, "a.txt"]), 1);
}

// ---------------------------------------------------------------------------
// Scanning and dispatch
// ---------------------------------------------------------------------------

#[test]
fn subcommand_owns_remaining_tokens() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["x", "cat", "--debug", "a.txt"]), 1);
    // `--debug` is unknown to cat even though the root declares it.
    assert_eq!(harness.stderr.contents(), "unknown option \"--debug\"\n");

    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["x", "cat", "a.txt", "version"]), 0);
    let seen = harness.seen();
    assert_eq!(seen.files, vec!["a.txt", "version"]);
    assert_eq!(seen.root_args, vec!["x"]);
}

#[test]
fn terminator_freezes_classification() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "--", "--count", "-", "-p"]), 0);
    let seen = harness.seen();
    assert_eq!(seen.files, vec!["--count", "-", "-p"]);
    assert_eq!(seen.count, 1);
}

#[test]
fn hidden_option_settable() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "--secret", "a.txt"]), 0);
    assert!(harness.seen().secret);

    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "--help"]), 1);
    let help = harness.stdout.contents();
    assert!(help.contains("--count n"));
    assert!(!help.contains("--secret"));
}

#[test]
fn hidden_subcommand_dispatchable_not_listed() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["version", "hidden"]), 0);
    assert_eq!(harness.stdout.contents(), "hidden 1.2.3\n");

    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["version", "--help"]), 1);
    let help = harness.stdout.contents();
    assert!(help.contains("\nSubcommands:\n"));
    assert!(help.contains("only"));
    assert!(!help.contains("hidden"));
}

#[test]
fn single_dash_long_option() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat", "-count", "4", "a.txt"]), 0);
    assert_eq!(harness.seen().count, 4);
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn cat_without_files_shows_help() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["cat"]), 1);
    let help = harness.stdout.contents();
    assert!(help.starts_with("Usage: prog cat [options] filename [filename] ...\n"));
    assert!(help.contains("\nOptions:\n"));
    assert!(help.contains("Default: $COUNT, 1"));
    assert!(help.contains("Requirements: must be a file Default: $INPUT"));
    assert!(help.contains("--prefix s"));
    assert!(!help.contains("Subcommands:"));
    assert_eq!(harness.stderr.contents(), "");
}

#[test]
fn root_help_lists_subcommands_alphabetically() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["-h"]), 1);
    let help = harness.stdout.contents();
    let options = help.find("\nOptions:\n").unwrap();
    let subcommands = help.find("\nSubcommands:\n").unwrap();
    assert!(options < subcommands);
    let cat = help.find("Output the content of a file or files.").unwrap();
    let version = help.find("Output the version of the program.").unwrap();
    assert!(cat < version);
    let help_row = help.find("-? -h --help").unwrap();
    let all_help_row = help.find("--all-help").unwrap();
    let color_row = help.find("--color").unwrap();
    assert!(help_row < all_help_row && all_help_row < color_row);
}

#[test]
fn all_help_renders_every_visible_level() {
    let mut harness = Harness::new(MockEnv::new());
    assert_eq!(harness.run(&["--all-help"]), 1);
    let out = harness.stdout.contents();
    for label in [
        "---[ prog cat ]",
        "---[ prog version ]",
        "---[ prog version only ]",
    ] {
        assert!(out.contains(label), "missing {label}");
    }
    assert!(!out.contains("---[ prog version hidden ]"));
    assert!(out.contains("Usage: prog version only\n"));
    let cat = out.find("---[ prog cat ]").unwrap();
    let version = out.find("---[ prog version ]").unwrap();
    assert!(cat < version);
    for line in out.lines().filter(|line| line.starts_with("---[")) {
        assert_eq!(line.len(), WIDTH - 1);
    }
}

#[test]
fn all_help_alias_on_level_without_switch() {
    #[derive(Default)]
    struct Bare {
        help: bool,
    }

    let mut tree = CommandSpec::<Bare>::new()
        .with_help("Usage: {{.Command}}")
        .with_option(Opt::help_switch(slot!(Bare, help)))
        .with_subcommand("leaf", CommandSpec::<Bare>::new().with_summary("Leaf."));
    let stdout = SharedBuffer::new();
    let mut ctx = Context::builder().stdout(stdout.clone()).build();
    let args: Vec<String> = ["bare", "--all-help"].iter().map(|s| s.to_string()).collect();
    assert_eq!(run_with_args(&mut tree, &mut ctx, &args), Ok(1));
    assert!(stdout.contents().starts_with("Usage: bare\n"));
    assert!(!stdout.contents().contains("---["));
}

#[test]
fn color_follows_nearest_frame() {
    struct Recording(Rc<RefCell<Vec<bool>>>);

    impl MarkdownRenderer for Recording {
        fn render(&self, markdown: &str, color: bool, width: usize) -> String {
            self.0.borrow_mut().push(color);
            PlainMarkdown.render(markdown, color, width)
        }
    }

    let colors = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::new(RefCell::new(Seen::default()));
    let mut tree = root(seen);
    let mut ctx = Context::builder()
        .stdout(SharedBuffer::new())
        .markdown(Recording(Rc::clone(&colors)))
        .terminal(FixedTerminal {
            is_terminal: true,
            width: 80,
        })
        .build();
    let args: Vec<String> = ["prog", "--no-color", "cat"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(run_with_args(&mut tree, &mut ctx, &args), Ok(1));
    // cat has no color option; the root's explicit --no-color wins over the
    // terminal.
    assert_eq!(*colors.borrow(), vec![false]);

    colors.borrow_mut().clear();
    let args: Vec<String> = ["prog", "cat"].iter().map(|s| s.to_string()).collect();
    assert_eq!(run_with_args(&mut tree, &mut ctx, &args), Ok(1));
    assert_eq!(*colors.borrow(), vec![true]);
}

// ---------------------------------------------------------------------------
// Declaration errors and description
// ---------------------------------------------------------------------------

#[test]
fn alias_collision_in_subcommand_is_schema_error() {
    #[derive(Default)]
    struct Clash {
        a: bool,
        b: bool,
    }

    let child = CommandSpec::<Clash>::new()
        .with_option(Opt::new("a", "x", slot!(Clash, a)))
        .with_option(Opt::new("b", "x", slot!(Clash, b)));
    let mut tree = CommandSpec::<Clash>::new().with_subcommand("child", child);
    let stdout = SharedBuffer::new();
    let mut ctx = Context::builder().stdout(stdout.clone()).build();
    let args: Vec<String> = ["prog", "child"].iter().map(|s| s.to_string()).collect();
    let err = run_with_args(&mut tree, &mut ctx, &args).unwrap_err();
    assert_eq!(
        err,
        SchemaError::DuplicateAlias {
            alias: "-x".to_string(),
            first: "a".to_string(),
            second: "b".to_string(),
        }
    );
    assert_eq!(stdout.contents(), "");
}

#[test]
fn repeated_binding_name_is_schema_error() {
    #[derive(Default)]
    struct Counter {
        count: i64,
    }

    let mut level = CommandSpec::<Counter>::new()
        .with_option(Opt::new("count", "c,count", slot!(Counter, count)))
        .with_option(Opt::new("count", "n,number", slot!(Counter, count)))
        .with_handler(|_, _| 0);
    let stderr = SharedBuffer::new();
    let mut ctx = Context::builder().stderr(stderr.clone()).build();
    let args: Vec<String> = ["prog", "--count", "3"].iter().map(|s| s.to_string()).collect();
    let err = run_with_args(&mut level, &mut ctx, &args).unwrap_err();
    assert_eq!(
        err,
        SchemaError::DuplicateBinding {
            binding: "count".to_string(),
        }
    );
    assert_eq!(stderr.contents(), "");
}

#[test]
fn describe_exports_tree() {
    let harness = Harness::new(MockEnv::new());
    let description = harness.root.describe().unwrap();
    let cat = description.find(&["cat"]).unwrap();
    let names: Vec<&str> = cat.options.iter().map(|opt| opt.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "sprinkle_type",
            "sprinkle_count",
            "help",
            "count",
            "prefix",
            "input",
            "secret",
        ]
    );
    assert!(cat.options.iter().any(|opt| opt.name == "secret" && opt.hidden));
    assert!(description.find(&["version", "hidden"]).is_some());
    assert!(description.subcommands["version"].hidden_subcommands.contains_key("hidden"));

    let json = description.to_json().unwrap();
    assert_eq!(CommandDescription::from_json(&json).unwrap(), description);
}
