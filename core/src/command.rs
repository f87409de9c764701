//! Command levels: declaration, dispatch and execution.
//!
//! A [`CommandSpec`] declares one level of a command tree. Dispatching a
//! level runs the whole pipeline for it: render the help template, build the
//! option table, resolve defaults, scan the arguments, then either recurse
//! into a subcommand, show help, or call the handler.
//!
//! # Examples
//!
//! ```
//! use optree_core::{CommandSpec, Context, Opt, SharedBuffer, run_with_args, slot};
//!
//! #[derive(Default)]
//! struct Demo {
//!     help: bool,
//!     int: i64,
//! }
//!
//! let mut root = CommandSpec::<Demo>::new()
//!     .with_help("Usage: {{.Command}} [--int n]")
//!     .with_option(Opt::help_switch(slot!(Demo, help)))
//!     .with_option(Opt::new("int", "int", slot!(Demo, int)))
//!     .with_handler(|demo, invocation| {
//!         let _ = writeln!(invocation.stdout(), "int = {}", demo.int);
//!         0
//!     });
//!
//! let stdout = SharedBuffer::new();
//! let mut ctx = Context::builder().stdout(stdout.clone()).build();
//! let args: Vec<String> = ["demo", "--int", "1"].iter().map(|s| s.to_string()).collect();
//! assert_eq!(run_with_args(&mut root, &mut ctx, &args), Ok(0));
//! assert_eq!(stdout.contents(), "int = 1\n");
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use tracing::debug;

use crate::console::EnvSource;
use crate::context::Context;
use crate::defaults::resolve_defaults;
use crate::describe::{CommandDescription, describe_options};
use crate::error::{Failure, SchemaError, UsageError};
use crate::frame::{Frame, LevelFrame};
use crate::group::OptionGroup;
use crate::help::{HelpPage, resolve_color, separator};
use crate::option::Opt;
use crate::scan::scan;
use crate::slot::Slot;
use crate::table::OptionTable;
use crate::template::render_template;
use crate::types::Role;

/// Process status after a [`SchemaError`].
const SCHEMA_ERROR_EXIT: u8 = 2;

/// Handler callback for one command level.
///
/// Returns `0` on success, `1` to have the level's help shown, or any other
/// code to propagate unchanged.
pub type Handler<T> = Box<dyn FnMut(&mut T, &mut Invocation<'_>) -> i32>;

/// Type-erased command level, as stored in a parent's subcommand table.
pub trait Dispatch {
    /// One-line summary for the parent's `Subcommands:` table.
    fn summary(&self) -> &str;

    /// Runs this level against `args` (everything after the level's name).
    ///
    /// Usage errors are reported on the context's standard error and yield
    /// `Ok(1)`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if this level or a descendant it dispatches
    /// to is declared incorrectly.
    fn dispatch(
        &mut self,
        ctx: &mut Context,
        path: &str,
        parent: Option<&dyn Frame>,
        args: &[String],
    ) -> Result<i32, SchemaError>;

    /// Writes this level's help followed by the help of every visible
    /// descendant, each behind a separator line.
    fn render_all_help(
        &self,
        ctx: &mut Context,
        path: &str,
        parent: Option<&dyn Frame>,
    ) -> Result<(), SchemaError>;

    /// Describes this level and its descendants without parsing anything.
    fn describe(&self) -> Result<CommandDescription, SchemaError>;
}

/// What a handler sees besides its own state.
pub struct Invocation<'a> {
    path: &'a str,
    args: &'a [String],
    parent: Option<&'a dyn Frame>,
    ctx: &'a mut Context,
}

impl<'a> Invocation<'a> {
    /// Invocation path of this level, e.g. `prog version only`.
    pub fn path(&self) -> &str {
        self.path
    }

    /// Positional arguments collected at this level, in order.
    pub fn args(&self) -> &[String] {
        self.args
    }

    /// The parent level, if this is a subcommand.
    pub fn parent_frame(&self) -> Option<&dyn Frame> {
        self.parent
    }

    /// State of the nearest ancestor level whose state type is `P`.
    pub fn parent<P: 'static>(&self) -> Option<&P> {
        self.parent.and_then(|frame| frame.ancestor::<P>())
    }

    pub fn stdout(&mut self) -> &mut dyn Write {
        self.ctx.stdout()
    }

    pub fn stderr(&mut self) -> &mut dyn Write {
        self.ctx.stderr()
    }

    pub fn env(&self) -> &dyn EnvSource {
        self.ctx.env()
    }

    /// Whether standard output is a terminal (memoized for the run).
    pub fn is_terminal(&self) -> bool {
        self.ctx.is_terminal()
    }

    /// Terminal width in columns.
    pub fn width(&self) -> usize {
        self.ctx.width()
    }
}

/// Declaration of one command level over the state type `T`.
///
/// A fresh `T::default()` is created each time the level is dispatched.
pub struct CommandSpec<T> {
    help: String,
    summary: String,
    options: OptionGroup<T>,
    args: Option<Slot<T, Vec<String>>>,
    handler: Option<Handler<T>>,
    subcommands: BTreeMap<String, Box<dyn Dispatch>>,
    hidden_subcommands: BTreeMap<String, Box<dyn Dispatch>>,
}

impl<T: Default + 'static> Default for CommandSpec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + 'static> CommandSpec<T> {
    pub fn new() -> Self {
        Self {
            help: String::new(),
            summary: String::new(),
            options: OptionGroup::new(),
            args: None,
            handler: None,
            subcommands: BTreeMap::new(),
            hidden_subcommands: BTreeMap::new(),
        }
    }

    /// Sets the help template. `{{.Command}}` expands to the invocation path.
    pub fn with_help(mut self, template: &str) -> Self {
        self.help = template.to_string();
        self
    }

    /// Sets the summary shown in the parent's subcommand table.
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    /// Declares an option directly on this level.
    pub fn with_option(mut self, opt: Opt<T>) -> Self {
        self.options.push_option(opt);
        self
    }

    /// Embeds an option group whose state lives at `outer`.
    pub fn with_group<G: 'static>(mut self, group: OptionGroup<G>, outer: Slot<T, G>) -> Self {
        self.options.push_group(group, outer);
        self
    }

    /// Collects positional arguments into the field behind `sink`.
    pub fn with_args(mut self, sink: Slot<T, Vec<String>>) -> Self {
        self.args = Some(sink);
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&mut T, &mut Invocation<'_>) -> i32 + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Adds a subcommand listed in help.
    pub fn with_subcommand(mut self, name: &str, command: impl Dispatch + 'static) -> Self {
        self.subcommands.insert(name.to_string(), Box::new(command));
        self
    }

    /// Adds a subcommand that dispatches but is not listed in help.
    pub fn with_hidden_subcommand(mut self, name: &str, command: impl Dispatch + 'static) -> Self {
        self.hidden_subcommands
            .insert(name.to_string(), Box::new(command));
        self
    }

    fn has_subcommand(&self, name: &str) -> bool {
        self.subcommands.contains_key(name) || self.hidden_subcommands.contains_key(name)
    }

    fn subcommand_mut(&mut self, name: &str) -> Option<&mut Box<dyn Dispatch>> {
        match self.subcommands.get_mut(name) {
            Some(command) => Some(command),
            None => self.hidden_subcommands.get_mut(name),
        }
    }

    fn visible_summaries(&self) -> Vec<(String, String)> {
        self.subcommands
            .iter()
            .map(|(name, command)| (name.clone(), command.summary().to_string()))
            .collect()
    }

    /// Renders the template, builds the table and resolves defaults.
    fn prepare(&self, ctx: &Context, path: &str) -> Result<(String, OptionTable<T>, T), Failure> {
        let intro = render_template(&self.help, path)?;
        let table = OptionTable::build(&self.options)?;
        debug!(path, options = table.len(), "Built option table");
        let mut state = T::default();
        resolve_defaults(&table, &mut state, ctx)?;
        Ok((intro, table, state))
    }

    fn write_help(&self, ctx: &mut Context, intro: &str, frame: &LevelFrame<'_, T>) {
        let color = resolve_color(frame, ctx);
        let subcommands = self.visible_summaries();
        let page = HelpPage {
            intro,
            table: frame.table,
            subcommands: &subcommands,
        };
        let text = page.render(ctx, color);
        let _ = ctx.stdout().write_all(text.as_bytes());
    }

    fn write_all_help(
        &self,
        ctx: &mut Context,
        intro: &str,
        frame: &LevelFrame<'_, T>,
    ) -> Result<(), SchemaError> {
        self.write_help(ctx, intro, frame);
        for (name, command) in &self.subcommands {
            let rule = separator(frame.path, name, ctx.width());
            let _ = ctx.stdout().write_all(rule.as_bytes());
            command.render_all_help(ctx, &format!("{} {name}", frame.path), Some(frame as &dyn Frame))?;
        }
        Ok(())
    }
}

impl<T: Default + 'static> Dispatch for CommandSpec<T> {
    fn summary(&self) -> &str {
        &self.summary
    }

    fn dispatch(
        &mut self,
        ctx: &mut Context,
        path: &str,
        parent: Option<&dyn Frame>,
        args: &[String],
    ) -> Result<i32, SchemaError> {
        let (intro, table, mut state) = match self.prepare(ctx, path) {
            Ok(prepared) => prepared,
            Err(Failure::Schema(err)) => return Err(err),
            Err(Failure::Usage(err)) => {
                ctx.report(&err);
                return Ok(1);
            }
        };

        let scanned = match scan(
            &table,
            &mut state,
            args,
            |name| self.has_subcommand(name),
            !self.subcommands.is_empty(),
        ) {
            Ok(scanned) => scanned,
            Err(err) => {
                ctx.report(&err);
                return Ok(1);
            }
        };
        if let Some(sink) = &self.args {
            sink.set(&mut state, scanned.positionals.clone());
        }

        if let Some((name, start)) = scanned.subcommand {
            let frame = LevelFrame {
                path,
                state: &state,
                table: &table,
                parent,
            };
            let child_path = format!("{path} {name}");
            if let Some(command) = self.subcommand_mut(&name) {
                debug!(parent = path, subcommand = name.as_str(), "Dispatching to subcommand");
                return command.dispatch(ctx, &child_path, Some(&frame as &dyn Frame), &args[start..]);
            }
        }

        if table.role_set(Role::AllHelp, &state) {
            let frame = LevelFrame {
                path,
                state: &state,
                table: &table,
                parent,
            };
            self.write_all_help(ctx, &intro, &frame)?;
            return Ok(1);
        }

        let code = if table.role_set(Role::Help, &state) {
            1
        } else if let Some(handler) = self.handler.as_mut() {
            let mut invocation = Invocation {
                path,
                args: &scanned.positionals,
                parent,
                ctx: &mut *ctx,
            };
            let code = handler(&mut state, &mut invocation);
            debug!(path, code, "Handler returned");
            code
        } else {
            1
        };

        if code == 1 {
            let frame = LevelFrame {
                path,
                state: &state,
                table: &table,
                parent,
            };
            self.write_help(ctx, &intro, &frame);
        }
        Ok(code)
    }

    fn render_all_help(
        &self,
        ctx: &mut Context,
        path: &str,
        parent: Option<&dyn Frame>,
    ) -> Result<(), SchemaError> {
        let (intro, table, state) = match self.prepare(ctx, path) {
            Ok(prepared) => prepared,
            Err(Failure::Schema(err)) => return Err(err),
            Err(Failure::Usage(err)) => {
                ctx.report(&err);
                return Ok(());
            }
        };
        let frame = LevelFrame {
            path,
            state: &state,
            table: &table,
            parent,
        };
        self.write_all_help(ctx, &intro, &frame)
    }

    fn describe(&self) -> Result<CommandDescription, SchemaError> {
        let table = OptionTable::build(&self.options)?;
        let describe_all = |commands: &BTreeMap<String, Box<dyn Dispatch>>| {
            commands
                .iter()
                .map(|(name, command)| Ok((name.clone(), command.describe()?)))
                .collect::<Result<BTreeMap<_, _>, SchemaError>>()
        };
        Ok(CommandDescription {
            summary: self.summary.clone(),
            help: self.help.clone(),
            takes_args: self.args.is_some(),
            options: describe_options(&table),
            subcommands: describe_all(&self.subcommands)?,
            hidden_subcommands: describe_all(&self.hidden_subcommands)?,
        })
    }
}

/// Dispatches `root` with a full argument vector.
///
/// `args[0]` labels the root level in help output and invocation paths; the
/// remaining tokens are parsed.
pub fn run_with_args(
    root: &mut dyn Dispatch,
    ctx: &mut Context,
    args: &[String],
) -> Result<i32, SchemaError> {
    match args.split_first() {
        Some((program, rest)) => root.dispatch(ctx, program, None, rest),
        None => root.dispatch(ctx, "", None, &[]),
    }
}

/// Dispatches `root` with the process arguments and the given context.
///
/// An argument that is not valid UTF-8 is reported on standard error and
/// ends the run with status 1 before any level is dispatched. A
/// [`SchemaError`] is written to standard error as `error: ...` and ends the
/// run with status 2.
pub fn run_with(root: &mut dyn Dispatch, mut ctx: Context) -> ExitCode {
    let args = match unicode_args(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            ctx.report(&err);
            return ExitCode::from(1);
        }
    };
    match run_with_args(root, &mut ctx, &args) {
        Ok(code) => exit_code(code),
        Err(err) => {
            let _ = writeln!(ctx.stderr(), "error: {err}");
            ExitCode::from(SCHEMA_ERROR_EXIT)
        }
    }
}

fn unicode_args<I>(args: I) -> Result<Vec<String>, UsageError>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| UsageError::NonUnicodeArgument(arg.to_string_lossy().into_owned()))
        })
        .collect()
}

/// [`run_with`] using [`Context::default`].
pub fn run(root: &mut dyn Dispatch) -> ExitCode {
    run_with(root, Context::default())
}

/// Converts a handler code to a process status, keeping its low byte.
pub fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{FixedTerminal, MockEnv};
    use crate::context::SharedBuffer;
    use crate::slot;

    #[derive(Default)]
    struct Root {
        help: bool,
        args: Vec<String>,
    }

    #[derive(Default)]
    struct Leaf {
        level: i64,
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn context() -> (Context, SharedBuffer, SharedBuffer) {
        let stdout = SharedBuffer::new();
        let stderr = SharedBuffer::new();
        let ctx = Context::builder()
            .stdout(stdout.clone())
            .stderr(stderr.clone())
            .env(MockEnv::new())
            .terminal(FixedTerminal {
                is_terminal: false,
                width: 80,
            })
            .build();
        (ctx, stdout, stderr)
    }

    #[test]
    fn test_missing_handler_shows_help() {
        let mut root = CommandSpec::<Root>::new()
            .with_help("Usage: {{.Command}}")
            .with_option(Opt::help_switch(slot!(Root, help)));
        let (mut ctx, stdout, _) = context();
        assert_eq!(run_with_args(&mut root, &mut ctx, &args(&["prog"])), Ok(1));
        assert!(stdout.contents().starts_with("Usage: prog\n"));
    }

    #[test]
    fn test_other_codes_propagate_without_help() {
        let mut root = CommandSpec::<Root>::new()
            .with_help("Usage: {{.Command}}")
            .with_handler(|_, _| 3);
        let (mut ctx, stdout, _) = context();
        assert_eq!(run_with_args(&mut root, &mut ctx, &args(&["prog"])), Ok(3));
        assert_eq!(stdout.contents(), "");
    }

    #[test]
    fn test_usage_error_reports_without_help() {
        let mut root = CommandSpec::<Root>::new()
            .with_help("Usage: {{.Command}}")
            .with_handler(|_, _| 0);
        let (mut ctx, stdout, stderr) = context();
        assert_eq!(run_with_args(&mut root, &mut ctx, &args(&["prog", "--bogus"])), Ok(1));
        assert_eq!(stderr.contents(), "unknown option \"--bogus\"\n");
        assert_eq!(stdout.contents(), "");
    }

    #[test]
    fn test_template_error_is_schema_error() {
        let mut root = CommandSpec::<Root>::new().with_help("{{.Name}}").with_handler(|_, _| 0);
        let (mut ctx, stdout, _) = context();
        let result = run_with_args(&mut root, &mut ctx, &args(&["prog"]));
        assert!(matches!(result, Err(SchemaError::Template { .. })));
        assert_eq!(stdout.contents(), "");
    }

    #[test]
    fn test_parent_sink_filled_before_child_runs() {
        let leaf = CommandSpec::<Leaf>::new()
            .with_option(Opt::new("level", "level", slot!(Leaf, level)))
            .with_handler(|leaf, invocation| {
                let seen = invocation.parent::<Root>().map(|root| root.args.clone());
                let own = invocation.args().to_vec();
                let _ = writeln!(invocation.stdout(), "{} {:?} {:?}", leaf.level, seen, own);
                0
            });
        let mut root = CommandSpec::<Root>::new()
            .with_args(slot!(Root, args))
            .with_subcommand("leaf", leaf);
        let (mut ctx, stdout, _) = context();
        let code = run_with_args(
            &mut root,
            &mut ctx,
            &args(&["prog", "a", "leaf", "--level", "2", "b"]),
        );
        assert_eq!(code, Ok(0));
        assert_eq!(stdout.contents(), "2 Some([\"a\"]) [\"b\"]\n");
    }

    #[test]
    fn test_hidden_subcommand_dispatches() {
        let hidden = CommandSpec::<Leaf>::new().with_handler(|_, _| 7);
        let mut root = CommandSpec::<Root>::new()
            .with_help("Usage: {{.Command}}")
            .with_option(Opt::help_switch(slot!(Root, help)))
            .with_hidden_subcommand("secret", hidden);
        let (mut ctx, stdout, _) = context();
        assert_eq!(run_with_args(&mut root, &mut ctx, &args(&["prog", "secret"])), Ok(7));

        assert_eq!(run_with_args(&mut root, &mut ctx, &args(&["prog", "--help"])), Ok(1));
        assert!(!stdout.contents().contains("secret"));
        assert!(!stdout.contents().contains("Subcommands:"));
    }

    #[test]
    fn test_describe_includes_hidden() {
        let root = CommandSpec::<Root>::new()
            .with_summary("Root.")
            .with_args(slot!(Root, args))
            .with_option(Opt::help_switch(slot!(Root, help)))
            .with_subcommand("leaf", CommandSpec::<Leaf>::new().with_summary("Leaf."))
            .with_hidden_subcommand("secret", CommandSpec::<Leaf>::new());
        let description = root.describe().unwrap();
        assert!(description.takes_args);
        assert_eq!(description.options[0].role, Role::Help);
        assert_eq!(description.subcommands["leaf"].summary, "Leaf.");
        assert!(description.hidden_subcommands.contains_key("secret"));
    }

    #[test]
    fn test_unicode_args_pass_through() {
        let args = unicode_args(["prog", "cat", "a.txt"].map(OsString::from)).unwrap();
        assert_eq!(args, vec!["prog", "cat", "a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_arg_is_usage_error() {
        use std::os::unix::ffi::OsStringExt;

        let bad = OsString::from_vec(b"caf\xe9.txt".to_vec());
        let err = unicode_args([OsString::from("prog"), bad]).unwrap_err();
        assert_eq!(err, UsageError::NonUnicodeArgument("caf\u{fffd}.txt".to_string()));
        assert_eq!(
            err.to_string(),
            "argument \"caf\u{fffd}.txt\" is not valid UTF-8"
        );
    }
}
