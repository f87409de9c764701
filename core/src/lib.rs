//! Declarative command trees for command-line programs.
//!
//! A program declares each command level as a [`CommandSpec`] over its own
//! state struct: typed options bound through [`Slot`]s, reusable
//! [`OptionGroup`]s, a positional-argument sink, a handler, and visible or
//! hidden subcommands. Dispatching the root then:
//!
//! - builds a flat option table per level, with options declared on a level
//!   overriding same-named options from embedded groups;
//! - resolves defaults from `env:NAME`, `terminal` and literal sources;
//! - validates string values against `dir`, `file` and `dirorfile`
//!   requirements;
//! - scans arguments left to right, recursing into the first subcommand
//!   named;
//! - shows help on request or when a handler returns `1`.
//!
//! Rendering collaborators ([`MarkdownRenderer`], [`TableAligner`],
//! [`Terminal`]) and the environment ([`EnvSource`]) are traits carried by
//! the per-run [`Context`], so every level can be driven deterministically
//! in tests.
//!
//! # Example
//!
//! ```
//! use optree_core::*;
//!
//! #[derive(Default)]
//! struct Cat {
//!     help: bool,
//!     count: i64,
//!     files: Vec<String>,
//! }
//!
//! let mut cat = CommandSpec::<Cat>::new()
//!     .with_help("Usage: {{.Command}} [options] <file>...")
//!     .with_option(Opt::help_switch(slot!(Cat, help)))
//!     .with_option(
//!         Opt::new("count", "c,count", slot!(Cat, count))
//!             .with_help("Times to print each file.")
//!             .with_default("env:COUNT,1"),
//!     )
//!     .with_args(slot!(Cat, files))
//!     .with_handler(|cat, _| if cat.files.is_empty() { 1 } else { 0 });
//!
//! let stdout = SharedBuffer::new();
//! let mut ctx = Context::builder()
//!     .stdout(stdout.clone())
//!     .env(MockEnv::from_pairs([("COUNT", "5")]))
//!     .build();
//! let args = vec!["cat".to_string()];
//! assert_eq!(run_with_args(&mut cat, &mut ctx, &args), Ok(1));
//! assert!(stdout.contents().starts_with("Usage: cat [options] <file>...\n"));
//! assert!(stdout.contents().contains("Default: $COUNT, 1"));
//! ```

mod align;
mod command;
mod console;
mod context;
mod defaults;
mod describe;
mod error;
mod frame;
mod group;
mod help;
mod option;
mod scan;
mod slot;
mod table;
mod template;
mod types;
mod validate;

pub use align::{AlignOptions, ColumnAligner, Row};
pub use command::{
    CommandSpec, Dispatch, Handler, Invocation, exit_code, run, run_with, run_with_args,
};
pub use console::{
    DEFAULT_WIDTH, EnvSource, FixedTerminal, MarkdownRenderer, MockEnv, PlainMarkdown, StdEnv,
    StdTerminal, TableAligner, Terminal,
};
pub use context::{Context, ContextBuilder, SharedBuffer};
pub use describe::{CommandDescription, OptionDescription};
pub use error::{SchemaError, UsageError};
pub use frame::Frame;
pub use group::OptionGroup;
pub use option::Opt;
pub use slot::{Binding, OptionValue, Slot};
pub use template::render_template;
pub use types::{DefaultSource, DefaultSpec, OptionKind, Requirement, Role, parse_bool};
pub use validate::{requirement_met, validate_requirement};
