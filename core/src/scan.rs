//! Left-to-right argument scanning for one command level.
//!
//! The scanner assigns option values into the level's state, collects
//! positional tokens, and stops at the first token naming a subcommand.
//! Recursing into that subcommand is the caller's job; the scanner only
//! reports where the child's arguments begin.

use tracing::debug;

use crate::error::UsageError;
use crate::table::{AssignError, Descriptor, OptionTable};
use crate::types::{OptionKind, Role};

/// Result of scanning one level.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Scanned {
    /// Non-option, non-subcommand tokens in arrival order.
    pub(crate) positionals: Vec<String>,
    /// Matched subcommand name and the index of its first argument.
    pub(crate) subcommand: Option<(String, usize)>,
}

/// What an option-looking token resolved to.
enum Resolved<'t, T> {
    Set(&'t Descriptor<T>, String),
    Clear(&'t Descriptor<T>, String),
    Unknown(String),
}

/// Scans `args` for one level.
///
/// `is_subcommand` reports whether a plain token names a visible or hidden
/// subcommand; `has_visible_subcommands` enables `--all-help` as an alias for
/// the help switch on levels that do not declare it.
pub(crate) fn scan<T: 'static>(
    table: &OptionTable<T>,
    state: &mut T,
    args: &[String],
    is_subcommand: impl Fn(&str) -> bool,
    has_visible_subcommands: bool,
) -> Result<Scanned, UsageError> {
    let mut scanned = Scanned::default();
    let mut terminated = false;
    let mut index = 0;

    while index < args.len() {
        let arg = &args[index];
        if !terminated {
            if arg == "--" {
                terminated = true;
                index += 1;
                continue;
            }
            if arg.len() > 1 && arg.starts_with('-') {
                index = apply_option(table, state, args, index, has_visible_subcommands)?;
                continue;
            }
        }
        if is_subcommand(arg) {
            scanned.subcommand = Some((arg.clone(), index + 1));
            return Ok(scanned);
        }
        scanned.positionals.push(arg.clone());
        index += 1;
    }

    Ok(scanned)
}

/// Applies the option at `args[index]` and returns the index of the next
/// unconsumed token.
fn apply_option<T: 'static>(
    table: &OptionTable<T>,
    state: &mut T,
    args: &[String],
    index: usize,
    has_visible_subcommands: bool,
) -> Result<usize, UsageError> {
    match resolve(table, &args[index], has_visible_subcommands) {
        Resolved::Unknown(name) => Err(UsageError::UnknownOption(name)),
        Resolved::Clear(descriptor, name) => {
            descriptor.set_bool(state, false);
            debug!(option = name.as_str(), "Cleared boolean option");
            Ok(index + 1)
        }
        Resolved::Set(descriptor, name) => {
            if descriptor.kind() == OptionKind::Bool {
                descriptor.set_bool(state, true);
                return Ok(index + 1);
            }
            let Some(value) = args.get(index + 1) else {
                return Err(UsageError::MissingValue(name));
            };
            descriptor.assign(state, value).map_err(|err| match err {
                AssignError::Malformed => UsageError::InvalidValue {
                    kind: descriptor.kind(),
                    option: name.clone(),
                    value: value.clone(),
                },
                AssignError::Unmet(requirement) => UsageError::Requirement {
                    option: name.clone(),
                    value: value.clone(),
                    requirement,
                },
            })?;
            Ok(index + 2)
        }
    }
}

fn resolve<'t, T: 'static>(
    table: &'t OptionTable<T>,
    arg: &str,
    has_visible_subcommands: bool,
) -> Resolved<'t, T> {
    if let Some(descriptor) = table.lookup(arg) {
        return Resolved::Set(descriptor, arg.to_string());
    }

    // Single-dash long names (`-version`) fall back to `--version`. Short
    // option clusters (`-abc`) are not expanded.
    let name = if arg.starts_with("--") {
        arg.to_string()
    } else {
        format!("-{arg}")
    };
    if let Some(descriptor) = table.lookup(&name) {
        return Resolved::Set(descriptor, name);
    }

    if name == "--all-help" && has_visible_subcommands {
        if let Some(descriptor) = table.by_role(Role::Help) {
            return Resolved::Set(descriptor, name);
        }
    }

    if let Some(positive) = name.strip_prefix("--no-") {
        if let Some(descriptor) = table.lookup(&format!("--{positive}")) {
            if descriptor.kind() == OptionKind::Bool {
                return Resolved::Clear(descriptor, name);
            }
        }
    }

    Resolved::Unknown(name)
}
