//! Error types for command declaration and argument processing.
//!
//! [`SchemaError`] covers mistakes in how a command tree was declared; they
//! are programming errors and abort the whole run. [`UsageError`] covers bad
//! user input and bad environment defaults; they are reported on standard
//! error and end the current command level with exit code `1`.

use thiserror::Error;

use crate::types::{OptionKind, Requirement};

/// Invalid command declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An option was declared with an empty alias list.
    #[error("option {binding:?} declares no aliases")]
    MissingAlias { binding: String },
    /// An alias contains whitespace or a leading dash.
    #[error("invalid alias {alias:?} for option {binding:?}")]
    InvalidAlias { binding: String, alias: String },
    /// One level declares two options under the same binding name.
    #[error("option {binding:?} is declared twice at the same level")]
    DuplicateBinding { binding: String },
    /// Two options at one command level share an alias.
    #[error("alias {alias} is declared by both {first:?} and {second:?}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },
    /// The requirement tag is not one of `dir`, `file`, `dirorfile`.
    #[error("unknown required value {tag:?} for option {binding:?}")]
    UnknownRequirement { binding: String, tag: String },
    /// A literal default does not parse for the option's kind, or a
    /// `terminal` default is attached to a non-boolean option.
    #[error("cannot handle default specification {entry:?} for option {binding:?}: {reason}")]
    InvalidDefault {
        binding: String,
        entry: String,
        reason: String,
    },
    /// The help template contains an action other than the invocation
    /// placeholder or a quoted literal.
    #[error("could not parse help text for {command:?}: {reason}")]
    Template { command: String, reason: String },
}

/// Invalid user input or environment default.
///
/// `Display` renders the diagnostic written to standard error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// No option matches the token.
    #[error("unknown option {0:?}")]
    UnknownOption(String),
    /// A value-taking option was the last token.
    #[error("no value given for option {0:?}")]
    MissingValue(String),
    /// A command-line value does not parse for the option's kind.
    #[error("invalid {kind} {value:?} for option {option:?}")]
    InvalidValue {
        kind: OptionKind,
        option: String,
        value: String,
    },
    /// An environment default does not parse for the option's kind.
    #[error("invalid {kind} {value:?} for option {option:?} via ${var}")]
    InvalidEnv {
        kind: OptionKind,
        option: String,
        var: String,
        value: String,
    },
    /// A process argument is not valid UTF-8.
    #[error("argument {0:?} is not valid UTF-8")]
    NonUnicodeArgument(String),
    /// A string value fails its filesystem requirement.
    #[error("{option} {value:?} is not {}", .requirement.noun())]
    Requirement {
        option: String,
        value: String,
        requirement: Requirement,
    },
}

/// Either kind of failure while preparing one command level.
#[derive(Debug)]
pub(crate) enum Failure {
    Schema(SchemaError),
    Usage(UsageError),
}

impl From<SchemaError> for Failure {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<UsageError> for Failure {
    fn from(err: UsageError) -> Self {
        Self::Usage(err)
    }
}
