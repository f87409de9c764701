//! Option value kinds, requirements and default specifications.
//!
//! These are the declaration-level vocabulary of the crate. They carry no
//! binding to application state; see [`Slot`](crate::Slot) and
//! [`Opt`](crate::Opt) for that.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value kind of an option.
///
/// The set is closed: options are booleans, base-10 integers, or strings.
///
/// # Examples
///
/// ```
/// use optree_core::OptionKind;
///
/// assert_eq!(OptionKind::Int.value_hint(), " n");
/// assert_eq!(OptionKind::Bool.to_string(), "boolean");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Switch without a value; `--no-<long>` clears it.
    Bool,
    /// Signed 64-bit integer parsed in base 10.
    Int,
    /// Verbatim string, optionally subject to a [`Requirement`].
    String,
}

impl OptionKind {
    /// Placeholder appended to an alias in help output (e.g. `--count n`).
    pub fn value_hint(self) -> &'static str {
        match self {
            Self::Bool => "",
            Self::Int => " n",
            Self::String => " s",
        }
    }

    /// Returns `true` if the option consumes the following token as its value.
    pub fn takes_value(self) -> bool {
        !matches!(self, Self::Bool)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::String => "string",
        })
    }
}

/// Filesystem constraint on a string option's value.
///
/// Parsed from the requirement tags `dir`, `file` and `dirorfile`.
///
/// # Examples
///
/// ```
/// use optree_core::Requirement;
///
/// assert_eq!(Requirement::parse("dirorfile"), Some(Requirement::DirOrFile));
/// assert_eq!(Requirement::parse(""), Some(Requirement::None));
/// assert_eq!(Requirement::parse("socket"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// No constraint.
    #[default]
    None,
    /// Value must name an existing directory.
    Dir,
    /// Value must name an existing non-directory.
    File,
    /// Value must name anything that exists.
    DirOrFile,
}

impl Requirement {
    /// Parses a requirement tag, returning `None` for an unknown tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "" => Some(Self::None),
            "dir" => Some(Self::Dir),
            "file" => Some(Self::File),
            "dirorfile" => Some(Self::DirOrFile),
            _ => None,
        }
    }

    /// Noun phrase used in diagnostics, e.g. `"x" is not a file`.
    pub fn noun(self) -> &'static str {
        match self {
            Self::None => "anything",
            Self::Dir => "a directory",
            Self::File => "a file",
            Self::DirOrFile => "a directory or file",
        }
    }

    /// Phrase used in the `Requirements:` suffix of option help.
    pub fn help_text(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Dir => Some("must be a directory"),
            Self::File => Some("must be a file"),
            Self::DirOrFile => Some("must be a directory or file"),
        }
    }
}

/// One source in a [`DefaultSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum DefaultSource {
    /// Named environment variable, parsed per the option's kind.
    Env(String),
    /// `true` when standard output is a terminal. Booleans only.
    Terminal,
    /// Fixed value, parsed per the option's kind.
    Literal(String),
}

impl DefaultSource {
    fn help_text(&self) -> String {
        match self {
            Self::Env(name) => format!("${name}"),
            Self::Terminal => "if terminal".to_string(),
            Self::Literal(value) => value.clone(),
        }
    }
}

/// Ordered default sources for an option; the first one that yields a value
/// wins.
///
/// # Examples
///
/// ```
/// use optree_core::{DefaultSource, DefaultSpec};
///
/// let spec = DefaultSpec::parse("env:COUNT,1");
/// assert_eq!(
///     spec.sources(),
///     &[DefaultSource::Env("COUNT".into()), DefaultSource::Literal("1".into())]
/// );
/// assert_eq!(spec.help_text().as_deref(), Some("$COUNT, 1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSpec {
    sources: Vec<DefaultSource>,
}

impl DefaultSpec {
    /// Parses a comma-separated default tag: `env:NAME`, `terminal`, or a
    /// literal. Empty entries are skipped.
    pub fn parse(spec: &str) -> Self {
        let sources = spec
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                if let Some(name) = entry.strip_prefix("env:") {
                    DefaultSource::Env(name.to_string())
                } else if entry == "terminal" {
                    DefaultSource::Terminal
                } else {
                    DefaultSource::Literal(entry.to_string())
                }
            })
            .collect();
        Self { sources }
    }

    /// Sources in evaluation order.
    pub fn sources(&self) -> &[DefaultSource] {
        &self.sources
    }

    /// Returns `true` when no source is declared.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Text for the `Default:` suffix of option help, if any.
    pub fn help_text(&self) -> Option<String> {
        if self.sources.is_empty() {
            return None;
        }
        Some(
            self.sources
                .iter()
                .map(DefaultSource::help_text)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Special meaning attached to an option by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Ordinary application option.
    #[default]
    Plain,
    /// Shows this level's help instead of running the handler.
    Help,
    /// Shows this level's help and the help of every descendant.
    AllHelp,
}

/// Parses a boolean token.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
