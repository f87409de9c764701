use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{Descriptor, OptionTable};
use crate::types::{DefaultSource, OptionKind, Requirement, Role};

/// Serializable description of a command and its descendants.
///
/// Produced by [`Dispatch::describe`](crate::Dispatch::describe) without
/// parsing any arguments or resolving any defaults, so an application can
/// export its own command tree, e.g. as JSON for shell completion tooling.
///
/// # Examples
///
/// ```
/// use optree_core::{CommandSpec, Dispatch, Opt, slot};
///
/// #[derive(Default)]
/// struct Cat {
///     count: i64,
/// }
///
/// let cat = CommandSpec::<Cat>::new()
///     .with_summary("Prints files.")
///     .with_option(Opt::new("count", "c,count", slot!(Cat, count)).with_default("env:COUNT,1"));
/// let description = cat.describe().unwrap();
/// assert_eq!(description.summary, "Prints files.");
/// assert_eq!(description.options[0].aliases, vec!["-c", "--count"]);
/// assert!(description.to_json().unwrap().contains("\"COUNT\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescription {
    /// One-line summary shown in the parent's subcommand table.
    pub summary: String,
    /// Raw help template, before placeholder substitution.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    /// Whether the command collects positional arguments.
    #[serde(default)]
    pub takes_args: bool,
    /// Effective options in registration order, hidden ones included.
    #[serde(default)]
    pub options: Vec<OptionDescription>,
    /// Subcommands listed in help.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subcommands: BTreeMap<String, CommandDescription>,
    /// Subcommands that dispatch but are not listed in help.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hidden_subcommands: BTreeMap<String, CommandDescription>,
}

impl CommandDescription {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a description previously produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Finds a descendant by subcommand path, visible or hidden.
    pub fn find(&self, path: &[&str]) -> Option<&CommandDescription> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.subcommands
            .get(*first)
            .or_else(|| self.hidden_subcommands.get(*first))
            .and_then(|child| child.find(rest))
    }
}

/// Serializable description of one effective option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescription {
    /// Binding name used for override resolution.
    pub name: String,
    /// Rendered aliases, e.g. `-c`, `--count`.
    pub aliases: Vec<String>,
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<DefaultSource>,
    #[serde(default)]
    pub requirement: Requirement,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub role: Role,
}

impl OptionDescription {
    fn from_descriptor<T: 'static>(descriptor: &Descriptor<T>) -> Self {
        Self {
            name: descriptor.name.clone(),
            aliases: descriptor.aliases.clone(),
            kind: descriptor.kind(),
            defaults: descriptor.defaults.sources().to_vec(),
            requirement: descriptor.requirement,
            hidden: descriptor.hidden,
            help: descriptor.help.clone(),
            role: descriptor.role,
        }
    }
}

pub(crate) fn describe_options<T: 'static>(table: &OptionTable<T>) -> Vec<OptionDescription> {
    table
        .descriptors()
        .iter()
        .map(OptionDescription::from_descriptor)
        .collect()
}
