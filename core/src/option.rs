//! Option declarations.

use crate::slot::{Binding, OptionValue, Slot};
use crate::types::{OptionKind, Role};

/// Declaration of one option on a state type `T`.
///
/// The declaration is kept in its tag form (comma-separated aliases,
/// default list and requirement) and validated when the command level's
/// descriptor table is built.
///
/// # Examples
///
/// ```
/// use optree_core::{Opt, OptionKind, slot};
///
/// #[derive(Default)]
/// struct Cat {
///     count: i64,
/// }
///
/// let count = Opt::new("count", "c,count", slot!(Cat, count))
///     .with_help("The number of times to output each file.")
///     .with_default("env:COUNT,1");
/// assert_eq!(count.name(), "count");
/// assert_eq!(count.kind(), OptionKind::Int);
/// ```
pub struct Opt<T> {
    pub(crate) name: String,
    pub(crate) aliases: String,
    pub(crate) binding: Binding<T>,
    pub(crate) help: String,
    pub(crate) default: String,
    pub(crate) requirement: String,
    pub(crate) hidden: bool,
    pub(crate) role: Role,
}

impl<T: 'static> Opt<T> {
    /// Declares an option.
    ///
    /// `name` is the binding name used for override resolution between a
    /// command and the option groups it embeds. `aliases` is a
    /// comma-separated list; single characters become `-x` short aliases,
    /// longer names become `--name` long aliases.
    pub fn new<V: OptionValue>(name: &str, aliases: &str, slot: Slot<T, V>) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.to_string(),
            binding: V::bind(slot),
            help: String::new(),
            default: String::new(),
            requirement: String::new(),
            hidden: false,
            role: Role::Plain,
        }
    }

    /// The conventional `-?`, `-h`, `--help` switch.
    pub fn help_switch(slot: Slot<T, bool>) -> Self {
        let mut opt = Self::new("help", "?,h,help", slot).with_help("Outputs this help text.");
        opt.role = Role::Help;
        opt
    }

    /// The `--all-help` switch; only listed in help when the command has
    /// visible subcommands.
    pub fn all_help_switch(slot: Slot<T, bool>) -> Self {
        let mut opt = Self::new("all-help", "all-help", slot)
            .with_help("Outputs this help text and the help text for all subcommands.");
        opt.role = Role::AllHelp;
        opt
    }

    /// Sets the help text shown in the options table.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Sets the default specification, e.g. `"env:COUNT,1"` or `"terminal"`.
    pub fn with_default(mut self, spec: &str) -> Self {
        self.default = spec.to_string();
        self
    }

    /// Sets the requirement tag: `dir`, `file` or `dirorfile`.
    pub fn with_requirement(mut self, tag: &str) -> Self {
        self.requirement = tag.to_string();
        self
    }

    /// Omits the option from help output; it stays settable.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Binding name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value kind of the bound field.
    pub fn kind(&self) -> OptionKind {
        self.binding.kind()
    }

    pub(crate) fn project<U: 'static>(&self, outer: &Slot<U, T>) -> Opt<U> {
        Opt {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            binding: self.binding.project(outer),
            help: self.help.clone(),
            default: self.default.clone(),
            requirement: self.requirement.clone(),
            hidden: self.hidden,
            role: self.role,
        }
    }
}
