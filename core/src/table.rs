//! Option descriptor extraction.
//!
//! Turns a level's declarations (own options plus embedded groups) into a
//! flat [`OptionTable`]: one [`Descriptor`] per effective option, an alias
//! index, and the widest rendered alias for help column sizing.

use std::collections::HashMap;

use unicode_width::UnicodeWidthStr;

use crate::error::SchemaError;
use crate::group::OptionGroup;
use crate::option::Opt;
use crate::slot::{Binding, OptionValue};
use crate::types::{DefaultSource, DefaultSpec, OptionKind, Requirement, Role};
use crate::validate::{parse_aliases, parse_requirement, requirement_met};

/// Why a raw value could not be assigned to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignError {
    Malformed,
    Unmet(Requirement),
}

/// Validated option metadata plus its binding.
pub(crate) struct Descriptor<T> {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) binding: Binding<T>,
    pub(crate) defaults: DefaultSpec,
    pub(crate) requirement: Requirement,
    pub(crate) hidden: bool,
    pub(crate) help: String,
    pub(crate) role: Role,
}

impl<T: 'static> Descriptor<T> {
    fn from_opt(opt: &Opt<T>) -> Result<Self, SchemaError> {
        let aliases = parse_aliases(&opt.name, &opt.aliases)?;
        let requirement = parse_requirement(&opt.name, &opt.requirement)?;
        let defaults = DefaultSpec::parse(&opt.default);
        let kind = opt.binding.kind();

        for source in defaults.sources() {
            let invalid = |reason: &str| SchemaError::InvalidDefault {
                binding: opt.name.clone(),
                entry: opt.default.clone(),
                reason: reason.to_string(),
            };
            match source {
                DefaultSource::Terminal if kind != OptionKind::Bool => {
                    return Err(invalid("terminal defaults apply to boolean options only"));
                }
                DefaultSource::Literal(value) => {
                    let parses = match kind {
                        OptionKind::Bool => bool::parse_value(value).is_some(),
                        OptionKind::Int => i64::parse_value(value).is_some(),
                        OptionKind::String => true,
                    };
                    if !parses {
                        return Err(invalid(&format!("{value:?} is not a valid {kind}")));
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            name: opt.name.clone(),
            aliases,
            binding: opt.binding.clone(),
            defaults,
            requirement,
            hidden: opt.hidden,
            help: opt.help.clone(),
            role: opt.role,
        })
    }

    pub(crate) fn kind(&self) -> OptionKind {
        self.binding.kind()
    }

    /// Aliases as rendered in help, with value placeholders.
    pub(crate) fn help_names(&self) -> Vec<String> {
        let hint = self.kind().value_hint();
        self.aliases
            .iter()
            .map(|alias| format!("{alias}{hint}"))
            .collect()
    }

    /// Help text with `Requirements:` and `Default:` suffixes.
    pub(crate) fn annotated_help(&self) -> String {
        let mut text = self.help.clone();
        if let Some(requirement) = self.requirement.help_text() {
            text.push_str(" Requirements: ");
            text.push_str(requirement);
        }
        if let Some(defaults) = self.defaults.help_text() {
            text.push_str(" Default: ");
            text.push_str(&defaults);
        }
        text
    }

    pub(crate) fn set_bool(&self, state: &mut T, value: bool) -> bool {
        match &self.binding {
            Binding::Bool(slot) => {
                slot.set(state, value);
                true
            }
            _ => false,
        }
    }

    /// Parses `raw` per kind and stores it, checking string requirements.
    /// The binding is untouched on error.
    pub(crate) fn assign(&self, state: &mut T, raw: &str) -> Result<(), AssignError> {
        match &self.binding {
            Binding::Bool(slot) => {
                let value = bool::parse_value(raw).ok_or(AssignError::Malformed)?;
                slot.set(state, value);
            }
            Binding::Int(slot) => {
                let value = i64::parse_value(raw).ok_or(AssignError::Malformed)?;
                slot.set(state, value);
            }
            Binding::Str(slot) => {
                if !requirement_met(raw, self.requirement) {
                    return Err(AssignError::Unmet(self.requirement));
                }
                slot.set(state, raw.to_string());
            }
        }
        Ok(())
    }
}

/// Flat descriptor table for one command level.
pub(crate) struct OptionTable<T> {
    descriptors: Vec<Descriptor<T>>,
    by_alias: HashMap<String, usize>,
    max_alias_width: usize,
}

impl<T: 'static> OptionTable<T> {
    /// Builds the table, rejecting malformed declarations and alias
    /// collisions.
    pub(crate) fn build(options: &OptionGroup<T>) -> Result<Self, SchemaError> {
        let mut descriptors: Vec<Descriptor<T>> = Vec::new();
        let mut by_alias = HashMap::new();
        let mut max_alias_width = 0;

        for opt in options.flatten()? {
            let descriptor = Descriptor::from_opt(opt)?;
            let index = descriptors.len();
            for (alias, help_name) in descriptor.aliases.iter().zip(descriptor.help_names()) {
                if let Some(&other) = by_alias.get(alias) {
                    let first: &Descriptor<T> = &descriptors[other];
                    return Err(SchemaError::DuplicateAlias {
                        alias: alias.clone(),
                        first: first.name.clone(),
                        second: descriptor.name.clone(),
                    });
                }
                by_alias.insert(alias.clone(), index);
                max_alias_width = max_alias_width.max(help_name.width());
            }
            descriptors.push(descriptor);
        }

        Ok(Self {
            descriptors,
            by_alias,
            max_alias_width,
        })
    }

    pub(crate) fn lookup(&self, alias: &str) -> Option<&Descriptor<T>> {
        self.by_alias.get(alias).map(|&index| &self.descriptors[index])
    }

    pub(crate) fn by_role(&self, role: Role) -> Option<&Descriptor<T>> {
        self.descriptors.iter().find(|descriptor| descriptor.role == role)
    }

    pub(crate) fn by_name(&self, name: &str) -> Option<&Descriptor<T>> {
        self.descriptors.iter().find(|descriptor| descriptor.name == name)
    }

    /// Returns `true` if an option with `role` exists and is set.
    pub(crate) fn role_set(&self, role: Role, state: &T) -> bool {
        self.by_role(role)
            .and_then(|descriptor| descriptor.binding.read_bool(state))
            .unwrap_or(false)
    }

    pub(crate) fn descriptors(&self) -> &[Descriptor<T>] {
        &self.descriptors
    }

    pub(crate) fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Display width of the widest alias including its value placeholder.
    pub(crate) fn max_alias_width(&self) -> usize {
        self.max_alias_width
    }
}
