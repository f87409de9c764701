//! Default resolution for a command level.

use tracing::debug;

use crate::context::Context;
use crate::error::{Failure, SchemaError, UsageError};
use crate::table::{AssignError, Descriptor, OptionTable};
use crate::types::DefaultSource;

/// Applies each descriptor's first satisfiable default source to `state`.
///
/// Environment values that do not parse are [`UsageError`]s; string values
/// from any source must meet the descriptor's requirement.
pub(crate) fn resolve_defaults<T: 'static>(
    table: &OptionTable<T>,
    state: &mut T,
    ctx: &Context,
) -> Result<(), Failure> {
    for descriptor in table.descriptors() {
        resolve_one(descriptor, state, ctx)?;
    }
    Ok(())
}

fn resolve_one<T: 'static>(
    descriptor: &Descriptor<T>,
    state: &mut T,
    ctx: &Context,
) -> Result<(), Failure> {
    // Diagnostics name the first declared alias, e.g. `-c` for `c,count`.
    let option = descriptor.aliases.first().map(String::as_str).unwrap_or_default();
    for source in descriptor.defaults.sources() {
        match source {
            DefaultSource::Env(var) => {
                let Some(value) = ctx.env().get(var) else {
                    continue;
                };
                descriptor
                    .assign(state, &value)
                    .map_err(|err| match err {
                        AssignError::Malformed => UsageError::InvalidEnv {
                            kind: descriptor.kind(),
                            option: option.to_string(),
                            var: var.clone(),
                            value: value.clone(),
                        },
                        AssignError::Unmet(requirement) => UsageError::Requirement {
                            option: option.to_string(),
                            value: value.clone(),
                            requirement,
                        },
                    })?;
                debug!(option, var = var.as_str(), "Applied environment default");
            }
            DefaultSource::Terminal => {
                descriptor.set_bool(state, ctx.is_terminal());
                debug!(option, "Applied terminal default");
            }
            DefaultSource::Literal(value) => {
                descriptor.assign(state, value).map_err(|err| match err {
                    AssignError::Malformed => Failure::Schema(SchemaError::InvalidDefault {
                        binding: descriptor.name.clone(),
                        entry: value.clone(),
                        reason: format!("{value:?} is not a valid {}", descriptor.kind()),
                    }),
                    AssignError::Unmet(requirement) => Failure::Usage(UsageError::Requirement {
                        option: option.to_string(),
                        value: value.clone(),
                        requirement,
                    }),
                })?;
                debug!(option, "Applied literal default");
            }
        }
        return Ok(());
    }
    Ok(())
}
