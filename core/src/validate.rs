//! Declaration checks and value requirement checks.
//!
//! Alias validation runs when a level's descriptor table is built and
//! reports [`SchemaError`]s. Requirement validation runs whenever a string
//! value is assigned, whatever its origin (command line, environment or
//! literal default).
//!
//! # Examples
//!
//! ```
//! use optree_core::{Requirement, validate_requirement};
//!
//! let dir = std::env::temp_dir();
//! let dir = dir.to_str().unwrap();
//! assert!(validate_requirement("--root", dir, Requirement::Dir).is_ok());
//! assert!(validate_requirement("--input", dir, Requirement::File).is_err());
//! ```

use std::fs;

use crate::error::{SchemaError, UsageError};
use crate::types::Requirement;

/// Splits an alias tag and renders each alias with its dash prefix.
///
/// Empty entries are skipped, mirroring the default tag syntax.
pub(crate) fn parse_aliases(binding: &str, tag: &str) -> Result<Vec<String>, SchemaError> {
    let mut aliases = Vec::new();
    for alias in tag.split(',').filter(|alias| !alias.is_empty()) {
        if alias.starts_with('-') || alias.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidAlias {
                binding: binding.to_string(),
                alias: alias.to_string(),
            });
        }
        if alias.chars().count() == 1 {
            aliases.push(format!("-{alias}"));
        } else {
            aliases.push(format!("--{alias}"));
        }
    }
    if aliases.is_empty() {
        return Err(SchemaError::MissingAlias {
            binding: binding.to_string(),
        });
    }
    Ok(aliases)
}

/// Parses a requirement tag for `binding`.
pub(crate) fn parse_requirement(binding: &str, tag: &str) -> Result<Requirement, SchemaError> {
    Requirement::parse(tag).ok_or_else(|| SchemaError::UnknownRequirement {
        binding: binding.to_string(),
        tag: tag.to_string(),
    })
}

/// Returns `true` if `path` satisfies `requirement`.
pub fn requirement_met(path: &str, requirement: Requirement) -> bool {
    match requirement {
        Requirement::None => true,
        Requirement::Dir => fs::metadata(path).is_ok_and(|meta| meta.is_dir()),
        Requirement::File => fs::metadata(path).is_ok_and(|meta| !meta.is_dir()),
        Requirement::DirOrFile => fs::metadata(path).is_ok(),
    }
}

/// Checks `value` against `requirement`, naming `option` in the error.
pub fn validate_requirement(
    option: &str,
    value: &str,
    requirement: Requirement,
) -> Result<(), UsageError> {
    if requirement_met(value, requirement) {
        return Ok(());
    }
    Err(UsageError::Requirement {
        option: option.to_string(),
        value: value.to_string(),
        requirement,
    })
}
