//! Reusable option groups and their override rules.
//!
//! A group declares options on its own state type `G`. Embedding it into a
//! command (or another group) projects every option through a slot that
//! locates the `G` inside the outer state.
//!
//! Flattening registers nested groups depth-first, then the level's own
//! options. An option declared directly on a level replaces a same-named
//! option contributed by one of its groups, in place. Two options declared
//! directly on the same group under one binding name are a
//! [`SchemaError::DuplicateBinding`](crate::SchemaError::DuplicateBinding).
//!
//! # Example
//!
//! ```
//! use optree_core::{Opt, OptionGroup, slot};
//!
//! #[derive(Default)]
//! struct Sprinkles {
//!     kind: i64,
//!     count: i64,
//! }
//!
//! #[derive(Default)]
//! struct Cat {
//!     sprinkles: Sprinkles,
//!     kind: i64,
//! }
//!
//! let sprinkles = OptionGroup::new()
//!     .with_option(Opt::new("kind", "sprinkle-type", slot!(Sprinkles, kind)))
//!     .with_option(Opt::new("count", "sprinkle-count", slot!(Sprinkles, count)));
//!
//! let cat = OptionGroup::new()
//!     .with_group(sprinkles, slot!(Cat, sprinkles))
//!     .with_option(Opt::new("kind", "sprinkle-type", slot!(Cat, kind)));
//!
//! let names: Vec<&str> = cat.flatten().unwrap().iter().map(|opt| opt.name()).collect();
//! assert_eq!(names, vec!["kind", "count"]);
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::option::Opt;
use crate::slot::Slot;

/// A set of option declarations over the state type `G`, including the
/// groups it embeds.
pub struct OptionGroup<G> {
    groups: Vec<OptionGroup<G>>,
    options: Vec<Opt<G>>,
}

impl<G> Default for OptionGroup<G> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            options: Vec::new(),
        }
    }
}

impl<G: 'static> OptionGroup<G> {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option declared directly on this group.
    pub fn with_option(mut self, opt: Opt<G>) -> Self {
        self.options.push(opt);
        self
    }

    /// Embeds `group`, whose state lives at `outer` inside `G`.
    pub fn with_group<H: 'static>(mut self, group: OptionGroup<H>, outer: Slot<G, H>) -> Self {
        self.groups.push(group.project(&outer));
        self
    }

    pub(crate) fn push_option(&mut self, opt: Opt<G>) {
        self.options.push(opt);
    }

    pub(crate) fn push_group<H: 'static>(&mut self, group: OptionGroup<H>, outer: Slot<G, H>) {
        self.groups.push(group.project(&outer));
    }

    /// Returns the effective options after override resolution.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateBinding`] if one group declares two
    /// options under the same binding name.
    pub fn flatten(&self) -> Result<Vec<&Opt<G>>, SchemaError> {
        let mut flat = Vec::new();
        let mut index = HashMap::new();
        self.collect(&mut flat, &mut index)?;
        Ok(flat)
    }

    fn collect<'a>(
        &'a self,
        flat: &mut Vec<&'a Opt<G>>,
        index: &mut HashMap<&'a str, usize>,
    ) -> Result<(), SchemaError> {
        for group in &self.groups {
            group.collect(flat, index)?;
        }
        let mut own = HashSet::new();
        for opt in &self.options {
            let name = opt.name.as_str();
            if !own.insert(name) {
                return Err(SchemaError::DuplicateBinding {
                    binding: name.to_string(),
                });
            }
            match index.get(name) {
                Some(&slot) => flat[slot] = opt,
                None => {
                    index.insert(name, flat.len());
                    flat.push(opt);
                }
            }
        }
        Ok(())
    }

    fn project<U: 'static>(&self, outer: &Slot<U, G>) -> OptionGroup<U> {
        OptionGroup {
            groups: self.groups.iter().map(|group| group.project(outer)).collect(),
            options: self.options.iter().map(|opt| opt.project(outer)).collect(),
        }
    }
}
