//! Read-only views of already-parsed ancestor levels.

use std::any::Any;

use crate::table::OptionTable;

/// An ancestor command level, as seen from its descendants.
///
/// Frames form a chain from the current level's parent up to the root.
pub trait Frame {
    /// Invocation path of the level, e.g. `prog version`.
    fn path(&self) -> &str;

    /// Parsed state of the level.
    fn state(&self) -> &dyn Any;

    /// Value of the boolean option with binding name `name`, if the level
    /// declares one.
    fn bool_option(&self, name: &str) -> Option<bool>;

    /// The level above this one; `None` at the root.
    fn parent(&self) -> Option<&dyn Frame>;
}

impl dyn Frame + '_ {
    /// Downcasts this level's state.
    pub fn state_as<P: 'static>(&self) -> Option<&P> {
        self.state().downcast_ref()
    }

    /// Nearest level in the chain, starting here, whose state is a `P`.
    pub fn ancestor<P: 'static>(&self) -> Option<&P> {
        let mut current: Option<&dyn Frame> = Some(self);
        while let Some(frame) = current {
            if let Some(state) = frame.state_as::<P>() {
                return Some(state);
            }
            current = frame.parent();
        }
        None
    }

    /// First value of the boolean option `name` walking up from this level.
    pub fn find_bool(&self, name: &str) -> Option<bool> {
        let mut current: Option<&dyn Frame> = Some(self);
        while let Some(frame) = current {
            if let Some(value) = frame.bool_option(name) {
                return Some(value);
            }
            current = frame.parent();
        }
        None
    }
}

/// Frame over one level's state and option table.
pub(crate) struct LevelFrame<'a, T> {
    pub(crate) path: &'a str,
    pub(crate) state: &'a T,
    pub(crate) table: &'a OptionTable<T>,
    pub(crate) parent: Option<&'a dyn Frame>,
}

impl<T: 'static> Frame for LevelFrame<'_, T> {
    fn path(&self) -> &str {
        self.path
    }

    fn state(&self) -> &dyn Any {
        self.state
    }

    fn bool_option(&self, name: &str) -> Option<bool> {
        self.table
            .by_name(name)
            .and_then(|descriptor| descriptor.binding.read_bool(self.state))
    }

    fn parent(&self) -> Option<&dyn Frame> {
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::OptionGroup;
    use crate::option::Opt;
    use crate::slot;

    #[derive(Default)]
    struct Root {
        color: bool,
    }

    #[derive(Default)]
    struct Version {
        only: bool,
    }

    #[test]
    fn test_chain_lookup() {
        let root_table =
            OptionTable::build(&OptionGroup::new().with_option(Opt::new("color", "color", slot!(Root, color))))
                .unwrap();
        let version_table =
            OptionTable::build(&OptionGroup::new().with_option(Opt::new("only", "only", slot!(Version, only))))
                .unwrap();
        let root = Root { color: true };
        let version = Version::default();

        let root_frame = LevelFrame {
            path: "prog",
            state: &root,
            table: &root_table,
            parent: None,
        };
        let version_frame = LevelFrame {
            path: "prog version",
            state: &version,
            table: &version_table,
            parent: Some(&root_frame as &dyn Frame),
        };
        let frame: &dyn Frame = &version_frame;

        assert_eq!(frame.find_bool("color"), Some(true));
        assert_eq!(frame.find_bool("only"), Some(false));
        assert_eq!(frame.find_bool("missing"), None);
        assert!(frame.ancestor::<Root>().unwrap().color);
        assert!(frame.state_as::<Root>().is_none());
        assert_eq!(frame.parent().map(|parent| parent.path()), Some("prog"));
    }
}
