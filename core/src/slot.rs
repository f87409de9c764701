//! Typed bindings from option descriptors to application state.

use std::rc::Rc;

use crate::types::{OptionKind, parse_bool};

/// Getter/mutator pair for one field of a command's state type `T`.
///
/// Usually built with the [`slot!`](crate::slot) macro. Slots compose with
/// [`Slot::project`], which is how option groups embedded in a larger state
/// struct are bound.
pub struct Slot<T, V> {
    get: Rc<dyn Fn(&T) -> &V>,
    get_mut: Rc<dyn Fn(&mut T) -> &mut V>,
}

impl<T, V> Clone for Slot<T, V> {
    fn clone(&self) -> Self {
        Self {
            get: Rc::clone(&self.get),
            get_mut: Rc::clone(&self.get_mut),
        }
    }
}

impl<T: 'static, V: 'static> Slot<T, V> {
    /// Creates a slot from a getter and a mutator for the same field.
    pub fn new<G, M>(get: G, get_mut: M) -> Self
    where
        G: Fn(&T) -> &V + 'static,
        M: Fn(&mut T) -> &mut V + 'static,
    {
        Self {
            get: Rc::new(get),
            get_mut: Rc::new(get_mut),
        }
    }

    /// Reads the bound field.
    pub fn get<'a>(&self, target: &'a T) -> &'a V {
        (self.get)(target)
    }

    /// Borrows the bound field mutably.
    pub fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut V {
        (self.get_mut)(target)
    }

    /// Overwrites the bound field.
    pub fn set(&self, target: &mut T, value: V) {
        *(self.get_mut)(target) = value;
    }

    /// Rebinds this slot through `outer`, which locates a `T` inside a `U`.
    pub fn project<U: 'static>(&self, outer: &Slot<U, T>) -> Slot<U, V> {
        let (inner_get, outer_get) = (Rc::clone(&self.get), Rc::clone(&outer.get));
        let (inner_mut, outer_mut) = (Rc::clone(&self.get_mut), Rc::clone(&outer.get_mut));
        Slot::new(
            move |u: &U| inner_get(outer_get(u)),
            move |u: &mut U| inner_mut(outer_mut(u)),
        )
    }
}

/// Builds a [`Slot`] for a (possibly nested) field of a state type.
///
/// ```
/// use optree_core::slot;
///
/// #[derive(Default)]
/// struct Common {
///     verbose: bool,
/// }
///
/// #[derive(Default)]
/// struct Cli {
///     common: Common,
///     count: i64,
/// }
///
/// let count = slot!(Cli, count);
/// let verbose = slot!(Cli, common.verbose);
///
/// let mut cli = Cli::default();
/// count.set(&mut cli, 3);
/// verbose.set(&mut cli, true);
/// assert_eq!(*count.get(&cli), 3);
/// assert!(cli.common.verbose);
/// ```
#[macro_export]
macro_rules! slot {
    ($ty:ty, $($field:ident).+) => {
        $crate::Slot::<$ty, _>::new(
            |state: &$ty| &state.$($field).+,
            |state: &mut $ty| &mut state.$($field).+,
        )
    };
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for bool {}
    impl Sealed for i64 {}
    impl Sealed for String {}
}

/// Field types an option can bind to: `bool`, `i64` and `String`.
///
/// This trait is sealed; any other field type is rejected at compile time.
pub trait OptionValue: sealed::Sealed + Sized + 'static {
    /// Kind reported for options bound to this type.
    const KIND: OptionKind;

    /// Parses a raw token for this kind.
    fn parse_value(raw: &str) -> Option<Self>;

    #[doc(hidden)]
    fn bind<T: 'static>(slot: Slot<T, Self>) -> Binding<T>;
}

impl OptionValue for bool {
    const KIND: OptionKind = OptionKind::Bool;

    fn parse_value(raw: &str) -> Option<Self> {
        parse_bool(raw)
    }

    fn bind<T: 'static>(slot: Slot<T, Self>) -> Binding<T> {
        Binding::Bool(slot)
    }
}

impl OptionValue for i64 {
    const KIND: OptionKind = OptionKind::Int;

    fn parse_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    fn bind<T: 'static>(slot: Slot<T, Self>) -> Binding<T> {
        Binding::Int(slot)
    }
}

impl OptionValue for String {
    const KIND: OptionKind = OptionKind::String;

    fn parse_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn bind<T: 'static>(slot: Slot<T, Self>) -> Binding<T> {
        Binding::Str(slot)
    }
}

/// Slot of one of the supported kinds, resolved at declaration time.
pub enum Binding<T> {
    Bool(Slot<T, bool>),
    Int(Slot<T, i64>),
    Str(Slot<T, String>),
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Bool(slot) => Self::Bool(slot.clone()),
            Self::Int(slot) => Self::Int(slot.clone()),
            Self::Str(slot) => Self::Str(slot.clone()),
        }
    }
}

impl<T: 'static> Binding<T> {
    /// Value kind of the bound field.
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Int(_) => OptionKind::Int,
            Self::Str(_) => OptionKind::String,
        }
    }

    /// Current value of a boolean binding; `None` for other kinds.
    pub fn read_bool(&self, target: &T) -> Option<bool> {
        match self {
            Self::Bool(slot) => Some(*slot.get(target)),
            _ => None,
        }
    }

    pub(crate) fn project<U: 'static>(&self, outer: &Slot<U, T>) -> Binding<U> {
        match self {
            Self::Bool(slot) => Binding::Bool(slot.project(outer)),
            Self::Int(slot) => Binding::Int(slot.project(outer)),
            Self::Str(slot) => Binding::Str(slot.project(outer)),
        }
    }
}
