//! Argument tuples.
//!
//! An [`Args`] carries a fixed number of positional values as one object.
//! The arity is part of the type (`Args<(A, B)>` always holds two slots), so it
//! can never change after construction. Slot *contents* stay mutable through
//! [`Args::slots_mut`], which is how callers re-bind arguments before a retry.
//!
//! The per-arity trait impls are generated by macro for tuples of 0 through
//! [`MAX_ARITY`] elements.

use std::any::{self, Any};
use std::fmt;

/// Largest arity with generated trait impls.
pub const MAX_ARITY: usize = 12;

/// A slot value that can be formatted for diagnostics and downcast in tests.
pub trait ArgSlot: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug> ArgSlot for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn ArgSlot {
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Structural facts about a native tuple used as an argument list.
pub trait ArgTuple {
    const ARITY: usize;

    /// Type names of each slot, in declaration order.
    fn parameter_types() -> Vec<&'static str>;
}

/// Borrowed, ordered view of every slot.
///
/// Only available when each slot is `'static + Debug`, since the view is
/// built from `&dyn ArgSlot` references.
pub trait SlotValues {
    fn ordered_values(&self) -> Vec<&dyn ArgSlot>;
}

/// Prepends a value to a tuple, producing the next arity up.
pub trait PushFront<H> {
    type Output;

    fn push_front(self, head: H) -> Self::Output;
}

/// Fixed-arity carrier of positional arguments.
///
/// `Clone` is slot-wise: `Arc`/`Rc` slots share identity with the original,
/// plain values are copied. A cloned `Args` is fully independent of the
/// original for re-binding purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Args<T> {
    slots: T,
}

impl<T> Args<T> {
    #[must_use]
    pub const fn new(slots: T) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn slots(&self) -> &T {
        &self.slots
    }

    /// Mutable access to the slots. The tuple shape is fixed; only values change.
    pub fn slots_mut(&mut self) -> &mut T {
        &mut self.slots
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.slots
    }
}

impl<T: ArgTuple> Args<T> {
    #[must_use]
    pub fn arity(&self) -> usize {
        T::ARITY
    }

    /// True only for the zero-arity tuple.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        T::ARITY == 0
    }

    #[must_use]
    pub fn parameter_types() -> Vec<&'static str> {
        T::parameter_types()
    }

    /// Produce a tuple one slot wider with `head` in the first position.
    #[must_use]
    pub fn push_front<H>(self, head: H) -> Args<T::Output>
    where
        T: PushFront<H>,
    {
        Args::new(self.slots.push_front(head))
    }
}

impl<T: SlotValues> Args<T> {
    /// Snapshot of the slots in declaration order. Always `arity()` long.
    #[must_use]
    pub fn to_ordered_values(&self) -> Vec<&dyn ArgSlot> {
        self.slots.ordered_values()
    }
}

impl<T> From<T> for Args<T> {
    fn from(slots: T) -> Self {
        Self::new(slots)
    }
}

impl<T: SlotValues> fmt::Display for Args<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.to_ordered_values().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value:?}")?;
        }
        f.write_str(")")
    }
}

/// Build an [`Args`] from a list of values.
///
/// ```
/// use callkit_types::args;
///
/// let args = args!(8080_u16, "localhost".to_string());
/// assert_eq!(args.arity(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new(())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::new(($($value,)+))
    };
}

macro_rules! count_idents {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count_idents!($($tail)*) };
}

macro_rules! impl_arg_tuple {
    ($($name:ident),*) => {
        impl<$($name),*> ArgTuple for ($($name,)*) {
            const ARITY: usize = count_idents!($($name)*);

            fn parameter_types() -> Vec<&'static str> {
                vec![$(any::type_name::<$name>()),*]
            }
        }

        impl<$($name: ArgSlot),*> SlotValues for ($($name,)*) {
            #[allow(non_snake_case, clippy::unused_unit)]
            fn ordered_values(&self) -> Vec<&dyn ArgSlot> {
                let ($($name,)*) = self;
                vec![$($name as &dyn ArgSlot),*]
            }
        }
    };
}

macro_rules! impl_push_front {
    ($($name:ident),*) => {
        impl<Head, $($name),*> PushFront<Head> for ($($name,)*) {
            type Output = (Head, $($name,)*);

            #[allow(non_snake_case)]
            fn push_front(self, head: Head) -> Self::Output {
                let ($($name,)*) = self;
                (head, $($name,)*)
            }
        }
    };
}

impl_arg_tuple!();
impl_arg_tuple!(A);
impl_arg_tuple!(A, B);
impl_arg_tuple!(A, B, C);
impl_arg_tuple!(A, B, C, D);
impl_arg_tuple!(A, B, C, D, E);
impl_arg_tuple!(A, B, C, D, E, F);
impl_arg_tuple!(A, B, C, D, E, F, G);
impl_arg_tuple!(A, B, C, D, E, F, G, H);
impl_arg_tuple!(A, B, C, D, E, F, G, H, I);
impl_arg_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_arg_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_arg_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

// One short of MAX_ARITY so the result still has generated impls.
impl_push_front!();
impl_push_front!(A);
impl_push_front!(A, B);
impl_push_front!(A, B, C);
impl_push_front!(A, B, C, D);
impl_push_front!(A, B, C, D, E);
impl_push_front!(A, B, C, D, E, F);
impl_push_front!(A, B, C, D, E, F, G);
impl_push_front!(A, B, C, D, E, F, G, H);
impl_push_front!(A, B, C, D, E, F, G, H, I);
impl_push_front!(A, B, C, D, E, F, G, H, I, J);
impl_push_front!(A, B, C, D, E, F, G, H, I, J, K);
