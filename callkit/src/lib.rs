//! Arity-generic callable wrappers and guarded resource initialization.
//!
//! This crate re-exports the workspace members under one name:
//!
//! - [`Args`] and the [`args!`] macro carry 0..=12 positional values
//! - [`ActionFactory`], [`FuncFactory`] and [`TesterFactory`] pair a callable
//!   with its arguments behind one execute operation
//! - [`Guard`] creates a resource, tests it, and releases it unless the tester
//!   hands it back

pub use callkit_config::{CallkitConfig, ConfigError, GuardConfig};
pub use callkit_core::{
    ActionFactory, CancelPolicy, CancellationToken, Completion, ErasedFn, FuncFactory,
    InvokeCancellable, TesterFactory,
};
pub use callkit_guard::{Guard, Owned, PassThrough, Release};
pub use callkit_types::{
    ArgSlot, ArgTuple, Args, CallShape, CallableInfo, Describe, Invoke, InvokeError, InvokeOnce,
    InvokeTester, MAX_ARITY, PushFront, SlotValues, args, validate,
};
