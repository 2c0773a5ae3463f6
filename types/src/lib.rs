//! Core invocation types for callkit.
//!
//! This crate contains the argument-tuple carrier, the arity-generic
//! invocation traits, callable descriptors, and the error taxonomy. No IO, no
//! async; wrappers and the guarded initializer live in downstream crates.

pub mod args;
mod error;
pub mod invoke;
mod metadata;
pub mod validate;

pub use args::{ArgSlot, ArgTuple, Args, MAX_ARITY, PushFront, SlotValues};
pub use error::{CallShape, InvokeError};
pub use invoke::{Invoke, InvokeOnce, InvokeTester};
pub use metadata::{CallableInfo, Describe};
