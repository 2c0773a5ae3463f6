//! Callable wrappers for callkit.
//!
//! A wrapper pairs a callable with the [`Args`](callkit_types::Args) it will
//! be invoked with and exposes one execute operation regardless of arity.
//! Three shapes are provided:
//!
//! - [`ActionFactory`] for callables run only for their side effect
//! - [`FuncFactory`] for value-returning callables
//! - [`TesterFactory`] for "try"-shaped callables that write through `&mut R`
//!
//! Each has an asynchronous form whose callable takes a trailing
//! [`CancellationToken`].

mod action;
mod binding;
mod cancellable;
mod func;
mod tester;

pub use action::{ActionFactory, Completion};
pub use cancellable::{CancelPolicy, InvokeCancellable};
pub use func::{ErasedFn, FuncFactory};
pub use tester::TesterFactory;
pub use tokio_util::sync::CancellationToken;
