//! Guarded resource initialization for callkit.
//!
//! A [`Guard`] creates a resource, runs a tester against it, and releases the
//! resource on every path except the one where the tester hands it back to
//! the caller. Ownership moves through [`Owned`], so a resource can only be
//! released once.

mod guard;
mod owned;

pub use callkit_config::GuardConfig;
pub use guard::{Guard, PassThrough};
pub use owned::{Owned, Release};
