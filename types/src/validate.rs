//! Boundary guards.
//!
//! Plain free functions run at the top of public constructors. They fail fast
//! and leave no partial side effects behind.

use std::fmt::Debug;
use std::ops::RangeBounds;

use crate::error::InvokeError;

/// Unwrap a required value or fail with [`InvokeError::NullArgument`].
pub fn require<T>(value: Option<T>, name: &'static str) -> Result<T, InvokeError> {
    value.ok_or(InvokeError::NullArgument { name })
}

/// Fail with [`InvokeError::InvalidArgument`] unless `condition` holds.
pub fn ensure(
    condition: bool,
    name: &'static str,
    reason: impl FnOnce() -> String,
) -> Result<(), InvokeError> {
    if condition {
        Ok(())
    } else {
        Err(InvokeError::InvalidArgument {
            name,
            reason: reason(),
        })
    }
}

pub fn ensure_in_range<T, B>(value: T, range: B, name: &'static str) -> Result<T, InvokeError>
where
    T: PartialOrd + Debug,
    B: RangeBounds<T> + Debug,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(InvokeError::InvalidArgument {
            name,
            reason: format!("{value:?} is outside {range:?}"),
        })
    }
}
