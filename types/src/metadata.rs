//! Diagnostic descriptors for wrapped callables.

use std::any;
use std::fmt;

use crate::args::ArgTuple;

/// Lazily-invoked constructor for a [`CallableInfo`].
///
/// Stored as a plain fn pointer so a wrapper can remember *which* callable it
/// describes without resolving anything until the descriptor is asked for.
pub type Describe = fn() -> CallableInfo;

/// Name and signature information for a callable.
///
/// Built from compiler type names, so closures report the enclosing function
/// (`my_crate::open_pool::{{closure}}`) and fn items their full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableInfo {
    type_name: &'static str,
    declaring: &'static str,
    member: &'static str,
    parameters: Vec<&'static str>,
    output: &'static str,
}

impl CallableInfo {
    /// Describe callable `F` invoked with tuple `T` and returning `Out`.
    #[must_use]
    pub fn of<F: ?Sized, T: ArgTuple, Out: ?Sized>() -> Self {
        let type_name = any::type_name::<F>();
        let (declaring, member) = split_path(type_name);
        Self {
            type_name,
            declaring,
            member,
            parameters: T::parameter_types(),
            output: any::type_name::<Out>(),
        }
    }

    /// Full compiler type name of the callable.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Everything before the last path segment (module, impl, or enclosing fn).
    #[must_use]
    pub fn declaring_type(&self) -> &'static str {
        self.declaring
    }

    #[must_use]
    pub fn member_name(&self) -> &'static str {
        self.member
    }

    #[must_use]
    pub fn parameters(&self) -> &[&'static str] {
        &self.parameters
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn output(&self) -> &'static str {
        self.output
    }

    /// True when the callable is a closure rather than a named fn item.
    #[must_use]
    pub fn is_closure(&self) -> bool {
        self.member.starts_with("{{closure")
    }
}

impl fmt::Display for CallableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.declaring.is_empty() {
            write!(f, "{}::", self.declaring)?;
        }
        write!(f, "{}(", self.member)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param)?;
        }
        write!(f, ") -> {}", self.output)
    }
}

/// Split at the last `::` that is not nested inside generic brackets.
fn split_path(path: &'static str) -> (&'static str, &'static str) {
    let bytes = path.as_bytes();
    let mut depth = 0_usize;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    match split {
        Some(at) => (&path[..at], &path[at + 2..]),
        None => ("", path),
    }
}
