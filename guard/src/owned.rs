//! Single-owner slot for a releasable resource.

use std::any::type_name;
use std::fmt;
use std::fs::File;
use std::ops::{Deref, DerefMut};

use tempfile::{NamedTempFile, TempDir};
use tracing::{trace, warn};

/// Explicit teardown for a resource handed through a guard.
///
/// Implementations must not panic. Close failures are logged, not returned:
/// release runs on error paths where there is nobody left to report to.
pub trait Release {
    fn release(self);
}

impl Release for File {
    fn release(self) {
        if let Err(err) = self.sync_all() {
            warn!(error = %err, "failed to sync file on release");
        }
    }
}

impl Release for NamedTempFile {
    fn release(self) {
        let path = self.path().to_path_buf();
        if let Err(err) = self.close() {
            warn!(path = %path.display(), error = %err, "failed to remove temp file");
        }
    }
}

impl Release for TempDir {
    fn release(self) {
        let path = self.path().to_path_buf();
        if let Err(err) = self.close() {
            warn!(path = %path.display(), error = %err, "failed to remove temp dir");
        }
    }
}

impl<R: Release> Release for Box<R> {
    fn release(self) {
        (*self).release();
    }
}

impl<R: Release> Release for Vec<R> {
    fn release(self) {
        for resource in self {
            resource.release();
        }
    }
}

/// The entity currently responsible for releasing `R`.
///
/// Dropping an `Owned` releases the resource. [`transfer`](Self::transfer)
/// is the only way to take it out without releasing it.
pub struct Owned<R: Release> {
    slot: Option<R>,
}

impl<R: Release> Owned<R> {
    pub fn new(resource: R) -> Self {
        Self {
            slot: Some(resource),
        }
    }

    /// Swap in `next` and release the resource previously held.
    pub fn replace(&mut self, next: R) {
        if let Some(previous) = self.slot.replace(next) {
            trace!(resource = type_name::<R>(), "releasing replaced resource");
            previous.release();
        }
    }

    /// Hand the resource to the caller. Nothing is released.
    #[must_use = "a transferred resource is no longer released automatically"]
    pub fn transfer(mut self) -> R {
        self.slot
            .take()
            .expect("Owned holds its resource until transfer")
    }

    /// Release now instead of at drop.
    pub fn release(self) {
        drop(self);
    }
}

impl<R: Release> Deref for Owned<R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.slot
            .as_ref()
            .expect("Owned holds its resource until transfer")
    }
}

impl<R: Release> DerefMut for Owned<R> {
    fn deref_mut(&mut self) -> &mut R {
        self.slot
            .as_mut()
            .expect("Owned holds its resource until transfer")
    }
}

impl<R: Release> Drop for Owned<R> {
    fn drop(&mut self) {
        if let Some(resource) = self.slot.take() {
            trace!(resource = type_name::<R>(), "releasing owned resource");
            resource.release();
        }
    }
}

impl<R: Release + fmt::Debug> fmt::Debug for Owned<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.slot).finish()
    }
}
