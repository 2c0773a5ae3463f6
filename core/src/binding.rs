//! Shared skeleton of every wrapper variant: the callable, its argument
//! tuple, and the lazily resolved descriptor.

use std::cell::OnceCell;
use std::sync::Arc;

use callkit_types::{Args, CallShape, CallableInfo, Describe, InvokeError};

/// Descriptor cache. Resolved on first access and kept for the life of the
/// wrapper (and copied into clones).
#[derive(Clone)]
pub(crate) struct MetadataCell {
    describe: Describe,
    resolved: OnceCell<CallableInfo>,
}

impl MetadataCell {
    pub(crate) fn new(describe: Describe) -> Self {
        Self {
            describe,
            resolved: OnceCell::new(),
        }
    }

    pub(crate) fn get(&self) -> &CallableInfo {
        self.resolved.get_or_init(self.describe)
    }

    pub(crate) fn describe(&self) -> Describe {
        self.describe
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

pub(crate) struct Binding<F, T> {
    callable: Option<Arc<F>>,
    args: Args<T>,
    metadata: MetadataCell,
    shape: CallShape,
}

impl<F, T> Binding<F, T> {
    pub(crate) fn bound(callable: F, args: Args<T>, describe: Describe, shape: CallShape) -> Self {
        Self {
            callable: Some(Arc::new(callable)),
            args,
            metadata: MetadataCell::new(describe),
            shape,
        }
    }

    pub(crate) fn unbound(args: Args<T>, describe: Describe, shape: CallShape) -> Self {
        Self {
            callable: None,
            args,
            metadata: MetadataCell::new(describe),
            shape,
        }
    }

    pub(crate) fn has_callable(&self) -> bool {
        self.callable.is_some()
    }

    pub(crate) fn callable(&self) -> Result<&F, InvokeError> {
        self.callable
            .as_deref()
            .ok_or(InvokeError::NoCallable { shape: self.shape })
    }

    /// Split into callable and arguments for a consuming call.
    pub(crate) fn into_parts(self) -> Result<(Arc<F>, Args<T>), InvokeError> {
        match self.callable {
            Some(callable) => Ok((callable, self.args)),
            None => Err(InvokeError::NoCallable { shape: self.shape }),
        }
    }

    pub(crate) fn shape(&self) -> CallShape {
        self.shape
    }

    pub(crate) fn set_shape(&mut self, shape: CallShape) {
        self.shape = shape;
    }

    pub(crate) fn args(&self) -> &Args<T> {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut Args<T> {
        &mut self.args
    }

    pub(crate) fn metadata(&self) -> &CallableInfo {
        self.metadata.get()
    }

    pub(crate) fn metadata_cell(&self) -> &MetadataCell {
        &self.metadata
    }

    /// Describe a different callable than the one stored. Drops any
    /// descriptor resolved so far.
    pub(crate) fn set_origin(&mut self, describe: Describe) {
        self.metadata = MetadataCell::new(describe);
    }
}

impl<F, T: Clone> Clone for Binding<F, T> {
    fn clone(&self) -> Self {
        Self {
            callable: self.callable.clone(),
            args: self.args.clone(),
            metadata: self.metadata.clone(),
            shape: self.shape,
        }
    }
}
