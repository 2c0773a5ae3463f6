//! Value-returning callable wrapper.

use std::fmt;
use std::future::Future;

use callkit_types::{
    ArgTuple, Args, CallShape, CallableInfo, Describe, Invoke, InvokeError, validate,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::binding::Binding;
use crate::cancellable::{CancelPolicy, InvokeCancellable};

/// Boxed zero-argument adapter produced by [`FuncFactory::erase`].
pub type ErasedFn<Out> = Box<dyn Fn() -> Out + Send + Sync>;

/// A value-returning callable paired with the arguments it will be called with.
///
/// Not internally synchronized: the descriptor cache is a `OnceCell`, so a
/// wrapper is `!Sync`. Use [`Clone`] to get an independent copy (shared
/// callable, cloned tuple) for another thread.
pub struct FuncFactory<F, T> {
    pub(crate) binding: Binding<F, T>,
}

impl<F, T> FuncFactory<F, T> {
    pub(crate) fn from_binding(binding: Binding<F, T>) -> Self {
        Self { binding }
    }

    pub(crate) fn relabel(mut self, shape: CallShape) -> Self {
        self.binding.set_shape(shape);
        self
    }

    #[must_use]
    pub fn has_callable(&self) -> bool {
        self.binding.has_callable()
    }

    #[must_use]
    pub fn args(&self) -> &Args<T> {
        self.binding.args()
    }

    /// Re-bind argument values before the next call.
    pub fn args_mut(&mut self) -> &mut Args<T> {
        self.binding.args_mut()
    }

    /// Descriptor of the callable this wrapper represents. Resolved on first
    /// call and cached.
    #[must_use]
    pub fn metadata(&self) -> &CallableInfo {
        self.binding.metadata()
    }

    /// Report `describe`'s callable in diagnostics instead of the stored one.
    ///
    /// Used when the stored callable is an adapter around the user's original.
    pub fn with_origin(mut self, describe: Describe) -> Self {
        self.binding.set_origin(describe);
        self
    }
}

impl<F, T: ArgTuple> FuncFactory<F, T> {
    #[must_use]
    pub fn arity(&self) -> usize {
        T::ARITY
    }
}

impl<F, T> FuncFactory<F, T>
where
    F: Invoke<T>,
    T: ArgTuple,
{
    pub fn new(callable: F, args: Args<T>) -> Self {
        Self {
            binding: Binding::bound(
                callable,
                args,
                CallableInfo::of::<F, T, <F as Invoke<T>>::Output>,
                CallShape::Function,
            ),
        }
    }

    pub fn try_new(callable: Option<F>, args: Args<T>) -> Result<Self, InvokeError> {
        let callable = validate::require(callable, "callable")?;
        Ok(Self::new(callable, args))
    }

    /// A wrapper with no callable. Every execute fails with `NoCallable`.
    pub fn empty(args: Args<T>) -> Self {
        Self {
            binding: Binding::unbound(
                args,
                CallableInfo::of::<F, T, <F as Invoke<T>>::Output>,
                CallShape::Function,
            ),
        }
    }

    /// Call with a copy of the current slot values. The tuple stays bound.
    pub fn execute(&self) -> Result<<F as Invoke<T>>::Output, InvokeError>
    where
        T: Clone,
    {
        let callable = self.binding.callable()?;
        trace!(
            callable = %self.metadata(),
            shape = %self.binding.shape(),
            arity = T::ARITY,
            "executing callable"
        );
        Ok(callable.invoke(self.binding.args().slots().clone()))
    }

    /// Call by moving the slot values out. No `Clone` bound on the tuple.
    pub fn into_execute(self) -> Result<<F as Invoke<T>>::Output, InvokeError> {
        if self.has_callable() {
            trace!(
                callable = %self.metadata(),
                shape = %self.binding.shape(),
                arity = T::ARITY,
                "executing callable"
            );
        }
        let (callable, args) = self.binding.into_parts()?;
        Ok(Invoke::invoke(&*callable, args.into_inner()))
    }

    /// Like [`execute`](Self::execute) for callables returning `Result`.
    /// The callable's own error is returned unchanged.
    pub fn try_execute<V, E>(&self) -> Result<V, E>
    where
        F: Invoke<T, Output = Result<V, E>>,
        E: From<InvokeError>,
        T: Clone,
    {
        self.execute()?
    }

    pub fn try_into_execute<V, E>(self) -> Result<V, E>
    where
        F: Invoke<T, Output = Result<V, E>>,
        E: From<InvokeError>,
    {
        self.into_execute()?
    }
}

impl<F, T> FuncFactory<F, T>
where
    F: Invoke<T> + Send + Sync + 'static,
    <F as Invoke<T>>::Output: 'static,
    T: ArgTuple + Clone + Send + Sync + 'static,
{
    /// Erase the arity: returns a zero-argument wrapper over an adapter that
    /// captures this wrapper's callable and tuple.
    ///
    /// The adapter's own shape says nothing useful, so the returned wrapper
    /// keeps describing the original callable.
    pub fn erase(self) -> FuncFactory<ErasedFn<<F as Invoke<T>>::Output>, ()> {
        let describe = self.binding.metadata_cell().describe();
        match self.binding.into_parts() {
            Ok((callable, args)) => {
                let adapter: ErasedFn<<F as Invoke<T>>::Output> =
                    Box::new(move || Invoke::invoke(&*callable, args.slots().clone()));
                FuncFactory::new(adapter, Args::new(())).with_origin(describe)
            }
            Err(_) => FuncFactory::empty(Args::new(())).with_origin(describe),
        }
    }
}

impl<F, T, Fut> FuncFactory<F, T>
where
    F: InvokeCancellable<T, Output = Fut>,
    Fut: Future,
    T: ArgTuple,
{
    pub fn new_async(callable: F, args: Args<T>) -> Self {
        Self {
            binding: Binding::bound(
                callable,
                args,
                CallableInfo::of::<F, T, Fut::Output>,
                CallShape::Function,
            ),
        }
    }

    pub fn try_new_async(callable: Option<F>, args: Args<T>) -> Result<Self, InvokeError> {
        let callable = validate::require(callable, "callable")?;
        Ok(Self::new_async(callable, args))
    }

    pub fn empty_async(args: Args<T>) -> Self {
        Self {
            binding: Binding::unbound(
                args,
                CallableInfo::of::<F, T, Fut::Output>,
                CallShape::Function,
            ),
        }
    }

    /// Await the callable with a copy of the current slots. Refuses to start
    /// on an already-cancelled token.
    pub async fn execute_async(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Fut::Output, InvokeError>
    where
        T: Clone,
    {
        self.execute_async_with(CancelPolicy::RefuseIfCanceled, cancel).await
    }

    pub async fn execute_async_with(
        &self,
        policy: CancelPolicy,
        cancel: &CancellationToken,
    ) -> Result<Fut::Output, InvokeError>
    where
        T: Clone,
    {
        let callable = self.binding.callable()?;
        if policy.refuses(cancel) {
            debug!(
                callable = %self.metadata(),
                "token cancelled before start; not invoking"
            );
            return Err(InvokeError::Canceled);
        }
        trace!(
            callable = %self.metadata(),
            shape = %self.binding.shape(),
            arity = T::ARITY,
            "executing async callable"
        );
        let fut =
            callable.invoke_cancellable(self.binding.args().slots().clone(), cancel.clone());
        Ok(fut.await)
    }

    pub async fn into_execute_async_with(
        self,
        policy: CancelPolicy,
        cancel: &CancellationToken,
    ) -> Result<Fut::Output, InvokeError> {
        if self.has_callable() && policy.refuses(cancel) {
            debug!(
                callable = %self.metadata(),
                "token cancelled before start; not invoking"
            );
            return Err(InvokeError::Canceled);
        }
        if self.has_callable() {
            trace!(
                callable = %self.metadata(),
                shape = %self.binding.shape(),
                arity = T::ARITY,
                "executing async callable"
            );
        }
        let (callable, args) = self.binding.into_parts()?;
        let fut =
            InvokeCancellable::invoke_cancellable(&*callable, args.into_inner(), cancel.clone());
        Ok(fut.await)
    }

    pub async fn try_execute_async<V, E>(&self, cancel: &CancellationToken) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>>,
        E: From<InvokeError>,
        T: Clone,
    {
        self.execute_async(cancel).await?
    }

    pub async fn try_into_execute_async_with<V, E>(
        self,
        policy: CancelPolicy,
        cancel: &CancellationToken,
    ) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>>,
        E: From<InvokeError>,
    {
        self.into_execute_async_with(policy, cancel).await?
    }
}

impl<F, T: Clone> Clone for FuncFactory<F, T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<F, T> fmt::Debug for FuncFactory<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncFactory")
            .field("has_callable", &self.binding.has_callable())
            .field("metadata_resolved", &self.binding.metadata_cell().is_resolved())
            .finish_non_exhaustive()
    }
}
