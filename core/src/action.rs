//! Fire-and-forget callable wrapper.

use std::fmt;
use std::future::Future;

use callkit_types::{
    ArgTuple, Args, CallShape, CallableInfo, Describe, Invoke, InvokeError, validate,
};
use tokio_util::sync::CancellationToken;

use crate::binding::Binding;
use crate::cancellable::{CancelPolicy, InvokeCancellable};
use crate::func::{ErasedFn, FuncFactory};

mod sealed {
    pub trait Sealed {}
    impl Sealed for () {}
    impl<E> Sealed for Result<(), E> {}
}

/// Outputs an action may produce: nothing, or a unit `Result`.
pub trait Completion: sealed::Sealed {}

impl Completion for () {}
impl<E> Completion for Result<(), E> {}

/// A callable run only for its side effect, paired with its arguments.
///
/// Shares the function wrapper's machinery; only the accepted callable shape
/// and the error label differ.
pub struct ActionFactory<F, T> {
    inner: FuncFactory<F, T>,
}

impl<F, T> ActionFactory<F, T> {
    #[must_use]
    pub fn has_callable(&self) -> bool {
        self.inner.has_callable()
    }

    #[must_use]
    pub fn args(&self) -> &Args<T> {
        self.inner.args()
    }

    pub fn args_mut(&mut self) -> &mut Args<T> {
        self.inner.args_mut()
    }

    #[must_use]
    pub fn metadata(&self) -> &CallableInfo {
        self.inner.metadata()
    }

    pub fn with_origin(self, describe: Describe) -> Self {
        Self {
            inner: self.inner.with_origin(describe),
        }
    }
}

impl<F, T: ArgTuple> ActionFactory<F, T> {
    #[must_use]
    pub fn arity(&self) -> usize {
        T::ARITY
    }
}

impl<F, T> ActionFactory<F, T>
where
    F: Invoke<T>,
    <F as Invoke<T>>::Output: Completion,
    T: ArgTuple,
{
    pub fn new(callable: F, args: Args<T>) -> Self {
        let describe = CallableInfo::of::<F, T, <F as Invoke<T>>::Output>;
        Self {
            inner: FuncFactory::from_binding(Binding::bound(
                callable,
                args,
                describe,
                CallShape::Action,
            )),
        }
    }

    pub fn try_new(callable: Option<F>, args: Args<T>) -> Result<Self, InvokeError> {
        let callable = validate::require(callable, "callable")?;
        Ok(Self::new(callable, args))
    }

    pub fn empty(args: Args<T>) -> Self {
        let describe = CallableInfo::of::<F, T, <F as Invoke<T>>::Output>;
        Self {
            inner: FuncFactory::from_binding(Binding::unbound(args, describe, CallShape::Action)),
        }
    }

    pub fn execute(&self) -> Result<(), InvokeError>
    where
        F: Invoke<T, Output = ()>,
        T: Clone,
    {
        self.inner.execute()
    }

    pub fn into_execute(self) -> Result<(), InvokeError>
    where
        F: Invoke<T, Output = ()>,
    {
        self.inner.into_execute()
    }

    pub fn try_execute<E>(&self) -> Result<(), E>
    where
        F: Invoke<T, Output = Result<(), E>>,
        E: From<InvokeError>,
        T: Clone,
    {
        self.inner.try_execute()
    }

    pub fn try_into_execute<E>(self) -> Result<(), E>
    where
        F: Invoke<T, Output = Result<(), E>>,
        E: From<InvokeError>,
    {
        self.inner.try_into_execute()
    }
}

impl<F, T> ActionFactory<F, T>
where
    F: Invoke<T> + Send + Sync + 'static,
    <F as Invoke<T>>::Output: Completion + 'static,
    T: ArgTuple + Clone + Send + Sync + 'static,
{
    /// Zero-argument form that keeps describing the original callable.
    pub fn erase(self) -> ActionFactory<ErasedFn<<F as Invoke<T>>::Output>, ()> {
        ActionFactory {
            inner: self.inner.erase().relabel(CallShape::Action),
        }
    }
}

impl<F, T, Fut> ActionFactory<F, T>
where
    F: InvokeCancellable<T, Output = Fut>,
    Fut: Future,
    Fut::Output: Completion,
    T: ArgTuple,
{
    pub fn new_async(callable: F, args: Args<T>) -> Self {
        let describe = CallableInfo::of::<F, T, Fut::Output>;
        Self {
            inner: FuncFactory::from_binding(Binding::bound(
                callable,
                args,
                describe,
                CallShape::Action,
            )),
        }
    }

    pub fn try_new_async(callable: Option<F>, args: Args<T>) -> Result<Self, InvokeError> {
        let callable = validate::require(callable, "callable")?;
        Ok(Self::new_async(callable, args))
    }

    pub fn empty_async(args: Args<T>) -> Self {
        let describe = CallableInfo::of::<F, T, Fut::Output>;
        Self {
            inner: FuncFactory::from_binding(Binding::unbound(args, describe, CallShape::Action)),
        }
    }

    pub async fn execute_async(&self, cancel: &CancellationToken) -> Result<(), InvokeError>
    where
        Fut: Future<Output = ()>,
        T: Clone,
    {
        self.inner.execute_async(cancel).await
    }

    pub async fn try_execute_async<E>(&self, cancel: &CancellationToken) -> Result<(), E>
    where
        Fut: Future<Output = Result<(), E>>,
        E: From<InvokeError>,
        T: Clone,
    {
        self.inner.try_execute_async(cancel).await
    }

    pub async fn try_into_execute_async_with<E>(
        self,
        policy: CancelPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), E>
    where
        Fut: Future<Output = Result<(), E>>,
        E: From<InvokeError>,
    {
        self.inner.try_into_execute_async_with(policy, cancel).await
    }
}

impl<F, T: Clone> Clone for ActionFactory<F, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F, T> fmt::Debug for ActionFactory<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionFactory")
            .field("has_callable", &self.has_callable())
            .finish_non_exhaustive()
    }
}
