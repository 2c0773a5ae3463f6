//! "Try"-shaped callable wrapper.
//!
//! A tester callable reports success through its return value and writes the
//! produced value through a trailing `&mut R`, the shape of a try-parse. The
//! wrapper turns that into a plain `(success, value)` pair.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use callkit_types::{
    ArgTuple, Args, CallShape, CallableInfo, Describe, InvokeError, InvokeTester, validate,
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::binding::Binding;
use crate::cancellable::{CancelPolicy, InvokeCancellable};
use crate::func::FuncFactory;

pub struct TesterFactory<F, T, R, S = bool> {
    inner: FuncFactory<F, T>,
    _out: PhantomData<fn() -> (S, R)>,
}

impl<F, T, R, S> TesterFactory<F, T, R, S> {
    fn wrap(binding: Binding<F, T>) -> Self {
        Self {
            inner: FuncFactory::from_binding(binding),
            _out: PhantomData,
        }
    }

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
            _out: PhantomData,
        }
    }
}

impl<F, T, R, S> TesterFactory<F, T, R, S>
where
    F: InvokeTester<T, R, S>,
    T: ArgTuple,
{
    pub fn new(callable: F, args: Args<T>) -> Self {
        Self::wrap(Binding::bound(
            callable,
            args,
            CallableInfo::of::<F, T, (S, R)>,
            CallShape::Tester,
        ))
    }

    pub fn try_new(callable: Option<F>, args: Args<T>) -> Result<Self, InvokeError> {
        let callable = validate::require(callable, "callable")?;
        Ok(Self::new(callable, args))
    }

    pub fn empty(args: Args<T>) -> Self {
        Self::wrap(Binding::unbound(
            args,
            CallableInfo::of::<F, T, (S, R)>,
            CallShape::Tester,
        ))
    }

    /// Run the tester against a fresh `R::default()` and return both the
    /// success indicator and whatever the tester wrote.
    pub fn execute(&self) -> Result<(S, R), InvokeError>
    where
        R: Default,
        T: Clone,
    {
        let binding = &self.inner.binding;
        let callable = binding.callable()?;
        trace!(callable = %self.metadata(), arity = T::ARITY, "executing tester");
        let mut out = R::default();
        let success = callable.invoke_tester(binding.args().slots().clone(), &mut out);
        Ok((success, out))
    }

    pub fn into_execute(self) -> Result<(S, R), InvokeError>
    where
        R: Default,
    {
        if self.has_callable() {
            trace!(callable = %self.metadata(), arity = T::ARITY, "executing tester");
        }
        let (callable, args) = self.inner.binding.into_parts()?;
        let mut out = R::default();
        let success = InvokeTester::invoke_tester(&*callable, args.into_inner(), &mut out);
        Ok((success, out))
    }
}

impl<F, T, R> TesterFactory<F, T, R, bool>
where
    F: InvokeTester<T, R, bool>,
    T: ArgTuple,
{
    /// `Some(value)` when the tester reports success, `None` otherwise.
    pub fn execute_checked(&self) -> Result<Option<R>, InvokeError>
    where
        R: Default,
        T: Clone,
    {
        let (success, value) = self.execute()?;
        Ok(success.then_some(value))
    }
}

impl<F, T, R, S, Fut> TesterFactory<F, T, R, S>
where
    F: InvokeCancellable<T, Output = Fut>,
    Fut: Future<Output = (S, R)>,
    T: ArgTuple,
{
    /// Asynchronous testers cannot hold a `&mut R` across an await, so they
    /// return the `(success, value)` pair directly.
    pub fn new_async(callable: F, args: Args<T>) -> Self {
        Self::wrap(Binding::bound(
            callable,
            args,
            CallableInfo::of::<F, T, (S, R)>,
            CallShape::Tester,
        ))
    }

    pub fn try_new_async(callable: Option<F>, args: Args<T>) -> Result<Self, InvokeError> {
        let callable = validate::require(callable, "callable")?;
        Ok(Self::new_async(callable, args))
    }

    pub fn empty_async(args: Args<T>) -> Self {
        Self::wrap(Binding::unbound(
            args,
            CallableInfo::of::<F, T, (S, R)>,
            CallShape::Tester,
        ))
    }

    pub async fn execute_async(&self, cancel: &CancellationToken) -> Result<(S, R), InvokeError>
    where
        T: Clone,
    {
        self.inner.execute_async(cancel).await
    }

    pub async fn into_execute_async_with(
        self,
        policy: CancelPolicy,
        cancel: &CancellationToken,
    ) -> Result<(S, R), InvokeError> {
        self.inner.into_execute_async_with(policy, cancel).await
    }
}

impl<F, T: Clone, R, S> Clone for TesterFactory<F, T, R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _out: PhantomData,
        }
    }
}

impl<F, T, R, S> fmt::Debug for TesterFactory<F, T, R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TesterFactory")
            .field("has_callable", &self.has_callable())
            .finish_non_exhaustive()
    }
}
