//! Cooperative cancellation for asynchronous callables.
//!
//! An asynchronous callable takes its regular arguments followed by a
//! [`CancellationToken`] and returns a future. Cancellation is advisory: the
//! wrapper never interrupts a running future, it only decides whether to
//! start one.

use tokio_util::sync::CancellationToken;

/// Invoke an asynchronous callable whose last parameter is a
/// [`CancellationToken`].
pub trait InvokeCancellable<Args> {
    type Output;

    fn invoke_cancellable(&self, args: Args, cancel: CancellationToken) -> Self::Output;
}

/// What a wrapper does with a token that is already cancelled at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Do not start the callable; report `InvokeError::Canceled`.
    #[default]
    RefuseIfCanceled,
    /// Start the callable anyway and let it observe the token itself.
    DeferToCallable,
}

impl CancelPolicy {
    #[must_use]
    pub fn refuses(self, cancel: &CancellationToken) -> bool {
        matches!(self, Self::RefuseIfCanceled) && cancel.is_cancelled()
    }
}

macro_rules! impl_invoke_cancellable {
    ($($name:ident),*) => {
        impl<Func, Fut, $($name),*> InvokeCancellable<($($name,)*)> for Func
        where
            Func: Fn($($name,)* CancellationToken) -> Fut,
        {
            type Output = Fut;

            #[allow(non_snake_case)]
            fn invoke_cancellable(&self, ($($name,)*): ($($name,)*), cancel: CancellationToken) -> Fut {
                self($($name,)* cancel)
            }
        }
    };
}

impl_invoke_cancellable!();
impl_invoke_cancellable!(A);
impl_invoke_cancellable!(A, B);
impl_invoke_cancellable!(A, B, C);
impl_invoke_cancellable!(A, B, C, D);
impl_invoke_cancellable!(A, B, C, D, E);
impl_invoke_cancellable!(A, B, C, D, E, F);
impl_invoke_cancellable!(A, B, C, D, E, F, G);
impl_invoke_cancellable!(A, B, C, D, E, F, G, H);
impl_invoke_cancellable!(A, B, C, D, E, F, G, H, I);
impl_invoke_cancellable!(A, B, C, D, E, F, G, H, I, J);
impl_invoke_cancellable!(A, B, C, D, E, F, G, H, I, J, K);
impl_invoke_cancellable!(A, B, C, D, E, F, G, H, I, J, K, L);
