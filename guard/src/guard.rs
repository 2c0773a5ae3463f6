//! The guarded initialization protocol.
//!
//! `initializer` creates a candidate, `tester` inspects it and returns the
//! [`Owned`] that is now responsible for it, and the guard hands the final
//! value to the caller. Any exit that does not reach the hand-off drops the
//! `Owned` still in flight, which releases the resource.

use std::any::type_name;
use std::future::Future;

use callkit_config::{CallkitConfig, GuardConfig};
use callkit_core::{ActionFactory, CancelPolicy, FuncFactory, InvokeCancellable};
use callkit_types::{ArgTuple, Args, Invoke, InvokeError, InvokeOnce, PushFront};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::owned::{Owned, Release};

/// Argument tuple `X` with `H` pushed in front.
type Slots<X, H> = <X as PushFront<H>>::Output;

/// Extra arguments forwarded to both tester and catcher. Up to five.
pub trait PassThrough: ArgTuple + Clone {}

macro_rules! impl_pass_through {
    ($($name:ident),*) => {
        impl<$($name: Clone),*> PassThrough for ($($name,)*) {}
    };
}

impl_pass_through!();
impl_pass_through!(A);
impl_pass_through!(A, B);
impl_pass_through!(A, B, C);
impl_pass_through!(A, B, C, D);
impl_pass_through!(A, B, C, D, E);

/// One guarded initialization, configured and then consumed by a `run*` call.
///
/// ```ignore
/// let file = Guard::new(|| tempfile::NamedTempFile::new().map_err(AppError::from))
///     .extra(args!(header))
///     .run(|mut file: Owned<NamedTempFile>, header: String| {
///         file.write_all(header.as_bytes())?;
///         Ok(file)
///     })?;
/// ```
#[derive(Debug, Clone)]
pub struct Guard<I, X = ()> {
    initializer: I,
    extra: Args<X>,
    config: GuardConfig,
}

impl<I> Guard<I> {
    pub fn new(initializer: I) -> Self {
        Self {
            initializer,
            extra: Args::new(()),
            config: GuardConfig::default(),
        }
    }
}

impl<I, X> Guard<I, X> {
    /// Arguments passed to the tester after the candidate and to the catcher
    /// after the error.
    pub fn extra<Y: PassThrough>(self, extra: Args<Y>) -> Guard<I, Y> {
        Guard {
            initializer: self.initializer,
            extra,
            config: self.config,
        }
    }

    pub fn config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    /// Take the `[guard]` table of a loaded config file, or its defaults.
    ///
    /// Nothing here reads the file; pass the result of
    /// [`CallkitConfig::load`] or [`CallkitConfig::load_from`].
    pub fn config_from(self, config: &CallkitConfig) -> Self {
        self.config(config.guard())
    }
}

impl<I, X: PassThrough> Guard<I, X> {
    /// Run the protocol. Errors from `initializer` or `tester` propagate
    /// unchanged after the candidate has been released.
    pub fn run<R, E, T>(self, tester: T) -> Result<R, E>
    where
        I: InvokeOnce<(), Output = Result<R, E>>,
        R: Release,
        X: PushFront<Owned<R>>,
        Slots<X, Owned<R>>: ArgTuple,
        T: Invoke<Slots<X, Owned<R>>, Output = Result<Owned<R>, E>>,
        E: From<InvokeError>,
    {
        let Self {
            initializer,
            extra,
            config,
        } = self;

        let candidate = create(initializer)?;
        let tester = FuncFactory::new(tester, extra.push_front(candidate));
        let lifecycle = Lifecycle::new(config, || tester.metadata().to_string());
        lifecycle.created::<R>();

        let outcome = tester.try_into_execute();
        lifecycle.finish(outcome)
    }

    /// Like [`run`](Self::run), but an error is passed to `catcher` and the
    /// caller gets `Ok(None)`. Only the catcher's own failure escapes.
    pub fn run_or_catch<R, E, T, C>(self, tester: T, catcher: C) -> Result<Option<R>, E>
    where
        I: InvokeOnce<(), Output = Result<R, E>>,
        R: Release,
        X: PushFront<Owned<R>> + PushFront<E>,
        Slots<X, Owned<R>>: ArgTuple,
        Slots<X, E>: ArgTuple,
        T: Invoke<Slots<X, Owned<R>>, Output = Result<Owned<R>, E>>,
        C: Invoke<Slots<X, E>, Output = Result<(), E>>,
        E: From<InvokeError>,
    {
        let extra = self.extra.clone();
        let config = self.config;
        match self.run(tester) {
            Ok(resource) => Ok(Some(resource)),
            Err(err) => {
                let catcher = ActionFactory::new(catcher, extra.push_front(err));
                let label = config.trace_metadata.then(|| catcher.metadata().to_string());
                catcher.try_into_execute()?;
                debug!(catcher = label.as_deref(), "guard error handled");
                Ok(None)
            }
        }
    }

    /// Asynchronous form. The tester receives `cancel` as its last argument.
    ///
    /// By default a cancelled token is left for the tester to observe. With
    /// `fail_fast_on_cancel` the tester is not started and the candidate is
    /// released straight away.
    pub async fn run_async<R, E, T, Fut>(
        self,
        tester: T,
        cancel: &CancellationToken,
    ) -> Result<R, E>
    where
        I: InvokeOnce<(), Output = Result<R, E>>,
        R: Release,
        X: PushFront<Owned<R>>,
        Slots<X, Owned<R>>: ArgTuple,
        T: InvokeCancellable<Slots<X, Owned<R>>, Output = Fut>,
        Fut: Future<Output = Result<Owned<R>, E>>,
        E: From<InvokeError>,
    {
        let Self {
            initializer,
            extra,
            config,
        } = self;

        let candidate = create(initializer)?;
        let tester = FuncFactory::new_async(tester, extra.push_front(candidate));
        let lifecycle = Lifecycle::new(config, || tester.metadata().to_string());
        lifecycle.created::<R>();

        let policy = if config.fail_fast_on_cancel {
            CancelPolicy::RefuseIfCanceled
        } else {
            CancelPolicy::DeferToCallable
        };
        let outcome = tester.try_into_execute_async_with(policy, cancel).await;
        lifecycle.finish(outcome)
    }

    /// Asynchronous [`run_or_catch`](Self::run_or_catch). The catcher always
    /// runs, even on a cancelled token, so cancellation is reported as
    /// handled rather than escaping.
    pub async fn run_async_or_catch<R, E, T, Fut, C, CFut>(
        self,
        tester: T,
        catcher: C,
        cancel: &CancellationToken,
    ) -> Result<Option<R>, E>
    where
        I: InvokeOnce<(), Output = Result<R, E>>,
        R: Release,
        X: PushFront<Owned<R>> + PushFront<E>,
        Slots<X, Owned<R>>: ArgTuple,
        Slots<X, E>: ArgTuple,
        T: InvokeCancellable<Slots<X, Owned<R>>, Output = Fut>,
        Fut: Future<Output = Result<Owned<R>, E>>,
        C: InvokeCancellable<Slots<X, E>, Output = CFut>,
        CFut: Future<Output = Result<(), E>>,
        E: From<InvokeError>,
    {
        let extra = self.extra.clone();
        let config = self.config;
        match self.run_async(tester, cancel).await {
            Ok(resource) => Ok(Some(resource)),
            Err(err) => {
                let catcher = ActionFactory::new_async(catcher, extra.push_front(err));
                let label = config.trace_metadata.then(|| catcher.metadata().to_string());
                catcher
                    .try_into_execute_async_with(CancelPolicy::DeferToCallable, cancel)
                    .await?;
                debug!(
                    catcher = label.as_deref(),
                    cancelled = cancel.is_cancelled(),
                    "guard error handled"
                );
                Ok(None)
            }
        }
    }
}

fn create<R, E>(initializer: impl InvokeOnce<(), Output = Result<R, E>>) -> Result<Owned<R>, E>
where
    R: Release,
{
    match initializer.invoke_once(()) {
        Ok(resource) => Ok(Owned::new(resource)),
        Err(err) => {
            debug!(
                resource = type_name::<R>(),
                "initializer failed; nothing to release"
            );
            Err(err)
        }
    }
}

/// Lifecycle events for one run, tagged with the tester when configured.
struct Lifecycle {
    tester: Option<String>,
}

impl Lifecycle {
    /// `describe` only runs when `trace_metadata` is on.
    fn new(config: GuardConfig, describe: impl FnOnce() -> String) -> Self {
        Self {
            tester: config.trace_metadata.then(describe),
        }
    }

    fn created<R>(&self) {
        debug!(
            tester = self.tester.as_deref(),
            resource = type_name::<R>(),
            "guard candidate created"
        );
    }

    fn finish<R: Release, E>(&self, outcome: Result<Owned<R>, E>) -> Result<R, E> {
        match outcome {
            Ok(owned) => {
                debug!(tester = self.tester.as_deref(), "guard resource transferred");
                Ok(owned.transfer())
            }
            Err(err) => {
                debug!(
                    tester = self.tester.as_deref(),
                    "guard tester failed; candidate released"
                );
                Err(err)
            }
        }
    }
}
