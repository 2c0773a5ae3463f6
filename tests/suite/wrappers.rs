//! Action, function and tester wrappers through the public facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use callkit::{
    ActionFactory, ArgTuple, CallShape, CallableInfo, CancellationToken, Describe, FuncFactory,
    Invoke, InvokeError, TesterFactory, args,
};
use futures_util::future::{Ready, ready};

fn scale(factor: u32, value: u32) -> u32 {
    factor * value
}

fn try_parse_percent(raw: &'static str, out: &mut u8) -> bool {
    match raw.trim_end_matches('%').parse::<u8>() {
        Ok(pct) if pct <= 100 => {
            *out = pct;
            true
        }
        _ => false,
    }
}

fn origin_of<F, T, Out>(_: &F) -> Describe
where
    F: Invoke<T, Output = Out>,
    T: ArgTuple,
{
    CallableInfo::of::<F, T, Out>
}

#[test]
fn empty_wrappers_never_run_user_code() {
    let action = ActionFactory::<fn(u8), _>::empty(args!(1_u8));
    let func = FuncFactory::<fn(u8) -> u8, _>::empty(args!(1_u8));
    let tester = TesterFactory::<fn(&'static str, &mut u8) -> bool, _, u8>::empty(args!("1%"));

    assert_eq!(
        action.execute(),
        Err(InvokeError::NoCallable {
            shape: CallShape::Action
        })
    );
    assert_eq!(
        func.clone().into_execute(),
        Err(InvokeError::NoCallable {
            shape: CallShape::Function
        })
    );
    assert_eq!(
        tester.execute(),
        Err(InvokeError::NoCallable {
            shape: CallShape::Tester
        })
    );
}

#[tokio::test]
async fn empty_async_wrappers_never_run_user_code() {
    type Notify = fn(CancellationToken) -> Ready<()>;
    type Check = fn(CancellationToken) -> Ready<(bool, u8)>;

    let token = CancellationToken::new();

    let action = ActionFactory::<Notify, _>::empty_async(args!());
    assert_eq!(
        action.execute_async(&token).await,
        Err(InvokeError::NoCallable {
            shape: CallShape::Action
        })
    );

    let tester = TesterFactory::<Check, _, u8, bool>::empty_async(args!());
    assert_eq!(
        tester.execute_async(&token).await,
        Err(InvokeError::NoCallable {
            shape: CallShape::Tester
        })
    );
}

#[test]
fn tester_models_try_parse() {
    let mut tester = TesterFactory::new(try_parse_percent, args!("75%"));
    assert_eq!(tester.execute(), Ok((true, 75)));

    tester.args_mut().slots_mut().0 = "250%";
    assert_eq!(tester.execute(), Ok((false, 0)));
    assert_eq!(tester.metadata().member_name(), "try_parse_percent");
}

#[test]
fn clones_run_concurrently_without_interference() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let template = FuncFactory::new(
        move |factor: u32, value: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            scale(factor, value)
        },
        args!(2_u32, 0_u32),
    );

    let handles: Vec<_> = (1..=4_u32)
        .map(|value| {
            let mut copy = template.clone();
            copy.args_mut().slots_mut().1 = value;
            thread::spawn(move || copy.into_execute())
        })
        .collect();

    let results: Vec<u32> = handles
        .into_iter()
        .map(|h| h.join().expect("thread").expect("bound"))
        .collect();

    assert_eq!(results, [2, 4, 6, 8]);
    assert_eq!(template.execute(), Ok(0));
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[test]
fn adapter_reports_the_original_callable() {
    let adapter = FuncFactory::new(|pair: (u32, u32)| scale(pair.0, pair.1), args!((3_u32, 7_u32)))
        .with_origin(origin_of::<_, (u32, u32), u32>(&scale));

    assert_eq!(adapter.execute(), Ok(21));

    let info = adapter.metadata();
    assert_eq!(info.member_name(), "scale");
    assert_eq!(info.parameters(), ["u32", "u32"]);
    assert!(!info.is_closure());
    assert!(info.to_string().ends_with("scale(u32, u32) -> u32"));
}

#[test]
fn erased_action_runs_through_common_type() {
    let hits = Arc::new(AtomicUsize::new(0));
    let actions: Vec<_> = (1..=3_usize)
        .map(|step| {
            let hits = Arc::clone(&hits);
            ActionFactory::new(
                move |n: usize| {
                    hits.fetch_add(n, Ordering::SeqCst);
                },
                args!(step),
            )
            .erase()
        })
        .collect();

    for action in &actions {
        action.execute().expect("bound");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn async_function_propagates_callable_error_unchanged() {
    let fetch = FuncFactory::new_async(
        |key: &'static str, _cancel: CancellationToken| {
            ready(if key.is_empty() {
                Err(anyhow::anyhow!("empty key"))
            } else {
                Ok(key.len())
            })
        },
        args!(""),
    );

    let token = CancellationToken::new();
    let err = fetch.try_execute_async(&token).await.unwrap_err();
    assert_eq!(err.to_string(), "empty key");

    token.cancel();
    let err = fetch.try_execute_async(&token).await.unwrap_err();
    assert_eq!(err.downcast_ref::<InvokeError>(), Some(&InvokeError::Canceled));
}
