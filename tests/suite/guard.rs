//! Guarded initialization scenarios: every exit path either transfers the
//! candidate to the caller or releases it exactly once.

use std::io::{Read, Seek, SeekFrom, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use callkit::{CancellationToken, Guard, GuardConfig, InvokeError, Owned, args};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::common::{Lease, Ledger, capture_debug, init_test_logging};

#[derive(Debug, PartialEq, Eq, Error)]
#[error("lease {id} failed health check")]
struct Unhealthy {
    id: u32,
}

fn accept_lease(lease: Owned<Lease>) -> anyhow::Result<Owned<Lease>> {
    Ok(lease)
}

fn reject_lease(lease: Owned<Lease>) -> anyhow::Result<Owned<Lease>> {
    Err(Unhealthy { id: lease.id }.into())
}

#[test]
fn unchanged_candidate_reaches_caller_unreleased() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();

    let lease = Guard::new(|| anyhow::Ok(ledger.open())).run(accept_lease)?;

    assert_eq!(lease.id, 1);
    assert!(ledger.released().is_empty());
    Ok(())
}

#[test]
fn replacement_is_what_the_caller_receives() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();

    let lease = Guard::new(|| anyhow::Ok(ledger.open())).run(|mut lease: Owned<Lease>| {
        lease.replace(ledger.open());
        anyhow::Ok(lease)
    })?;

    assert_eq!(lease.id, 2);
    assert_eq!(ledger.released(), [1]);
    Ok(())
}

#[test]
fn failing_tester_releases_once_and_error_keeps_identity() {
    init_test_logging();
    let ledger = Ledger::default();

    let err = Guard::new(|| anyhow::Ok(ledger.open()))
        .run(reject_lease)
        .unwrap_err();

    assert_eq!(err.downcast_ref::<Unhealthy>(), Some(&Unhealthy { id: 1 }));
    assert_eq!(err.to_string(), "lease 1 failed health check");
    assert_eq!(ledger.released(), [1]);
}

#[test]
fn failure_after_replacement_releases_both_exactly_once() {
    init_test_logging();
    let ledger = Ledger::default();

    let outcome = Guard::new(|| anyhow::Ok(ledger.open())).run(|mut lease: Owned<Lease>| {
        lease.replace(ledger.open());
        bail!("replica {} is read-only", lease.id)
    });

    assert_eq!(outcome.unwrap_err().to_string(), "replica 2 is read-only");
    assert_eq!(ledger.released(), [1, 2]);
}

#[test]
fn catcher_handles_error_after_release() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();
    let caught = Mutex::new(Vec::new());

    let outcome = Guard::new(|| anyhow::Ok(ledger.open()))
        .extra(args!("pool-a"))
        .run_or_catch(
            |lease: Owned<Lease>, _pool: &'static str| reject_lease(lease),
            |err: anyhow::Error, pool: &'static str| {
                let released = ledger.released();
                caught
                    .lock()
                    .expect("lock")
                    .push(format!("{pool}: {err} (released {released:?})"));
                Ok(())
            },
        )?;

    assert!(outcome.is_none());
    assert_eq!(
        *caught.lock().expect("lock"),
        ["pool-a: lease 1 failed health check (released [1])"]
    );
    assert_eq!(ledger.released(), [1]);
    Ok(())
}

#[test]
fn five_extras_reach_tester_and_catcher() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();
    let tested = Mutex::new(None);
    let caught = Mutex::new(None);

    let outcome = Guard::new(|| anyhow::Ok(ledger.open()))
        .extra(args!("x", 1_u8, 2_u16, 3_u32, "five".to_string()))
        .run_or_catch(
            |lease: Owned<Lease>,
             region: &'static str,
             shard: u8,
             port: u16,
             retries: u32,
             label: String| {
                *tested.lock().expect("lock") =
                    Some(format!("{region} {shard}{port}{retries}{label}"));
                reject_lease(lease)
            },
            |err: anyhow::Error,
             region: &'static str,
             shard: u8,
             port: u16,
             retries: u32,
             label: String| {
                *caught.lock().expect("lock") =
                    Some(format!("{region} {shard}{port}{retries}{label}: {err}"));
                Ok(())
            },
        )?;

    assert!(outcome.is_none());
    assert_eq!(tested.lock().expect("lock").as_deref(), Some("x 123five"));
    assert_eq!(
        caught.lock().expect("lock").as_deref(),
        Some("x 123five: lease 1 failed health check")
    );
    assert_eq!(ledger.released(), [1]);
    Ok(())
}

#[test]
fn panicking_tester_still_releases_candidate() {
    init_test_logging();
    let ledger = Ledger::default();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        Guard::new(|| anyhow::Ok(ledger.open()))
            .extra(args!("x", 1_u8, 2_u16, 3_u32, "five".to_string()))
            .run(
                |_lease: Owned<Lease>,
                 _region: &'static str,
                 _shard: u8,
                 _port: u16,
                 _retries: u32,
                 _label: String|
                 -> anyhow::Result<Owned<Lease>> { panic!("health check crashed") },
            )
    }));

    assert!(outcome.is_err());
    assert_eq!(ledger.released(), [1]);
}

#[test]
fn initializer_error_goes_to_catcher_without_release() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();
    let caught = Mutex::new(None);

    let outcome = Guard::new(|| -> anyhow::Result<Lease> { bail!("pool exhausted") })
        .run_or_catch(accept_lease, |err: anyhow::Error| {
            *caught.lock().expect("lock") = Some(err.to_string());
            Ok(())
        })?;

    assert!(outcome.is_none());
    assert_eq!(caught.lock().expect("lock").as_deref(), Some("pool exhausted"));
    assert_eq!(ledger.opened(), 0);
    assert!(ledger.released().is_empty());
    Ok(())
}

#[test]
fn temp_file_survives_only_when_transferred() -> anyhow::Result<()> {
    init_test_logging();
    let header = "# callkit v1\n";

    let mut kept = Guard::new(|| -> anyhow::Result<NamedTempFile> { Ok(NamedTempFile::new()?) })
        .extra(args!(header))
        .run(|mut file: Owned<NamedTempFile>, header: &'static str| {
            file.write_all(header.as_bytes())?;
            file.flush()?;
            anyhow::Ok(file)
        })?;

    let mut contents = String::new();
    kept.seek(SeekFrom::Start(0))?;
    kept.read_to_string(&mut contents)?;
    assert_eq!(contents, header);

    let seen: Mutex<Option<PathBuf>> = Mutex::new(None);
    let outcome = Guard::new(|| -> anyhow::Result<NamedTempFile> { Ok(NamedTempFile::new()?) })
        .run(|file: Owned<NamedTempFile>| {
            *seen.lock().expect("lock") = Some(file.path().to_path_buf());
            bail!("refusing empty file")
        });

    assert!(outcome.is_err());
    let path = seen.lock().expect("lock").take().expect("tester ran");
    assert!(!path.exists());
    Ok(())
}

#[test]
fn lifecycle_events_name_the_tester_when_configured() {
    let ledger = Ledger::default();

    let (lease, logs) = capture_debug(|| {
        Guard::new(|| anyhow::Ok(ledger.open()))
            .run(accept_lease)
            .expect("accepted")
    });
    assert_eq!(lease.id, 1);
    assert!(logs.contains("guard candidate created"));
    assert!(logs.contains("guard resource transferred"));
    assert!(logs.contains("accept_lease"));

    let (outcome, logs) = capture_debug(|| {
        Guard::new(|| anyhow::Ok(ledger.open()))
            .config(GuardConfig {
                trace_metadata: false,
                ..GuardConfig::default()
            })
            .run(reject_lease)
    });
    assert!(outcome.is_err());
    assert!(logs.contains("guard tester failed; candidate released"));
    assert!(!logs.contains("reject_lease"));
}

#[tokio::test]
async fn cancelled_token_is_observed_by_tester_and_handled() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();
    let caught = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&caught);

    let token = CancellationToken::new();
    token.cancel();

    let outcome = Guard::new(|| anyhow::Ok(ledger.open()))
        .run_async_or_catch(
            |lease: Owned<Lease>, cancel: CancellationToken| async move {
                if cancel.is_cancelled() {
                    drop(lease);
                    return Err(anyhow::Error::from(InvokeError::Canceled));
                }
                Ok(lease)
            },
            move |err: anyhow::Error, _cancel: CancellationToken| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().expect("lock").push(err.downcast::<InvokeError>()?);
                    Ok::<(), anyhow::Error>(())
                }
            },
            &token,
        )
        .await?;

    assert!(outcome.is_none());
    assert_eq!(*caught.lock().expect("lock"), [InvokeError::Canceled]);
    assert_eq!(ledger.released(), [1]);
    Ok(())
}

#[tokio::test]
async fn async_tester_can_await_before_accepting() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();
    let token = CancellationToken::new();

    let lease = Guard::new(|| anyhow::Ok(ledger.open()))
        .extra(args!(2_u32))
        .run_async(
            |lease: Owned<Lease>, min_id: u32, _cancel: CancellationToken| async move {
                tokio::task::yield_now().await;
                if lease.id < min_id {
                    return Err(anyhow::Error::from(Unhealthy { id: lease.id }));
                }
                Ok(lease)
            },
            &token,
        )
        .await;

    assert_eq!(
        lease.unwrap_err().downcast_ref::<Unhealthy>(),
        Some(&Unhealthy { id: 1 })
    );
    assert_eq!(ledger.released(), [1]);

    let lease = Guard::new(|| anyhow::Ok(ledger.open()))
        .run_async(
            |lease: Owned<Lease>, _cancel: CancellationToken| async move { anyhow::Ok(lease) },
            &token,
        )
        .await?;
    assert_eq!(lease.id, 2);
    assert_eq!(ledger.released(), [1]);
    Ok(())
}

#[tokio::test]
async fn five_extras_and_token_reach_async_tester() -> anyhow::Result<()> {
    init_test_logging();
    let ledger = Ledger::default();
    let token = CancellationToken::new();

    let lease = Guard::new(|| anyhow::Ok(ledger.open()))
        .extra(args!("x", 1_u8, 2_u16, 3_u32, "five".to_string()))
        .run_async(
            |lease: Owned<Lease>,
             region: &'static str,
             shard: u8,
             port: u16,
             retries: u32,
             label: String,
             cancel: CancellationToken| async move {
                let seen = format!("{region} {shard}{port}{retries}{label}");
                if cancel.is_cancelled() || seen != "x 123five" {
                    bail!("unexpected extras: {seen}");
                }
                Ok(lease)
            },
            &token,
        )
        .await?;

    assert_eq!(lease.id, 1);
    assert!(ledger.released().is_empty());
    Ok(())
}

#[tokio::test]
async fn fail_fast_skips_tester_but_still_releases() {
    init_test_logging();
    let ledger = Ledger::default();
    let started = AtomicBool::new(false);
    let token = CancellationToken::new();
    token.cancel();

    let outcome = Guard::new(|| anyhow::Ok(ledger.open()))
        .config(GuardConfig {
            fail_fast_on_cancel: true,
            ..GuardConfig::default()
        })
        .run_async(
            |lease: Owned<Lease>, _cancel: CancellationToken| {
                started.store(true, Ordering::SeqCst);
                async move { anyhow::Ok(lease) }
            },
            &token,
        )
        .await;

    assert!(!started.load(Ordering::SeqCst));
    let err = outcome.unwrap_err();
    assert_eq!(err.downcast_ref::<InvokeError>(), Some(&InvokeError::Canceled));
    assert_eq!(ledger.released(), [1]);
}
