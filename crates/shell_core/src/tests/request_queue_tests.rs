use std::time::Duration;

use anyhow::Result;
use tokio::time::timeout;

use crate::request_queue::{InFlightQueue, RequestError, RequestId, RequestQueue};

#[tokio::test]
async fn snapshot_reflects_tracked_requests_until_settled() {
    let queue = InFlightQueue::new();
    let scoped = queue.track(true);
    let background = queue.track(false);

    let snapshot = queue.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    let scoped_entry = snapshot
        .iter()
        .find(|request| request.id == scoped.id())
        .expect("scoped entry");
    assert!(scoped_entry.cancel_when_route_change);
    let background_entry = snapshot
        .iter()
        .find(|request| request.id == background.id())
        .expect("background entry");
    assert!(!background_entry.cancel_when_route_change);

    drop(scoped);
    let snapshot = queue.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, background.id());
}

#[tokio::test]
async fn cancel_resolves_immediately_for_unknown_ids() {
    let queue = InFlightQueue::new();
    timeout(
        Duration::from_secs(1),
        queue.cancel(&[RequestId::new(), RequestId::new()]),
    )
    .await
    .expect("already-settled ids must not block")
    .expect("cancel");
}

#[tokio::test]
async fn cancel_aborts_a_running_request() {
    let queue = InFlightQueue::new();
    let guard = queue.track(true);
    let id = guard.id();
    let task = tokio::spawn(guard.run(futures::future::pending::<Result<()>>()));

    queue.cancel(&[id]).await.expect("cancel");

    let err = task
        .await
        .expect("join")
        .expect_err("request must be canceled");
    match err.downcast_ref::<RequestError>() {
        Some(RequestError::Canceled(canceled)) => assert_eq!(*canceled, id),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(queue.snapshot().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_waits_until_the_named_request_settles() {
    let queue = InFlightQueue::new();
    let guard = queue.track(true);
    let id = guard.id();

    let mut cancel_task = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.cancel(&[id]).await })
    };

    // The owner is not observing the cancel signal yet, so the entry stays
    // in the ledger and the cancel call must keep waiting.
    let waited = timeout(Duration::from_millis(100), &mut cancel_task).await;
    assert!(waited.is_err(), "cancel resolved before the request settled");

    drop(guard);
    cancel_task
        .await
        .expect("join")
        .expect("cancel resolves once settled");
}

#[tokio::test]
async fn run_passes_through_a_successful_result_and_settles() {
    let queue = InFlightQueue::new();
    let guard = queue.track(false);

    let value = guard
        .run(async { Ok(42u32) })
        .await
        .expect("request succeeds");
    assert_eq!(value, 42);
    assert!(queue.snapshot().await.is_empty());
}
