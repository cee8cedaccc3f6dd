//! Against the running kernel.

use std::sync::Arc;

use booster_core::Status;
use booster_services::{current_priority, SchedThreadTable};

use crate::*;

#[tokio::test]
async fn test_exited_kernel_thread_not_found() {
    let tid = exited_thread_id();
    if proc_entry_exists(tid) {
        eprintln!("SKIP: tid {tid} was reused before the test could use it");
        return;
    }

    let table = Arc::new(SchedThreadTable::new());
    let daemon = spawn_daemon("live-exited", table.clone());

    let reply = daemon.send(tid, 20).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::ThreadNotFound));
    assert_eq!(table.active_locks(), 0);
}

#[tokio::test]
async fn test_boost_parked_kernel_thread() {
    let parked = spawn_parked_thread();
    let table = Arc::new(SchedThreadTable::new());
    let daemon = spawn_daemon("live-boost", table.clone());

    let first = daemon.send(parked.tid, 15).await.unwrap();
    match first.status() {
        Ok(Status::Success) => {}
        Ok(Status::AccessDenied) => {
            eprintln!("SKIP: SCHED_RR needs CAP_SYS_NICE");
            assert_eq!(current_priority(parked.tid), Ok(0));
            return;
        }
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(first.record.current_priority, 0);
    assert_eq!(current_priority(parked.tid), Ok(15));

    let second = daemon.send(parked.tid, 15).await.unwrap();
    assert_eq!(second.status(), Ok(Status::Success));
    assert_eq!(second.record.current_priority, 15);
    assert_eq!(table.active_locks(), 0);
}

#[tokio::test]
async fn test_invalid_request_never_reaches_kernel() {
    let parked = spawn_parked_thread();
    let table = Arc::new(SchedThreadTable::new());
    let daemon = spawn_daemon("live-invalid", table.clone());

    let reply = daemon.send(parked.tid, 0).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::InvalidParameter));
    assert_eq!(current_priority(parked.tid), Ok(0));
    assert_eq!(table.active_locks(), 0);
}
