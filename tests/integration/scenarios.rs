use std::sync::Arc;

use booster_core::wire::{MAX_REQUEST_BYTES, THREAD_DATA_SIZE};
use booster_core::{Status, ThreadData};
use booster_services::MemoryThreadTable;
use zerocopy::AsBytes;

use crate::*;

fn table_with(thread_id: u32, priority: i32) -> Arc<MemoryThreadTable> {
    let table = Arc::new(MemoryThreadTable::new());
    table.spawn(thread_id, priority);
    table
}

/// Live thread at 8, request 15: reply carries 8, thread now at 15.
#[tokio::test]
async fn test_boost_live_thread() {
    let table = table_with(1234, 8);
    let daemon = spawn_daemon("boost-live", table.clone());
    assert!(daemon.path().exists());

    let reply = daemon.send(1234, 15).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::Success));
    assert_eq!(reply.record.current_priority, 8);
    assert_eq!(reply.record.target_priority, 15);
    assert_eq!(table.priority(1234), Some(15));
    assert_eq!(table.refcount(1234), Some(0));
}

/// One byte short of a full record.
#[tokio::test]
async fn test_short_buffer_rejected() {
    let table = table_with(1234, 8);
    let daemon = spawn_daemon("short", table.clone());

    let request = ThreadData::request(1234, 15);
    let reply = daemon
        .send_raw(&request.as_bytes()[..THREAD_DATA_SIZE - 1])
        .await
        .unwrap();
    assert_eq!(reply.status(), Ok(Status::BufferSize));
    assert_eq!(table.priority(1234), Some(8));
}

/// Every wrong length up to and past the read cap is a size error.
#[tokio::test]
async fn test_all_wrong_lengths_rejected() {
    let table = table_with(1234, 8);
    let daemon = spawn_daemon("lengths", table.clone());

    let mut bytes = ThreadData::request(1234, 15).as_bytes().to_vec();
    bytes.resize(MAX_REQUEST_BYTES + 8, 0);
    for len in (0..bytes.len()).filter(|l| *l != THREAD_DATA_SIZE) {
        let reply = daemon.send_raw(&bytes[..len]).await.unwrap();
        assert_eq!(reply.status(), Ok(Status::BufferSize), "length {len}");
    }
    assert_eq!(table.priority(1234), Some(8));
}

#[tokio::test]
async fn test_priority_zero_rejected() {
    let table = table_with(1234, 8);
    let daemon = spawn_daemon("prio-zero", table.clone());

    let reply = daemon.send(1234, 0).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::InvalidParameter));
    assert_eq!(table.priority(1234), Some(8));
}

#[tokio::test]
async fn test_out_of_band_priorities_rejected() {
    let table = table_with(1234, 8);
    let daemon = spawn_daemon("prio-band", table.clone());

    for p in [-1, 32, 255, i32::MIN, i32::MAX] {
        let reply = daemon.send(1234, p).await.unwrap();
        assert_eq!(reply.status(), Ok(Status::InvalidParameter), "priority {p}");
    }
    assert_eq!(table.priority(1234), Some(8));
}

/// A caller that skips the client's own checks and sends id 0 directly.
#[tokio::test]
async fn test_zero_thread_id_rejected() {
    let table = Arc::new(MemoryThreadTable::new());
    let daemon = spawn_daemon("tid-zero", table);

    let reply = daemon.send(0, 15).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::InvalidParameter));
}

#[tokio::test]
async fn test_nonexistent_thread_not_found() {
    let table = table_with(1234, 8);
    let daemon = spawn_daemon("missing", table);

    let reply = daemon.send(999_999, 20).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::ThreadNotFound));
    assert_eq!(reply.record.current_priority, 0);
}

/// Sending the same request twice: the second reply reflects the first write.
#[tokio::test]
async fn test_second_request_observes_first() {
    let table = table_with(1234, 8);
    let daemon = spawn_daemon("twice", table);

    let first = daemon.send(1234, 15).await.unwrap();
    let second = daemon.send(1234, 15).await.unwrap();
    assert_eq!(first.record.current_priority, 8);
    assert_eq!(second.record.current_priority, 15);
}

#[tokio::test]
async fn test_exited_thread_not_found_without_leak() {
    let table = table_with(1234, 8);
    table.exit(1234);
    let daemon = spawn_daemon("exited", table.clone());

    let reply = daemon.send(1234, 20).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::ThreadNotFound));
    assert_eq!(table.priority(1234), Some(8));
    assert_eq!(table.refcount(1234), Some(0));
}

#[tokio::test]
async fn test_allow_list_gates_requests() {
    // SAFETY: getuid has no preconditions.
    let me = unsafe { libc::getuid() };

    let table = table_with(1234, 8);
    let allowed = spawn_daemon_with_uids("uid-ok", table.clone(), vec![me]);
    let reply = allowed.send(1234, 15).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::Success));

    let denied = spawn_daemon_with_uids("uid-denied", table.clone(), vec![me.wrapping_add(1)]);
    let reply = denied.send(1234, 20).await.unwrap();
    assert_eq!(reply.status(), Ok(Status::AccessDenied));
    assert_eq!(table.priority(1234), Some(15));
}
