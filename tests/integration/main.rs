//! Booster integration test harness.
//!
//! Each test runs a real ChannelServer on a Unix socket under the temp dir
//! and talks to it the same way booster-ctl does:
//!
//!   cargo test --test integration
//!
//! Tests that change real scheduler state need CAP_SYS_NICE. Without it
//! they print SKIP and return.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use anyhow::Result;
use tokio::net::UnixListener;
use tokio::sync::broadcast;
use zerocopy::AsBytes;

use booster_core::{Reply, ThreadData};
use booster_services::{transact, ChannelServer, ThreadTable};

mod live;
mod scenarios;

// ── Harness ───────────────────────────────────────────────────────────────────

/// A channel server bound to its own socket. Stops and cleans up on drop.
pub struct Daemon {
    path: PathBuf,
    shutdown: broadcast::Sender<()>,
}

impl Daemon {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Send a raw buffer, exactly as written by a requester.
    pub async fn send_raw(&self, bytes: &[u8]) -> Result<Reply> {
        transact(&self.path, bytes).await
    }

    /// Send a well-formed request record.
    pub async fn send(&self, thread_id: u32, priority: i32) -> Result<Reply> {
        self.send_raw(ThreadData::request(thread_id, priority).as_bytes())
            .await
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Start a server for `table`. Must be called inside a tokio runtime.
pub fn spawn_daemon<T: ThreadTable + 'static>(name: &str, table: Arc<T>) -> Daemon {
    spawn_daemon_with_uids(name, table, Vec::new())
}

pub fn spawn_daemon_with_uids<T: ThreadTable + 'static>(
    name: &str,
    table: Arc<T>,
    allowed_uids: Vec<u32>,
) -> Daemon {
    let path = std::env::temp_dir().join(format!(
        "booster-it-{}-{}.sock",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).expect("bind test socket");
    let (shutdown, rx) = broadcast::channel(1);
    tokio::spawn(ChannelServer::new(listener, table, allowed_uids, rx).run());
    Daemon { path, shutdown }
}

/// A real OS thread parked until the guard drops.
pub struct ParkedThread {
    pub tid: u32,
    release: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for ParkedThread {
    fn drop(&mut self) {
        drop(self.release.take());
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

pub fn spawn_parked_thread() -> ParkedThread {
    let (tid_tx, tid_rx) = mpsc::channel();
    let (release, wait) = mpsc::channel::<()>();
    let handle = std::thread::spawn(move || {
        // SAFETY: gettid has no preconditions.
        let tid = unsafe { libc::gettid() } as u32;
        tid_tx.send(tid).unwrap();
        let _ = wait.recv();
    });
    let tid = tid_rx.recv().expect("parked thread reports its tid");
    ParkedThread {
        tid,
        release: Some(release),
        handle: Some(handle),
    }
}

/// The tid of a thread that has already exited and been joined.
pub fn exited_thread_id() -> u32 {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        // SAFETY: gettid has no preconditions.
        tx.send(unsafe { libc::gettid() } as u32).unwrap();
    })
    .join()
    .unwrap();
    rx.recv().unwrap()
}

pub fn proc_entry_exists(tid: u32) -> bool {
    Path::new("/proc").join(tid.to_string()).exists()
}
