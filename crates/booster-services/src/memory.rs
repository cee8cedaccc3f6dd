//! In-memory thread table.
//!
//! Threads are plain records with an explicit reference count, so tests can
//! observe exactly how many references the handler holds at any moment. The
//! daemon also uses it as a dry-run backend that touches nothing on the host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use booster_core::BoostError;

use crate::thread::{ThreadHandle, ThreadTable};

#[derive(Debug)]
struct MemThread {
    priority: Mutex<i32>,
    refs: AtomicUsize,
    alive: AtomicBool,
}

/// Thread registry keyed by id. Exited threads stay listed (dead) until
/// `reap`, so their reference counts remain observable.
#[derive(Debug, Clone, Default)]
pub struct MemoryThreadTable {
    threads: Arc<DashMap<u32, Arc<MemThread>>>,
}

impl MemoryThreadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live thread, replacing any previous entry with this id.
    pub fn spawn(&self, thread_id: u32, priority: i32) {
        self.threads.insert(
            thread_id,
            Arc::new(MemThread {
                priority: Mutex::new(priority),
                refs: AtomicUsize::new(0),
                alive: AtomicBool::new(true),
            }),
        );
    }

    /// Mark a thread as exited. Handles already resolved stay valid as
    /// references but can no longer change its priority.
    pub fn exit(&self, thread_id: u32) {
        if let Some(t) = self.threads.get(&thread_id) {
            t.alive.store(false, Ordering::SeqCst);
        }
    }

    /// Drop an exited thread's record entirely.
    pub fn reap(&self, thread_id: u32) {
        self.threads
            .remove_if(&thread_id, |_, t| !t.alive.load(Ordering::SeqCst));
    }

    pub fn priority(&self, thread_id: u32) -> Option<i32> {
        self.threads
            .get(&thread_id)
            .map(|t| *t.priority.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Outstanding handle references on one thread.
    pub fn refcount(&self, thread_id: u32) -> Option<usize> {
        self.threads
            .get(&thread_id)
            .map(|t| t.refs.load(Ordering::SeqCst))
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

impl ThreadTable for MemoryThreadTable {
    type Thread = MemoryThread;

    fn resolve(&self, thread_id: u32) -> Result<MemoryThread, BoostError> {
        let entry = self
            .threads
            .get(&thread_id)
            .ok_or(BoostError::ThreadNotFound(thread_id))?;
        let thread = entry.value().clone();
        drop(entry);

        if !thread.alive.load(Ordering::SeqCst) {
            return Err(BoostError::ThreadNotFound(thread_id));
        }
        thread.refs.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryThread { thread_id, thread })
    }
}

/// Handle on a `MemoryThreadTable` thread. Releases its reference on drop.
#[derive(Debug)]
pub struct MemoryThread {
    thread_id: u32,
    thread: Arc<MemThread>,
}

impl ThreadHandle for MemoryThread {
    fn thread_id(&self) -> u32 {
        self.thread_id
    }

    fn swap_priority(&self, priority: i32) -> Result<i32, BoostError> {
        let mut current = self
            .thread
            .priority
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        // Checked under the lock so an exit cannot slip in after the check.
        if !self.thread.alive.load(Ordering::SeqCst) {
            return Err(BoostError::ThreadNotFound(self.thread_id));
        }
        Ok(std::mem::replace(&mut *current, priority))
    }
}

impl Drop for MemoryThread {
    fn drop(&mut self) {
        self.thread.refs.fetch_sub(1, Ordering::SeqCst);
    }
}
