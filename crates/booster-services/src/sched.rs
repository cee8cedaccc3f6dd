//! Linux scheduler backend.
//!
//! Resolution pins the task's `/proc/<tid>` directory with an open
//! descriptor. That descriptor stays bound to the original task even if the
//! id is recycled, so liveness checks made through it can never observe a
//! different thread. The descriptor is closed when the handle drops.
//!
//! Priority here is the SCHED_RR real-time priority. 1..=31 maps onto it
//! one to one; a thread under a time-sharing policy reports 0.
//!
//! The kernel offers no read-and-replace for scheduling parameters, so each
//! swap holds a per-thread lock from this table across the read and the
//! write. Concurrent requests through one daemon cannot lose an update;
//! changes made outside the daemon are not covered.

use std::ffi::CString;
use std::fs::File;
use std::io::Read;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use booster_core::BoostError;

use crate::thread::{ThreadHandle, ThreadTable};

type LockTable = Arc<DashMap<u32, Arc<Mutex<()>>>>;

/// Threads of the running kernel, reached through procfs.
#[derive(Debug, Clone)]
pub struct SchedThreadTable {
    proc_root: PathBuf,
    locks: LockTable,
}

impl Default for SchedThreadTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedThreadTable {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Number of per-thread locks currently allocated. Zero when idle.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    fn lock_for(&self, thread_id: u32) -> Arc<Mutex<()>> {
        self.locks
            .entry(thread_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl ThreadTable for SchedThreadTable {
    type Thread = SchedThread;

    fn resolve(&self, thread_id: u32) -> Result<SchedThread, BoostError> {
        // pid_t is signed; ids above i32::MAX cannot name a task.
        let tid = libc::pid_t::try_from(thread_id).map_err(|_| BoostError::ThreadNotFound(thread_id))?;

        let dir = File::open(self.proc_root.join(tid.to_string())).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BoostError::ThreadNotFound(thread_id),
            std::io::ErrorKind::PermissionDenied => BoostError::AccessDenied { thread_id },
            _ => os_error(thread_id, &e),
        })?;

        let thread = SchedThread {
            thread_id,
            tid,
            dir: OwnedFd::from(dir),
            lock: self.lock_for(thread_id),
            locks: self.locks.clone(),
        };
        if !thread.is_alive() {
            return Err(BoostError::ThreadNotFound(thread_id));
        }
        tracing::trace!(thread_id, "thread resolved");
        Ok(thread)
    }
}

/// A pinned reference to one kernel task.
#[derive(Debug)]
pub struct SchedThread {
    thread_id: u32,
    tid: libc::pid_t,
    dir: OwnedFd,
    lock: Arc<Mutex<()>>,
    locks: LockTable,
}

impl SchedThread {
    /// Read the task state through the pinned directory. A reaped task's
    /// entries vanish; a zombie or dead task is no longer schedulable.
    fn is_alive(&self) -> bool {
        let Some(stat) = self.read_stat() else {
            return false;
        };
        match task_state(&stat) {
            Some('Z') | Some('X') | Some('x') | None => false,
            Some(_) => true,
        }
    }

    fn read_stat(&self) -> Option<String> {
        let name = CString::new("stat").ok()?;
        // SAFETY: `dir` is an open directory descriptor owned by self and
        // `name` is a valid NUL-terminated path.
        let fd = unsafe {
            libc::openat(
                self.dir.as_raw_fd(),
                name.as_ptr(),
                libc::O_RDONLY | libc::O_CLOEXEC,
            )
        };
        if fd < 0 {
            return None;
        }
        // SAFETY: openat returned a fresh descriptor that nothing else owns.
        let mut file = unsafe { File::from_raw_fd(fd) };
        let mut text = String::new();
        file.read_to_string(&mut text).ok()?;
        Some(text)
    }
}

impl ThreadHandle for SchedThread {
    fn thread_id(&self) -> u32 {
        self.thread_id
    }

    fn swap_priority(&self, priority: i32) -> Result<i32, BoostError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        if !self.is_alive() {
            return Err(BoostError::ThreadNotFound(self.thread_id));
        }

        let previous = read_priority(self.tid).map_err(|e| os_error(self.thread_id, &e))?;

        // SAFETY: sched_param is plain data; zeroed is a valid value.
        let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
        param.sched_priority = priority;
        // SAFETY: `param` is a valid sched_param for the duration of the call.
        let ret = unsafe { libc::sched_setscheduler(self.tid, libc::SCHED_RR, &param) };
        if ret != 0 {
            return Err(os_error(self.thread_id, &std::io::Error::last_os_error()));
        }

        Ok(previous)
    }
}

impl Drop for SchedThread {
    fn drop(&mut self) {
        // Our clone plus the table's: nobody else is waiting on this lock.
        self.locks
            .remove_if(&self.thread_id, |_, lock| Arc::strong_count(lock) <= 2);
    }
}

/// Current real-time priority of a thread, 0 under a time-sharing policy.
///
/// Read-only; needs no privilege. booster-ctl uses it for display.
pub fn current_priority(thread_id: u32) -> Result<i32, BoostError> {
    let tid = libc::pid_t::try_from(thread_id).map_err(|_| BoostError::ThreadNotFound(thread_id))?;
    read_priority(tid).map_err(|e| os_error(thread_id, &e))
}

fn read_priority(tid: libc::pid_t) -> std::io::Result<i32> {
    // SAFETY: plain syscall on a pid value.
    let policy = unsafe { libc::sched_getscheduler(tid) };
    if policy < 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: sched_param is plain data; zeroed is a valid value.
    let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
    // SAFETY: `param` outlives the call.
    if unsafe { libc::sched_getparam(tid, &mut param) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // Mask SCHED_RESET_ON_FORK.
    match policy & !0x4000_0000 {
        libc::SCHED_FIFO | libc::SCHED_RR => Ok(param.sched_priority),
        _ => Ok(0),
    }
}

fn os_error(thread_id: u32, e: &std::io::Error) -> BoostError {
    match e.raw_os_error() {
        Some(libc::ESRCH) | Some(libc::ENOENT) => BoostError::ThreadNotFound(thread_id),
        Some(libc::EPERM) | Some(libc::EACCES) => BoostError::AccessDenied { thread_id },
        Some(errno) => BoostError::Mutation { thread_id, errno },
        None => BoostError::Mutation {
            thread_id,
            errno: 0,
        },
    }
}

/// State letter from a `/proc/<tid>/stat` line. The command name is in
/// parentheses and may itself contain spaces or parentheses.
fn task_state(stat: &str) -> Option<char> {
    let after_comm = &stat[stat.rfind(')')? + 1..];
    after_comm.split_whitespace().next()?.chars().next()
}
