//! Thread lookup trait and its scoped handle.
//!
//! A `ThreadTable` maps a numeric thread id to a live thread and hands back
//! a handle that holds an owning reference for as long as it exists. The
//! reference is released when the handle drops, whichever way the caller
//! leaves its scope.

use booster_core::BoostError;

/// A namespace of threads reachable by id.
pub trait ThreadTable: Send + Sync {
    type Thread: ThreadHandle;

    /// Look up a live thread. Fails with `ThreadNotFound` if `thread_id`
    /// does not currently name one; that is an expected outcome when a
    /// thread exits between being named and being resolved.
    fn resolve(&self, thread_id: u32) -> Result<Self::Thread, BoostError>;
}

/// An owning reference to one resolved thread.
pub trait ThreadHandle {
    fn thread_id(&self) -> u32;

    /// Set the scheduling priority and return the one in effect just before,
    /// as a single step with respect to other swaps on the same thread.
    fn swap_priority(&self, priority: i32) -> Result<i32, BoostError>;
}
