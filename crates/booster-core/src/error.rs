//! Request failure taxonomy.
//!
//! Every failure maps to exactly one wire `Status`, and is reported once,
//! synchronously, in the reply to the request that caused it.

use crate::wire::{Status, THREAD_DATA_SIZE};

/// Why a request was judged an invalid argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// No buffer was supplied at all.
    NullBuffer,
    /// `thread_id` was zero.
    ZeroThreadId,
    /// `target_priority` was outside MIN_PRIORITY..=MAX_PRIORITY.
    PriorityOutOfRange(i32),
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::NullBuffer => write!(f, "no request buffer"),
            InvalidReason::ZeroThreadId => write!(f, "thread id is zero"),
            InvalidReason::PriorityOutOfRange(p) => write!(f, "priority {p} is outside 1..=31"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoostError {
    #[error("request is {actual} bytes, expected exactly {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(InvalidReason),

    #[error("thread {0} not found")]
    ThreadNotFound(u32),

    #[error("access denied for thread {thread_id}")]
    AccessDenied { thread_id: u32 },

    #[error("failed to change priority of thread {thread_id} (errno {errno})")]
    Mutation { thread_id: u32, errno: i32 },
}

impl BoostError {
    pub fn buffer_size(actual: usize) -> Self {
        BoostError::BufferSize {
            expected: THREAD_DATA_SIZE,
            actual,
        }
    }

    /// The status word reported to the requester for this failure.
    pub fn status(&self) -> Status {
        match self {
            BoostError::BufferSize { .. } => Status::BufferSize,
            BoostError::InvalidArgument(_) => Status::InvalidParameter,
            BoostError::ThreadNotFound(_) => Status::ThreadNotFound,
            BoostError::AccessDenied { .. } => Status::AccessDenied,
            BoostError::Mutation { .. } => Status::MutationFailed,
        }
    }
}
