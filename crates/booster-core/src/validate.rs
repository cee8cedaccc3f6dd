//! Request validation at the trust boundary.
//!
//! The buffer comes from an unprivileged caller and may be malformed or
//! hostile. Nothing here reads outside the slice it is given, and nothing
//! is mutated: the verdict is either a parsed record or an error.

use zerocopy::FromBytes;

use crate::error::{BoostError, InvalidReason};
use crate::wire::{ThreadData, MAX_PRIORITY, MIN_PRIORITY, THREAD_DATA_SIZE};

/// Structural then semantic checks, in that order.
///
/// `None` models a request that arrived without a buffer at all.
pub fn validate(buffer: Option<&[u8]>) -> Result<ThreadData, BoostError> {
    let bytes = buffer.ok_or(BoostError::InvalidArgument(InvalidReason::NullBuffer))?;

    if bytes.len() != THREAD_DATA_SIZE {
        return Err(BoostError::buffer_size(bytes.len()));
    }

    let record = ThreadData::read_from(bytes).ok_or(BoostError::buffer_size(bytes.len()))?;

    if record.thread_id == 0 {
        return Err(BoostError::InvalidArgument(InvalidReason::ZeroThreadId));
    }

    check_priority(record.target_priority)?;

    Ok(record)
}

/// The sole semantic rule on priorities. Zero falls below MIN_PRIORITY.
pub fn check_priority(priority: i32) -> Result<(), BoostError> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(BoostError::InvalidArgument(
            InvalidReason::PriorityOutOfRange(priority),
        ));
    }
    Ok(())
}
