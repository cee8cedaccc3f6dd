//! The request callback: validate, resolve, mutate, respond.
//!
//! One call is one fully synchronous transaction. Failures short-circuit at
//! the first unmet precondition and leave both the buffer and the thread
//! untouched.

use zerocopy::AsBytes;

use booster_core::{validate, BoostError, InvalidReason, Status, ThreadData};

use crate::thread::{ThreadHandle, ThreadTable};

/// Handle one request buffer in place.
///
/// On success `current_priority` in the buffer holds the priority that was
/// in effect before the change.
pub fn handle_request<T: ThreadTable + ?Sized>(table: &T, buffer: Option<&mut [u8]>) -> Status {
    let result = match buffer {
        Some(buffer) => boost(table, buffer),
        None => Err(BoostError::InvalidArgument(InvalidReason::NullBuffer)),
    };

    match result {
        Ok(record) => {
            tracing::debug!(
                thread_id = record.thread_id,
                previous = record.current_priority,
                target = record.target_priority,
                "priority changed"
            );
            Status::Success
        }
        Err(e) => {
            tracing::warn!(error = %e, "request rejected");
            e.status()
        }
    }
}

/// Validate and apply one request, writing the result back into `buffer`.
pub fn boost<T: ThreadTable + ?Sized>(table: &T, buffer: &mut [u8]) -> Result<ThreadData, BoostError> {
    let mut record = validate(Some(&*buffer))?;

    record.current_priority = {
        let thread = table.resolve(record.thread_id)?;
        thread.swap_priority(record.target_priority)?
    };

    buffer.copy_from_slice(record.as_bytes());
    Ok(record)
}
