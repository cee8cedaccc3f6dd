//! Booster wire format — the request record and its reply framing.
//!
//! These types ARE the protocol between booster-ctl and boosterd. The record
//! layout is fixed and versionless: the daemon refuses any buffer whose size
//! is not exactly `THREAD_DATA_SIZE`.
//!
//! Both ends run on the same host, so fields are in native byte order.
//! All types are #[repr(C)] with naturally aligned fields and no padding,
//! and use zerocopy derives for allocation-free parsing. There is no unsafe
//! code in this module.

use static_assertions::assert_eq_size;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

// ── Request record ───────────────────────────────────────────────────────────

/// One priority change request, and its response in the same buffer.
///
/// The requester fills `thread_id` and `target_priority` and zeroes
/// `current_priority`. On success the daemon overwrites `current_priority`
/// with the priority that was in effect before the change.
///
/// Wire size: 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct ThreadData {
    /// Target thread identifier. Zero is never valid.
    pub thread_id: u32,

    /// Desired scheduling priority, MIN_PRIORITY..=MAX_PRIORITY.
    pub target_priority: i32,

    /// Output: the priority before the change.
    pub current_priority: i32,
}

assert_eq_size!(ThreadData, [u8; 12]);

impl ThreadData {
    /// A fresh request with the output field zeroed.
    pub fn request(thread_id: u32, target_priority: i32) -> Self {
        Self {
            thread_id,
            target_priority,
            current_priority: 0,
        }
    }
}

// ── Reply framing ────────────────────────────────────────────────────────────

/// What the daemon writes back on the socket transport: the request status
/// followed by the record as it stands after handling.
///
/// Wire size: 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct Reply {
    /// A `Status` discriminant.
    pub status: i32,
    pub record: ThreadData,
}

assert_eq_size!(Reply, [u8; 16]);

impl Reply {
    pub fn new(status: Status, record: ThreadData) -> Self {
        Self {
            status: status.into(),
            record,
        }
    }

    pub fn status(&self) -> Result<Status, WireError> {
        Status::try_from(self.status)
    }
}

// ── Status ───────────────────────────────────────────────────────────────────

/// Completion status of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Status {
    Success = 0,
    /// The buffer was not exactly THREAD_DATA_SIZE bytes.
    BufferSize = 1,
    /// Null buffer, zero thread id, or priority outside the valid band.
    InvalidParameter = 2,
    /// The thread id does not name a live thread.
    ThreadNotFound = 3,
    /// The caller or the daemon lacks permission for this thread.
    AccessDenied = 4,
    /// The scheduler refused the change for another reason.
    MutationFailed = 5,
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl TryFrom<i32> for Status {
    type Error = WireError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Success),
            1 => Ok(Status::BufferSize),
            2 => Ok(Status::InvalidParameter),
            3 => Ok(Status::ThreadNotFound),
            4 => Ok(Status::AccessDenied),
            5 => Ok(Status::MutationFailed),
            other => Err(WireError::UnknownStatus(other)),
        }
    }
}

impl From<Status> for i32 {
    fn from(s: Status) -> i32 {
        s as i32
    }
}

// ── Constants ─────────────────────────────────────────────────────────────────

/// Exact size of a request buffer.
pub const THREAD_DATA_SIZE: usize = std::mem::size_of::<ThreadData>();

/// Exact size of a reply on the socket transport.
pub const REPLY_SIZE: usize = std::mem::size_of::<Reply>();

/// Lowest accepted priority. Zero is the idle value and is never assignable.
pub const MIN_PRIORITY: i32 = 1;

/// Highest accepted priority.
pub const MAX_PRIORITY: i32 = 31;

/// Upper bound on what the daemon will read from one transaction.
/// Anything longer is still answered with BufferSize.
pub const MAX_REQUEST_BYTES: usize = 64;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("unknown status code: {0}")]
    UnknownStatus(i32),

    #[error("reply is {0} bytes, expected {}", REPLY_SIZE)]
    ShortReply(usize),
}

/// Parse a reply read off the socket.
pub fn parse_reply(bytes: &[u8]) -> Result<Reply, WireError> {
    Reply::read_from(bytes).ok_or(WireError::ShortReply(bytes.len()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
