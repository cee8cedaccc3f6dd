//! booster-services — thread resolution, priority mutation, and the
//! request handler that ties them to the wire record.

pub mod channel;
pub mod handler;
pub mod memory;
pub mod sched;
pub mod thread;

pub use channel::{transact, ChannelServer};
pub use handler::{boost, handle_request};
pub use memory::{MemoryThread, MemoryThreadTable};
pub use sched::{current_priority, SchedThread, SchedThreadTable};
pub use thread::{ThreadHandle, ThreadTable};
