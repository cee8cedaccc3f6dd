//! Send one priority change request to boosterd.

use std::path::Path;

use anyhow::{bail, Result};
use serde::Serialize;
use zerocopy::AsBytes;

use booster_core::{Status, ThreadData};
use booster_services::{current_priority, transact};

#[derive(Debug, Serialize)]
struct BoostOutput {
    thread_id: u32,
    previous_priority: i32,
    target_priority: i32,
}

pub async fn cmd_boost(socket: &Path, thread_id: u32, priority: i32, json: bool) -> Result<()> {
    if !json {
        println!("═══════════════════════════════════════");
        println!("  Booster");
        println!("═══════════════════════════════════════");
        println!("  Thread           : {}", thread_id);
        // Display only; skipped if the thread cannot be queried.
        if let Ok(current) = current_priority(thread_id) {
            println!("  Current priority : {}", current);
        }
    }

    let request = ThreadData::request(thread_id, priority);
    let reply = transact(socket, request.as_bytes()).await?;

    let status = reply.status()?;
    if !status.is_success() {
        bail!("boosterd refused thread {}: {}", thread_id, describe(status));
    }

    if json {
        let out = BoostOutput {
            thread_id,
            previous_priority: reply.record.current_priority,
            target_priority: reply.record.target_priority,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "  Priority changed from {} -> {}",
            reply.record.current_priority, reply.record.target_priority
        );
    }
    Ok(())
}

pub fn describe(status: Status) -> &'static str {
    match status {
        Status::Success => "success",
        Status::BufferSize => "request record has the wrong size",
        Status::InvalidParameter => "invalid thread id or priority",
        Status::ThreadNotFound => "no such thread (it may have exited)",
        Status::AccessDenied => "access denied",
        Status::MutationFailed => "the scheduler rejected the change",
    }
}
