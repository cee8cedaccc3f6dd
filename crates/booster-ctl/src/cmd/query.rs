//! Read-only look at a thread's current priority. Talks to the kernel
//! directly; boosterd is not involved.

use anyhow::{Context, Result};

use booster_services::current_priority;

pub fn cmd_query(thread_id: u32) -> Result<()> {
    let priority = current_priority(thread_id)
        .with_context(|| format!("failed to query thread {}", thread_id))?;
    println!("  Thread {} priority : {}", thread_id, priority);
    Ok(())
}
