//! Positional argument checks, done before anything is sent.

use anyhow::{bail, Result};

use booster_core::validate::check_priority;

pub fn parse_thread_id(text: &str, require_aligned: bool) -> Result<u32> {
    let thread_id: u32 = match text.trim().parse() {
        Ok(id) => id,
        Err(_) => bail!("invalid thread id: {text}"),
    };
    if thread_id == 0 {
        bail!("invalid thread id: {text} (must be non-zero)");
    }
    if require_aligned && thread_id % 4 != 0 {
        bail!("invalid thread id: {text} (must be a multiple of 4)");
    }
    Ok(thread_id)
}

pub fn parse_priority(text: &str) -> Result<i32> {
    let priority: i32 = match text.trim().parse() {
        Ok(p) => p,
        Err(_) => bail!("invalid thread priority: {text}"),
    };
    if check_priority(priority).is_err() {
        bail!("invalid thread priority: {text} (must be 1..=31)");
    }
    Ok(priority)
}
