//! booster-ctl — command-line client for the Booster daemon.

use std::path::PathBuf;

use anyhow::{Context, Result};

use booster_core::config::BoosterConfig;

mod cmd;

use cmd::args::{parse_priority, parse_thread_id};

fn print_usage() {
    println!("Usage: booster-ctl [--socket <path>] [--json] <thread-id> <priority>");
    println!("       booster-ctl query <thread-id>");
    println!();
    println!("Commands:");
    println!("  <thread-id> <priority>   Set a thread's priority (1..=31) via boosterd");
    println!("  query <thread-id>        Show a thread's current priority");
    println!();
    println!("Options:");
    println!("  --socket <path>   Daemon socket (default: from config)");
    println!("  --json            Print the result as JSON");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    eprintln!();
    print_usage();
    std::process::exit(1);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let config = BoosterConfig::load().context("failed to load config")?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut socket = config.endpoint.socket_path.clone();
    let mut json = false;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--socket" => {
                i += 1;
                socket = PathBuf::from(args.get(i).context("--socket requires a value")?);
            }
            "--json" => json = true,
            other => remaining.push(other),
        }
        i += 1;
    }

    let aligned = config.client.require_aligned_tid;
    match remaining.as_slice() {
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        ["query", tid] => {
            let thread_id = parse_thread_id(tid, aligned).unwrap_or_else(|e| usage_error(&e.to_string()));
            cmd::query::cmd_query(thread_id)
        }
        [tid, priority] => {
            let thread_id = parse_thread_id(tid, aligned).unwrap_or_else(|e| usage_error(&e.to_string()));
            let priority = parse_priority(priority).unwrap_or_else(|e| usage_error(&e.to_string()));
            cmd::boost::cmd_boost(&socket, thread_id, priority, json).await
        }
        other => usage_error(&format!("Unexpected arguments: {}", other.join(" "))),
    }
}
