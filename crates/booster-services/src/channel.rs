//! Unix socket adapter between requesters and `handle_request`.
//!
//! One connection is one transaction. The requester writes its record and
//! shuts down its write half; the server reads at most MAX_REQUEST_BYTES + 1
//! bytes, handles them, and writes back a `Reply` before closing.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use booster_core::wire::{
    parse_reply, Reply, Status, ThreadData, MAX_REQUEST_BYTES, REPLY_SIZE, THREAD_DATA_SIZE,
};

use crate::handler::handle_request;
use crate::thread::ThreadTable;

/// How long a connected requester may take to deliver its buffer.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ChannelServer<T> {
    listener: UnixListener,
    table: Arc<T>,
    allowed_uids: Arc<Vec<u32>>,
    shutdown: broadcast::Receiver<()>,
}

impl<T: ThreadTable + 'static> ChannelServer<T> {
    pub fn new(
        listener: UnixListener,
        table: Arc<T>,
        allowed_uids: Vec<u32>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            listener,
            table,
            allowed_uids: Arc::new(allowed_uids),
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("channel server shutting down");
                    return Ok(());
                }

                result = self.listener.accept() => {
                    let stream = match result {
                        Ok((stream, _)) => stream,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let table = self.table.clone();
                    let allowed = self.allowed_uids.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, table, allowed).await {
                            tracing::warn!(error = %e, "transaction failed");
                        }
                    });
                }
            }
        }
    }
}

async fn serve_connection<T: ThreadTable>(
    mut stream: UnixStream,
    table: Arc<T>,
    allowed_uids: Arc<Vec<u32>>,
) -> Result<()> {
    let cred = stream.peer_cred().context("failed to read peer credentials")?;
    let uid = cred.uid();
    let pid = cred.pid().unwrap_or(0);
    tracing::debug!(pid, uid, "channel opened");

    let mut buf = Vec::with_capacity(MAX_REQUEST_BYTES + 1);
    tokio::time::timeout(
        READ_TIMEOUT,
        (&mut stream)
            .take(MAX_REQUEST_BYTES as u64 + 1)
            .read_to_end(&mut buf),
    )
    .await
    .context("requester did not finish its write in time")?
    .context("failed to read request")?;

    let status = if !allowed_uids.is_empty() && !allowed_uids.contains(&uid) {
        tracing::warn!(pid, uid, "requester not in allowed_uids");
        Status::AccessDenied
    } else {
        handle_request(table.as_ref(), Some(buf.as_mut_slice()))
    };

    let reply = Reply::new(status, echo_record(&buf));
    stream
        .write_all(reply.as_bytes())
        .await
        .context("failed to write reply")?;
    stream.shutdown().await.ok();

    tracing::debug!(pid, uid, status = ?status, "channel closed");
    Ok(())
}

/// The record as it stands after handling. Wrong-sized buffers are
/// truncated or zero-padded to fit.
fn echo_record(buf: &[u8]) -> ThreadData {
    let mut bytes = [0u8; THREAD_DATA_SIZE];
    let n = buf.len().min(THREAD_DATA_SIZE);
    bytes[..n].copy_from_slice(&buf[..n]);
    ThreadData::read_from(&bytes[..]).unwrap_or_else(ThreadData::new_zeroed)
}

/// Send one raw request buffer and wait for the reply.
pub async fn transact(socket_path: &Path, request: &[u8]) -> Result<Reply> {
    let mut stream = UnixStream::connect(socket_path).await.with_context(|| {
        format!(
            "failed to connect to boosterd at {} — is it running?",
            socket_path.display()
        )
    })?;

    stream
        .write_all(request)
        .await
        .context("failed to send request")?;
    stream.shutdown().await.context("failed to finish request")?;

    // Exactly one reply; the server may reset the connection right after it
    // when an oversized request was left unread.
    let mut buf = [0u8; REPLY_SIZE];
    stream
        .read_exact(&mut buf)
        .await
        .context("failed to read reply")?;

    Ok(parse_reply(&buf)?)
}
