//! The daemon's reachable endpoint: a Unix socket at a well-known path.
//!
//! Created at start-up with restrictive permissions and removed again when
//! the `Endpoint` drops.

use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::net::UnixListener;

#[derive(Debug)]
pub struct Endpoint {
    path: PathBuf,
}

impl Endpoint {
    /// Bind the socket and apply `mode`. A leftover socket file from a dead
    /// daemon is replaced; a live one is an error.
    pub fn create(path: &Path, mode: u32) -> Result<(Self, UnixListener)> {
        if let Ok(meta) = std::fs::symlink_metadata(path) {
            if !meta.file_type().is_socket() {
                bail!("{} exists and is not a socket", path.display());
            }
            if std::os::unix::net::UnixStream::connect(path).is_ok() {
                bail!("another boosterd is already serving {}", path.display());
            }
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove stale socket {}", path.display()))?;
            tracing::info!(path = %path.display(), "removed stale socket");
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let listener = UnixListener::bind(path)
            .with_context(|| format!("failed to bind {}", path.display()))?;
        let endpoint = Self {
            path: path.to_path_buf(),
        };
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("failed to set mode {:o} on {}", mode, path.display()))?;

        tracing::info!(path = %path.display(), mode = %format!("{:o}", mode), "endpoint created");
        Ok((endpoint, listener))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::info!(path = %self.path.display(), "endpoint removed"),
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove endpoint"),
        }
    }
}
