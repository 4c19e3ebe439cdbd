use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::DumpError;
use crate::queue::Message;

pub const FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written(PathBuf),
    /// A previous delivery (or run) already wrote this id.
    Skipped(PathBuf),
}

impl PersistOutcome {
    pub fn path(&self) -> &Path {
        match self {
            PersistOutcome::Written(p) | PersistOutcome::Skipped(p) => p,
        }
    }
}

/// Shard directory name for a message id: its first character.
pub fn shard_of(id: &str) -> Result<&str, DumpError> {
    let first = id
        .chars()
        .next()
        .ok_or_else(|| DumpError::InvalidMessageId(id.to_string()))?;
    if first == '.' || id.contains(['/', '\\', '\0']) {
        return Err(DumpError::InvalidMessageId(id.to_string()));
    }
    Ok(&id[..first.len_utf8()])
}

/// `<root>/<first char of id>/<id>.json`
pub fn message_path(root: &Path, id: &str) -> Result<PathBuf, DumpError> {
    let shard = shard_of(id)?;
    Ok(root.join(shard).join(format!("{id}.{FILE_EXTENSION}")))
}

/// Create the output root (and its parents) if it does not exist yet.
pub async fn ensure_output_root(root: &Path) -> Result<(), DumpError> {
    fs::create_dir_all(root)
        .await
        .map_err(|source| DumpError::OutputRoot {
            path: root.to_path_buf(),
            source,
        })
}

pub struct MessagePersister {
    root: PathBuf,
    // Shards we already tried to create during this run.
    created_shards: HashSet<String>,
}

impl MessagePersister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            created_shards: HashSet::new(),
        }
    }

    /// Write `message.body` to its [`message_path`] unless that file exists.
    ///
    /// Shard directory creation is best-effort. Any failure to create or
    /// write the message file itself is returned as [`DumpError::Write`].
    /// Redelivery, and re-running against the same root, never overwrite.
    pub async fn persist(&mut self, message: &Message) -> Result<PersistOutcome, DumpError> {
        let path = message_path(&self.root, &message.id)?;
        let shard = shard_of(&message.id)?;
        if !self.created_shards.contains(shard) {
            if let Some(dir) = path.parent() {
                match fs::create_dir(dir).await {
                    Ok(()) => debug!(dir = %dir.display(), "created shard directory"),
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                    Err(e) => {
                        debug!(dir = %dir.display(), error = %e, "shard directory not created")
                    }
                }
            }
            self.created_shards.insert(shard.to_string());
        }

        let opened = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        let mut file = match opened {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(message_id = %message.id, "already persisted, skipping");
                return Ok(PersistOutcome::Skipped(path));
            }
            Err(source) => {
                return Err(DumpError::Write {
                    message_id: message.id.clone(),
                    path,
                    source,
                });
            }
        };

        let written = async {
            file.write_all(message.body.as_bytes()).await?;
            file.flush().await
        }
        .await;
        if let Err(source) = written {
            drop(file);
            // A truncated file would be skipped forever on redelivery.
            let _ = fs::remove_file(&path).await;
            return Err(DumpError::Write {
                message_id: message.id.clone(),
                path,
                source,
            });
        }

        Ok(PersistOutcome::Written(path))
    }
}
