//! Append-only license activity log.
//!
//! One JSON object per line. All appends go through a single file handle
//! behind an async mutex, so concurrent requests never interleave lines.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::ActivityEntry;
use crate::errors::{AppError, AppResult};

pub struct ActivityLog {
    path: PathBuf,
    writer: Mutex<Option<File>>,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single line.
    pub async fn append(&self, entry: &ActivityEntry) -> AppResult<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| AppError::internal(format!("activity entry serialization failed: {}", e)))?;
        line.push('\n');

        let mut guard = self.writer.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        let Some(file) = guard.as_mut() else {
            return Err(AppError::internal("activity log handle missing"));
        };

        if let Err(e) = write_line(file, &line).await {
            // Reopen on the next append
            *guard = None;
            return Err(io_error("write", &self.path, e));
        }

        tracing::debug!(
            license_id = %entry.license_id,
            action = ?entry.action,
            "activity entry appended"
        );
        Ok(())
    }

    /// Entries for one license, newest first. A missing file reads as empty.
    pub async fn read_for_license(&self, license_id: Uuid) -> AppResult<Vec<ActivityEntry>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("read", &self.path, e)),
        };

        let mut entries = parse_entries(&contents, license_id);
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    async fn open(&self) -> AppResult<File> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error("create directory for", &self.path, e))?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| io_error("open", &self.path, e))
    }
}

async fn write_line(file: &mut File, line: &str) -> std::io::Result<()> {
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

fn parse_entries(contents: &str, license_id: Uuid) -> Vec<ActivityEntry> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str::<ActivityEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(line = n + 1, "skipping malformed activity log line: {}", e);
                None
            }
        })
        .filter(|entry| entry.license_id == license_id)
        .collect()
}

fn io_error(op: &str, path: &Path, e: std::io::Error) -> AppError {
    tracing::error!(path = %path.display(), "failed to {} activity log: {}", op, e);
    AppError::internal(format!("failed to {} activity log: {}", op, e))
}
