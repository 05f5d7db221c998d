//! Append-only JSONL audit trail.
//!
//! One JSON object per line. The log is the durable record of who moved
//! which request where; readers tolerate trailing garbage from a torn
//! write by skipping lines that fail to parse.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use fleet_core::AuditRecord;

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and fsync before returning.
    pub async fn append(&self, record: &AuditRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("create audit log directory")?;
        }

        let mut line = serde_json::to_string(record).context("serialize audit record")?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context("open audit log")?;
        file.write_all(line.as_bytes())
            .await
            .context("write audit record")?;
        file.sync_all().await.context("sync audit log")?;

        Ok(())
    }

    /// Read every parseable record in file order.
    pub async fn read_all(&self) -> Result<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .context("read audit log")?;
        let records = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        Ok(records)
    }
}
