// src/core/fs_ops.rs
//! File system helpers shared by config setup and snapshot export

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

use crate::app_log;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write a file, creating parent directories first
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        app_log!(info, "Written file: {}", path.display());
        Ok(())
    }

    /// Turn an arbitrary id into a single safe path segment
    pub fn safe_segment(raw: &str) -> String {
        let cleaned = raw
            .trim()
            .chars()
            .map(|c| match c {
                c if c.is_alphanumeric() || c == '-' || c == '_' => c,
                _ => '-',
            })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        if cleaned.is_empty() {
            "unknown".to_string()
        } else {
            cleaned
        }
    }
}
