//! Sequential writer for a snapshot temp file.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Owns the open temp file; dropping it without `finalize` leaves the final path untouched.
pub struct StorageWriter {
    file: File,
    temp_path: PathBuf,
}

impl StorageWriter {
    /// Create (truncate) the temp file, creating parent directories as needed.
    pub fn create(temp_path: &Path) -> Result<Self> {
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let file = File::create(temp_path)
            .with_context(|| format!("create temp file {}", temp_path.display()))?;
        Ok(Self {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .with_context(|| format!("write {}", self.temp_path.display()))
    }

    /// Flush and sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush().context("storage flush failed")?;
        self.file.sync_all().context("storage sync failed")?;
        Ok(())
    }

    /// Close the file and atomically rename it onto `final_path`.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        let StorageWriter { file, temp_path } = self;
        drop(file);
        fs::rename(&temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })
    }
}
