//! Append-only run logs: `index.jsonl`, `errors.jsonl`, and `stats.json`.
//!
//! Both logs are truncated when a run starts and then only appended to, one
//! JSON object per line, flushed per record so an interrupted run still
//! leaves a readable prefix.

mod records;

pub use records::{ErrorRecord, RunStats, SnapshotRecord, SnapshotStatus};

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::layout::OutputLayout;
use crate::storage;

/// Single writer for the index and error logs of one run.
pub struct Journal {
    index: JsonLines,
    errors: JsonLines,
}

struct JsonLines {
    path: PathBuf,
    out: BufWriter<File>,
}

impl JsonLines {
    fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    fn open_append(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    fn append<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out
            .flush()
            .with_context(|| format!("append to {}", self.path.display()))
    }
}

impl Journal {
    pub fn create(layout: &OutputLayout) -> Result<Self> {
        Ok(Self {
            index: JsonLines::create(layout.index_path())?,
            errors: JsonLines::create(layout.errors_path())?,
        })
    }

    /// Reopen existing logs for appending (rewrite-only runs).
    pub fn reopen(layout: &OutputLayout) -> Result<Self> {
        Ok(Self {
            index: JsonLines::open_append(layout.index_path())?,
            errors: JsonLines::open_append(layout.errors_path())?,
        })
    }

    pub fn append_snapshot(&mut self, record: &SnapshotRecord) -> Result<()> {
        self.index.append(record)
    }

    pub fn append_error(&mut self, record: &ErrorRecord) -> Result<()> {
        self.errors.append(record)
    }
}

/// Write `stats.json` (pretty-printed).
pub fn write_stats(layout: &OutputLayout, stats: &RunStats) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(stats)?;
    json.push(b'\n');
    storage::write_atomic(&layout.stats_path(), &json)
}

/// Stats of an earlier run, if it finished.
pub fn read_stats(layout: &OutputLayout) -> Result<Option<RunStats>> {
    let path = layout.stats_path();
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let stats = serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(stats))
}

/// Load an index written by an earlier run. Blank lines are skipped.
pub fn read_index(path: &Path) -> Result<Vec<SnapshotRecord>> {
    let file = File::open(path).with_context(|| format!("open index {}", path.display()))?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let rec: SnapshotRecord = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: bad index record", path.display(), idx + 1))?;
        records.push(rec);
    }
    Ok(records)
}
