//! Records persisted by a run.

use serde::{Deserialize, Serialize};

use crate::error::FailureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    Ok,
    Failed,
}

/// One line of `index.jsonl`: exactly one per attempted capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub original_url: String,
    pub timestamp: String,
    pub archived_url: String,
    /// Path under the site root, `/`-separated.
    pub local_path: String,
    /// Normalized MIME type (no parameters).
    pub content_type: String,
    /// Decoded size on disk.
    pub byte_length: u64,
    pub status: SnapshotStatus,
    /// Satisfied by a file left by an earlier run (or an earlier entry of this run).
    #[serde(default)]
    pub resumed: bool,
}

impl SnapshotRecord {
    pub fn is_ok(&self) -> bool {
        self.status == SnapshotStatus::Ok
    }
}

/// One line of `errors.jsonl`: enough to retry the capture by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub original_url: String,
    pub timestamp: String,
    pub archived_url: String,
    pub local_path: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// `stats.json`, written once when the run finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Captures in the input after dedup.
    pub total_selected: u64,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Subset of `succeeded` satisfied from disk without a request.
    pub resumed: u64,
    /// Bytes written (or found on disk) for successful captures.
    pub total_bytes: u64,
    /// Whether the link rewriter ran.
    pub rewrite: bool,
    pub rewritten_html: u64,
    pub rewritten_css: u64,
    pub rewrite_failed: u64,
    pub seconds: f64,
}
