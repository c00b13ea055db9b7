//! Running counters for the fetch phase.

use crate::journal::{RunStats, SnapshotRecord};

/// Log a progress line every this many entries.
pub(crate) const PROGRESS_EVERY: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub total: u64,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub resumed: u64,
    pub bytes: u64,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total: total as u64,
            ..Self::default()
        }
    }

    pub fn record(&mut self, rec: &SnapshotRecord) {
        self.attempted += 1;
        if rec.is_ok() {
            self.succeeded += 1;
            self.bytes += rec.byte_length;
            if rec.resumed {
                self.resumed += 1;
            }
        } else {
            self.failed += 1;
        }
    }

    /// Fraction of entries attempted, in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.attempted as f64 / self.total as f64).min(1.0)
    }

    pub(crate) fn should_log(&self) -> bool {
        self.attempted % PROGRESS_EVERY == 0 || self.attempted == self.total
    }

    /// Fetch-phase part of the run stats.
    pub fn to_stats(&self) -> RunStats {
        RunStats {
            total_selected: self.total,
            attempted: self.attempted,
            succeeded: self.succeeded,
            failed: self.failed,
            resumed: self.resumed,
            total_bytes: self.bytes,
            ..RunStats::default()
        }
    }
}
