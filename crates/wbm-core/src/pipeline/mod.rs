//! The mirror run: fetch every capture, then rewrite links, then record stats.
//!
//! Run state lives in [`Mirror`], whose type parameter tracks the phase.
//! Only a `Mirror<Fetched>` can rewrite or finish, so the URL map is always
//! complete before any file is rewritten.

mod entry;
mod progress;

pub use progress::Progress;

use anyhow::Result;
use std::marker::PhantomData;
use std::time::Instant;

use crate::capture::archived_url;
use crate::config::MirrorConfig;
use crate::error::SetupError;
use crate::fetch::SnapshotFetcher;
use crate::journal::{self, ErrorRecord, Journal, RunStats, SnapshotRecord, SnapshotStatus};
use crate::layout::OutputLayout;
use crate::local_path::PlannedCapture;
use crate::rewrite::{self, RewriteSummary};
use crate::url_map::UrlPathMap;

/// Per-run switches.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub wayback_base: String,
    pub strip_age_gate: bool,
    pub rewrite: bool,
}

impl MirrorOptions {
    pub fn from_config(cfg: &MirrorConfig) -> Self {
        Self {
            wayback_base: cfg.wayback_base.clone(),
            strip_age_gate: cfg.strip_age_gate,
            rewrite: true,
        }
    }
}

/// Phase marker: captures not fetched yet.
pub struct Fetching;
/// Phase marker: every capture has a record and the URL map is complete.
pub struct Fetched;

pub struct Mirror<S> {
    layout: OutputLayout,
    options: MirrorOptions,
    journal: Journal,
    plan: Vec<PlannedCapture>,
    progress: Progress,
    map: UrlPathMap,
    records: Vec<SnapshotRecord>,
    rewrite: Option<RewriteSummary>,
    started: Instant,
    _phase: PhantomData<S>,
}

impl Mirror<Fetching> {
    /// Validate the run and prepare the output root. Fatal errors
    /// ([`SetupError`]) surface here, before any log is touched.
    pub fn start(layout: OutputLayout, options: MirrorOptions, plan: Vec<PlannedCapture>) -> Result<Self> {
        if plan.is_empty() {
            return Err(SetupError::EmptyInput.into());
        }
        layout.prepare()?;
        let journal = Journal::create(&layout)?;
        tracing::info!(root = %layout.root().display(), captures = plan.len(), "mirror run starting");
        Ok(Self {
            progress: Progress::new(plan.len()),
            layout,
            options,
            journal,
            plan,
            map: UrlPathMap::new(),
            records: Vec::new(),
            rewrite: None,
            started: Instant::now(),
            _phase: PhantomData,
        })
    }

    /// Process every planned capture in order. Entry failures are logged
    /// and recorded; only a failure to write the run logs themselves is
    /// returned as an error.
    pub fn fetch_all<F: SnapshotFetcher>(mut self, fetcher: &mut F) -> Result<Mirror<Fetched>> {
        let plan = std::mem::take(&mut self.plan);
        self.records.reserve(plan.len());
        for planned in &plan {
            let archived = archived_url(&self.options.wayback_base, &planned.entry);
            let mut record = SnapshotRecord {
                original_url: planned.entry.original_url.clone(),
                timestamp: planned.entry.timestamp.clone(),
                archived_url: archived,
                local_path: planned.local_path.clone(),
                content_type: String::new(),
                byte_length: 0,
                status: SnapshotStatus::Ok,
                resumed: false,
            };
            match entry::process(fetcher, &self.layout, &self.options, planned) {
                Ok(saved) => {
                    record.content_type = saved.content_type;
                    record.byte_length = saved.bytes;
                    record.resumed = saved.resumed;
                    self.map.insert(&record.original_url, &record.local_path);
                    tracing::debug!(url = %record.original_url, path = %record.local_path, resumed = record.resumed, "saved");
                }
                Err(e) => {
                    record.status = SnapshotStatus::Failed;
                    tracing::warn!(url = %record.original_url, ts = %record.timestamp, error = %e, "capture failed");
                    self.journal.append_error(&ErrorRecord {
                        original_url: record.original_url.clone(),
                        timestamp: record.timestamp.clone(),
                        archived_url: record.archived_url.clone(),
                        local_path: record.local_path.clone(),
                        kind: e.kind(),
                        reason: e.to_string(),
                    })?;
                }
            }
            self.journal.append_snapshot(&record)?;
            self.progress.record(&record);
            self.records.push(record);
            if self.progress.should_log() {
                tracing::info!(
                    done = self.progress.attempted,
                    total = self.progress.total,
                    failed = self.progress.failed,
                    resumed = self.progress.resumed,
                    "progress {:.0}%",
                    self.progress.fraction() * 100.0
                );
            }
        }
        Ok(Mirror {
            layout: self.layout,
            options: self.options,
            journal: self.journal,
            plan,
            progress: self.progress,
            map: self.map,
            records: self.records,
            rewrite: None,
            started: self.started,
            _phase: PhantomData,
        })
    }
}

impl Mirror<Fetched> {
    /// Rewrite links in every saved HTML/CSS file. Files that cannot be
    /// rewritten are recorded in the error log and left as fetched.
    pub fn rewrite_all(&mut self) -> Result<()> {
        let summary = rewrite::rewrite_all(&self.layout, &self.map, &self.records);
        append_rewrite_failures(&mut self.journal, &summary)?;
        self.rewrite = Some(summary);
        Ok(())
    }

    /// Write `stats.json` and end the run.
    pub fn finish(self) -> Result<RunStats> {
        let mut stats = self.progress.to_stats();
        if let Some(summary) = &self.rewrite {
            apply_rewrite(&mut stats, summary);
        }
        stats.seconds = self.started.elapsed().as_secs_f64();
        journal::write_stats(&self.layout, &stats)?;
        tracing::info!(
            attempted = stats.attempted,
            succeeded = stats.succeeded,
            failed = stats.failed,
            resumed = stats.resumed,
            bytes = stats.total_bytes,
            "mirror run finished"
        );
        Ok(stats)
    }
}

/// Fetch, optionally rewrite, and finish: the whole run in one call.
pub fn run_mirror<F: SnapshotFetcher>(
    layout: OutputLayout,
    options: MirrorOptions,
    plan: Vec<PlannedCapture>,
    fetcher: &mut F,
) -> Result<RunStats> {
    let rewrite = options.rewrite;
    let mut fetched = Mirror::start(layout, options, plan)?.fetch_all(fetcher)?;
    if rewrite {
        fetched.rewrite_all()?;
    }
    fetched.finish()
}

/// Rewrite pass over a tree fetched by an earlier run, driven by its index.
/// Rewrite failures are appended to the existing error log, and the rewrite
/// counters in `stats.json` are replaced.
pub fn rewrite_existing(layout: &OutputLayout) -> Result<RunStats> {
    let started = Instant::now();
    let records = journal::read_index(&layout.index_path())?;
    let map = UrlPathMap::from_records(&records);
    let summary = rewrite::rewrite_all(layout, &map, &records);

    let mut journal = Journal::reopen(layout)?;
    append_rewrite_failures(&mut journal, &summary)?;

    let mut stats = journal::read_stats(layout)?.unwrap_or_default();
    apply_rewrite(&mut stats, &summary);
    stats.seconds = started.elapsed().as_secs_f64();
    journal::write_stats(layout, &stats)?;
    Ok(stats)
}

fn append_rewrite_failures(journal: &mut Journal, summary: &RewriteSummary) -> Result<()> {
    for (record, err) in &summary.failures {
        journal.append_error(&ErrorRecord {
            original_url: record.original_url.clone(),
            timestamp: record.timestamp.clone(),
            archived_url: record.archived_url.clone(),
            local_path: record.local_path.clone(),
            kind: err.kind(),
            reason: err.to_string(),
        })?;
    }
    Ok(())
}

fn apply_rewrite(stats: &mut RunStats, summary: &RewriteSummary) {
    stats.rewrite = true;
    stats.rewritten_html = summary.html_files;
    stats.rewritten_css = summary.css_files;
    stats.rewrite_failed = summary.failures.len() as u64;
}
