//! Failure taxonomy for per-entry and per-file errors.
//!
//! Entry and rewrite errors are recorded in the error log and never abort a
//! run. Only [`SetupError`] is fatal, and it is raised before any entry runs.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::retry::FetchError;

/// Failure category written to the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Network failure or non-2xx response.
    Transport,
    /// Declared content-encoding could not be decoded.
    Decode,
    /// Filesystem failure while reading or writing the output tree.
    Write,
    /// Saved HTML/CSS could not be parsed for rewriting.
    Parse,
}

/// Why a single capture could not be mirrored.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("transport: {0}")]
    Transport(#[from] FetchError),
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("write {}: {detail}", .path.display())]
    Write { path: PathBuf, detail: String },
    #[error("path conflict: {} exists and is not a file", .0.display())]
    Conflict(PathBuf),
}

impl EntryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EntryError::Transport(_) => FailureKind::Transport,
            EntryError::Decode(_) => FailureKind::Decode,
            EntryError::Write { .. } | EntryError::Conflict(_) => FailureKind::Write,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        EntryError::Write {
            path: path.into(),
            detail: format!("{:#}", err),
        }
    }
}

/// Why a saved file could not be rewritten.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not in an ASCII-compatible encoding", .path.display())]
    Encoding { path: PathBuf },
    #[error("write {}: {detail}", .path.display())]
    Write { path: PathBuf, detail: String },
}

impl RewriteError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RewriteError::Encoding { .. } => FailureKind::Parse,
            RewriteError::Read { .. } | RewriteError::Write { .. } => FailureKind::Write,
        }
    }
}

/// Configuration-level problems that stop a run before it starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no captures to mirror")]
    EmptyInput,
    #[error("output root {} is not writable: {detail}", .path.display())]
    OutputRoot { path: PathBuf, detail: String },
}
