//! On-disk layout of a mirror run.
//!
//! ```text
//! <root>/docs/             site tree (publish this folder)
//! <root>/docs/.nojekyll
//! <root>/meta/index.jsonl
//! <root>/meta/errors.jsonl
//! <root>/meta/stats.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SetupError;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("docs")
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join("meta")
    }

    pub fn index_path(&self) -> PathBuf {
        self.meta_dir().join("index.jsonl")
    }

    pub fn errors_path(&self) -> PathBuf {
        self.meta_dir().join("errors.jsonl")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.meta_dir().join("stats.json")
    }

    /// Absolute path of a `/`-separated local path inside the site tree.
    pub fn site_path(&self, local_path: &str) -> PathBuf {
        let mut p = self.docs_dir();
        for seg in local_path.split('/').filter(|s| !s.is_empty()) {
            p.push(seg);
        }
        p
    }

    /// Create `docs/` and `meta/` and the `.nojekyll` marker (GitHub Pages
    /// otherwise hides folders starting with `_`).
    pub fn prepare(&self) -> Result<(), SetupError> {
        let fail = |path: &Path, e: std::io::Error| SetupError::OutputRoot {
            path: path.to_path_buf(),
            detail: e.to_string(),
        };
        for dir in [self.docs_dir(), self.meta_dir()] {
            fs::create_dir_all(&dir).map_err(|e| fail(&dir, e))?;
        }
        let marker = self.docs_dir().join(".nojekyll");
        if !marker.exists() {
            fs::write(&marker, b"").map_err(|e| fail(&marker, e))?;
        }
        Ok(())
    }
}
