//! Disk I/O for snapshot bodies.
//!
//! Bodies are written to `<final>.part`, synced, then renamed over the final
//! path, so a crash never leaves a truncated file that the next run would
//! mistake for a finished one.

mod writer;

pub use writer::StorageWriter;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.css` → `a.css.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `data` to `final_path` atomically, creating parent directories.
/// On failure the temp file is removed and `final_path` is untouched.
pub fn write_atomic(final_path: &Path, data: &[u8]) -> Result<()> {
    let tp = temp_path(final_path);
    let result = StorageWriter::create(&tp).and_then(|mut writer| {
        writer.write_all(data)?;
        writer.sync()?;
        writer.finalize(final_path)
    });
    if result.is_err() {
        let _ = std::fs::remove_file(&tp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("index.html"));
        assert_eq!(p.to_string_lossy(), "index.html.part");
        let p2 = temp_path(Path::new("/tmp/docs/a/b.css"));
        assert_eq!(p2.to_string_lossy(), "/tmp/docs/a/b.css.part");
    }

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c.html");
        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"second");
        assert!(!temp_path(&target).exists());
    }

    #[test]
    fn write_atomic_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), b"file").unwrap();
        let target = dir.path().join("a/b.css");
        assert!(write_atomic(&target, b"x").is_err());
        assert_eq!(std::fs::read(dir.path().join("a")).unwrap(), b"file");
    }
}
