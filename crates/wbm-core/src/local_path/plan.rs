//! Capture planning: dedup and file/directory clash resolution.

use std::collections::{HashMap, HashSet};

use super::{ext_for_mime, local_path_for, short_hash};
use crate::capture::CaptureEntry;

/// A capture together with the local path it will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCapture {
    pub entry: CaptureEntry,
    pub local_path: String,
}

/// Assign local paths to `entries`, in input order.
///
/// Exact (URL, timestamp) duplicates are dropped. A static tree cannot hold
/// both a file `a` and a directory `a/`, so a path that is also a directory
/// prefix of another path gets the MIME extension appended (`a` → `a.html`),
/// or a URL hash as well when that name is taken too. Entries sharing a
/// path keep sharing it after the rename.
pub fn plan_captures(entries: Vec<CaptureEntry>) -> Vec<PlannedCapture> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut planned = Vec::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert((entry.original_url.clone(), entry.timestamp.clone())) {
            tracing::debug!(url = %entry.original_url, ts = %entry.timestamp, "duplicate capture dropped");
            continue;
        }
        let local_path = local_path_for(&entry.original_url, &entry.mimetype);
        planned.push(PlannedCapture { entry, local_path });
    }
    resolve_dir_clashes(&mut planned);
    planned
}

fn resolve_dir_clashes(planned: &mut [PlannedCapture]) {
    let mut dir_prefixes: HashSet<String> = HashSet::new();
    for p in planned.iter() {
        let mut end = 0;
        while let Some(i) = p.local_path[end..].find('/') {
            end += i;
            dir_prefixes.insert(p.local_path[..end].to_string());
            end += 1;
        }
    }
    if dir_prefixes.is_empty() {
        return;
    }

    let mut taken: HashSet<String> = planned.iter().map(|p| p.local_path.clone()).collect();
    let mut renamed: HashMap<String, String> = HashMap::new();
    for p in planned.iter_mut() {
        if !dir_prefixes.contains(&p.local_path) {
            continue;
        }
        if let Some(new_path) = renamed.get(&p.local_path) {
            p.local_path = new_path.clone();
            continue;
        }
        let ext = ext_for_mime(&p.entry.mimetype);
        let mut new_path = format!("{}{}", p.local_path, ext);
        if taken.contains(&new_path) || dir_prefixes.contains(&new_path) {
            new_path = format!("{}__{}{}", p.local_path, short_hash(&p.entry.original_url), ext);
        }
        tracing::debug!(from = %p.local_path, to = %new_path, "file/directory clash renamed");
        taken.insert(new_path.clone());
        renamed.insert(p.local_path.clone(), new_path.clone());
        p.local_path = new_path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, ts: &str, mime: &str) -> CaptureEntry {
        CaptureEntry::new(url, ts).with_mimetype(mime)
    }

    #[test]
    fn drops_exact_duplicates_only() {
        let plan = plan_captures(vec![
            entry("https://example.org/a.css", "1", "text/css"),
            entry("https://example.org/a.css", "1", "text/css"),
            entry("https://example.org/a.css", "2", "text/css"),
        ]);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].local_path, plan[1].local_path);
    }

    #[test]
    fn file_that_is_also_a_directory_gets_extension() {
        let plan = plan_captures(vec![
            entry("https://example.org/wp-json/oembed/1.0", "1", "application/json"),
            entry("https://example.org/wp-json/oembed/1.0/embed", "1", "application/json"),
        ]);
        assert_eq!(plan[0].local_path, "wp-json/oembed/1.0.json");
        assert_eq!(plan[1].local_path, "wp-json/oembed/1.0/embed");
    }

    #[test]
    fn second_clash_uses_hash_suffix() {
        let plan = plan_captures(vec![
            entry("https://example.org/x.json", "1", "application/json"),
            entry("https://example.org/x", "1", "application/json"),
            entry("https://example.org/x/y.json", "1", "application/json"),
        ]);
        assert_eq!(plan[0].local_path, "x.json");
        let expected = format!("x__{}.json", short_hash("https://example.org/x"));
        assert_eq!(plan[1].local_path, expected);
    }

    #[test]
    fn planning_is_deterministic() {
        let input = vec![
            entry("https://example.org/", "1", "text/html"),
            entry("https://example.org/feed", "1", "application/rss+xml"),
            entry("https://example.org/feed/atom", "1", "application/atom+xml"),
        ];
        assert_eq!(plan_captures(input.clone()), plan_captures(input));
    }
}
