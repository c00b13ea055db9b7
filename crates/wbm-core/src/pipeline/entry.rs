//! One capture: resume check, fetch, decode, scrub, write.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::capture::archived_url;
use crate::decode::{decode_body, Decoded};
use crate::error::EntryError;
use crate::fetch::SnapshotFetcher;
use crate::layout::OutputLayout;
use crate::local_path::{is_html, mime_from_path, normalize_mime, sniff_mime, PlannedCapture, SNIFF_LEN};
use crate::scrub::strip_age_gate_html;
use crate::storage;

use super::MirrorOptions;

/// What a successful entry produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Saved {
    pub content_type: String,
    pub bytes: u64,
    pub resumed: bool,
}

pub(crate) fn process<F: SnapshotFetcher>(
    fetcher: &mut F,
    layout: &OutputLayout,
    options: &MirrorOptions,
    planned: &PlannedCapture,
) -> Result<Saved, EntryError> {
    let path = layout.site_path(&planned.local_path);
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => {
            return Ok(Saved {
                content_type: fallback_type(planned, &read_head(&path)),
                bytes: meta.len(),
                resumed: true,
            });
        }
        Ok(_) => return Err(EntryError::Conflict(path)),
        Err(_) => {}
    }

    let url = archived_url(&options.wayback_base, &planned.entry);
    let response = fetcher.fetch(&url)?;
    let declared = response
        .meta
        .content_type
        .as_deref()
        .map(normalize_mime)
        .filter(|m| !m.is_empty());
    let known = declared.or_else(|| known_type(planned));
    let (body, decoded) = decode_body(
        response.body,
        response.meta.content_encoding.as_deref(),
        known.as_deref(),
    )?;
    if decoded != Decoded::Identity {
        tracing::debug!(url = %planned.entry.original_url, ?decoded, "decompressed body");
    }
    let content_type = known.unwrap_or_else(|| fallback_type(planned, &body));

    let body = if options.strip_age_gate && is_html(&content_type) {
        strip_age_gate_html(&body)
    } else {
        body
    };

    storage::write_atomic(&path, &body).map_err(|e| EntryError::write(&path, &e))?;
    Ok(Saved {
        content_type,
        bytes: body.len() as u64,
        resumed: false,
    })
}

/// Type from the capture's MIME hint, else the file extension, else the
/// first bytes of the body.
fn fallback_type(planned: &PlannedCapture, head: &[u8]) -> String {
    known_type(planned).unwrap_or_else(|| {
        sniff_mime(head)
            .unwrap_or("application/octet-stream")
            .to_string()
    })
}

fn known_type(planned: &PlannedCapture) -> Option<String> {
    let hint = normalize_mime(&planned.entry.mimetype);
    if !hint.is_empty() {
        return Some(hint);
    }
    match mime_from_path(&planned.local_path) {
        "application/octet-stream" => None,
        by_ext => Some(by_ext.to_string()),
    }
}

/// Start of a saved file; empty if it cannot be read.
fn read_head(path: &Path) -> Vec<u8> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    if let Ok(file) = File::open(path) {
        let _ = file.take(SNIFF_LEN as u64).read_to_end(&mut head);
    }
    head
}
