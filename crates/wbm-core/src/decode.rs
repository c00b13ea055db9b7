//! Content-encoding removal for archived bodies.
//!
//! The archive sometimes replays gzip or zlib bodies without a matching
//! `Content-Encoding` header, so textual bodies are also sniffed by magic
//! bytes. What ends up on disk is always the decoded representation.

use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use std::io::{self, Read};
use thiserror::Error;

use crate::local_path::normalize_mime;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decompression failure for a declared content-encoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported content-encoding {0:?}")]
    Unsupported(String),
    #[error("corrupt {encoding} body: {source}")]
    Corrupt {
        encoding: &'static str,
        #[source]
        source: io::Error,
    },
}

/// How the body was (or was not) transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Identity,
    Gzip,
    Deflate,
}

/// Decode `body` according to `content_encoding`, sniffing when none is declared.
///
/// A declared encoding that fails to decode is an error. A sniffed one that
/// fails leaves the body untouched, since the magic bytes may be coincidence.
pub fn decode_body(
    body: Vec<u8>,
    content_encoding: Option<&str>,
    content_type: Option<&str>,
) -> Result<(Vec<u8>, Decoded), DecodeError> {
    let declared = content_encoding
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e != "identity");

    match declared.as_deref() {
        Some("gzip") | Some("x-gzip") => {
            let out = gunzip(&body).map_err(|source| DecodeError::Corrupt {
                encoding: "gzip",
                source,
            })?;
            Ok((out, Decoded::Gzip))
        }
        Some("deflate") => {
            let out = inflate(&body).map_err(|source| DecodeError::Corrupt {
                encoding: "deflate",
                source,
            })?;
            Ok((out, Decoded::Deflate))
        }
        Some(other) => Err(DecodeError::Unsupported(other.to_string())),
        None => Ok(sniff(body, content_type)),
    }
}

fn sniff(body: Vec<u8>, content_type: Option<&str>) -> (Vec<u8>, Decoded) {
    if !is_textual(content_type) {
        return (body, Decoded::Identity);
    }
    if body.starts_with(&GZIP_MAGIC) {
        if let Ok(out) = gunzip(&body) {
            tracing::debug!("sniffed undeclared gzip body");
            return (out, Decoded::Gzip);
        }
    } else if looks_like_zlib(&body) {
        if let Ok(out) = read_all(ZlibDecoder::new(&body[..])) {
            tracing::debug!("sniffed undeclared zlib body");
            return (out, Decoded::Deflate);
        }
    }
    (body, Decoded::Identity)
}

/// Binary assets are copied verbatim; only text-like types are sniffed.
fn is_textual(content_type: Option<&str>) -> bool {
    let mime = normalize_mime(content_type.unwrap_or(""));
    mime.is_empty()
        || mime.starts_with("text/")
        || mime.contains("javascript")
        || mime.contains("json")
        || mime.contains("xml")
}

/// RFC 1950 header: CM=8, window <= 32K, FCHECK makes the pair divisible by 31.
fn looks_like_zlib(body: &[u8]) -> bool {
    match body {
        [cmf, flg, ..] => {
            cmf & 0x0f == 8 && (cmf >> 4) <= 7 && ((*cmf as u16) << 8 | *flg as u16) % 31 == 0
        }
        _ => false,
    }
}

fn gunzip(body: &[u8]) -> io::Result<Vec<u8>> {
    read_all(MultiGzDecoder::new(body))
}

/// Servers disagree on "deflate": try the zlib wrapper first, then raw deflate.
fn inflate(body: &[u8]) -> io::Result<Vec<u8>> {
    read_all(ZlibDecoder::new(body)).or_else(|_| read_all(DeflateDecoder::new(body)))
}

fn read_all<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}
