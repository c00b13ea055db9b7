//! `wbm rewrite` – rewrite links of an existing mirror.

use anyhow::Result;
use std::path::Path;
use wbm_core::layout::OutputLayout;
use wbm_core::pipeline::rewrite_existing;

use super::EXIT_PARTIAL;

pub fn run_rewrite(out: &Path) -> Result<i32> {
    let stats = rewrite_existing(&OutputLayout::new(out))?;
    println!(
        "Rewrote {} HTML and {} CSS files ({} failed).",
        stats.rewritten_html, stats.rewritten_css, stats.rewrite_failed
    );
    Ok(if stats.rewrite_failed > 0 { EXIT_PARTIAL } else { 0 })
}
