//! `wbm discover` – print CDX captures in capture-list format.

use anyhow::Result;
use wbm_core::cdx::{discover, DiscoverOptions};
use wbm_core::config::MirrorConfig;
use wbm_core::fetch::CurlFetcher;

pub fn run_discover(
    cfg: &MirrorConfig,
    domain: &str,
    max: Option<usize>,
    include_age_gate_resources: bool,
) -> Result<i32> {
    let mut fetcher = CurlFetcher::new(cfg)?;
    let opts = DiscoverOptions {
        max,
        include_age_gate_resources: include_age_gate_resources || cfg.include_age_gate_resources,
    };
    let captures = discover(&mut fetcher, &cfg.cdx_endpoint, domain, &opts)?;
    if captures.is_empty() {
        eprintln!("No captures found for {}.", domain);
    }
    for c in captures {
        println!("{} {} {}", c.timestamp, c.original_url, c.mimetype);
    }
    Ok(0)
}
