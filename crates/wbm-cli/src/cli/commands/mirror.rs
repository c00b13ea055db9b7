//! `wbm mirror` – fetch captures, rewrite links, write stats.

use anyhow::{Context, Result};
use wbm_core::capture::read_capture_list;
use wbm_core::cdx::{discover, DiscoverOptions};
use wbm_core::config::MirrorConfig;
use wbm_core::fetch::CurlFetcher;
use wbm_core::layout::OutputLayout;
use wbm_core::local_path::plan_captures;
use wbm_core::pipeline::{self, MirrorOptions};
use wbm_core::scrub::is_age_gate_resource;

use super::EXIT_PARTIAL;
use crate::cli::MirrorArgs;

pub fn run_mirror(cfg: &MirrorConfig, args: &MirrorArgs) -> Result<i32> {
    let mut cfg = cfg.clone();
    if let Some(ms) = args.delay_ms {
        cfg.delay_ms = ms;
    }
    if args.keep_age_gate {
        cfg.strip_age_gate = false;
    }
    if args.include_age_gate_resources {
        cfg.include_age_gate_resources = true;
    }

    let mut fetcher = CurlFetcher::new(&cfg)?;
    let captures = match (&args.input, &args.domain) {
        (Some(input), _) => {
            let mut list = read_capture_list(input)?;
            if !cfg.include_age_gate_resources {
                list.retain(|c| !is_age_gate_resource(&c.original_url));
            }
            if let Some(max) = args.max.filter(|m| *m > 0) {
                list.truncate(max);
            }
            list
        }
        (None, Some(domain)) => {
            let opts = DiscoverOptions {
                max: args.max,
                include_age_gate_resources: cfg.include_age_gate_resources,
            };
            discover(&mut fetcher, &cfg.cdx_endpoint, domain, &opts)?
        }
        (None, None) => anyhow::bail!("either --domain or --input is required"),
    };

    let plan = plan_captures(captures);
    let mut options = MirrorOptions::from_config(&cfg);
    options.rewrite = !args.no_rewrite;

    let stats = pipeline::run_mirror(OutputLayout::new(&args.out), options, plan, &mut fetcher)
        .with_context(|| format!("mirror into {}", args.out.display()))?;

    println!(
        "Mirrored {}/{} captures ({} resumed, {} failed), {} bytes in {:.1}s.",
        stats.succeeded, stats.attempted, stats.resumed, stats.failed, stats.total_bytes, stats.seconds
    );
    if stats.rewrite {
        println!(
            "Rewrote {} HTML and {} CSS files ({} failed).",
            stats.rewritten_html, stats.rewritten_css, stats.rewrite_failed
        );
    }
    println!("Site: {}", OutputLayout::new(&args.out).docs_dir().display());

    Ok(if stats.failed > 0 { EXIT_PARTIAL } else { 0 })
}
