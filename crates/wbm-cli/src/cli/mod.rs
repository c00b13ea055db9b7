//! CLI for wbm, the Wayback static mirror builder.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wbm_core::config::{self, MirrorConfig};

use commands::{run_completions, run_discover, run_manpage, run_mirror, run_rewrite};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wbm", version)]
#[command(about = "Build a static, offline mirror of a site from Wayback Machine captures", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every capture of a site and build the mirror.
    Mirror(MirrorArgs),

    /// Re-run link rewriting over an existing mirror, using its index.
    Rewrite {
        /// Output root of an earlier `wbm mirror` run.
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
    },

    /// List the captures the CDX API knows for a domain.
    Discover {
        /// Domain to query, e.g. example.org.
        #[arg(long)]
        domain: String,
        /// Keep only the first N captures.
        #[arg(long, value_name = "N")]
        max: Option<usize>,
        /// Keep Age Gate plugin assets and endpoints.
        #[arg(long)]
        include_age_gate_resources: bool,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff).
    Manpage,
}

#[derive(Debug, Clone, Args)]
pub struct MirrorArgs {
    /// Domain to mirror; captures are discovered through the CDX API.
    #[arg(long, required_unless_present = "input")]
    pub domain: Option<String>,
    /// Output root; the site goes to DIR/docs, logs to DIR/meta.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,
    /// Capture list (`timestamp url [mimetype]` per line) instead of CDX discovery.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Mirror at most N captures.
    #[arg(long, value_name = "N")]
    pub max: Option<usize>,
    /// Skip the link rewriting pass.
    #[arg(long)]
    pub no_rewrite: bool,
    /// Leave the WordPress Age Gate overlay in saved pages.
    #[arg(long)]
    pub keep_age_gate: bool,
    /// Also fetch Age Gate plugin assets and endpoints.
    #[arg(long)]
    pub include_age_gate_resources: bool,
    /// Pause between requests, overriding the config file.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,
}

impl CliCommand {
    /// Parse arguments, run the command and return the process exit code.
    pub fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let load_config = || -> Result<MirrorConfig> {
            let cfg = config::load_or_init()?;
            tracing::debug!("loaded config: {:?}", cfg);
            Ok(cfg)
        };

        match cli.command {
            CliCommand::Mirror(args) => run_mirror(&load_config()?, &args),
            CliCommand::Rewrite { out } => run_rewrite(&out),
            CliCommand::Discover {
                domain,
                max,
                include_age_gate_resources,
            } => run_discover(&load_config()?, &domain, max, include_age_gate_resources),
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Manpage => run_manpage(),
        }
    }
}

#[cfg(test)]
mod tests;
