//! CLI command handlers, one file per command. Each returns the exit code.

mod completions;
mod discover;
mod manpage;
mod mirror;
mod rewrite;

pub use completions::run_completions;
pub use discover::run_discover;
pub use manpage::run_manpage;
pub use mirror::run_mirror;
pub use rewrite::run_rewrite;

/// Exit code when the run completed but some captures or files failed.
pub const EXIT_PARTIAL: i32 = 2;
