pub mod capture;
pub mod cdx;
pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod journal;
pub mod layout;
pub mod local_path;
pub mod logging;
pub mod pipeline;
pub mod retry;
pub mod rewrite;
pub mod scrub;
pub mod storage;
pub mod url_map;
