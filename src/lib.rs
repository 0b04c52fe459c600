//! Download the body of a URL in bounded chunks, feeding every chunk to a
//! set of incremental checksum accumulators and to a file, stdout or an
//! in-memory buffer, with an optional in-place progress display on stderr.

use std::time::Duration;

pub mod checksum;
pub mod cli;
pub mod error;
pub mod logging;
pub mod models;
pub mod progress;
pub mod transfer;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use checksum::Algorithm;
pub use error::TransferError;
pub use models::{Destination, TransferOptions, TransferReport};
pub use transfer::transfer;

/// Ceiling on the number of chunks a bounded download is split into.
pub const MAX_CHUNK_COUNT: u64 = 10_000;
pub const MIN_CHUNK_SIZE: u64 = 64 * 1024; // 64 KB
pub const MAX_CHUNK_SIZE: u64 = 10 * 1024 * 1024; // 10 MB
pub const PROGRESS_BAR_WIDTH: usize = 20;
/// File name used when the URL path ends in a slash.
pub const DIRECTORY_INDEX: &str = "index.html";
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
