use std::collections::HashMap;
use std::path::PathBuf;

use crate::checksum::Algorithm;

/// Where the downloaded bytes end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Write to a file at the given path.
    Path(PathBuf),
    /// Stream straight to standard output.
    Stdout,
    /// Collect the body in memory and return it in the report.
    Memory,
}

/// Configuration for one transfer invocation.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Extra request headers, merged into the outbound request.
    pub headers: HashMap<String, String>,
    /// Checksum algorithm names to compute while streaming; unknown names
    /// are skipped with a warning.
    pub checksums: Vec<String>,
    /// Render progress on stderr after every chunk.
    pub show_progress: bool,
    pub destination: Destination,
    /// Explicit chunk size in bytes; derived from the content length when
    /// absent.
    pub chunk_size: Option<u64>,
    pub user_agent: String,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            checksums: Vec::new(),
            show_progress: false,
            destination: Destination::Memory,
            chunk_size: None,
            user_agent: format!("chunkget/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TransferOptions {
    /// Whether progress should actually be rendered. Forced off when the
    /// body streams to stdout.
    pub fn effective_progress(&self) -> bool {
        self.show_progress && self.destination != Destination::Stdout
    }
}

/// Final outcome of a completed transfer.
#[derive(Debug, Clone)]
pub struct TransferReport {
    /// Hex digests in the order the algorithms were requested.
    pub digests: Vec<(Algorithm, String)>,
    pub received_bytes: u64,
    /// The body itself, present only for [`Destination::Memory`].
    pub content: Option<Vec<u8>>,
}

impl TransferReport {
    pub fn digest(&self, algorithm: Algorithm) -> Option<&str> {
        self.digests
            .iter()
            .find(|(candidate, _)| *candidate == algorithm)
            .map(|(_, digest)| digest.as_str())
    }
}
