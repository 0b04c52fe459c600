use std::io;
use std::path::PathBuf;

/// Errors produced while fetching and storing a URL body.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Connection, TLS, timeout or non-2xx status failures from the HTTP layer.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot open {path:?} for writing: {source}")]
    OpenDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Body reads and destination writes share this variant; both abort the
    /// transfer without producing a report.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
