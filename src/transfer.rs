//! The chunked transfer pipeline: one GET request, one read loop.
//!
//! Each chunk read from the response body is fed to every checksum
//! accumulator, written to the destination sink and reflected in the
//! progress display before the next read. Control flow is strictly linear
//! and blocking; an error on any step aborts the transfer.

use std::fs::File;
use std::io::{self, Read, Write};
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::checksum::AccumulatorSet;
use crate::error::TransferError;
use crate::models::{Destination, TransferOptions, TransferReport};
use crate::progress::Reporter;
use crate::utils::{format_bytes, format_duration};
use crate::{CONNECTION_TIMEOUT, MAX_CHUNK_COUNT, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};

/// Fetches `url` and streams the body through the chunk pipeline.
///
/// Returns the digests, byte count and (for an in-memory destination) the
/// body itself. Progress and diagnostics go to stderr; nothing is retried.
pub fn transfer(url: &str, options: TransferOptions) -> Result<TransferReport, TransferError> {
    let client = build_client(&options)?;

    tracing::debug!("Request sent, waiting for response from {:?} ...", netloc(url));
    let request_started = Instant::now();
    let response = client.get(url).send()?.error_for_status()?;
    tracing::debug!(
        "Received response after {}",
        format_duration(request_started.elapsed())
    );
    tracing::debug!("Downloading {url:?} ...");

    let total = content_length(response.headers());
    let chunk_size = effective_chunk_size(options.chunk_size, total);
    tracing::debug!("Using chunks of up to {}", format_bytes(chunk_size));

    let mut session = Session::open(&options, total)?;
    session.run(response, chunk_size)?;
    session.finish(&options.destination)
}

fn build_client(options: &TransferOptions) -> Result<Client, TransferError> {
    let mut headers = HeaderMap::new();
    for (key, value) in &options.headers {
        match (key.parse::<HeaderName>(), HeaderValue::from_str(value)) {
            (Ok(name), Ok(val)) => {
                headers.insert(name, val);
            }
            _ => tracing::warn!("Ignoring malformed header {key:?}"),
        }
    }

    // The default per-request timeout covers the whole transfer and would
    // cut off long downloads. Only the connect phase keeps a deadline.
    Client::builder()
        .timeout(None)
        .connect_timeout(CONNECTION_TIMEOUT)
        .default_headers(headers)
        .user_agent(options.user_agent.as_str())
        .build()
        .map_err(TransferError::Http)
}

/// The `host:port` part of the URL, for log messages only.
fn netloc(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().to_string();
            match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host,
            }
        }
        Err(_) => url.to_string(),
    }
}

/// The declared body size, or `None` when the header is missing or does not
/// parse as a non-negative integer.
fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Picks the chunk size for this transfer.
///
/// An explicit override wins; otherwise the total is split into at most
/// [`MAX_CHUNK_COUNT`] chunks. The result is always clamped between
/// [`MIN_CHUNK_SIZE`] and [`MAX_CHUNK_SIZE`] to avoid pathologically tiny
/// reads and unbounded buffers.
fn effective_chunk_size(requested: Option<u64>, total: Option<u64>) -> u64 {
    let chunk_size = match (requested, total) {
        (Some(size), _) => size,
        (None, Some(total)) => (total as f64 / MAX_CHUNK_COUNT as f64).round() as u64,
        (None, None) => MIN_CHUNK_SIZE,
    };
    chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

/// Reads until the buffer is full or the stream ends.
///
/// A bare `read` may return far less than the buffer size on a fast socket;
/// filling the chunk keeps the number of progress updates bounded.
fn read_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Destination sink for the downloaded bytes.
#[derive(Debug)]
enum Sink {
    File(File),
    Stdout(io::Stdout),
    Memory(Vec<u8>),
}

impl Sink {
    fn open(destination: &Destination) -> Result<Self, TransferError> {
        match destination {
            Destination::Path(path) => File::create(path)
                .map(Sink::File)
                .map_err(|source| TransferError::OpenDestination {
                    path: path.clone(),
                    source,
                }),
            Destination::Stdout => Ok(Sink::Stdout(io::stdout())),
            Destination::Memory => Ok(Sink::Memory(Vec::new())),
        }
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            Sink::File(file) => file.write_all(chunk),
            Sink::Stdout(out) => out.write_all(chunk),
            Sink::Memory(buffer) => {
                buffer.extend_from_slice(chunk);
                Ok(())
            }
        }
    }

    fn finish(self) -> io::Result<Option<Vec<u8>>> {
        match self {
            Sink::File(mut file) => {
                file.flush()?;
                Ok(None)
            }
            Sink::Stdout(mut out) => {
                out.flush()?;
                Ok(None)
            }
            Sink::Memory(buffer) => Ok(Some(buffer)),
        }
    }
}

/// One download invocation: owns the accumulators, the sink and the
/// progress reporter for the duration of the call.
#[derive(Debug)]
struct Session {
    accumulators: AccumulatorSet,
    sink: Sink,
    reporter: Option<Reporter<io::Stderr>>,
    received: u64,
    started: Instant,
}

impl Session {
    /// Opens the sink and resolves the checksum set. Fails before any body
    /// byte is read if the destination cannot be opened.
    fn open(options: &TransferOptions, total: Option<u64>) -> Result<Self, TransferError> {
        let sink = Sink::open(&options.destination)?;
        let started = Instant::now();
        let reporter = options
            .effective_progress()
            .then(|| Reporter::new(io::stderr(), total, started));
        Ok(Self {
            accumulators: AccumulatorSet::resolve(&options.checksums),
            sink,
            reporter,
            received: 0,
            started,
        })
    }

    /// The read-process-write loop. An empty read ends the stream.
    fn run<R: Read>(&mut self, mut body: R, chunk_size: u64) -> Result<(), TransferError> {
        let mut buffer = vec![0u8; chunk_size as usize];
        loop {
            let read = read_chunk(&mut body, &mut buffer)?;
            if read == 0 {
                break;
            }
            let chunk = &buffer[..read];
            self.accumulators.update(chunk);
            self.sink.write(chunk)?;
            self.received += read as u64;
            if let Some(reporter) = self.reporter.as_mut() {
                // A failed progress write never aborts the transfer.
                let _ = reporter.update(self.received);
            }
        }
        Ok(())
    }

    fn finish(mut self, destination: &Destination) -> Result<TransferReport, TransferError> {
        if let Some(reporter) = self.reporter.as_mut() {
            let _ = reporter.finish();
        }

        let elapsed = self.started.elapsed();
        let seconds = elapsed.as_secs_f64();
        let rate = if seconds > 0.0 {
            (self.received as f64 / seconds) as u64
        } else {
            0
        };
        tracing::debug!(
            "Received {} bytes in {} (~ {} bytes/sec)",
            self.received,
            format_duration(elapsed),
            rate
        );

        let content = self.sink.finish()?;
        if let Destination::Path(path) = destination {
            tracing::info!("Saved {} bytes to {:?}", self.received, path);
        }
        Ok(TransferReport {
            digests: self.accumulators.finalize_hex(),
            received_bytes: self.received,
            content,
        })
    }
}
