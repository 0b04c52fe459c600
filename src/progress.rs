//! In-place progress rendering on the error stream.
//!
//! Two display modes, chosen by whether the total size is known: a bar with
//! percentage and time estimate, or a plain byte counter. Every update ends
//! in a carriage return so the line is redrawn in place; a final newline is
//! emitted once when the transfer ends.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::PROGRESS_BAR_WIDTH;
use crate::utils::format_duration;

const ITEM_COMPLETE: char = '#';
const ITEM_REMAINING: char = '-';

/// Point-in-time progress figures, recomputed on every chunk boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub elapsed: Duration,
    pub received: u64,
    /// Completed fraction in `0.0..=1.0`; `None` when the total is unknown.
    pub ratio: Option<f64>,
    /// Estimated remaining time; `None` when unknowable.
    pub remaining: Option<Duration>,
}

impl Snapshot {
    /// Derives a snapshot from the byte counters and the elapsed time.
    ///
    /// Servers occasionally declare a content length smaller than the body
    /// they send; the ratio is clamped to 1.0 so the display stays sane.
    /// A declared length of zero is treated like an unknown total.
    pub fn compute(received: u64, total: Option<u64>, elapsed: Duration) -> Self {
        let ratio = match total {
            Some(total) if total > 0 => Some((received as f64 / total as f64).min(1.0)),
            _ => None,
        };
        let remaining = ratio.and_then(|ratio| {
            if ratio > 0.0 {
                let seconds = elapsed.as_secs_f64() * (1.0 - ratio) / ratio;
                Duration::try_from_secs_f64(seconds).ok()
            } else {
                None
            }
        });
        Self {
            elapsed,
            received,
            ratio,
            remaining,
        }
    }
}

/// Renders one progress line, without a trailing newline.
pub fn render(snapshot: &Snapshot, width: usize) -> String {
    match snapshot.ratio {
        Some(ratio) => {
            let complete = ((ratio * width as f64).round() as usize).min(width);
            let bar_complete: String = std::iter::repeat(ITEM_COMPLETE).take(complete).collect();
            let bar_remaining: String = std::iter::repeat(ITEM_REMAINING)
                .take(width - complete)
                .collect();
            let eta = match snapshot.remaining {
                Some(remaining) => format_duration(remaining),
                None => "-".to_string(),
            };
            format!(
                "PROGRESS | {bar_complete}{bar_remaining} | {percent:5.1}% | ET: {et} | ETA: {eta}       \r",
                percent = 100.0 * ratio,
                et = format_duration(snapshot.elapsed),
            )
        }
        None => format!(
            "PROGRESS | {received} bytes received, elapsed time: {et}\r",
            received = snapshot.received,
            et = format_duration(snapshot.elapsed),
        ),
    }
}

/// Writes progress lines for one transfer to the given stream.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    total: Option<u64>,
    width: usize,
    started: Instant,
    rendered: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, total: Option<u64>, started: Instant) -> Self {
        Self {
            out,
            total,
            width: PROGRESS_BAR_WIDTH,
            started,
            rendered: false,
        }
    }

    /// Recomputes the snapshot for the current byte count and redraws the line.
    pub fn update(&mut self, received: u64) -> io::Result<()> {
        let snapshot = Snapshot::compute(received, self.total, self.started.elapsed());
        self.out.write_all(render(&snapshot, self.width).as_bytes())?;
        self.out.flush()?;
        self.rendered = true;
        Ok(())
    }

    /// Ends the in-place redraw with a newline, if anything was drawn.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.rendered {
            self.out.write_all(b"\n")?;
            self.out.flush()?;
        }
        Ok(())
    }
}
