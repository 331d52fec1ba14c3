//! Timing utilities for proxied request measurements.

use crate::proxy::types::TimingInfo;
use std::time::Instant;

/// Wall-clock measurements for one proxied call.
///
/// The total runs from construction (just before dispatch) to [`finish`],
/// which is called once the outcome is known, success or failure.
///
/// [`finish`]: DetailedTiming::finish
#[derive(Debug)]
pub struct DetailedTiming {
    pub total_start: Instant,
    pub request_start: Option<Instant>,
    pub ttfb: Option<Instant>,
    pub download_start: Option<Instant>,
    pub download_end: Option<Instant>,
    pub finished: Option<Instant>,
}

impl DetailedTiming {
    /// Creates a new `DetailedTiming` instance with the total timer started.
    pub fn new() -> Self {
        Self {
            total_start: Instant::now(),
            request_start: None,
            ttfb: None,
            download_start: None,
            download_end: None,
            finished: None,
        }
    }

    /// Marks the start of sending the request.
    pub fn start_request(&mut self) {
        self.request_start = Some(Instant::now());
    }

    /// Marks the time to first byte (TTFB).
    pub fn mark_ttfb(&mut self) {
        self.ttfb = Some(Instant::now());
    }

    pub fn start_download(&mut self) {
        self.download_start = Some(Instant::now());
    }

    pub fn end_download(&mut self) {
        self.download_end = Some(Instant::now());
    }

    /// Stops the total timer. Later calls keep the first stop time.
    pub fn finish(&mut self) {
        if self.finished.is_none() {
            self.finished = Some(Instant::now());
        }
    }

    /// Milliseconds from start to finish (or to now, if still running).
    pub fn total_ms(&self) -> u64 {
        self.finished
            .unwrap_or_else(Instant::now)
            .duration_since(self.total_start)
            .as_millis() as u64
    }

    pub fn to_timing_info(&self) -> TimingInfo {
        let ttfb = match (self.request_start, self.ttfb) {
            (Some(s), Some(e)) => Some(e.duration_since(s).as_millis() as u64),
            _ => None,
        };

        let download = match (self.download_start, self.download_end) {
            (Some(s), Some(e)) => Some(e.duration_since(s).as_millis() as u64),
            _ => None,
        };

        TimingInfo {
            total: self.total_ms(),
            ttfb,
            download,
        }
    }
}

impl Default for DetailedTiming {
    fn default() -> Self {
        Self::new()
    }
}
