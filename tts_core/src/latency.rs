//! Time-to-first-byte and throughput tracking for a single synthesis run.

use std::time::{Duration, Instant};

/// Running measurement, started when the first text is sent.
#[derive(Debug, Clone)]
pub struct LatencyTracker {
    start: Instant,
    ttfb: Option<Duration>,
    audio_bytes: usize,
    chunks: usize,
}

impl LatencyTracker {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            ttfb: None,
            audio_bytes: 0,
            chunks: 0,
        }
    }

    /// Records one decoded audio chunk. The first call fixes TTFB.
    pub fn record_audio(&mut self, len: usize) {
        if self.ttfb.is_none() {
            self.ttfb = Some(self.start.elapsed());
        }
        self.audio_bytes += len;
        self.chunks += 1;
    }

    pub fn ttfb(&self) -> Option<Duration> {
        self.ttfb
    }

    pub fn audio_bytes(&self) -> usize {
        self.audio_bytes
    }

    pub fn finish(self) -> LatencyReport {
        LatencyReport {
            ttfb: self.ttfb,
            total: self.start.elapsed(),
            audio_bytes: self.audio_bytes,
            chunks: self.chunks,
        }
    }
}

/// Final result of a latency probe.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyReport {
    /// Absent when the stream carried no audio.
    pub ttfb: Option<Duration>,
    pub total: Duration,
    pub audio_bytes: usize,
    pub chunks: usize,
}

impl LatencyReport {
    pub fn ttfb_ms(&self) -> Option<f64> {
        self.ttfb.map(|d| d.as_secs_f64() * 1000.0)
    }

    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }
}
