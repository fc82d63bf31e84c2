//! HTTP streaming latency probe.
//!
//! A warm-up request establishes the pooled TCP + TLS connection first, so
//! the timed request measures synthesis latency rather than the handshake.

use futures_util::{pin_mut, StreamExt};
use reqwest::{header, Client};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::latency::{LatencyReport, LatencyTracker};
use crate::messages::{ServerEvent, SynthesisRequest};
use crate::ndjson::ndjson_lines;

/// Text of the untimed warm-up request.
pub const WARMUP_TEXT: &str = "hi";

pub struct HttpProber {
    client: Client,
    url: String,
    authorization: String,
}

impl HttpProber {
    /// Builds a connection-reusing client for `url`.
    pub fn new(url: impl Into<String>, api_key: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url: url.into(),
            authorization: format!("Basic {api_key}"),
        })
    }

    /// Runs the warm-up and then the timed request.
    pub async fn probe(&self, request: &SynthesisRequest) -> Result<LatencyReport> {
        self.warm_up(request).await?;
        self.measure(request).await
    }

    /// Sends a short request and reads the whole body so the connection goes
    /// back to the pool. A non-success status is only logged.
    pub async fn warm_up(&self, request: &SynthesisRequest) -> Result<()> {
        info!(url = %self.url, "Warming up connection");
        let response = self.post(&request.with_text(WARMUP_TEXT)).await?;
        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() {
            debug!(bytes = body.len(), "Warm-up complete");
        } else {
            warn!(status = %status, "Warm-up request failed");
        }
        Ok(())
    }

    /// Streams one synthesis and measures it from request start.
    pub async fn measure(&self, request: &SynthesisRequest) -> Result<LatencyReport> {
        let mut tracker = LatencyTracker::start();
        let response = self.post(request).await?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!(error = %e, "Failed to read error body");
                    String::new()
                }
            };
            let body = match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(json) => json.to_string(),
                Err(_) => text,
            };
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let lines = ndjson_lines(response.bytes_stream());
        pin_mut!(lines);
        while let Some(line) = lines.next().await {
            handle_line(&line?, &mut tracker)?;
        }

        let report = tracker.finish();
        info!(
            ttfb_ms = ?report.ttfb_ms(),
            total_ms = report.total_ms(),
            audio_bytes = report.audio_bytes,
            "HTTP stream finished"
        );
        Ok(report)
    }

    async fn post(&self, request: &SynthesisRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&self.url)
            .header(header::AUTHORIZATION, self.authorization.as_str())
            .json(request)
            .send()
            .await?;
        Ok(response)
    }
}

fn handle_line(line: &str, tracker: &mut LatencyTracker) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    match ServerEvent::from_json(line) {
        Ok(ServerEvent::Audio(chunk)) => match chunk.decode() {
            Ok(Some(audio)) => tracker.record_audio(audio.len()),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Skipping undecodable audio payload"),
        },
        Ok(ServerEvent::Error(e)) => return Err(e.into()),
        Ok(_) => {}
        Err(e) => debug!(error = %e, "Skipping malformed line"),
    }
    Ok(())
}
