//! WebSocket streaming latency probe.
//!
//! The connection and the synthesis context are set up before the timer
//! starts, so TTFB covers only text submission to first audio chunk.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::latency::{LatencyReport, LatencyTracker};
use crate::messages::{ContextMessage, CreateContext, ServerEvent};
use crate::sentences::split_sentences;
use crate::ws::{WsClient, WsConnection};

pub struct WsProber {
    client: WsClient,
}

impl WsProber {
    pub fn new(client: WsClient) -> Self {
        Self { client }
    }

    /// Creates `context_id`, sends `text` one flushed sentence at a time and
    /// measures the audio that comes back. The socket is closed on every path.
    pub async fn probe(&self, context_id: &str, create: CreateContext, text: &str) -> Result<LatencyReport> {
        let mut conn = self.client.connect().await?;
        let result = run_probe(&mut conn, context_id, create, text).await;
        conn.close().await;
        result
    }
}

async fn run_probe(conn: &mut WsConnection, context_id: &str, create: CreateContext, text: &str) -> Result<LatencyReport> {
    conn.send_json(&ContextMessage::create(context_id, create)).await?;
    wait_for_context(conn, context_id).await?;

    let mut tracker = LatencyTracker::start();

    let sentences = split_sentences(text);
    debug!(count = sentences.len(), "Sending sentences");
    for sentence in sentences {
        conn.send_json(&ContextMessage::send_text(context_id, sentence, true)).await?;
    }
    conn.send_json(&ContextMessage::close(context_id)).await?;

    while let Some(event) = conn.next_event().await? {
        match event {
            ServerEvent::Error(e) => {
                warn!(message = %e.message, code = ?e.code, "Server error during synthesis");
                return Err(e.into());
            }
            ServerEvent::ContextClosed { context_id: closed } => {
                if is_ours(closed.as_deref(), context_id) {
                    debug!("Context closed");
                    break;
                }
                debug!(closed = ?closed, "Ignoring close for another context");
            }
            ServerEvent::Done => break,
            ServerEvent::Audio(chunk) => {
                match chunk.decode() {
                    Ok(Some(audio)) => tracker.record_audio(audio.len()),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Skipping undecodable audio payload"),
                }
            }
            _ => {}
        }
    }

    let report = tracker.finish();
    info!(
        ttfb_ms = ?report.ttfb_ms(),
        total_ms = report.total_ms(),
        audio_bytes = report.audio_bytes,
        "WebSocket stream finished"
    );
    Ok(report)
}

/// Blocks until the server acknowledges `context_id`. Other messages are
/// ignored; an error or a closed socket ends the wait with a failure.
async fn wait_for_context(conn: &mut WsConnection, context_id: &str) -> Result<()> {
    while let Some(event) = conn.next_event().await? {
        match event {
            ServerEvent::Error(e) => return Err(e.into()),
            ServerEvent::ContextCreated { context_id: acked } => {
                if is_ours(acked.as_deref(), context_id) {
                    info!(context_id = %context_id, "Context created");
                    return Ok(());
                }
                debug!(acked = ?acked, "Ignoring ack for another context");
            }
            _ => {}
        }
    }
    Err(Error::UnexpectedClose)
}

/// Acks without a context id are taken to refer to ours.
fn is_ours(acked: Option<&str>, context_id: &str) -> bool {
    acked.map_or(true, |id| id == context_id)
}
