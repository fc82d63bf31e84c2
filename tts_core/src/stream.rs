//! Full synthesis over the bidirectional socket.
//!
//! `synthesis_stream` sends a scripted sequence of context messages and
//! yields decoded audio chunks as they arrive. The stream is lazy: nothing
//! connects until it is first polled, and it can be consumed only once.
//! `save_audio_stream` drains such a stream into a WAV file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::{pin_mut, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::messages::{ContextMessage, ServerEvent};
use crate::wav::{write_pcm16_wav, PcmCollector, OUTPUT_SAMPLE_RATE};
use crate::ws::{WsClient, WsConnection};

/// Sends `messages` in order and yields each decoded audio chunk.
///
/// The stream ends on `done`, on the socket closing, or once every context
/// closed by the script has been acknowledged. A server or transport error is
/// yielded as `Err` after the socket has been closed, and ends the stream.
pub fn synthesis_stream(client: WsClient, messages: Vec<ContextMessage>) -> impl Stream<Item = Result<Vec<u8>>> {
    try_stream! {
        let connect_start = Instant::now();
        let mut conn = client.connect().await?;
        info!(
            url = %client.url(),
            elapsed_ms = connect_start.elapsed().as_millis() as u64,
            "Connection established"
        );

        let mut pending_closes: Vec<&str> = messages
            .iter()
            .filter(|m| m.is_close())
            .map(|m| m.context_id.as_str())
            .collect();
        let mut failure = send_all(&mut conn, &messages).await.err();

        let recv_start = Instant::now();
        let mut chunk_count = 0usize;
        let mut total_bytes = 0usize;

        while failure.is_none() {
            let event = match conn.next_event().await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            match event {
                ServerEvent::Error(e) => {
                    warn!(message = %e.message, code = ?e.code, "Server error");
                    failure = Some(e.into());
                }
                ServerEvent::Done => {
                    info!("Synthesis completed (done)");
                    break;
                }
                ServerEvent::Status(status) => info!(status = %status, "Status"),
                ServerEvent::ContextClosed { context_id } => {
                    let pos = match context_id.as_deref() {
                        Some(id) => pending_closes.iter().position(|pending| *pending == id),
                        None if pending_closes.is_empty() => None,
                        None => Some(0),
                    };
                    let Some(pos) = pos else {
                        debug!(context_id = ?context_id, "Ignoring close for an unscripted context");
                        continue;
                    };
                    debug!(context_id = ?context_id, "Context closed");
                    pending_closes.remove(pos);
                    if pending_closes.is_empty() {
                        break;
                    }
                }
                ServerEvent::Audio(chunk) => {
                    if let Some(summary) = chunk.timestamp_summary() {
                        debug!(timestamps = %summary, "Timestamp info");
                    }
                    let audio = match chunk.decode() {
                        Ok(Some(audio)) => audio,
                        Ok(None) => continue,
                        Err(e) => {
                            warn!(error = %e, "Skipping undecodable audio payload");
                            continue;
                        }
                    };
                    chunk_count += 1;
                    total_bytes += audio.len();
                    if chunk_count == 1 {
                        info!(elapsed_ms = recv_start.elapsed().as_millis() as u64, "Time to first chunk");
                    }
                    debug!(chunk = chunk_count, bytes = audio.len(), "Audio chunk");
                    yield audio;
                }
                ServerEvent::ContextCreated { .. } | ServerEvent::Other => {}
            }
        }

        info!(chunks = chunk_count, bytes = total_bytes, "Stream finished");
        conn.close().await;
        if let Some(e) = failure {
            Err::<(), _>(e)?;
        }
    }
}

async fn send_all(conn: &mut WsConnection, messages: &[ContextMessage]) -> Result<()> {
    for message in messages {
        conn.send_json(message).await?;
    }
    Ok(())
}

/// Result of saving a synthesis stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub chunks: usize,
    /// PCM bytes written, excluding any stripped container header.
    pub pcm_bytes: usize,
}

/// Collects every chunk of `chunks` and writes them as a 48 kHz mono 16-bit
/// WAV at `path`. A leading WAV header on the first chunk is dropped. Nothing
/// is written if the stream fails.
pub async fn save_audio_stream<S>(chunks: S, path: impl AsRef<Path>) -> Result<SaveSummary>
where
    S: Stream<Item = Result<Vec<u8>>>,
{
    let path = path.as_ref().to_path_buf();
    info!(path = %path.display(), "Saving audio chunks");

    pin_mut!(chunks);
    let mut collector = PcmCollector::new();
    while let Some(chunk) = chunks.next().await {
        collector.push(&chunk?);
    }

    let chunk_count = collector.chunks();
    let pcm = collector.into_pcm();
    let out = path.clone();
    let pcm_bytes = tokio::task::spawn_blocking(move || write_pcm16_wav(&out, &pcm, OUTPUT_SAMPLE_RATE))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;

    info!(path = %path.display(), chunks = chunk_count, pcm_bytes, "Audio saved");
    Ok(SaveSummary {
        path,
        chunks: chunk_count,
        pcm_bytes,
    })
}
