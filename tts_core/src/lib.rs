//! Streaming clients for the Inworld text-to-speech API.
//!
//! Three flows are provided:
//!
//! - [`HttpProber`]: TTFB over the HTTP NDJSON streaming endpoint, with a
//!   warm-up request so the handshake is not timed.
//! - [`WsProber`]: TTFB over the bidirectional socket, with the context
//!   created before the timer starts and text flushed sentence by sentence.
//! - [`synthesis_stream`] + [`save_audio_stream`]: a scripted context flow
//!   whose audio is written to a WAV file.
//!
//! # Example
//!
//! ```no_run
//! use tts_core::{AudioConfig, HttpProber, SynthesisRequest, HTTP_STREAM_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tts_core::Error> {
//!     let api_key = std::env::var("INWORLD_API_KEY").unwrap_or_default();
//!     let prober = HttpProber::new(HTTP_STREAM_URL, &api_key)?;
//!     let request = SynthesisRequest::new(
//!         "Hello there.",
//!         "Dennis",
//!         "inworld-tts-1.5-mini",
//!         AudioConfig::ogg_opus(24000, 32000),
//!     );
//!     let report = prober.probe(&request).await?;
//!     println!("TTFB: {:?}", report.ttfb);
//!     Ok(())
//! }
//! ```

mod error;
mod http;
mod latency;
mod messages;
mod ndjson;
pub mod sentences;
mod stream;
pub mod wav;
mod ws;
mod ws_probe;

pub use error::{Error, Result};
pub use http::{HttpProber, WARMUP_TEXT};
pub use latency::{LatencyReport, LatencyTracker};
pub use messages::*;
pub use ndjson::ndjson_lines;
pub use sentences::split_sentences;
pub use stream::{save_audio_stream, synthesis_stream, SaveSummary};
pub use ws::{WsClient, WsConnection, CONN_TIMEOUT};
pub use ws_probe::WsProber;

/// HTTP streaming synthesis endpoint.
pub const HTTP_STREAM_URL: &str = "https://api.inworld.ai/tts/v1/voice:stream";

/// Bidirectional WebSocket synthesis endpoint.
pub const WS_STREAM_URL: &str = "wss://api.inworld.ai/tts/v1/voice:streamBidirectional";
