//! Low-latency TTS over the bidirectional WebSocket.
//!
//! The socket and the audio context are set up before the timer starts;
//! TTFB runs from the first sentence sent to the first audio chunk.

use std::process::ExitCode;

use probe::config::env_var;

#[tokio::main]
async fn main() -> ExitCode {
    probe::init();
    probe::run("WebSocket latency test", probe::flows::ws_latency(env_var)).await
}
