//! Low-latency TTS over HTTP streaming.
//!
//! The connection is warmed up with a short request before the timed one, so
//! TTFB measures synthesis only.

use std::process::ExitCode;

use probe::config::env_var;

#[tokio::main]
async fn main() -> ExitCode {
    probe::init();
    probe::run("HTTP latency test", probe::flows::http_latency(env_var)).await
}
