//! Full synthesis over the WebSocket context flow, saved as a WAV file.

use std::process::ExitCode;

use probe::config::env_var;

#[tokio::main]
async fn main() -> ExitCode {
    probe::init();
    probe::run("WebSocket synthesis", probe::flows::ws_synthesis(env_var)).await
}
