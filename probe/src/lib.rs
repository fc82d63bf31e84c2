pub mod config;
pub mod error;
pub mod flows;
pub mod report;
pub mod validation;

use std::future::Future;
use std::process::ExitCode;

use tracing::{error, info};

pub use config::{ApiKey, ProbeConfig};
pub use error::ProbeError;

/// Installs the fmt subscriber (`RUST_LOG`, default `info`) and loads `.env`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();
}

/// Runs `task` and maps its outcome to the process exit status.
pub async fn run<F>(name: &str, task: F) -> ExitCode
where
    F: Future<Output = anyhow::Result<()>>,
{
    match task.await {
        Ok(()) => {
            info!("{name} finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{name} failed: {e:#}");
            eprintln!("\n{name} failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
