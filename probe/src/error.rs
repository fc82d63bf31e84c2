use thiserror::Error;

/// Failures reported by the probe binaries.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0} environment variable is not set. Please set it with: export {0}=your_api_key_here")]
    MissingCredential(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No audio received")]
    NoAudio,

    #[error(transparent)]
    Client(#[from] tts_core::Error),
}
