//! Error types for the streaming TTS clients.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Client error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key cannot be sent as a header value: {0}")]
    InvalidCredential(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// In-band error object sent by the server.
    #[error("Server error: {message}{}", fmt_code(.code))]
    Server { code: Option<i64>, message: String },

    #[error("Connection timeout")]
    ConnectionTimeout,

    /// The socket ended before the context was acknowledged.
    #[error("Connection closed before the context was created")]
    UnexpectedClose,

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_code(code: &Option<i64>) -> String {
    code.map(|c| format!(" (code: {c})")).unwrap_or_default()
}
