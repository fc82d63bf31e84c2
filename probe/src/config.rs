// Configuration for the probe binaries

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ProbeError;

pub const API_KEY_VAR: &str = "INWORLD_API_KEY";

pub const DEFAULT_TEXT: &str =
    "Life moves pretty fast. Look around once in a while, or you might miss it.";
pub const DEFAULT_VOICE_ID: &str = "Dennis";
pub const DEFAULT_MODEL_ID: &str = "inworld-tts-1.5-mini";
pub const DEFAULT_OUTPUT_FILE: &str = "synthesis_websocket_output.wav";

/// Process-environment lookup used by the binaries.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// API credential, kept out of `Debug` output.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Reads the key through `lookup`. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(API_KEY_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(ApiKey)
            .ok_or(ProbeError::MissingCredential(API_KEY_VAR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub http_url: String,
    pub ws_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub text: String,
    pub output_file: PathBuf,
    pub connect_timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            http_url: tts_core::HTTP_STREAM_URL.to_string(),
            ws_url: tts_core::WS_STREAM_URL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            text: DEFAULT_TEXT.to_string(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            connect_timeout_secs: tts_core::CONN_TIMEOUT.as_secs(),
        }
    }
}

impl ProbeConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default)
        };

        let connect_timeout_secs = lookup("WS_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_timeout_secs);

        let output_file = lookup("TTS_OUTPUT_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.output_file);

        Self {
            http_url: string("INWORLD_TTS_HTTP_URL", defaults.http_url),
            ws_url: string("INWORLD_TTS_WS_URL", defaults.ws_url),
            voice_id: string("TTS_VOICE_ID", defaults.voice_id),
            model_id: string("TTS_MODEL_ID", defaults.model_id),
            text: string("TTS_TEXT", defaults.text),
            output_file,
            connect_timeout_secs,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
