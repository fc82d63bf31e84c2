//! Message types for the Inworld TTS HTTP and WebSocket protocols.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

// ============================================================================
// Requests
// ============================================================================

/// Audio encodings accepted by the synthesis endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Linear16,
    OggOpus,
    Mp3,
    Alaw,
    Mulaw,
    Flac,
}

/// Output audio configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub audio_encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u32>,
}

impl AudioConfig {
    /// Opus in an Ogg container, the lowest-latency encoding for the probes.
    pub fn ogg_opus(sample_rate_hertz: u32, bit_rate: u32) -> Self {
        Self {
            audio_encoding: AudioEncoding::OggOpus,
            sample_rate_hertz,
            bit_rate: Some(bit_rate),
        }
    }

    /// Raw 16-bit PCM.
    pub fn linear16(sample_rate_hertz: u32) -> Self {
        Self {
            audio_encoding: AudioEncoding::Linear16,
            sample_rate_hertz,
            bit_rate: None,
        }
    }
}

/// Body of a `POST` to the HTTP streaming endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub audio_config: AudioConfig,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        model_id: impl Into<String>,
        audio_config: AudioConfig,
    ) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            model_id: model_id.into(),
            audio_config,
        }
    }

    /// Same voice, model and audio config with different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// Settings for a new synthesis context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContext {
    pub voice_id: String,
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_char_threshold: Option<u32>,
    pub audio_config: AudioConfig,
}

impl CreateContext {
    pub fn new(voice_id: impl Into<String>, model_id: impl Into<String>, audio_config: AudioConfig) -> Self {
        Self {
            voice_id: voice_id.into(),
            model_id: model_id.into(),
            buffer_char_threshold: None,
            audio_config,
        }
    }

    pub fn with_buffer_char_threshold(mut self, threshold: u32) -> Self {
        self.buffer_char_threshold = Some(threshold);
        self
    }
}

/// Serialized as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushContext {}

/// Serialized as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseContext {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_context: Option<FlushContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextAction {
    Create(CreateContext),
    SendText(SendText),
    CloseContext(CloseContext),
}

/// A client message on the bidirectional socket: a context id plus one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMessage {
    pub context_id: String,
    #[serde(flatten)]
    pub action: ContextAction,
}

impl ContextMessage {
    pub fn create(context_id: impl Into<String>, create: CreateContext) -> Self {
        Self {
            context_id: context_id.into(),
            action: ContextAction::Create(create),
        }
    }

    pub fn send_text(context_id: impl Into<String>, text: impl Into<String>, flush: bool) -> Self {
        Self {
            context_id: context_id.into(),
            action: ContextAction::SendText(SendText {
                text: text.into(),
                flush_context: flush.then(FlushContext::default),
            }),
        }
    }

    pub fn close(context_id: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            action: ContextAction::CloseContext(CloseContext::default()),
        }
    }

    pub fn is_close(&self) -> bool {
        matches!(self.action, ContextAction::CloseContext(_))
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    result: Option<RawResult>,
    #[serde(default)]
    done: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    #[serde(default)]
    context_id: Option<String>,
    #[serde(default)]
    context_created: Option<Value>,
    #[serde(default)]
    context_closed: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    audio_chunk: Option<RawAudioChunk>,
    #[serde(default)]
    audio_content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAudioChunk {
    #[serde(default)]
    audio_content: Option<String>,
    #[serde(default)]
    timestamp_info: Option<Value>,
}

/// Error object reported in-band by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub code: Option<i64>,
    pub message: String,
}

impl ServerError {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(o) => Self {
                code: o.get("code").and_then(Value::as_i64),
                message: o
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string(),
            },
            Value::String(s) => Self {
                code: None,
                message: s.clone(),
            },
            other => Self {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<ServerError> for Error {
    fn from(e: ServerError) -> Self {
        Error::Server {
            code: e.code,
            message: e.message,
        }
    }
}

/// One audio chunk as received, still base64-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub audio_content: Option<String>,
    pub timestamp_info: Option<Value>,
}

impl AudioChunk {
    /// The base64 payload, if the chunk carries any audio.
    pub fn payload(&self) -> Option<&str> {
        self.audio_content.as_deref().filter(|s| !s.is_empty())
    }

    pub fn decode(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        self.payload()
            .map(|b64| general_purpose::STANDARD.decode(b64))
            .transpose()
    }

    /// Short description of the timestamp metadata for logging.
    pub fn timestamp_summary(&self) -> Option<String> {
        match self.timestamp_info.as_ref()? {
            Value::Array(entries) => Some(format!("{} entries", entries.len())),
            Value::Object(fields) => Some(
                fields
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

/// Classified inbound message, shared by the NDJSON body and the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Error(ServerError),
    ContextCreated { context_id: Option<String> },
    ContextClosed { context_id: Option<String> },
    Audio(AudioChunk),
    Status(Value),
    /// Top-level `done: true`.
    Done,
    /// Anything else, including results with no recognised field.
    Other,
}

impl ServerEvent {
    /// Parses and classifies one JSON message.
    ///
    /// An error object wins over everything else. Audio is looked up in
    /// `result.audioChunk.audioContent` first and then in
    /// `result.audioContent`, which is where the HTTP endpoint puts it.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawMessage = serde_json::from_str(text)?;

        if let Some(err) = raw.error.as_ref() {
            return Ok(ServerEvent::Error(ServerError::from_value(err)));
        }

        let Some(result) = raw.result else {
            return Ok(if raw.done == Some(true) {
                ServerEvent::Done
            } else {
                ServerEvent::Other
            });
        };

        if result.context_created.is_some() {
            return Ok(ServerEvent::ContextCreated {
                context_id: result.context_id,
            });
        }
        if result.context_closed.is_some() {
            return Ok(ServerEvent::ContextClosed {
                context_id: result.context_id,
            });
        }
        if let Some(chunk) = result.audio_chunk {
            return Ok(ServerEvent::Audio(AudioChunk {
                audio_content: chunk.audio_content.or(result.audio_content),
                timestamp_info: chunk.timestamp_info,
            }));
        }
        if result.audio_content.is_some() {
            return Ok(ServerEvent::Audio(AudioChunk {
                audio_content: result.audio_content,
                timestamp_info: None,
            }));
        }
        if let Some(status) = result.status {
            return Ok(ServerEvent::Status(status));
        }
        Ok(ServerEvent::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_message_shape() {
        let create = CreateContext::new("Ashley", "inworld-tts-1", AudioConfig::linear16(48000))
            .with_buffer_char_threshold(50);
        let msg = serde_json::to_value(ContextMessage::create("ctx-1", create)).unwrap();
        assert_eq!(
            msg,
            json!({
                "context_id": "ctx-1",
                "create": {
                    "voice_id": "Ashley",
                    "model_id": "inworld-tts-1",
                    "buffer_char_threshold": 50,
                    "audio_config": {
                        "audio_encoding": "LINEAR16",
                        "sample_rate_hertz": 48000
                    }
                }
            })
        );
    }

    #[test]
    fn test_send_text_and_close_shape() {
        let msg = serde_json::to_value(ContextMessage::send_text("ctx", "Hi.", true)).unwrap();
        assert_eq!(
            msg,
            json!({"context_id": "ctx", "send_text": {"text": "Hi.", "flush_context": {}}})
        );

        let msg = serde_json::to_value(ContextMessage::send_text("ctx", "Hi.", false)).unwrap();
        assert_eq!(msg, json!({"context_id": "ctx", "send_text": {"text": "Hi."}}));

        let msg = serde_json::to_value(ContextMessage::close("ctx")).unwrap();
        assert_eq!(msg, json!({"context_id": "ctx", "close_context": {}}));
    }

    #[test]
    fn test_http_request_shape() {
        let req = SynthesisRequest::new("text", "Dennis", "inworld-tts-1.5-mini", AudioConfig::ogg_opus(24000, 32000));
        let warmup = serde_json::to_value(req.with_text("hi")).unwrap();
        assert_eq!(
            warmup,
            json!({
                "text": "hi",
                "voice_id": "Dennis",
                "model_id": "inworld-tts-1.5-mini",
                "audio_config": {
                    "audio_encoding": "OGG_OPUS",
                    "sample_rate_hertz": 24000,
                    "bit_rate": 32000
                }
            })
        );
    }

    #[test]
    fn test_classify_error_first() {
        let event = ServerEvent::from_json(
            r#"{"error": {"code": 5, "message": "no such voice"}, "result": {"audioContent": "AAAA"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ServerEvent::Error(ServerError { code: Some(5), message: "no such voice".to_string() })
        );

        let event = ServerEvent::from_json(r#"{"error": "boom"}"#).unwrap();
        assert_eq!(event, ServerEvent::Error(ServerError { code: None, message: "boom".to_string() }));
    }

    #[test]
    fn test_classify_context_acks() {
        let event = ServerEvent::from_json(r#"{"result": {"contextId": "c", "contextCreated": {}}}"#).unwrap();
        assert_eq!(event, ServerEvent::ContextCreated { context_id: Some("c".to_string()) });

        let event = ServerEvent::from_json(r#"{"result": {"contextClosed": {}}}"#).unwrap();
        assert_eq!(event, ServerEvent::ContextClosed { context_id: None });
    }

    #[test]
    fn test_classify_done_and_other() {
        assert_eq!(ServerEvent::from_json(r#"{"done": true}"#).unwrap(), ServerEvent::Done);
        assert_eq!(ServerEvent::from_json(r#"{"done": false}"#).unwrap(), ServerEvent::Other);
        assert_eq!(ServerEvent::from_json(r#"{"result": {}}"#).unwrap(), ServerEvent::Other);
        assert!(ServerEvent::from_json("not json").is_err());
    }

    #[test]
    fn test_audio_chunk_payload_and_fallback() {
        let event = ServerEvent::from_json(
            r#"{"result": {"audioChunk": {"audioContent": "aGVsbG8=", "timestampInfo": [{"word": "hello"}]}}}"#,
        )
        .unwrap();
        let ServerEvent::Audio(chunk) = event else { panic!("expected audio") };
        assert_eq!(chunk.decode().unwrap(), Some(b"hello".to_vec()));
        assert_eq!(chunk.timestamp_summary().as_deref(), Some("1 entries"));

        let event = ServerEvent::from_json(r#"{"result": {"audioChunk": {}, "audioContent": "aGk="}}"#).unwrap();
        let ServerEvent::Audio(chunk) = event else { panic!("expected audio") };
        assert_eq!(chunk.decode().unwrap(), Some(b"hi".to_vec()));

        // HTTP body lines carry the payload directly under result.
        let event = ServerEvent::from_json(r#"{"result": {"audioContent": "aGk="}}"#).unwrap();
        let ServerEvent::Audio(chunk) = event else { panic!("expected audio") };
        assert_eq!(chunk.payload(), Some("aGk="));
    }

    #[test]
    fn test_audio_chunk_without_content() {
        let event = ServerEvent::from_json(r#"{"result": {"audioChunk": {"audioContent": ""}}}"#).unwrap();
        let ServerEvent::Audio(chunk) = event else { panic!("expected audio") };
        assert_eq!(chunk.payload(), None);
        assert_eq!(chunk.decode().unwrap(), None);
    }

    #[test]
    fn test_status_event() {
        let event = ServerEvent::from_json(r#"{"result": {"status": {"code": 0}}}"#).unwrap();
        assert_eq!(event, ServerEvent::Status(json!({"code": 0})));
    }
}
