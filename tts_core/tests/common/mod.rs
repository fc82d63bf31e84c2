//! In-process stand-in for the TTS API used by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// How the mock answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Audio payloads are the UTF-8 bytes of the submitted text.
    Echo,
    /// Like `Echo` over the socket, but the first chunk is prefixed with a
    /// RIFF header and a second header-less chunk follows.
    WavEcho,
    ErrorOnCreate,
    ErrorBeforeAudio,
    Unauthorized,
    /// Closes the socket instead of acknowledging the context.
    CloseBeforeAck,
    /// Like `Echo`, but each text is preceded by a chunk that is not base64.
    BadAudio,
    /// Like `Echo`, but every reply goes out as a binary frame, after one
    /// frame that is not UTF-8.
    BinaryFrames,
    /// Like `Echo`, but closing first acks another context, then sends
    /// `LATE_AUDIO`, then acks ours.
    LateAudio,
}

/// Trailing chunk sent by `Behaviour::WavEcho`.
pub const WAV_TAIL: [u8; 4] = [1, 0, 2, 0];

/// Audio sent between the two close acks by `Behaviour::LateAudio`.
pub const LATE_AUDIO: &[u8] = b"bye!";

#[derive(Debug, Default)]
pub struct Recorded {
    pub authorization: Vec<String>,
    pub http_bodies: Vec<Value>,
    pub ws_messages: Vec<Value>,
    pub close_frames: usize,
}

#[derive(Clone)]
struct MockState {
    behaviour: Behaviour,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct MockApi {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockApi {
    pub async fn spawn(behaviour: Behaviour) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            behaviour,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route("/tts/v1/stream", post(http_stream))
            .route("/tts/v1/bidi", get(ws_stream))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded }
    }

    pub fn http_url(&self) -> String {
        format!("http://{}/tts/v1/stream", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/tts/v1/bidi", self.addr)
    }

    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }

    /// Waits up to a second for the client's close frame to be processed and
    /// returns how many arrived.
    pub async fn close_frames(&self) -> usize {
        for _ in 0..100 {
            let count = self.recorded().close_frames;
            if count > 0 {
                return count;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.recorded().close_frames
    }
}

/// Even-length PCM derived from `text`, as served by `Behaviour::WavEcho`.
pub fn pcm_for(text: &str) -> Vec<u8> {
    let mut pcm = text.as_bytes().to_vec();
    if pcm.len() % 2 != 0 {
        pcm.push(0);
    }
    pcm
}

fn wav_header() -> Vec<u8> {
    let mut header = b"RIFF".to_vec();
    header.extend_from_slice(&[0; 4]);
    header.extend_from_slice(b"WAVEfmt ");
    header.resize(44, 0);
    header
}

fn audio_line(bytes: &[u8]) -> String {
    json!({ "result": { "audioContent": general_purpose::STANDARD.encode(bytes) } }).to_string()
}

fn audio_chunk(context_id: &str, bytes: &[u8]) -> String {
    json!({
        "result": {
            "contextId": context_id,
            "audioChunk": {
                "audioContent": general_purpose::STANDARD.encode(bytes),
                "timestampInfo": { "wordAlignment": {} }
            }
        }
    })
    .to_string()
}

fn bad_audio_chunk(context_id: &str) -> String {
    json!({
        "result": {
            "contextId": context_id,
            "audioChunk": { "audioContent": "!!not base64!!" }
        }
    })
    .to_string()
}

fn context_closed(context_id: &str) -> String {
    json!({ "result": { "contextId": context_id, "contextClosed": {} } }).to_string()
}

fn error_message(code: i64, message: &str) -> String {
    json!({ "error": { "code": code, "message": message } }).to_string()
}

async fn http_stream(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    {
        let mut recorded = state.recorded.lock().unwrap();
        if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            recorded.authorization.push(auth.to_string());
        }
        recorded.http_bodies.push(body.clone());
    }

    if state.behaviour == Behaviour::Unauthorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": 16, "message": "unauthorized" } })),
        )
            .into_response();
    }

    let text = body["text"].as_str().unwrap_or_default();
    let mut lines = Vec::new();
    if state.behaviour == Behaviour::ErrorBeforeAudio {
        lines.push(error_message(3, "text rejected"));
    }
    for word in text.split_whitespace() {
        lines.push(audio_line(word.as_bytes()));
    }
    lines.push("not json".to_string());
    lines.push(String::new());
    // Last line is left without a terminator.
    lines.push(json!({ "result": { "status": { "code": 0 } } }).to_string());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        lines.join("\n"),
    )
        .into_response()
}

async fn ws_stream(ws: WebSocketUpgrade, State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        state.recorded.lock().unwrap().authorization.push(auth.to_string());
    }
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: MockState) {
    if state.behaviour == Behaviour::BinaryFrames
        && socket.send(Message::Binary(vec![0xff, 0xfe, 0xfd].into())).await.is_err()
    {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => {
                state.recorded.lock().unwrap().close_frames += 1;
                return;
            }
            _ => continue,
        };
        let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else { continue };
        state.recorded.lock().unwrap().ws_messages.push(value.clone());

        let context_id = value["context_id"].as_str().unwrap_or_default().to_string();
        let replies = if value.get("create").is_some() {
            match state.behaviour {
                Behaviour::ErrorOnCreate => vec![error_message(5, "voice not found")],
                Behaviour::CloseBeforeAck => {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }
                _ => vec![
                    json!({ "result": { "status": { "code": 0 } } }).to_string(),
                    json!({ "result": { "contextId": "someone-else", "contextCreated": {} } }).to_string(),
                    json!({ "result": { "contextId": context_id, "contextCreated": {} } }).to_string(),
                ],
            }
        } else if let Some(send) = value.get("send_text") {
            let text = send["text"].as_str().unwrap_or_default();
            match state.behaviour {
                Behaviour::ErrorBeforeAudio => vec![error_message(3, "text rejected")],
                Behaviour::WavEcho => {
                    let mut first = wav_header();
                    first.extend_from_slice(&pcm_for(text));
                    vec![audio_chunk(&context_id, &first), audio_chunk(&context_id, &WAV_TAIL)]
                }
                Behaviour::BadAudio => vec![
                    bad_audio_chunk(&context_id),
                    audio_chunk(&context_id, text.as_bytes()),
                ],
                _ => vec![
                    "{ not json".to_string(),
                    audio_chunk(&context_id, text.as_bytes()),
                ],
            }
        } else if value.get("close_context").is_some() {
            match state.behaviour {
                Behaviour::LateAudio => vec![
                    context_closed("someone-else"),
                    audio_chunk(&context_id, LATE_AUDIO),
                    context_closed(&context_id),
                ],
                _ => vec![context_closed(&context_id)],
            }
        } else {
            Vec::new()
        };

        for reply in replies {
            let frame = match state.behaviour {
                Behaviour::BinaryFrames => Message::Binary(reply.into_bytes().into()),
                _ => Message::Text(reply.into()),
            };
            if socket.send(frame).await.is_err() {
                return;
            }
        }
    }
}
