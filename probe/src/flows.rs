//! The three probe runs. Each reads its settings through `lookup` and checks
//! the API key before opening any connection.

use std::time::Instant;

use tracing::info;
use tts_core::{
    save_audio_stream, synthesis_stream, AudioConfig, ContextMessage, CreateContext, HttpProber, SynthesisRequest,
    WsClient, WsProber,
};

use crate::config::{ApiKey, ProbeConfig};
use crate::error::ProbeError;
use crate::report::{print_banner, print_latency, print_saved, print_settings};
use crate::validation::{validate_id, validate_text};

/// Context used by the WebSocket latency run.
pub const LATENCY_CONTEXT_ID: &str = "ctx-latency-test";

const SYNTHESIS_CONTEXT_ID: &str = "ctx-1";
const SYNTHESIS_VOICE_ID: &str = "Ashley";
const SYNTHESIS_MODEL_ID: &str = "inworld-tts-1";
const SYNTHESIS_TEXT: &str =
    "Okay so like, I'm 19 and I just started trying to do this whole online streaming thing...";

/// Latency runs request compressed audio so byte counts stay small.
fn latency_audio() -> AudioConfig {
    AudioConfig::ogg_opus(24000, 32000)
}

/// Credential first, then config and input checks.
fn load<F>(lookup: F) -> Result<(ApiKey, ProbeConfig), ProbeError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = ApiKey::from_lookup(&lookup)?;
    let config = ProbeConfig::from_lookup(&lookup);
    validate_text(&config.text)?;
    validate_id("voice id", &config.voice_id)?;
    validate_id("model id", &config.model_id)?;
    Ok((api_key, config))
}

pub async fn http_latency<F>(lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    print_banner("Inworld TTS Low-Latency HTTP Streaming");
    let (api_key, config) = load(lookup)?;

    print_settings(&config);
    println!("Warming up connection, then generating audio...\n");

    let prober = HttpProber::new(config.http_url.as_str(), api_key.as_str())?;
    let request = SynthesisRequest::new(
        config.text.as_str(),
        config.voice_id.as_str(),
        config.model_id.as_str(),
        latency_audio(),
    );
    let report = prober.probe(&request).await?;

    print_latency(&report)?;
    Ok(())
}

pub async fn ws_latency<F>(lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    print_banner("Inworld TTS Low-Latency WebSocket");
    let (api_key, config) = load(lookup)?;

    print_settings(&config);
    println!("Connecting and creating context, then generating audio...\n");

    let client =
        WsClient::new(config.ws_url.as_str(), api_key.as_str()).with_connect_timeout(config.connect_timeout());
    let create = CreateContext::new(config.voice_id.as_str(), config.model_id.as_str(), latency_audio());
    let report = WsProber::new(client)
        .probe(LATENCY_CONTEXT_ID, create, &config.text)
        .await?;

    print_latency(&report)?;
    Ok(())
}

/// create → send_text (flushed) → close_context on a single context.
pub fn synthesis_script() -> Vec<ContextMessage> {
    let create = CreateContext::new(SYNTHESIS_VOICE_ID, SYNTHESIS_MODEL_ID, AudioConfig::linear16(48000))
        .with_buffer_char_threshold(50);
    vec![
        ContextMessage::create(SYNTHESIS_CONTEXT_ID, create),
        ContextMessage::send_text(SYNTHESIS_CONTEXT_ID, SYNTHESIS_TEXT, true),
        ContextMessage::close(SYNTHESIS_CONTEXT_ID),
    ]
}

pub async fn ws_synthesis<F>(lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    print_banner("Inworld TTS WebSocket Synthesis (Context Flow)");
    let api_key = ApiKey::from_lookup(&lookup)?;
    let config = ProbeConfig::from_lookup(&lookup);

    let started = Instant::now();
    let client =
        WsClient::new(config.ws_url.as_str(), api_key.as_str()).with_connect_timeout(config.connect_timeout());
    let summary = save_audio_stream(synthesis_stream(client, synthesis_script()), &config.output_file).await?;

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Total synthesis time");
    print_saved(&summary)?;
    Ok(())
}
