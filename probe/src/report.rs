//! Console output for the probe binaries.

use tts_core::{LatencyReport, SaveSummary};

use crate::config::ProbeConfig;
use crate::error::ProbeError;

pub fn print_banner(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(45));
}

pub fn print_settings(config: &ProbeConfig) {
    println!("   Text: \"{}\"", config.text);
    println!("  Voice: {}", config.voice_id);
    println!("  Model: {}", config.model_id);
    println!();
}

/// Renders the three result lines. A run without audio has no TTFB and is
/// a failure.
pub fn format_latency(report: &LatencyReport) -> Result<String, ProbeError> {
    let ttfb_ms = report.ttfb_ms().ok_or(ProbeError::NoAudio)?;
    Ok(format!(
        "TTFB:         {:.1} ms\nTotal time:   {:.1} ms\nAudio bytes:  {}",
        ttfb_ms,
        report.total_ms(),
        report.audio_bytes
    ))
}

pub fn print_latency(report: &LatencyReport) -> Result<(), ProbeError> {
    println!("{}", format_latency(report)?);
    Ok(())
}

pub fn print_saved(summary: &SaveSummary) -> Result<(), ProbeError> {
    if summary.pcm_bytes == 0 {
        return Err(ProbeError::NoAudio);
    }
    println!(
        "Audio saved to {} ({} chunks, {} PCM bytes)",
        summary.path.display(),
        summary.chunks,
        summary.pcm_bytes
    );
    Ok(())
}
