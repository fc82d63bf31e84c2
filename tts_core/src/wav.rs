use std::path::Path;

use tracing::warn;

/// Size of a canonical RIFF/WAVE header (RIFF + fmt + data chunk headers).
pub const WAV_HEADER_LEN: usize = 44;

/// Sample rate of the WAV files written from socket audio.
pub const OUTPUT_SAMPLE_RATE: u32 = 48_000;

/// Accumulates raw 16-bit PCM from a sequence of audio chunks.
///
/// Only the first chunk may carry a container header; it is dropped when
/// that chunk is longer than the header and starts with `RIFF`.
#[derive(Debug, Default)]
pub struct PcmCollector {
    pcm: Vec<u8>,
    chunks: usize,
}

impl PcmCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        let body = if self.chunks == 0 {
            strip_wav_header(chunk)
        } else {
            chunk
        };
        self.pcm.extend_from_slice(body);
        self.chunks += 1;
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    pub fn into_pcm(self) -> Vec<u8> {
        self.pcm
    }
}

/// Returns the PCM body of `chunk`, skipping a leading RIFF header.
pub fn strip_wav_header(chunk: &[u8]) -> &[u8] {
    if chunk.len() > WAV_HEADER_LEN && chunk.starts_with(b"RIFF") {
        &chunk[WAV_HEADER_LEN..]
    } else {
        chunk
    }
}

/// Writes little-endian 16-bit PCM bytes as a mono WAV file.
///
/// Returns the number of PCM bytes written. A trailing odd byte cannot form
/// a sample and is dropped.
pub fn write_pcm16_wav<P: AsRef<Path>>(path: P, pcm: &[u8], sample_rate: u32) -> Result<usize, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    if pcm.len() % 2 != 0 {
        warn!(len = pcm.len(), "Dropping trailing byte of incomplete PCM sample");
    }

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    let mut written = 0;
    for pair in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        written += 2;
    }
    writer.finalize()?;
    Ok(written)
}
