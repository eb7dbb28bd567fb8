use std::path::Path;

use hound::WavSpec;

pub mod ffmpeg;

pub use ffmpeg::FfmpegCodec;

use crate::Result;

/// Output encodings the pipeline produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Uncompressed WAV container (lossless)
    Wav,
    /// MPEG layer 3 with bitrate control (lossy)
    Mp3,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

/// Encoding parameters for one output file
#[derive(Debug, Clone, Copy)]
pub struct EncodeSpec {
    pub format: AudioFormat,
    /// Target bitrate in kbit/s, only meaningful for lossy formats
    pub bitrate_kbps: Option<u32>,
    /// Resample to this rate on encode, keep the source rate if absent
    pub sample_rate: Option<u32>,
}

impl EncodeSpec {
    pub fn wav() -> Self {
        Self { format: AudioFormat::Wav, bitrate_kbps: None, sample_rate: None }
    }

    pub fn mp3(bitrate_kbps: u32) -> Self {
        Self { format: AudioFormat::Mp3, bitrate_kbps: Some(bitrate_kbps), sample_rate: None }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }
}

/// Decoded audio held as interleaved 16-bit PCM
#[derive(Debug, Clone)]
pub struct Waveform {
    spec: WavSpec,
    samples: Vec<i16>,
}

impl Waveform {
    pub fn new(spec: WavSpec, samples: Vec<i16>) -> Self {
        Self { spec, samples }
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    fn frames(&self) -> u64 {
        self.samples.len() as u64 / self.spec.channels.max(1) as u64
    }

    /// Duration in whole milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.frames() * 1000 / self.spec.sample_rate.max(1) as u64
    }

    /// Frame index of an absolute millisecond offset
    fn frame_at_ms(&self, ms: u64) -> u64 {
        (ms as u128 * self.spec.sample_rate as u128 / 1000) as u64
    }

    /// Copy out the `[start_ms, end_ms)` range.
    ///
    /// Offsets past the end of the audio clamp to the end, matching the
    /// slicing behavior the timing tables were tuned against.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> Waveform {
        let channels = self.spec.channels.max(1) as u64;
        let total = self.samples.len() as u64;
        let start = (self.frame_at_ms(start_ms) * channels).min(total);
        let end = (self.frame_at_ms(end_ms) * channels).min(total).max(start);
        Waveform::new(self.spec, self.samples[start as usize..end as usize].to_vec())
    }

    /// Append another waveform of the same shape.
    pub fn append(&mut self, other: &Waveform) {
        debug_assert_eq!(self.spec, other.spec);
        self.samples.extend_from_slice(&other.samples);
    }
}

/// Decode/encode seam between the assembler and the audio backend
pub trait AudioCodec: Send + Sync {
    /// Decode a source recording into PCM
    fn decode(&self, path: &Path) -> Result<Waveform>;

    /// Write a waveform to `path` with the given encoding parameters
    fn encode(&self, waveform: &Waveform, path: &Path, spec: &EncodeSpec) -> Result<()>;
}
