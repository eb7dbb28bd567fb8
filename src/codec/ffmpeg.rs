use std::path::Path;
use std::process::Command;

use anyhow::Context;
use hound::SampleFormat;

use super::{AudioCodec, AudioFormat, EncodeSpec, Waveform};
use crate::Result;

/// Audio backend backed by `hound` for WAV I/O and the external `ffmpeg`
/// binary for MP3 encoding.
pub struct FfmpegCodec {
    ffmpeg_bin: String,
}

impl FfmpegCodec {
    pub fn new(ffmpeg_bin: impl Into<String>) -> Self {
        Self { ffmpeg_bin: ffmpeg_bin.into() }
    }

    /// Encode a waveform to MP3 by staging it as a temporary WAV next to the
    /// target and handing that to ffmpeg.
    fn encode_mp3(&self, waveform: &Waveform, path: &Path, spec: &EncodeSpec) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let staged = tempfile::Builder::new()
            .prefix(".encode-")
            .suffix(".wav")
            .tempfile_in(dir)
            .context("Failed to create staging WAV for MP3 encode")?;
        write_wav(waveform, staged.path())?;

        let bitrate = format!("{}k", spec.bitrate_kbps.unwrap_or(128));
        let mut command = Command::new(&self.ffmpeg_bin);
        command
            .arg("-i")
            .arg(staged.path())
            .args(["-vn", "-codec:a", "libmp3lame", "-b:a"])
            .arg(&bitrate);
        if let Some(rate) = spec.sample_rate {
            command.arg("-ar").arg(rate.to_string());
        }
        command.arg("-y").arg(path);

        tracing::debug!("Encoding {} at {}", path.display(), bitrate);
        let output = command
            .output()
            .with_context(|| format!("Failed to run {}", self.ffmpeg_bin))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg failed to encode {}: {}", path.display(), error);
        }

        Ok(())
    }
}

impl AudioCodec for FfmpegCodec {
    fn decode(&self, path: &Path) -> Result<Waveform> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open source recording {}", path.display()))?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            anyhow::bail!(
                "Unsupported source format in {}: expected 16-bit PCM, got {}-bit {:?}",
                path.display(),
                spec.bits_per_sample,
                spec.sample_format
            );
        }

        let samples = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read samples from {}", path.display()))?;

        Ok(Waveform::new(spec, samples))
    }

    fn encode(&self, waveform: &Waveform, path: &Path, spec: &EncodeSpec) -> Result<()> {
        match spec.format {
            AudioFormat::Wav => write_wav(waveform, path),
            AudioFormat::Mp3 => self.encode_mp3(waveform, path, spec),
        }
    }
}

fn write_wav(waveform: &Waveform, path: &Path) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, waveform.spec())
        .with_context(|| format!("Failed to create WAV file {}", path.display()))?;
    for sample in waveform.samples() {
        writer.write_sample(*sample)?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file {}", path.display()))?;
    Ok(())
}
