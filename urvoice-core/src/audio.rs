//! Recording buffer and WAV encoding
//!
//! The host owns the microphone and pushes frames into a [`Recorder`]; the
//! recorder downmixes to mono, buffers, and hands back an [`AudioClip`] that
//! can be encoded for upload.

use std::io::Cursor;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Recording configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Sample rate in Hz (default: 16000 for speech recognition)
    pub sample_rate: u32,
    /// Interleaved channels in pushed frames; output is always mono
    pub channels: u16,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
        }
    }
}

/// State of the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
}

/// A finished recording: mono f32 samples in `[-1.0, 1.0]`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000) / self.sample_rate as u64
    }

    /// Encode as a 16-bit mono WAV file
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                writer.write_sample(to_i16(sample))?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    /// Decode a WAV file, downmixing to mono
    pub fn from_wav(bytes: &[u8]) -> Result<Self> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        Ok(Self::new(downmix(&interleaved, channels), spec.sample_rate))
    }
}

/// Buffers pushed audio frames between start and stop
pub struct Recorder {
    config: RecorderConfig,
    state: Arc<Mutex<CaptureState>>,
    buffer: Arc<Mutex<Vec<f32>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_config(RecorderConfig::default())
    }

    pub fn with_config(config: RecorderConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(CaptureState::Idle)),
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start a fresh recording, discarding anything buffered
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state == CaptureState::Recording {
            return Ok(());
        }
        self.buffer.lock().clear();
        *state = CaptureState::Recording;
        info!("Recording started");
        Ok(())
    }

    /// Append interleaved frames; ignored unless recording
    pub fn push(&self, frames: &[f32]) {
        if *self.state.lock() != CaptureState::Recording {
            return;
        }
        let mono = downmix(frames, self.config.channels.max(1) as usize);
        self.buffer.lock().extend(mono);
    }

    /// Stop recording and return the captured clip
    pub fn stop(&self) -> Result<AudioClip> {
        let mut state = self.state.lock();
        if *state == CaptureState::Idle {
            return Err(Error::Audio("Recorder is not running".to_string()));
        }
        *state = CaptureState::Idle;

        let samples = std::mem::take(&mut *self.buffer.lock());
        let clip = AudioClip::new(samples, self.config.sample_rate);
        info!("Recording stopped, {} ms captured", clip.duration_ms());
        Ok(clip)
    }

    /// Stop and throw away the buffer
    pub fn discard(&self) {
        *self.state.lock() = CaptureState::Idle;
        self.buffer.lock().clear();
        debug!("Recording discarded");
    }

    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }

    pub fn is_recording(&self) -> bool {
        self.state() == CaptureState::Recording
    }

    pub fn buffer_duration_ms(&self) -> u64 {
        let samples = self.buffer.lock().len();
        (samples as u64 * 1000) / self.config.sample_rate.max(1) as u64
    }

    /// RMS level of the last 50ms, scaled into `[0.0, 1.0]`
    pub fn current_audio_level(&self) -> f32 {
        let buffer = self.buffer.lock();
        if buffer.is_empty() {
            return 0.0;
        }

        let samples_per_50ms = (self.config.sample_rate as usize / 20).max(1);
        let start_idx = buffer.len().saturating_sub(samples_per_50ms);
        let recent_samples = &buffer[start_idx..];

        let sum_squares: f32 = recent_samples.iter().map(|&s| s * s).sum();
        let rms = (sum_squares / recent_samples.len() as f32).sqrt();

        // typical speech is quiet
        (rms * 3.0).min(1.0)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

fn downmix(frames: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return frames.to_vec();
    }
    frames
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_ignored_when_idle() {
        let recorder = Recorder::new();
        recorder.push(&[0.1, 0.2]);
        assert_eq!(recorder.buffer_duration_ms(), 0);
        assert!(recorder.stop().is_err());
    }

    #[test]
    fn test_record_and_stop() {
        let recorder = Recorder::new();
        recorder.start().unwrap();
        recorder.push(&vec![0.0; 16000]);
        assert_eq!(recorder.buffer_duration_ms(), 1000);

        let clip = recorder.stop().unwrap();
        assert_eq!(clip.duration_ms(), 1000);
        assert_eq!(recorder.state(), CaptureState::Idle);
    }

    #[test]
    fn test_stereo_downmix() {
        let recorder = Recorder::with_config(RecorderConfig {
            sample_rate: 8000,
            channels: 2,
        });
        recorder.start().unwrap();
        recorder.push(&[1.0, 0.0, 0.5, 0.5]);
        let clip = recorder.stop().unwrap();
        assert_eq!(clip.samples, vec![0.5, 0.5]);
    }

    #[test]
    fn test_wav_header_and_size() {
        let clip = AudioClip::new(vec![0.0; 16000], 16000);
        let wav = clip.to_wav().unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 32000);
    }

    #[test]
    fn test_wav_decode_keeps_shape() {
        let clip = AudioClip::new(vec![0.0, 0.5, -0.5, 1.0], 22050);
        let decoded = AudioClip::from_wav(&clip.to_wav().unwrap()).unwrap();

        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.samples.len(), 4);
        assert!((decoded.samples[1] - 0.5).abs() < 0.001);
        assert!((decoded.samples[2] + 0.5).abs() < 0.001);
    }

    #[test]
    fn test_audio_level() {
        let recorder = Recorder::new();
        assert_eq!(recorder.current_audio_level(), 0.0);
        recorder.start().unwrap();
        recorder.push(&[0.5; 800]);
        assert!(recorder.current_audio_level() > 0.9);
    }
}
