use anyhow::{bail, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::channel::ChannelBackend;
use super::file::FileBackend;
use super::synthetic::{Signal, SyntheticBackend};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Little-endian PCM bytes as sent to the backends
    pub fn pcm_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn duration_ms(&self) -> u64 {
        let per_channel = self.samples.len() as u64 / self.channels.max(1) as u64;
        per_channel * 1000 / self.sample_rate.max(1) as u64
    }
}

/// Configuration for audio backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBackendConfig {
    /// Target sample rate (will resample if needed)
    pub target_sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub target_channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl AudioBackendConfig {
    pub fn samples_per_buffer(&self) -> usize {
        (self.target_sample_rate as u64 * self.buffer_duration_ms / 1000) as usize
            * self.target_channels.max(1) as usize
    }
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // 16kHz speech models
            target_channels: 1,        // Mono
            buffer_duration_ms: 100,   // 100ms buffers
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - File: a WAV file played out in real time (recorded answers, smoke tests)
/// - Synthetic: silence or a tone
/// - Channel: frames pushed by the embedding application's own capture
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio and release the underlying source
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Where captured audio comes from
#[derive(Debug)]
pub enum AudioSource {
    /// WAV file input
    File(PathBuf),
    /// Generated signal
    Synthetic(Signal),
    /// Frames pushed through a channel by the caller
    Channel(mpsc::Receiver<AudioFrame>),
}

impl AudioSource {
    /// Channel source plus the sender the caller feeds it with
    pub fn channel(capacity: usize) -> (mpsc::Sender<AudioFrame>, AudioSource) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, AudioSource::Channel(rx))
    }
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    pub fn create(
        source: AudioSource,
        config: AudioBackendConfig,
    ) -> Result<Box<dyn AudioBackend>> {
        if config.buffer_duration_ms == 0 {
            bail!("buffer_duration_ms must be greater than zero");
        }

        match source {
            AudioSource::File(path) => Ok(Box::new(FileBackend::new(path, config)?)),
            AudioSource::Synthetic(signal) => Ok(Box::new(SyntheticBackend::new(signal, config))),
            AudioSource::Channel(rx) => Ok(Box::new(ChannelBackend::new(rx))),
        }
    }
}
