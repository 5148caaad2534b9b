use serde::Serialize;
use tokio::sync::watch;

use super::backend::AudioFrame;

/// Normalised loudness of one frame, for drawing a waveform
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AudioLevel {
    /// 0.0..=1.0
    pub peak: f32,
    /// 0.0..=1.0
    pub rms: f32,
}

impl AudioLevel {
    pub fn measure(frame: &AudioFrame) -> Self {
        if frame.samples.is_empty() {
            return Self::default();
        }

        let mut peak: i32 = 0;
        let mut sum_sq: f64 = 0.0;
        for &sample in &frame.samples {
            let abs = (sample as i32).abs();
            peak = peak.max(abs);
            sum_sq += (sample as f64) * (sample as f64);
        }

        let full_scale = i16::MAX as f64;
        let rms = (sum_sq / frame.samples.len() as f64).sqrt() / full_scale;

        Self {
            peak: (peak as f64 / full_scale).min(1.0) as f32,
            rms: rms.min(1.0) as f32,
        }
    }
}

/// Read-only tap on the capture path
///
/// Publishing never fails: with no subscriber the value is simply replaced.
#[derive(Clone)]
pub struct LevelMeter {
    tx: watch::Sender<AudioLevel>,
}

impl LevelMeter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AudioLevel::default());
        Self { tx }
    }

    pub fn publish(&self, frame: &AudioFrame) {
        self.tx.send_replace(AudioLevel::measure(frame));
    }

    pub fn reset(&self) {
        self.tx.send_replace(AudioLevel::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<AudioLevel> {
        self.tx.subscribe()
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}
