pub mod backend;
pub mod capture;
pub mod channel;
pub mod convert;
pub mod file;
pub mod level;
pub mod synthetic;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource};
pub use capture::{AudioCapture, AudioGate, CaptureCounters, CaptureCounts, PcmSink};
pub use channel::ChannelBackend;
pub use file::{AudioFile, FileBackend};
pub use level::{AudioLevel, LevelMeter};
pub use synthetic::{Signal, SyntheticBackend};
