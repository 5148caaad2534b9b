// Integration tests for audio backends and the capture pipeline
//
// These tests drive each backend through the factory and check what the
// forwarding task lets through the gate.

use interview_client::audio::{
    AudioBackendConfig, AudioBackendFactory, AudioCapture, AudioFrame, AudioGate, AudioSource,
    CaptureCounters, LevelMeter, Signal,
};
use interview_client::session::ConnectionState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

fn speech_config() -> AudioBackendConfig {
    AudioBackendConfig {
        target_sample_rate: 16000,
        target_channels: 1,
        buffer_duration_ms: 20,
    }
}

struct Pipeline {
    muted: Arc<AtomicBool>,
    state: watch::Sender<ConnectionState>,
    counters: Arc<CaptureCounters>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    meter: LevelMeter,
}

impl Pipeline {
    fn new(state: ConnectionState) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            muted: Arc::new(AtomicBool::new(false)),
            state,
            counters: Arc::new(CaptureCounters::default()),
            sent: Arc::new(Mutex::new(Vec::new())),
            meter: LevelMeter::new(),
        }
    }

    async fn start(&self, source: AudioSource) -> AudioCapture {
        let backend = AudioBackendFactory::create(source, speech_config()).unwrap();
        let sent = Arc::clone(&self.sent);
        AudioCapture::start(
            backend,
            speech_config(),
            AudioGate::new(Arc::clone(&self.muted), self.state.subscribe()),
            self.meter.clone(),
            Arc::clone(&self.counters),
            Box::new(move |pcm| {
                sent.lock().unwrap().push(pcm);
                true
            }),
        )
        .await
        .unwrap()
    }
}

async fn settle<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[test]
fn test_audio_backend_config_default() {
    let config = AudioBackendConfig::default();

    assert_eq!(config.target_sample_rate, 16000, "Default should be 16kHz for speech");
    assert_eq!(config.target_channels, 1, "Default should be mono");
    assert_eq!(config.buffer_duration_ms, 100, "Default buffer should be 100ms");
    assert_eq!(config.samples_per_buffer(), 1600);
}

#[test]
fn test_factory_rejects_zero_buffer() {
    let config = AudioBackendConfig {
        buffer_duration_ms: 0,
        ..AudioBackendConfig::default()
    };
    let result = AudioBackendFactory::create(AudioSource::Synthetic(Signal::Silence), config);
    assert!(result.is_err());
}

#[test]
fn test_factory_rejects_missing_file() {
    let result = AudioBackendFactory::create(
        AudioSource::File("/nonexistent/answer.wav".into()),
        AudioBackendConfig::default(),
    );
    assert!(result.is_err(), "Missing WAV file should fail at creation");
}

#[tokio::test]
async fn test_synthetic_backend_produces_target_format() {
    let mut backend = AudioBackendFactory::create(
        AudioSource::Synthetic(Signal::Tone {
            frequency_hz: 440.0,
            amplitude: 0.5,
        }),
        speech_config(),
    )
    .unwrap();

    assert_eq!(backend.name(), "synthetic");
    let mut rx = backend.start().await.unwrap();
    assert!(backend.is_capturing());

    let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frame.sample_rate, 16000);
    assert_eq!(frame.channels, 1);
    assert_eq!(frame.samples.len(), 320);
    assert!(frame.samples.iter().any(|s| *s != 0));

    backend.stop().await.unwrap();
    assert!(!backend.is_capturing());
}

#[tokio::test]
async fn test_channel_source_starts_once() {
    let (_tx, source) = AudioSource::channel(4);
    let mut backend = AudioBackendFactory::create(source, speech_config()).unwrap();

    assert!(backend.start().await.is_ok());
    assert!(backend.start().await.is_err());
}

#[tokio::test]
async fn test_capture_forwards_when_gate_open() {
    let pipeline = Pipeline::new(ConnectionState::Recording);
    let (tx, source) = AudioSource::channel(8);
    let capture = pipeline.start(source).await;
    assert!(capture.is_active());
    assert_eq!(capture.backend_name(), "channel");

    // 48kHz stereo input is brought down to 16kHz mono
    tx.send(AudioFrame {
        samples: vec![300; 960 * 2],
        sample_rate: 48000,
        channels: 2,
        timestamp_ms: 0,
    })
    .await
    .unwrap();

    assert!(settle(|| pipeline.counters.snapshot().frames_sent == 1).await);
    let sent = pipeline.sent.lock().unwrap().clone();
    assert_eq!(sent[0].len(), 320 * 2);
    assert_eq!(pipeline.counters.snapshot().bytes_sent, 640);

    capture.stop().await;
    assert!(tx.is_closed());
}

#[tokio::test]
async fn test_capture_drops_while_muted_or_not_ready() {
    let pipeline = Pipeline::new(ConnectionState::Connected);
    let (tx, source) = AudioSource::channel(8);
    let capture = pipeline.start(source).await;

    let frame = AudioFrame {
        samples: vec![500; 320],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 0,
    };

    tx.send(frame.clone()).await.unwrap();
    assert!(settle(|| pipeline.counters.snapshot().frames_dropped == 1).await);

    pipeline.state.send_replace(ConnectionState::Recording);
    pipeline.muted.store(true, Ordering::SeqCst);
    tx.send(frame.clone()).await.unwrap();
    assert!(settle(|| pipeline.counters.snapshot().frames_dropped == 2).await);

    pipeline.muted.store(false, Ordering::SeqCst);
    tx.send(frame).await.unwrap();
    assert!(settle(|| pipeline.counters.snapshot().frames_sent == 1).await);
    assert_eq!(pipeline.sent.lock().unwrap().len(), 1);

    capture.stop().await;
}

#[tokio::test]
async fn test_level_meter_tracks_input_even_when_gated() {
    let pipeline = Pipeline::new(ConnectionState::Connected);
    let mut level = pipeline.meter.subscribe();
    let (tx, source) = AudioSource::channel(8);
    let capture = pipeline.start(source).await;

    tx.send(AudioFrame {
        samples: vec![i16::MAX / 2; 320],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 0,
    })
    .await
    .unwrap();

    tokio::time::timeout(Duration::from_secs(1), level.changed())
        .await
        .unwrap()
        .unwrap();
    let current = *level.borrow();
    assert!(current.peak > 0.4 && current.peak < 0.6);
    assert_eq!(pipeline.counters.snapshot().frames_sent, 0);

    // Dropping the only watcher does not disturb forwarding
    drop(level);
    pipeline.state.send_replace(ConnectionState::Recording);
    tx.send(AudioFrame {
        samples: vec![1; 320],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 20,
    })
    .await
    .unwrap();
    assert!(settle(|| pipeline.counters.snapshot().frames_sent == 1).await);

    capture.stop().await;
}

#[tokio::test]
async fn test_dropping_capture_stops_backend() {
    let pipeline = Pipeline::new(ConnectionState::Recording);
    let (tx, source) = AudioSource::channel(8);
    let capture = pipeline.start(source).await;

    drop(capture);
    assert!(settle(|| tx.is_closed()).await);
}

#[tokio::test]
async fn test_sink_refusal_ends_capture() {
    let (state, _) = watch::channel(ConnectionState::Recording);
    let backend = AudioBackendFactory::create(
        AudioSource::Synthetic(Signal::Silence),
        speech_config(),
    )
    .unwrap();

    let capture = AudioCapture::start(
        backend,
        speech_config(),
        AudioGate::new(Arc::new(AtomicBool::new(false)), state.subscribe()),
        LevelMeter::new(),
        Arc::new(CaptureCounters::default()),
        Box::new(|_| false),
    )
    .await
    .unwrap();

    assert!(settle(|| !capture.is_active()).await);
}
