// Integration tests for WAV file input
//
// Fixtures are written to a temp dir with hound so the tests carry no
// binary files.

use anyhow::Result;
use interview_client::audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFile, AudioSource, FileBackend,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn write_wav(dir: &Path, name: &str, sample_rate: u32, channels: u16, seconds: f32) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    let total = (sample_rate as f32 * seconds) as usize;
    for i in 0..total {
        let value = ((i as f32 * 0.05).sin() * 8000.0) as i16;
        for _ in 0..channels {
            writer.write_sample(value).unwrap();
        }
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn test_audio_file_open() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_wav(dir.path(), "answer.wav", 16000, 1, 0.5);

    let audio = AudioFile::open(&path)?;

    assert!((audio.duration_seconds - 0.5).abs() < 0.001);
    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 8000);
    assert!(audio.path.contains("answer.wav"));

    Ok(())
}

#[test]
fn test_audio_file_stereo_is_interleaved() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_wav(dir.path(), "stereo.wav", 44100, 2, 0.2);

    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.channels, 2);
    assert_eq!(audio.samples.len() % 2, 0);
    assert_eq!(audio.samples[0], audio.samples[1]);
    assert!((audio.duration_seconds - 0.2).abs() < 0.001);

    Ok(())
}

#[test]
fn test_audio_file_nonexistent() {
    let result = AudioFile::open("/nonexistent/path/to/audio.wav");
    assert!(result.is_err(), "Opening nonexistent file should fail");
}

#[test]
fn test_audio_file_rejects_float_samples() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("float.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;
    for _ in 0..160 {
        writer.write_sample(0.25f32)?;
    }
    writer.finalize()?;

    assert!(AudioFile::open(&path).is_err());
    Ok(())
}

#[test]
fn test_audio_file_frames_cover_all_samples() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_wav(dir.path(), "frames.wav", 16000, 1, 0.25);

    let audio = AudioFile::open(&path)?;
    let frames = audio.frames(100);

    // 250ms in 100ms buffers: two full frames and a short tail
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].samples.len(), 1600);
    assert_eq!(frames[2].samples.len(), 800);
    assert_eq!(frames[1].timestamp_ms, 100);

    let total: usize = frames.iter().map(|f| f.samples.len()).sum();
    assert_eq!(total, audio.samples.len());

    Ok(())
}

#[tokio::test]
async fn test_file_backend_plays_whole_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_wav(dir.path(), "play.wav", 16000, 1, 0.3);

    let config = AudioBackendConfig::default();
    let mut backend = FileBackend::new(path, config)?.with_realtime(false);
    assert_eq!(backend.name(), "wav-file");

    let mut rx = backend.start().await?;
    let mut samples = 0;
    while let Ok(Some(frame)) = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
        samples += frame.samples.len();
    }
    assert_eq!(samples, 4800);

    backend.stop().await?;
    assert!(!backend.is_capturing());
    Ok(())
}

#[tokio::test]
async fn test_file_backend_paces_in_real_time() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_wav(dir.path(), "paced.wav", 16000, 1, 0.5);

    let mut backend = AudioBackendFactory::create(
        AudioSource::File(path),
        AudioBackendConfig::default(),
    )?;

    let started = tokio::time::Instant::now();
    let mut rx = backend.start().await?;
    let mut frames = 0;
    while rx.recv().await.is_some() {
        frames += 1;
    }

    assert_eq!(frames, 5);
    // First tick is immediate, the other four wait one buffer each
    assert!(started.elapsed() >= Duration::from_millis(390));

    backend.stop().await?;
    Ok(())
}
