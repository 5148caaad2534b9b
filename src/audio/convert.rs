use super::backend::{AudioBackendConfig, AudioFrame};

/// Bring a captured frame to the format the backend expects
pub fn to_target(frame: AudioFrame, target: &AudioBackendConfig) -> AudioFrame {
    let mut processed = frame;

    if processed.sample_rate != target.target_sample_rate {
        processed = resample(processed, target.target_sample_rate);
    }

    if processed.channels != target.target_channels && target.target_channels == 1 {
        processed = stereo_to_mono(processed);
    }

    processed
}

/// Resample by linear interpolation between neighbouring input frames
///
/// Output length is `frames * target / source`, so the label always matches
/// the content. Integer ratios land exactly on input frames.
pub fn resample(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if target_rate == 0 || frame.sample_rate == 0 || frame.sample_rate == target_rate {
        return frame;
    }

    let channels = frame.channels.max(1) as usize;
    let in_frames = frame.samples.len() / channels;
    let source_rate = frame.sample_rate as u64;
    let target = target_rate as u64;
    let out_frames = (in_frames as u64 * target / source_rate) as usize;

    let mut samples = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        // Position in input frames as whole + remainder / target
        let position = i as u64 * source_rate;
        let index = ((position / target) as usize).min(in_frames - 1);
        let fraction = (position % target) as f64 / target as f64;
        let next = (index + 1).min(in_frames - 1);

        for ch in 0..channels {
            let a = frame.samples[index * channels + ch] as f64;
            let b = frame.samples[next * channels + ch] as f64;
            samples.push((a + (b - a) * fraction).round() as i16);
        }
    }

    AudioFrame {
        samples,
        sample_rate: target_rate,
        channels: frame.channels,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Average left and right channels
pub fn stereo_to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels != 2 {
        return frame;
    }

    let samples = frame
        .samples
        .chunks_exact(2)
        .map(|pair| ((pair[0] as i32 + pair[1] as i32) / 2) as i16)
        .collect();

    AudioFrame {
        samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}
