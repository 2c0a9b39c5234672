use super::backend::AudioFrame;

/// Convert a frame towards the target format (decimating and/or folding
/// stereo to mono). Frames that cannot be converted are returned unchanged.
pub fn process_frame(frame: AudioFrame, target_sample_rate: u32, target_channels: u16) -> AudioFrame {
    let mut processed = frame;

    // Convert to mono first so decimation works on whole frames
    if processed.channels != target_channels && target_channels == 1 {
        processed = to_mono(processed);
    }

    if processed.sample_rate != target_sample_rate {
        processed = downsample(processed, target_sample_rate);
    }

    processed
}

/// Downsample by decimation (integer ratios only, mono input)
fn downsample(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if frame.channels != 1 || target_rate == 0 {
        return frame;
    }

    let ratio = frame.sample_rate / target_rate;
    if ratio <= 1 || frame.sample_rate % target_rate != 0 {
        return frame; // Can't upsample or decimate by a fractional ratio
    }

    AudioFrame {
        samples: frame.samples.iter().step_by(ratio as usize).copied().collect(),
        sample_rate: target_rate,
        channels: frame.channels,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Average interleaved channels down to mono
fn to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels <= 1 {
        return frame;
    }

    let channels = frame.channels as usize;
    let samples = frame
        .samples
        .chunks_exact(channels)
        .map(|chunk| {
            let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect();

    AudioFrame {
        samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}
