use std::collections::VecDeque;
use std::f32::consts::PI;

/// Window size for frequency analysis (128 frequency bins)
pub const FFT_SIZE: usize = 256;

/// Frequency-domain view of the most recent captured samples
///
/// Drives the recording visualizer. Keeps a sliding window of `FFT_SIZE`
/// mono samples and computes bin magnitudes on demand.
#[derive(Debug, Clone)]
pub struct FrequencyAnalyser {
    window: VecDeque<f32>,
    hann: Vec<f32>,
}

impl FrequencyAnalyser {
    pub fn new() -> Self {
        let hann = (0..FFT_SIZE)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / (FFT_SIZE as f32 - 1.0)).cos())
            .collect();

        Self {
            window: VecDeque::with_capacity(FFT_SIZE),
            hann,
        }
    }

    /// Feed interleaved samples; only the first channel is analysed
    pub fn push_samples(&mut self, samples: &[i16], channels: u16) {
        let step = channels.max(1) as usize;
        for &sample in samples.iter().step_by(step) {
            if self.window.len() == FFT_SIZE {
                self.window.pop_front();
            }
            self.window.push_back(sample as f32 / i16::MAX as f32);
        }
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Magnitude per frequency bin, normalised to `0.0..=1.0`
    pub fn frequency_data(&self) -> Vec<f32> {
        let bins = FFT_SIZE / 2;
        if self.window.is_empty() {
            return vec![0.0; bins];
        }

        // Zero-pad at the front while the window is filling
        let pad = FFT_SIZE - self.window.len();
        let input: Vec<f32> = (0..FFT_SIZE)
            .map(|n| {
                if n < pad {
                    0.0
                } else {
                    self.window[n - pad] * self.hann[n]
                }
            })
            .collect();

        (0..bins)
            .map(|k| {
                let (mut re, mut im) = (0.0f32, 0.0f32);
                for (n, x) in input.iter().enumerate() {
                    let angle = 2.0 * PI * k as f32 * n as f32 / FFT_SIZE as f32;
                    re += x * angle.cos();
                    im -= x * angle.sin();
                }
                let magnitude = (re * re + im * im).sqrt() / (FFT_SIZE as f32 / 4.0);
                magnitude.clamp(0.0, 1.0)
            })
            .collect()
    }

    /// Fold the frequency data into `bar_count` bars (mean of each group)
    pub fn bars(&self, bar_count: usize) -> Vec<f32> {
        if bar_count == 0 {
            return Vec::new();
        }

        let data = self.frequency_data();
        let per_bar = (data.len() / bar_count).max(1);

        (0..bar_count)
            .map(|i| {
                let start = (i * per_bar).min(data.len());
                let end = (start + per_bar).min(data.len());
                let group = &data[start..end];
                if group.is_empty() {
                    0.0
                } else {
                    group.iter().sum::<f32>() / group.len() as f32
                }
            })
            .collect()
    }
}

impl Default for FrequencyAnalyser {
    fn default() -> Self {
        Self::new()
    }
}
