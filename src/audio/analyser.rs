use std::{f32::consts::TAU, sync::Arc};

use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Samples per analysis window; yields `FFT_SIZE / 2` frequency bins.
pub const FFT_SIZE: usize = 512;

const SMOOTHING: f32 = 0.8;
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Byte-scaled magnitude spectrum with Blackman windowing and exponential
/// smoothing between frames.
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(size: usize) -> Self {
        let size = size.next_power_of_two().max(8);
        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(size),
            window: blackman(size),
            buffer: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; size / 2],
        }
    }

    /// Analyses the last `size` samples (zero-padded in front) into `out`.
    /// Bytes past the `size / 2` bins are zeroed.
    pub fn process(&mut self, samples: &[f32], out: &mut [u8]) {
        let size = self.buffer.len();
        let recent = &samples[samples.len().saturating_sub(size)..];
        let offset = size - recent.len();
        for (index, slot) in self.buffer.iter_mut().enumerate() {
            let value = index
                .checked_sub(offset)
                .and_then(|i| recent.get(i))
                .copied()
                .unwrap_or(0.0);
            *slot = Complex::new(value * self.window[index], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 255.0 / (MAX_DB - MIN_DB);
        out.fill(0);
        for ((bin, smoothed), slot) in self.buffer.iter().zip(&mut self.smoothed).zip(out) {
            let magnitude = bin.norm() / size as f32;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;
            let db = 20.0 * smoothed.max(f32::MIN_POSITIVE).log10();
            *slot = ((db - MIN_DB) * scale).clamp(0.0, 255.0) as u8;
        }
    }
}

fn blackman(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| {
            let phase = TAU * n as f32 / size as f32;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        })
        .collect()
}
