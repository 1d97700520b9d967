//! FFT magnitude analysis producing one byte per frequency bin.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::SetupError;
use crate::params::AnalyserConfig;

/// Turns a window of time-domain samples into byte magnitudes (0-255).
///
/// Blackman window, magnitude normalised by the window size, optional blending
/// with the previous frame, then a linear map from `[min_db, max_db]` to bytes.
pub struct FrequencyAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self, SetupError> {
        config.validate().map_err(SetupError::InvalidConfig)?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();

        Ok(Self {
            fft,
            window,
            spectrum: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.frequency_bin_count()],
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Analyse `time_domain` (oldest sample first, `fft_size` long) and write
    /// the lowest `out.len()` bins into `out`.
    pub fn byte_frequency_data(&mut self, time_domain: &[f32], out: &mut [u8]) {
        for (i, slot) in self.spectrum.iter_mut().enumerate() {
            let sample = time_domain.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.spectrum);

        let tau = self.config.smoothing_time_constant;
        let scale = 1.0 / self.config.fft_size as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.spectrum[k].norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
        }

        for (byte, &magnitude) in out.iter_mut().zip(self.smoothed.iter()) {
            *byte = magnitude_to_byte(magnitude, self.config.min_db, self.config.max_db);
        }
    }
}

/// Map a linear magnitude onto 0-255 across the `[min_db, max_db]` range
pub fn magnitude_to_byte(magnitude: f32, min_db: f32, max_db: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = (255.0 / (max_db - min_db) * (db - min_db)).floor();
    scaled.clamp(0.0, 255.0) as u8
}

/// Blackman window (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}
