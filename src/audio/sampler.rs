//! Per-frame spectrum snapshots for the render loop.

use super::analyser::FrequencyAnalyser;
use super::capture::MicrophoneGrant;
use super::window::{lock, SharedWindow};
use crate::error::SetupError;
use crate::params::AnalyserConfig;

/// Source of one magnitude byte per bar, refreshed on every call.
///
/// The returned slice borrows the source, so it cannot outlive the next call.
pub trait SpectrumSource {
    /// Number of bins returned by `sample`, fixed for the session
    fn bin_count(&self) -> usize;

    /// Refresh and return the current snapshot
    fn sample(&mut self) -> &[u8];
}

/// Live microphone spectrum backed by a single reusable buffer
pub struct SpectrumSampler {
    window: SharedWindow,
    analyser: FrequencyAnalyser,
    time_domain: Vec<f32>,
    bins: Vec<u8>,
    /// Keeps the capture stream alive
    _stream: Option<cpal::Stream>,
}

impl SpectrumSampler {
    /// Build the sampler from a granted microphone
    pub fn new(grant: MicrophoneGrant, config: AnalyserConfig) -> Result<Self, SetupError> {
        let mut sampler = Self::from_window(grant.window, config)?;
        sampler._stream = Some(grant.stream);
        Ok(sampler)
    }

    fn from_window(window: SharedWindow, config: AnalyserConfig) -> Result<Self, SetupError> {
        let bar_count = config.bar_count();
        let fft_size = config.fft_size;
        let analyser = FrequencyAnalyser::new(config)?;

        Ok(Self {
            window,
            analyser,
            time_domain: vec![0.0; fft_size],
            bins: vec![0; bar_count],
            _stream: None,
        })
    }
}

impl SpectrumSource for SpectrumSampler {
    fn bin_count(&self) -> usize {
        self.bins.len()
    }

    fn sample(&mut self) -> &[u8] {
        lock(&self.window).copy_ordered(&mut self.time_domain);
        self.analyser
            .byte_frequency_data(&self.time_domain, &mut self.bins);
        &self.bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::window::SampleWindow;
    use std::f32::consts::PI;
    use std::sync::{Arc, Mutex};

    fn sampler_with_window() -> (SpectrumSampler, SharedWindow) {
        let config = AnalyserConfig {
            smoothing_time_constant: 0.0,
            ..AnalyserConfig::default()
        };
        let window = Arc::new(Mutex::new(SampleWindow::new(config.fft_size)));
        let sampler = SpectrumSampler::from_window(Arc::clone(&window), config).unwrap();
        (sampler, window)
    }

    #[test]
    fn test_bin_count_is_quarter_of_window() {
        let (sampler, _) = sampler_with_window();
        assert_eq!(sampler.bin_count(), 128);
    }

    #[test]
    fn test_sample_tracks_latest_audio() {
        let (mut sampler, window) = sampler_with_window();
        assert!(sampler.sample().iter().all(|&b| b == 0));

        {
            let mut window = lock(&window);
            for i in 0..512 {
                window.push(0.05 * (2.0 * PI * 40.0 * i as f32 / 512.0).sin());
            }
        }
        let loud = sampler.sample()[40];
        assert!(loud > 0);

        // Source stopped: the snapshot falls back to silence
        lock(&window).clear();
        assert_eq!(sampler.sample()[40], 0);
    }
}
