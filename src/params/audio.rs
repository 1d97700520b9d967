//! Frequency analyser configuration.

/// Smallest analysis window accepted by the analyser
pub const MIN_FFT_SIZE: usize = 32;

/// Largest analysis window accepted by the analyser
pub const MAX_FFT_SIZE: usize = 32768;

/// Frequency analyser configuration
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Analysis window size in samples (power of 2)
    pub fft_size: usize,

    /// Weight of the previous magnitude when blending frames (0.0-1.0, 0 = off)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_db: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_db: f32,

    /// How long to wait for the first microphone buffer (seconds)
    pub consent_timeout_s: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            smoothing_time_constant: 0.8,
            min_db: -100.0,
            max_db: -30.0,
            consent_timeout_s: 10.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of magnitude bins the full transform resolves (half the window)
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Number of bins drawn as bars: half of the frequency bin count
    pub fn bar_count(&self) -> usize {
        self.frequency_bin_count() / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(format!(
                "FFT size must be a power of 2 in {}..={}, got {}",
                MIN_FFT_SIZE, MAX_FFT_SIZE, self.fft_size
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "Smoothing time constant must be in 0..=1, got {}",
                self.smoothing_time_constant
            ));
        }
        if self.min_db >= self.max_db {
            return Err(format!(
                "min_db ({}) must be below max_db ({})",
                self.min_db, self.max_db
            ));
        }
        if !self.consent_timeout_s.is_finite() || self.consent_timeout_s <= 0.0 {
            return Err(format!(
                "Consent timeout must be a positive number of seconds, got {}",
                self.consent_timeout_s
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bar_count() {
        let config = AnalyserConfig::default();

        // 512-sample window -> 256 frequency bins -> 128 bars
        assert_eq!(config.frequency_bin_count(), 256);
        assert_eq!(config.bar_count(), 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let mut config = AnalyserConfig::default();
        config.fft_size = 500;
        assert!(config.validate().is_err());

        config.fft_size = 16;
        assert!(config.validate().is_err());

        let mut config = AnalyserConfig::default();
        config.smoothing_time_constant = 1.5;
        assert!(config.validate().is_err());

        let mut config = AnalyserConfig::default();
        config.min_db = -10.0;
        config.max_db = -30.0;
        assert!(config.validate().is_err());
    }
}
