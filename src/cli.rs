//! Command-line argument parsing.

use clap::Parser;

use crate::color::ColorStop;
use crate::params::{AnalyserConfig, RenderConfig, VisualParams};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Ringwave")]
#[command(about = "Circular spectrum visualizer for live microphone audio", long_about = None)]
pub struct Args {
    /// Analysis window size in samples (power of 2); a quarter of it becomes bars
    #[arg(long, value_name = "SAMPLES", default_value_t = 512)]
    pub fft_size: usize,

    /// Weight of bar loudness in the colour blend
    #[arg(long, value_name = "SCALE", default_value_t = 1.0, allow_negative_numbers = true)]
    pub height_scale: f32,

    /// Weight of bar position around the ring in the colour blend
    #[arg(long, value_name = "SCALE", default_value_t = 0.5, allow_negative_numbers = true)]
    pub distance_scale: f32,

    /// Gradient start colour (#RRGGBB, invalid values fall back to black)
    #[arg(long, value_name = "HEX", default_value = "#00a0ff")]
    pub start_color: String,

    /// Gradient end colour (#RRGGBB, invalid values fall back to black)
    #[arg(long, value_name = "HEX", default_value = "#ff0080")]
    pub end_color: String,

    /// Analyser smoothing between frames (0 = off, 1 = frozen)
    #[arg(long, value_name = "0..1", default_value_t = 0.8)]
    pub smoothing: f32,

    /// Quietest level shown (dBFS)
    #[arg(long, value_name = "DB", default_value_t = -100.0, allow_negative_numbers = true)]
    pub min_db: f32,

    /// Loudest level shown (dBFS)
    #[arg(long, value_name = "DB", default_value_t = -30.0, allow_negative_numbers = true)]
    pub max_db: f32,

    /// Seconds to wait for the microphone to start delivering audio
    #[arg(long, value_name = "SECONDS", default_value_t = 10.0)]
    pub consent_timeout: f32,

    /// Initial window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    /// Initial window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,
}

impl Args {
    pub fn analyser_config(&self) -> AnalyserConfig {
        AnalyserConfig {
            fft_size: self.fft_size,
            smoothing_time_constant: self.smoothing,
            min_db: self.min_db,
            max_db: self.max_db,
            consent_timeout_s: self.consent_timeout,
        }
    }

    pub fn visual_params(&self) -> VisualParams {
        VisualParams {
            height_scale: self.height_scale,
            distance_scale: self.distance_scale,
            start_color: ColorStop::from_hex(&self.start_color),
            end_color: ColorStop::from_hex(&self.end_color),
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
        }
    }
}
