//! Microphone capture and frequency analysis.
//!
//! The capture callback feeds a rolling sample window; once per frame the
//! sampler runs the analyser over that window to produce one byte per bar.

mod analyser;
mod capture;
mod sampler;
mod window;

// Re-export public types
pub use analyser::{blackman_window, magnitude_to_byte, FrequencyAnalyser};
pub use capture::{request_microphone, MicrophoneGrant};
pub use sampler::{SpectrumSampler, SpectrumSource};
pub use window::{SampleWindow, SharedWindow};
