//! Error types for setup and the running frame loop.

use thiserror::Error;

/// Failures that abort initialization before the first frame.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Invalid analyser config: {0}")]
    InvalidConfig(String),
    #[error("No audio input device found")]
    NoInputDevice,
    #[error("Failed to get audio input config: {0}")]
    InputConfig(String),
    #[error("Unsupported input sample format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to open microphone stream: {0}")]
    Stream(String),
    #[error("Microphone access denied: {0}")]
    ConsentDenied(String),
    #[error("Microphone produced no data within {0:.1}s")]
    ConsentTimeout(f32),
    #[error("Failed to create window: {0}")]
    Window(String),
    #[error("Failed to create surface: {0}")]
    Surface(String),
    #[error("Failed to find suitable GPU adapter")]
    Adapter,
    #[error("Failed to request device: {0}")]
    Device(String),
    #[error("Unable to load shaders: {0}")]
    ShaderProgram(String),
}

/// Failures inside a running frame. These are not recovered from.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
