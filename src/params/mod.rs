//! Parameter definitions with units and documented semantics.

mod audio;
mod camera;
mod render;
mod visual;

// Re-export all types
pub use audio::{AnalyserConfig, MAX_FFT_SIZE, MIN_FFT_SIZE};
pub use camera::{FixedCamera, EYE, FAR_PLANE, FOV_DEGREES, NEAR_PLANE, TARGET, UP};
pub use render::RenderConfig;
pub use visual::VisualParams;
