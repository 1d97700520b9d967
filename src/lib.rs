//! Ringwave library - circular spectrum visualizer for live microphone audio

pub mod audio;
pub mod camera;
pub mod cli;
pub mod color;
pub mod console;
pub mod controls;
pub mod error;
pub mod params;
pub mod render_loop;
pub mod rendering;
pub mod ring;
