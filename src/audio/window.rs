//! Rolling window of the most recent mono input samples.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Window shared between the capture callback and the render thread
pub type SharedWindow = Arc<Mutex<SampleWindow>>;

/// Lock a shared window, recovering the data if a holder panicked
pub fn lock(window: &SharedWindow) -> MutexGuard<'_, SampleWindow> {
    window.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fixed-size ring of mono samples; always full, zero-initialised
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Vec<f32>,
    write_pos: usize,
}

impl SampleWindow {
    pub fn new(size: usize) -> Self {
        Self {
            samples: vec![0.0; size],
            write_pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append one sample, overwriting the oldest
    pub fn push(&mut self, sample: f32) {
        if self.samples.is_empty() {
            return;
        }
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    /// Append interleaved frames, averaging each frame's channels to mono
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) {
        for frame in data.chunks(channels.max(1)) {
            self.push(frame.iter().sum::<f32>() / frame.len() as f32);
        }
    }

    /// Reset to silence
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.write_pos = 0;
    }

    /// Copy the window into `out`, oldest sample first
    pub fn copy_ordered(&self, out: &mut [f32]) {
        let (newer, older) = self.samples.split_at(self.write_pos);
        let split = older.len().min(out.len());
        out[..split].copy_from_slice(&older[..split]);
        let rest = (out.len() - split).min(newer.len());
        out[split..split + rest].copy_from_slice(&newer[..rest]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_ordered_after_wrap() {
        let mut window = SampleWindow::new(4);
        for s in 1..=6 {
            window.push(s as f32);
        }

        let mut out = [0.0; 4];
        window.copy_ordered(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_interleaved_frames_are_downmixed() {
        let mut window = SampleWindow::new(2);
        window.push_interleaved(&[1.0, 0.0, -0.5, -0.5], 2);

        let mut out = [0.0; 2];
        window.copy_ordered(&mut out);
        assert_eq!(out, [0.5, -0.5]);
    }

    #[test]
    fn test_clear_restores_silence() {
        let mut window = SampleWindow::new(3);
        window.push_interleaved(&[0.3, 0.6, 0.9], 1);
        window.clear();

        let mut out = [1.0; 3];
        window.copy_ordered(&mut out);
        assert_eq!(out, [0.0; 3]);
    }
}
