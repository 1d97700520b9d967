//! Per-frame orchestration: matrices, spectrum sample, bar layout, draw.

use crate::audio::SpectrumSource;
use crate::camera::ViewMatrices;
use crate::controls::{CancelToken, ControlQueue};
use crate::error::FrameError;
use crate::params::{FixedCamera, VisualParams};
use crate::rendering::{BarUniforms, FrameUniforms, RingTarget};
use crate::ring::{bar_width, layout_bar};

/// Lifecycle of the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No frame has run yet
    Uninitialized,
    /// Frames are being drawn
    Running,
    /// Cancelled; no further frames will be drawn
    Stopped,
}

/// What a single iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    /// Drawable has zero area; nothing sampled or drawn
    Skipped,
    Stopped,
}

/// Drives one frame per host redraw callback until cancelled
pub struct RenderLoop<S> {
    state: LoopState,
    source: S,
    params: VisualParams,
    camera: FixedCamera,
    controls: ControlQueue,
    cancel: CancelToken,
    bar_width: f32,
    bars: Vec<BarUniforms>,
}

impl<S: SpectrumSource> RenderLoop<S> {
    pub fn new(
        source: S,
        params: VisualParams,
        controls: ControlQueue,
        cancel: CancelToken,
    ) -> Self {
        let bar_count = source.bin_count();
        Self {
            state: LoopState::Uninitialized,
            bar_width: bar_width(bar_count),
            bars: Vec::with_capacity(bar_count),
            source,
            params,
            camera: FixedCamera::default(),
            controls,
            cancel,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn params(&self) -> &VisualParams {
        &self.params
    }

    pub fn bar_count(&self) -> usize {
        self.source.bin_count()
    }

    /// Run one iteration. Errors are not recovered; the caller should stop.
    pub fn frame<T: RingTarget>(&mut self, target: &mut T) -> Result<FrameOutcome, FrameError> {
        if self.state == LoopState::Stopped || self.cancel.is_cancelled() {
            if self.state != LoopState::Stopped {
                log::info!("Render loop cancelled");
            }
            self.state = LoopState::Stopped;
            return Ok(FrameOutcome::Stopped);
        }
        if self.state == LoopState::Uninitialized {
            log::info!("Render loop running with {} bars", self.bar_count());
            self.state = LoopState::Running;
        }

        self.controls.drain_into(&mut self.params);

        let (width, height) = target.drawable_size();
        if width == 0 || height == 0 {
            return Ok(FrameOutcome::Skipped);
        }

        let matrices = ViewMatrices::new(&self.camera, width as f32 / height as f32);
        let frame = FrameUniforms {
            projection: matrices.combined().to_cols_array_2d(),
            width: self.bar_width,
            _padding: [0.0; 3],
        };

        let spectrum = self.source.sample();
        let bar_count = spectrum.len();
        self.bars.clear();
        for (i, &magnitude) in spectrum.iter().enumerate() {
            let bar = layout_bar(i, magnitude, bar_count, &self.params);
            self.bars.push(BarUniforms::from(&bar));
        }

        target.draw_ring(&frame, &self.bars)?;
        Ok(FrameOutcome::Drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorStop;
    use crate::controls::{self, ControlHandle, ControlMessage};

    struct FixedSpectrum {
        bins: Vec<u8>,
        calls: usize,
    }

    impl SpectrumSource for FixedSpectrum {
        fn bin_count(&self) -> usize {
            self.bins.len()
        }

        fn sample(&mut self) -> &[u8] {
            self.calls += 1;
            &self.bins
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        size: (u32, u32),
        frames: Vec<(FrameUniforms, Vec<BarUniforms>)>,
        fail: bool,
    }

    impl RingTarget for RecordingTarget {
        fn drawable_size(&self) -> (u32, u32) {
            self.size
        }

        fn draw_ring(
            &mut self,
            frame: &FrameUniforms,
            bars: &[BarUniforms],
        ) -> Result<(), FrameError> {
            if self.fail {
                return Err(FrameError::Surface(wgpu::SurfaceError::Lost));
            }
            self.frames.push((*frame, bars.to_vec()));
            Ok(())
        }
    }

    fn params() -> VisualParams {
        VisualParams {
            height_scale: 1.0,
            distance_scale: 1.0,
            start_color: ColorStop::new(0, 0, 0),
            end_color: ColorStop::new(200, 100, 50),
        }
    }

    fn render_loop(bins: Vec<u8>) -> (RenderLoop<FixedSpectrum>, ControlHandle) {
        let cancel = CancelToken::new();
        let (handle, queue) = controls::channel(16, cancel.clone());
        let source = FixedSpectrum { bins, calls: 0 };
        (RenderLoop::new(source, params(), queue, cancel), handle)
    }

    fn target(width: u32, height: u32) -> RecordingTarget {
        RecordingTarget {
            size: (width, height),
            ..Default::default()
        }
    }

    #[test]
    fn test_one_draw_per_bin() {
        let mut bins = vec![0u8; 128];
        bins[64] = 255;
        let (mut ring, _handle) = render_loop(bins);
        let mut target = target(800, 600);

        assert_eq!(ring.state(), LoopState::Uninitialized);
        assert_eq!(ring.frame(&mut target).unwrap(), FrameOutcome::Drawn);
        assert_eq!(ring.state(), LoopState::Running);

        let (frame, bars) = &target.frames[0];
        assert_eq!(bars.len(), 128);
        assert_eq!(frame.width, 1.40625);
        assert_eq!(ring.source.calls, 1);

        // Loud centre bar reaches the end colour, silent first bar the start colour
        assert_eq!(bars[64].color, [200.0, 100.0, 50.0]);
        assert_eq!(bars[64].angle, 180.0);
        assert!((bars[64].height - 3.1875).abs() < 1e-5);
        assert_eq!(bars[0].color, [0.0, 0.0, 0.0]);
        assert_eq!(bars[0].height, 0.0);
    }

    #[test]
    fn test_updates_apply_before_bars() {
        let (mut ring, handle) = render_loop(vec![0u8; 8]);
        let mut target = target(100, 100);

        handle.send(ControlMessage::SetStartColor(ColorStop::new(9, 9, 9)));
        handle.send(ControlMessage::SetStartColor(ColorStop::new(10, 20, 30)));
        ring.frame(&mut target).unwrap();

        let (_, bars) = &target.frames[0];
        assert_eq!(bars[0].color, [10.0, 20.0, 30.0]);
        assert_eq!(ring.params().start_color, ColorStop::new(10, 20, 30));
    }

    #[test]
    fn test_negative_scale_extrapolates_color() {
        let (mut ring, handle) = render_loop(vec![255u8; 8]);
        let mut target = target(100, 100);

        handle.send(ControlMessage::SetHeightScale(-1.0));
        handle.send(ControlMessage::SetDistanceScale(0.0));
        handle.send(ControlMessage::SetStartColor(ColorStop::new(100, 100, 100)));
        ring.frame(&mut target).unwrap();

        // t = -1 pushes past the start colour, away from the end colour
        let (_, bars) = &target.frames[0];
        assert_eq!(bars[0].color, [0.0, 100.0, 150.0]);
    }

    #[test]
    fn test_cancel_stops_before_sampling() {
        let (mut ring, handle) = render_loop(vec![0u8; 8]);
        let mut target = target(100, 100);

        ring.frame(&mut target).unwrap();
        handle.cancel();

        assert_eq!(ring.frame(&mut target).unwrap(), FrameOutcome::Stopped);
        assert_eq!(ring.frame(&mut target).unwrap(), FrameOutcome::Stopped);
        assert_eq!(ring.state(), LoopState::Stopped);
        assert_eq!(ring.source.calls, 1);
        assert_eq!(target.frames.len(), 1);
    }

    #[test]
    fn test_zero_area_skips_frame() {
        let (mut ring, _handle) = render_loop(vec![0u8; 8]);
        let mut target = target(800, 0);

        assert_eq!(ring.frame(&mut target).unwrap(), FrameOutcome::Skipped);
        assert_eq!(ring.source.calls, 0);
        assert!(target.frames.is_empty());
        assert_eq!(ring.state(), LoopState::Running);
    }

    #[test]
    fn test_aspect_change_only_rescales_x() {
        let (mut ring, _handle) = render_loop(vec![0u8; 8]);
        let mut target = target(1000, 500);
        ring.frame(&mut target).unwrap();
        target.size = (500, 500);
        ring.frame(&mut target).unwrap();

        let wide = target.frames[0].0.projection;
        let square = target.frames[1].0.projection;

        // Only the first row of the combined matrix depends on aspect
        for col in 0..4 {
            for row in 1..4 {
                assert_eq!(wide[col][row], square[col][row]);
            }
            assert!((wide[col][0] * 2.0 - square[col][0]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_draw_failure_propagates() {
        let (mut ring, _handle) = render_loop(vec![0u8; 8]);
        let mut target = RecordingTarget {
            size: (100, 100),
            fail: true,
            ..Default::default()
        };

        assert!(ring.frame(&mut target).is_err());
    }
}
