//! Parameter updates from input handlers to the render loop.
//!
//! Handlers on any thread push messages into a bounded queue; the render loop
//! is the only owner of [`VisualParams`] and drains the queue once per frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;

use crate::color::ColorStop;
use crate::params::VisualParams;

/// Default number of pending updates before new ones are dropped
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// One change to the live visual parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    SetHeightScale(f32),
    SetDistanceScale(f32),
    AdjustHeightScale(f32),
    AdjustDistanceScale(f32),
    SetStartColor(ColorStop),
    SetEndColor(ColorStop),
}

impl ControlMessage {
    pub fn apply(self, params: &mut VisualParams) {
        match self {
            Self::SetHeightScale(value) => params.height_scale = value,
            Self::SetDistanceScale(value) => params.distance_scale = value,
            Self::AdjustHeightScale(delta) => params.height_scale += delta,
            Self::AdjustDistanceScale(delta) => params.distance_scale += delta,
            Self::SetStartColor(color) => params.start_color = color,
            Self::SetEndColor(color) => params.end_color = color,
        }
    }
}

/// Cancellation flag shared between the host and the render loop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sending side, cloned into every input handler
#[derive(Debug, Clone)]
pub struct ControlHandle {
    sender: SyncSender<ControlMessage>,
    cancel: CancelToken,
}

impl ControlHandle {
    /// Queue an update; returns false if it was dropped
    pub fn send(&self, message: ControlMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                log::warn!("Control queue full, dropping {:?}", message);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Ask the render loop to stop at the top of its next iteration
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

/// Receiving side, owned by the render loop
#[derive(Debug)]
pub struct ControlQueue {
    receiver: Receiver<ControlMessage>,
}

impl ControlQueue {
    /// Apply every pending update in arrival order; returns how many were applied
    pub fn drain_into(&self, params: &mut VisualParams) -> usize {
        let mut applied = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    message.apply(params);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if applied > 0 {
            log::debug!(
                "Applied {} control update(s): height_scale={:.2} distance_scale={:.2} start={:?} end={:?}",
                applied,
                params.height_scale,
                params.distance_scale,
                params.start_color,
                params.end_color
            );
        }
        applied
    }
}

/// Create a connected handle/queue pair
pub fn channel(capacity: usize, cancel: CancelToken) -> (ControlHandle, ControlQueue) {
    let (sender, receiver) = mpsc::sync_channel(capacity);
    (ControlHandle { sender, cancel }, ControlQueue { receiver })
}
