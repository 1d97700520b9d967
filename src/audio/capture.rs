//! Microphone capture and the one-time consent phase.
//!
//! Opening the default input device is treated as asking for consent: the
//! request only resolves once the first buffer of audio arrives, the stream
//! reports an error, or the timeout expires.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use futures::channel::oneshot;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use super::window::{lock, SampleWindow, SharedWindow};
use crate::error::SetupError;
use crate::params::AnalyserConfig;

/// Outcome of the consent phase, delivered once
enum Consent {
    Granted,
    Failed(String),
    TimedOut,
}

type ConsentSlot = Arc<Mutex<Option<oneshot::Sender<Consent>>>>;

/// Proof that the microphone is open and delivering audio.
///
/// Consumed by value when the spectrum sampler is built.
pub struct MicrophoneGrant {
    pub(crate) window: SharedWindow,
    pub(crate) stream: cpal::Stream,
    pub device_name: String,
    pub sample_rate_hz: u32,
}

/// Open the default input device and wait until it produces audio
pub async fn request_microphone(config: &AnalyserConfig) -> Result<MicrophoneGrant, SetupError> {
    config.validate().map_err(SetupError::InvalidConfig)?;

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(SetupError::NoInputDevice)?;

    let supported = device
        .default_input_config()
        .map_err(|e| SetupError::InputConfig(e.to_string()))?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    let sample_rate_hz = stream_config.sample_rate.0;
    log::info!(
        "Audio input: {} @ {}Hz, {} channel(s), {:?}",
        device_name,
        sample_rate_hz,
        stream_config.channels,
        sample_format
    );

    let window = Arc::new(Mutex::new(SampleWindow::new(config.fft_size)));
    let (consent_tx, consent_rx) = oneshot::channel();
    let consent: ConsentSlot = Arc::new(Mutex::new(Some(consent_tx)));

    let stream = match sample_format {
        SampleFormat::F32 => build_input_stream::<f32>(&device, &stream_config, &window, &consent),
        SampleFormat::I16 => build_input_stream::<i16>(&device, &stream_config, &window, &consent),
        SampleFormat::U16 => build_input_stream::<u16>(&device, &stream_config, &window, &consent),
        other => return Err(SetupError::UnsupportedFormat(format!("{:?}", other))),
    }?;

    stream
        .play()
        .map_err(|e| SetupError::Stream(e.to_string()))?;

    spawn_consent_timeout(Arc::clone(&consent), config.consent_timeout_s);

    match consent_rx.await {
        Ok(Consent::Granted) => {
            log::info!("Microphone access granted");
            Ok(MicrophoneGrant {
                window,
                stream,
                device_name,
                sample_rate_hz,
            })
        }
        Ok(Consent::Failed(reason)) => Err(SetupError::ConsentDenied(reason)),
        Ok(Consent::TimedOut) => Err(SetupError::ConsentTimeout(config.consent_timeout_s)),
        Err(_) => Err(SetupError::ConsentDenied("capture stream closed".to_string())),
    }
}

/// Build an input stream that downmixes into the shared window
fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    window: &SharedWindow,
    consent: &ConsentSlot,
) -> Result<cpal::Stream, SetupError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let data_window = Arc::clone(window);
    let data_consent = Arc::clone(consent);
    let error_window = Arc::clone(window);
    let error_consent = Arc::clone(consent);
    let mut mono = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                mono.clear();
                mono.extend(data.iter().map(|s| s.to_sample::<f32>()));
                lock(&data_window).push_interleaved(&mono, channels);
                resolve(&data_consent, Consent::Granted);
            },
            move |err| {
                log::warn!("Audio stream error: {}", err);
                // A dead source reads as silence
                lock(&error_window).clear();
                resolve(&error_consent, Consent::Failed(err.to_string()));
            },
            None,
        )
        .map_err(|e| SetupError::Stream(e.to_string()))
}

/// Deliver the consent outcome if nobody has yet
fn resolve(slot: &ConsentSlot, outcome: Consent) {
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        let _ = sender.send(outcome);
    }
}

fn spawn_consent_timeout(slot: ConsentSlot, timeout_s: f32) {
    thread::spawn(move || {
        thread::sleep(Duration::from_secs_f32(timeout_s.max(0.0)));
        resolve(&slot, Consent::TimedOut);
    });
}
