//! Microphone capture with cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread that
//! owns it from open to close. Samples are downmixed to mono i16 at the
//! device rate and wrapped as WAV on stop; resampling happens at upload.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::pcm::{downmix_to_mono, encode_wav, f32_to_i16};
use crate::application::ports::{AudioCapture, RecordingError};
use crate::domain::transcription::{AudioClip, AudioMimeType};

/// How often the capture thread checks for a stop request
const POLL_INTERVAL: Duration = Duration::from_millis(20);

type SampleBuffer = Arc<StdMutex<Vec<i16>>>;

struct ActiveCapture {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
    started_at: Instant,
}

pub struct CpalRecorder {
    samples: SampleBuffer,
    sample_rate: Arc<AtomicU32>,
    active: StdMutex<Option<ActiveCapture>>,
}

impl CpalRecorder {
    pub fn new() -> Self {
        Self {
            samples: Arc::new(StdMutex::new(Vec::new())),
            sample_rate: Arc::new(AtomicU32::new(0)),
            active: StdMutex::new(None),
        }
    }

    fn take_active(&self) -> Option<ActiveCapture> {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    fn take_samples(&self) -> Vec<i16> {
        std::mem::take(&mut *self.samples.lock().unwrap_or_else(|e| e.into_inner()))
    }

    async fn shut_down(capture: ActiveCapture) -> Result<(), RecordingError> {
        capture.stop.store(true, Ordering::SeqCst);
        tokio::task::spawn_blocking(move || capture.thread.join())
            .await
            .map_err(|e| RecordingError::RecordingFailed(e.to_string()))?
            .map_err(|_| RecordingError::RecordingFailed("capture thread panicked".into()))
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_start_error(message: String) -> RecordingError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") {
        RecordingError::PermissionDenied
    } else {
        RecordingError::StartFailed(message)
    }
}

fn push_samples(buffer: &SampleBuffer, mono: Vec<i16>) {
    if let Ok(mut samples) = buffer.lock() {
        samples.extend_from_slice(&mono);
    }
}

fn open_stream(buffer: SampleBuffer) -> Result<(Stream, u32), RecordingError> {
    let device = cpal::default_host()
        .default_input_device()
        .ok_or(RecordingError::NoAudioDevice)?;
    let supported = device
        .default_input_config()
        .map_err(|e| classify_start_error(e.to_string()))?;

    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.config();
    let channels = config.channels;
    let on_error = |err: cpal::StreamError| warn!(error = %err, "Audio stream error");

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                push_samples(&buffer, downmix_to_mono(data, channels));
            },
            on_error,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let converted: Vec<i16> = data.iter().map(|&s| f32_to_i16(s)).collect();
                push_samples(&buffer, downmix_to_mono(&converted, channels));
            },
            on_error,
            None,
        ),
        other => {
            return Err(RecordingError::StartFailed(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| classify_start_error(e.to_string()))?;

    stream
        .play()
        .map_err(|e| classify_start_error(e.to_string()))?;

    debug!(
        sample_rate = config.sample_rate.0,
        channels,
        format = ?sample_format,
        "Input stream opened"
    );
    Ok((stream, config.sample_rate.0))
}

fn capture_loop(
    buffer: SampleBuffer,
    stop: Arc<AtomicBool>,
    ready: oneshot::Sender<Result<u32, RecordingError>>,
) {
    let stream = match open_stream(buffer) {
        Ok((stream, rate)) => {
            if ready.send(Ok(rate)).is_err() {
                return;
            }
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(POLL_INTERVAL);
    }
    drop(stream);
}

#[async_trait]
impl AudioCapture for CpalRecorder {
    async fn start(&self) -> Result<(), RecordingError> {
        if self.is_recording() {
            return Err(RecordingError::StartFailed(
                "recording already in progress".into(),
            ));
        }
        self.take_samples();

        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();
        let buffer = Arc::clone(&self.samples);
        let thread_stop = Arc::clone(&stop);
        let thread = std::thread::Builder::new()
            .name("ppq-voice-capture".into())
            .spawn(move || capture_loop(buffer, thread_stop, ready_tx))
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

        let rate = ready_rx
            .await
            .map_err(|_| RecordingError::StartFailed("capture thread exited".into()))??;
        self.sample_rate.store(rate, Ordering::SeqCst);

        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = Some(ActiveCapture {
            stop,
            thread,
            started_at: Instant::now(),
        });
        info!(sample_rate = rate, "Recording started");
        Ok(())
    }

    async fn stop(&self) -> Result<AudioClip, RecordingError> {
        let capture = self.take_active().ok_or(RecordingError::NotRecording)?;
        let elapsed = capture.started_at.elapsed();
        Self::shut_down(capture).await?;

        let samples = self.take_samples();
        if samples.is_empty() {
            warn!("No audio captured");
            return Ok(AudioClip::new(Vec::new(), AudioMimeType::Wav));
        }

        let rate = self.sample_rate.load(Ordering::SeqCst);
        info!(
            samples = samples.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Recording stopped"
        );
        let wav = tokio::task::spawn_blocking(move || encode_wav(&samples, rate))
            .await
            .map_err(|e| RecordingError::RecordingFailed(e.to_string()))?
            .map_err(|e| RecordingError::RecordingFailed(e.to_string()))?;
        Ok(AudioClip::new(wav, AudioMimeType::Wav))
    }

    async fn cancel(&self) -> Result<(), RecordingError> {
        if let Some(capture) = self.take_active() {
            Self::shut_down(capture).await?;
            debug!("Recording cancelled");
        }
        self.take_samples();
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.active
            .lock()
            .map(|active| active.is_some())
            .unwrap_or(false)
    }

    fn elapsed_ms(&self) -> u64 {
        self.active
            .lock()
            .ok()
            .and_then(|active| {
                active
                    .as_ref()
                    .map(|c| c.started_at.elapsed().as_millis() as u64)
            })
            .unwrap_or(0)
    }
}
