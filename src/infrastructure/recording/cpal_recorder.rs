//! Cross-platform voice recorder using cpal
//!
//! Captures mono 16-bit PCM from the default input device, resampling
//! to 16kHz when the device rate differs, and encodes the take to FLAC
//! when recording stops.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::Instant;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};

use super::flac_encoder::{encode_to_flac, TARGET_SAMPLE_RATE};
use crate::application::ports::{RecordingError, VoiceRecorder};
use crate::domain::recording::AudioClip;

/// How long to wait for the capture thread to report that the stream
/// is live before declaring the start failed
const START_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(3);

/// Voice recorder using cpal.
///
/// The stream lives on a dedicated thread because cpal::Stream is not
/// Send; the thread holds the microphone until the recording flag is
/// cleared, and joining it is what guarantees the device is released.
pub struct CpalRecorder {
    /// Recorded samples (mono, i16, at device sample rate)
    audio_buffer: Arc<StdMutex<Vec<i16>>>,
    /// Device sample rate (may differ from the 16kHz target)
    device_sample_rate: Arc<AtomicU32>,
    is_recording: Arc<AtomicBool>,
    elapsed_ms: Arc<AtomicU64>,
    capture_thread: StdMutex<Option<JoinHandle<()>>>,
}

impl CpalRecorder {
    pub fn new() -> Self {
        Self {
            audio_buffer: Arc::new(StdMutex::new(Vec::new())),
            device_sample_rate: Arc::new(AtomicU32::new(0)),
            is_recording: Arc::new(AtomicBool::new(false)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            capture_thread: StdMutex::new(None),
        }
    }

    fn get_input_device() -> Result<cpal::Device, RecordingError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(RecordingError::NoInputDevice)
    }

    /// Pick an input configuration, preferring mono and a range that
    /// covers the 16kHz target
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), RecordingError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| Self::classify_device_error(&e.to_string()))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or_else(|| {
            RecordingError::StartFailed("No suitable input configuration found".into())
        })?;

        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Map a device error message onto the closest port error
    fn classify_device_error(message: &str) -> RecordingError {
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") {
            RecordingError::PermissionDenied(message.to_string())
        } else {
            RecordingError::StartFailed(message.to_string())
        }
    }

    /// Resample from the device rate to 16kHz
    fn resample_to_16k(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, RecordingError> {
        if source_rate == TARGET_SAMPLE_RATE {
            return Ok(samples.to_vec());
        }

        let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

        let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
        let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            TARGET_SAMPLE_RATE as usize,
            1024, // Chunk size
            2,    // Sub-chunks
            1,    // Mono
        )
        .map_err(|e| RecordingError::EncodeFailed(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut input_pos = 0;

        while input_pos < samples_f32.len() {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples_f32.len());
            let mut chunk = samples_f32[input_pos..end_pos].to_vec();

            // The final chunk is zero-padded up to the resampler frame
            if chunk.len() < frames_needed {
                chunk.resize(frames_needed, 0.0);
            }

            let resampled = resampler
                .process(&[chunk], None)
                .map_err(|e| RecordingError::EncodeFailed(format!("Resampling failed: {}", e)))?;

            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            input_pos = end_pos;
        }

        output.truncate(output_len);

        Ok(output)
    }

    /// Mix interleaved multi-channel samples down to mono
    fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Resample and FLAC-encode a finished take
    fn encode_clip(samples: &[i16], sample_rate: u32) -> Result<AudioClip, RecordingError> {
        let resampled = Self::resample_to_16k(samples, sample_rate)?;

        let flac =
            encode_to_flac(&resampled).map_err(|e| RecordingError::EncodeFailed(e.to_string()))?;

        if flac.is_empty() {
            return Err(RecordingError::EncodeFailed("Encoded clip is empty".into()));
        }

        let duration_ms = (resampled.len() as u64 * 1000) / TARGET_SAMPLE_RATE as u64;
        Ok(AudioClip::new(flac, duration_ms))
    }

    /// Clear the recording flag and join the capture thread, which
    /// drops the stream and releases the microphone
    async fn release_device(&self) -> Result<(), RecordingError> {
        self.is_recording.store(false, Ordering::SeqCst);

        let handle = self
            .capture_thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            tokio::task::spawn_blocking(move || handle.join())
                .await
                .map_err(|e| RecordingError::RecordingFailed(format!("Join task error: {}", e)))?
                .map_err(|_| {
                    RecordingError::RecordingFailed("Capture thread panicked".to_string())
                })?;
        }
        Ok(())
    }

    fn take_samples(&self) -> Vec<i16> {
        let mut buffer = self
            .audio_buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *buffer)
    }

    /// Body of the capture thread: open the stream, report readiness,
    /// pump elapsed time until the flag clears, then drop the stream
    fn run_capture(
        audio_buffer: Arc<StdMutex<Vec<i16>>>,
        device_sample_rate: Arc<AtomicU32>,
        is_recording: Arc<AtomicBool>,
        elapsed_ms: Arc<AtomicU64>,
        ready: mpsc::Sender<Result<(), RecordingError>>,
    ) {
        let setup = Self::get_input_device().and_then(|device| {
            Self::get_input_config(&device).map(|(config, format)| (device, config, format))
        });
        let (device, config, sample_format) = match setup {
            Ok(parts) => parts,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        let sample_rate = config.sample_rate.0;
        let channels = config.channels;
        device_sample_rate.store(sample_rate, Ordering::SeqCst);

        let buffer = Arc::clone(&audio_buffer);
        let recording = Arc::clone(&is_recording);

        let stream_result = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        let mono = CpalRecorder::mix_to_mono(data, channels);
                        if let Ok(mut buffer) = buffer.lock() {
                            buffer.extend_from_slice(&mono);
                        }
                    }
                },
                |err| tracing::warn!("Audio stream error: {}", err),
                None,
            ),

            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        let i16_data: Vec<i16> =
                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        let mono = CpalRecorder::mix_to_mono(&i16_data, channels);
                        if let Ok(mut buffer) = buffer.lock() {
                            buffer.extend_from_slice(&mono);
                        }
                    }
                },
                |err| tracing::warn!("Audio stream error: {}", err),
                None,
            ),

            other => {
                let _ = ready.send(Err(RecordingError::StartFailed(format!(
                    "Unsupported sample format: {:?}",
                    other
                ))));
                return;
            }
        };

        let stream = match stream_result {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(Self::classify_device_error(&e.to_string())));
                return;
            }
        };

        if let Err(e) = stream.play() {
            let _ = ready.send(Err(RecordingError::StartFailed(e.to_string())));
            return;
        }

        let _ = ready.send(Ok(()));

        let started = Instant::now();
        while is_recording.load(Ordering::SeqCst) {
            elapsed_ms.store(started.elapsed().as_millis() as u64, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        drop(stream);
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceRecorder for CpalRecorder {
    async fn start(&self) -> Result<(), RecordingError> {
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(RecordingError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        {
            let mut buffer = self
                .audio_buffer
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            buffer.clear();
        }
        self.elapsed_ms.store(0, Ordering::SeqCst);
        self.is_recording.store(true, Ordering::SeqCst);

        let audio_buffer = Arc::clone(&self.audio_buffer);
        let device_sample_rate = Arc::clone(&self.device_sample_rate);
        let is_recording = Arc::clone(&self.is_recording);
        let elapsed_ms = Arc::clone(&self.elapsed_ms);
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            Self::run_capture(
                audio_buffer,
                device_sample_rate,
                is_recording,
                elapsed_ms,
                ready_tx,
            );
        });

        // Wait for the stream to come up (or fail) off the async runtime
        let startup = tokio::task::spawn_blocking(move || ready_rx.recv_timeout(START_TIMEOUT))
            .await
            .map_err(|e| RecordingError::StartFailed(format!("Startup task error: {}", e)))?;

        match startup {
            Ok(Ok(())) => {
                *self
                    .capture_thread
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                self.is_recording.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                self.is_recording.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(RecordingError::StartFailed(
                    "Timed out waiting for the input stream".to_string(),
                ))
            }
        }
    }

    async fn stop(&self) -> Result<AudioClip, RecordingError> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(RecordingError::RecordingFailed(
                "No recording in progress".to_string(),
            ));
        }

        // The microphone is free once the capture thread has joined;
        // encoding happens strictly after that.
        self.release_device().await?;

        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if sample_rate == 0 {
            return Err(RecordingError::RecordingFailed(
                "Sample rate not set".to_string(),
            ));
        }

        let samples = self.take_samples();
        if samples.is_empty() {
            return Err(RecordingError::RecordingFailed(
                "No audio data captured".to_string(),
            ));
        }

        tokio::task::spawn_blocking(move || Self::encode_clip(&samples, sample_rate))
            .await
            .map_err(|e| RecordingError::EncodeFailed(format!("Encode task error: {}", e)))?
    }

    async fn cancel(&self) -> Result<(), RecordingError> {
        self.release_device().await?;
        self.take_samples();
        self.elapsed_ms.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }
}
