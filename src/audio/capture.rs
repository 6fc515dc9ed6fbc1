//! Microphone capture using CPAL (Cross-Platform Audio Library).

use crate::audio::buffer::AudioFragment;
use crate::audio::recorder::AudioSource;
use crate::audio::wav::{encode_wav, le_bytes_to_samples, mix_to_mono, resample, samples_to_le_bytes};
use crate::defaults;
use crate::error::{MockviewError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// CPAL probes several backends (ALSA, JACK, PipeWire) and they print
/// harmless noise while doing so.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2.
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Preferred device names on desktop Linux.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse"];

/// Device name patterns that are never a microphone.
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "digital output",
    "hdmi",
    "s/pdif",
];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES.iter().any(|pref| lower.contains(pref))
}

/// List usable input devices. Preferred ones are marked "\[recommended\]".
pub fn list_devices() -> Result<Vec<String>> {
    let devices = with_suppressed_stderr(|| cpal::default_host().input_devices()).map_err(|e| {
        MockviewError::DeviceUnavailable {
            message: format!("Failed to enumerate input devices: {}", e),
        }
    })?;

    let mut names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }
            if is_preferred_device(&name) {
                names.push(format!("{} [recommended]", name));
            } else {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn find_device(device_name: Option<&str>) -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| MockviewError::DeviceUnavailable {
                message: format!("Failed to enumerate input devices: {}", e),
            })?;

        let mut preferred = None;
        for device in devices {
            let Ok(name) = device.name() else { continue };
            match device_name {
                Some(wanted) if name == wanted => return Ok(device),
                None if preferred.is_none() && is_preferred_device(&name) => {
                    preferred = Some(device)
                }
                _ => {}
            }
        }

        if let Some(wanted) = device_name {
            return Err(MockviewError::DeviceUnavailable {
                message: format!("Audio input device '{}' not found", wanted),
            });
        }
        preferred
            .or_else(|| host.default_input_device())
            .ok_or_else(|| MockviewError::DeviceUnavailable {
                message: "No audio input device available".to_string(),
            })
    })
}

/// `cpal::Stream` is not `Send` on every platform. The stream is only
/// touched from the thread driving the controller.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone source producing 16-bit mono PCM.
///
/// Fragments are little-endian PCM; [`AudioSource::package`] turns a
/// drained take into a WAV file. The stream exists only between `start`
/// and `stop`.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    samples: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Resolve the device now so a bad name fails before the interview starts.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        Ok(Self {
            device: find_device(device_name)?,
            stream: None,
            samples: Arc::new(Mutex::new(Vec::new())),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Try 16 kHz mono directly, then fall back to the device's native format.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let preferred = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let samples = Arc::clone(&self.samples);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = samples.lock() {
                    buf.extend_from_slice(data);
                }
            },
            |err| warn!("Audio stream error: {}", err),
            None,
        ) {
            return Ok(stream);
        }

        self.build_native_stream()
    }

    fn build_native_stream(&self) -> Result<cpal::Stream> {
        let config = self
            .device
            .default_input_config()
            .map_err(|e| MockviewError::DeviceUnavailable {
                message: format!("Failed to query input config: {}", e),
            })?;

        let native_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let target_rate = self.sample_rate;
        let stream_config: cpal::StreamConfig = config.clone().into();
        debug!(
            "Using native input format {}ch/{}Hz/{:?}",
            channels,
            native_rate,
            config.sample_format()
        );

        let samples = Arc::clone(&self.samples);
        let push = move |data: &[i16]| {
            let converted = resample(&mix_to_mono(data, channels), native_rate, target_rate);
            if let Ok(mut buf) = samples.lock() {
                buf.extend_from_slice(&converted);
            }
        };

        let built = match config.sample_format() {
            cpal::SampleFormat::I16 => self.device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| push(data),
                |err| warn!("Audio stream error: {}", err),
                None,
            ),
            cpal::SampleFormat::F32 => self.device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let pcm: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    push(&pcm);
                },
                |err| warn!("Audio stream error: {}", err),
                None,
            ),
            other => {
                return Err(MockviewError::DeviceUnavailable {
                    message: format!("Unsupported sample format {:?}", other),
                });
            }
        };

        built.map_err(|e| MockviewError::DeviceUnavailable {
            message: format!("Failed to open input stream: {}", e),
        })
    }

    fn take_samples(&self) -> Vec<i16> {
        match self.samples.lock() {
            Ok(mut buf) => std::mem::take(&mut *buf),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        self.take_samples();
        let stream = with_suppressed_stderr(|| self.build_stream())?;
        stream.play().map_err(|e| MockviewError::DeviceUnavailable {
            message: format!("Failed to start audio stream: {}", e),
        })?;
        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        // Dropping the stream releases the device even if pause fails
        if let Some(SendableStream(stream)) = self.stream.take() {
            stream.pause().map_err(|e| MockviewError::Audio {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
        }
        Ok(())
    }

    fn read_fragments(&mut self) -> Result<Vec<AudioFragment>> {
        let samples = self.take_samples();
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![AudioFragment::new(samples_to_le_bytes(&samples))])
    }

    fn package(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        encode_wav(&le_bytes_to_samples(&payload), self.sample_rate)
    }

    fn name(&self) -> &'static str {
        "microphone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_filter_device() {
        assert!(should_filter_device("surround51"));
        assert!(should_filter_device("front:CARD=PCH"));
        assert!(should_filter_device("HDMI Output"));
        assert!(should_filter_device("Digital Output S/PDIF"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("Built-in Audio"));
    }

    #[test]
    fn test_is_preferred_device() {
        assert!(is_preferred_device("PipeWire"));
        assert!(is_preferred_device("PulseAudio"));
        assert!(!is_preferred_device("hw:0,0"));
        assert!(!is_preferred_device("default"));
    }

    #[test]
    fn test_unknown_device_name_is_device_unavailable() {
        match CpalAudioSource::new(Some("NonExistentDevice12345")) {
            Err(MockviewError::DeviceUnavailable { .. }) => {}
            Err(other) => panic!("Expected DeviceUnavailable, got {:?}", other),
            Ok(_) => panic!("Expected an error for a missing device"),
        }
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_start_stop_releases_stream() {
        let mut source = CpalAudioSource::new(None).expect("Failed to open default device");

        for _ in 0..3 {
            source.start().unwrap();
            std::thread::sleep(std::time::Duration::from_millis(50));
            source.stop().unwrap();
            assert!(source.stream.is_none());
        }
    }
}
