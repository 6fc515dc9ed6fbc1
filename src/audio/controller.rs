//! Audio capture controller: owns the device for one record/stop/drain cycle.

use crate::audio::buffer::{AudioBlob, RecordingBuffer};
use crate::audio::recorder::AudioSource;
use crate::error::{MockviewError, Result};
use std::fmt;
use tracing::{debug, warn};

/// Lifecycle of the capture device as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No take in progress and nothing left to drain.
    Idle,
    /// Device acquired, fragments accumulating.
    Recording,
    /// Device released, take waiting to be drained.
    Stopped,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CaptureState::Idle => "nothing has been recorded",
            CaptureState::Recording => "recording is in progress",
            CaptureState::Stopped => "a recording is waiting to be submitted",
        };
        f.write_str(text)
    }
}

/// Records takes from an [`AudioSource`] into a [`RecordingBuffer`].
///
/// The device is held only between `start` and `stop`. If the controller is
/// dropped mid-take the device is released anyway.
pub struct AudioCapture {
    source: Box<dyn AudioSource>,
    buffer: RecordingBuffer,
    state: CaptureState,
}

impl AudioCapture {
    pub fn new(source: Box<dyn AudioSource>) -> Self {
        Self {
            source,
            buffer: RecordingBuffer::new(),
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    pub fn buffer(&self) -> &RecordingBuffer {
        &self.buffer
    }

    /// Acquire the device and begin a new take.
    ///
    /// The previous take is discarded only once the device has been acquired.
    pub fn start(&mut self) -> Result<()> {
        if self.state == CaptureState::Recording {
            return Err(MockviewError::invalid_state("start recording", self.state));
        }

        self.source.start().map_err(|e| match e {
            MockviewError::DeviceUnavailable { .. } => e,
            other => MockviewError::DeviceUnavailable {
                message: other.to_string(),
            },
        })?;

        self.buffer.clear();
        self.state = CaptureState::Recording;
        debug!("Capture started on {}", self.source.name());
        Ok(())
    }

    /// Move fragments the device has emitted so far into the buffer.
    ///
    /// Returns how many fragments were collected. A no-op unless recording.
    pub fn pump(&mut self) -> Result<usize> {
        if self.state != CaptureState::Recording {
            return Ok(0);
        }
        let fragments = self.source.read_fragments()?;
        let count = fragments.len();
        self.buffer.extend(fragments);
        Ok(count)
    }

    /// Finalize the take and release the device.
    ///
    /// The device is released and the controller leaves `Recording` even when
    /// the source reports an error while stopping. A failed read means the
    /// take is incomplete, so it is reported after the release.
    pub fn stop(&mut self) -> Result<usize> {
        if self.state != CaptureState::Recording {
            return Err(MockviewError::invalid_state("stop recording", self.state));
        }

        let pending = self.source.read_fragments();
        let stopped = self.source.stop();
        self.state = CaptureState::Stopped;
        let flushed = self.source.read_fragments();

        stopped?;
        self.buffer.extend(pending?);
        self.buffer.extend(flushed?);

        debug!(
            "Capture stopped: {} fragments, {} bytes",
            self.buffer.len(),
            self.buffer.total_bytes()
        );
        Ok(self.buffer.len())
    }

    /// Consume the finished take as one payload tagged with `mime_type`.
    ///
    /// Only legal after `stop`. The buffer is cleared once the blob exists.
    pub fn drain_as_blob(&mut self, mime_type: &str) -> Result<AudioBlob> {
        if self.state != CaptureState::Stopped {
            return Err(MockviewError::invalid_state("submit a recording", self.state));
        }

        let payload = self.source.package(self.buffer.concatenated())?;
        self.buffer.clear();
        self.state = CaptureState::Idle;
        Ok(AudioBlob::new(payload, mime_type))
    }

    /// Throw away any take, stopping the device first if needed.
    pub fn discard(&mut self) {
        if self.state == CaptureState::Recording {
            self.release();
        }
        self.buffer.clear();
        self.state = CaptureState::Idle;
    }

    fn release(&mut self) {
        if let Err(e) = self.source.stop() {
            warn!("Failed to stop {} cleanly: {}", self.source.name(), e);
        }
        self.state = CaptureState::Stopped;
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        if self.state == CaptureState::Recording {
            self.release();
        }
    }
}
