use crate::audio::buffer::AudioFragment;
use crate::error::{MockviewError, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait for audio capture devices.
///
/// This trait allows swapping implementations (microphone, pre-recorded file, mock).
pub trait AudioSource: Send {
    /// Acquire the device and begin emitting fragments.
    ///
    /// # Errors
    /// `MockviewError::DeviceUnavailable` if permission is denied or no device exists.
    fn start(&mut self) -> Result<()>;

    /// Finalize the stream and release the device.
    ///
    /// Any fragment still buffered inside the device must become readable
    /// through [`AudioSource::read_fragments`] once this returns.
    fn stop(&mut self) -> Result<()>;

    /// Take every fragment emitted since the previous call.
    fn read_fragments(&mut self) -> Result<Vec<AudioFragment>>;

    /// Wrap the concatenated fragments of a take into a self-contained payload.
    ///
    /// Sources that already emit a container format return the payload unchanged.
    fn package(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        Ok(payload)
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "audio source"
    }
}

#[derive(Debug, Default)]
struct MockDeviceState {
    open: bool,
    pending: Vec<AudioFragment>,
    per_take: Vec<AudioFragment>,
    flush: Option<AudioFragment>,
    start_failure: Option<String>,
    stop_failure: Option<String>,
    read_failure: Option<String>,
    open_count: usize,
    close_count: usize,
}

/// Mock audio source for testing.
///
/// Clones share the same device state, so a test can keep a handle
/// after moving the source into a controller.
#[derive(Debug, Clone, Default)]
pub struct MockAudioSource {
    state: Arc<Mutex<MockDeviceState>>,
}

impl MockAudioSource {
    /// Create a new mock audio source that emits nothing by itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments emitted right after every successful `start`.
    pub fn with_fragments<I, F>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<AudioFragment>,
    {
        self.lock().per_take = fragments.into_iter().map(Into::into).collect();
        self
    }

    /// Fragment the device still holds when asked to stop.
    pub fn with_flush_fragment(self, fragment: impl Into<AudioFragment>) -> Self {
        self.lock().flush = Some(fragment.into());
        self
    }

    /// Configure the mock to fail on start (as if permission were denied).
    pub fn with_start_failure(self, message: &str) -> Self {
        self.lock().start_failure = Some(message.to_string());
        self
    }

    /// Change the start failure on a shared handle, e.g. to deny the second take.
    pub fn set_start_failure(&self, message: Option<&str>) {
        self.lock().start_failure = message.map(str::to_string);
    }

    /// Configure the mock to fail on stop. The device is still released.
    pub fn with_stop_failure(self, message: &str) -> Self {
        self.lock().stop_failure = Some(message.to_string());
        self
    }

    /// Make the next `read_fragments` call fail once.
    pub fn fail_next_read(&self, message: &str) {
        self.lock().read_failure = Some(message.to_string());
    }

    /// Simulate the device emitting a fragment. Ignored while the device is closed.
    pub fn emit(&self, fragment: impl Into<AudioFragment>) {
        let mut state = self.lock();
        if state.open {
            state.pending.push(fragment.into());
        }
    }

    /// Check if the device is currently held open.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Number of successful acquisitions.
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }

    /// Number of releases.
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    fn lock(&self) -> MutexGuard<'_, MockDeviceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        let mut state = self.lock();
        if let Some(message) = state.start_failure.clone() {
            return Err(MockviewError::DeviceUnavailable { message });
        }
        state.open = true;
        state.open_count += 1;
        let take = state.per_take.clone();
        state.pending.extend(take);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.open = false;
        state.close_count += 1;
        if let Some(message) = state.stop_failure.clone() {
            return Err(MockviewError::Audio { message });
        }
        if let Some(flush) = state.flush.clone() {
            state.pending.push(flush);
        }
        Ok(())
    }

    fn read_fragments(&mut self) -> Result<Vec<AudioFragment>> {
        let mut state = self.lock();
        if let Some(message) = state.read_failure.take() {
            return Err(MockviewError::Audio { message });
        }
        Ok(std::mem::take(&mut state.pending))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_emits_configured_fragments_after_start() {
        let mut source = MockAudioSource::new().with_fragments([&b"one"[..], &b"two"[..]]);

        source.start().unwrap();
        let fragments = source.read_fragments().unwrap();

        assert_eq!(
            fragments,
            vec![AudioFragment::from(&b"one"[..]), AudioFragment::from(&b"two"[..])]
        );
        assert!(source.read_fragments().unwrap().is_empty());
    }

    #[test]
    fn test_mock_ignores_emission_while_closed() {
        let mut source = MockAudioSource::new();

        source.emit(&b"early"[..]);
        source.start().unwrap();
        source.emit(&b"live"[..]);

        assert_eq!(
            source.read_fragments().unwrap(),
            vec![AudioFragment::from(&b"live"[..])]
        );
    }

    #[test]
    fn test_mock_flushes_on_stop() {
        let mut source = MockAudioSource::new().with_flush_fragment(&b"tail"[..]);

        source.start().unwrap();
        assert!(source.read_fragments().unwrap().is_empty());
        source.stop().unwrap();

        assert_eq!(
            source.read_fragments().unwrap(),
            vec![AudioFragment::from(&b"tail"[..])]
        );
    }

    #[test]
    fn test_mock_start_failure_is_device_unavailable() {
        let mut source = MockAudioSource::new().with_start_failure("permission denied");

        match source.start() {
            Err(MockviewError::DeviceUnavailable { message }) => {
                assert_eq!(message, "permission denied");
            }
            other => panic!("Expected DeviceUnavailable, got {:?}", other),
        }
        assert!(!source.is_open());
        assert_eq!(source.open_count(), 0);
    }

    #[test]
    fn test_mock_stop_failure_still_releases() {
        let mut source = MockAudioSource::new().with_stop_failure("finalize failed");

        source.start().unwrap();
        assert!(source.stop().is_err());

        assert!(!source.is_open());
        assert_eq!(source.close_count(), 1);
    }

    #[test]
    fn test_mock_clones_share_state() {
        let handle = MockAudioSource::new();
        let mut source = handle.clone();

        source.start().unwrap();
        assert!(handle.is_open());
        assert_eq!(handle.open_count(), 1);
    }
}
