//! Pre-recorded answers as an audio source.

use crate::audio::buffer::{AudioFragment, mime_for_extension};
use crate::audio::recorder::AudioSource;
use crate::defaults::FILE_FRAGMENT_BYTES;
use crate::error::{MockviewError, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Audio source that plays back one file per take.
///
/// Each `start` consumes the next queued file and emits its bytes in
/// fixed-size fragments. Once the queue is empty the source behaves like a
/// missing device.
pub struct FileAudioSource {
    takes: VecDeque<Vec<u8>>,
    pending: Vec<AudioFragment>,
    fragment_bytes: usize,
    open: bool,
}

impl FileAudioSource {
    /// Build from in-memory takes.
    pub fn from_takes(takes: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            takes: takes.into_iter().collect(),
            pending: Vec::new(),
            fragment_bytes: FILE_FRAGMENT_BYTES,
            open: false,
        }
    }

    /// Read every file up front so a missing file fails before the interview starts.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let takes = paths
            .iter()
            .map(|path| {
                std::fs::read(path).map_err(|e| MockviewError::Audio {
                    message: format!("Failed to read answer file {}: {}", path.display(), e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_takes(takes))
    }

    pub fn with_fragment_bytes(mut self, fragment_bytes: usize) -> Self {
        self.fragment_bytes = fragment_bytes.max(1);
        self
    }

    /// Takes not yet played.
    pub fn remaining(&self) -> usize {
        self.takes.len()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Media type implied by a file's extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
}

impl AudioSource for FileAudioSource {
    fn start(&mut self) -> Result<()> {
        let take = self
            .takes
            .pop_front()
            .ok_or_else(|| MockviewError::DeviceUnavailable {
                message: "no pre-recorded answers left".to_string(),
            })?;
        self.pending = take
            .chunks(self.fragment_bytes)
            .map(AudioFragment::from)
            .collect();
        self.open = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn read_fragments(&mut self) -> Result<Vec<AudioFragment>> {
        Ok(std::mem::take(&mut self.pending))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
