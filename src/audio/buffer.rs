//! Recorded audio containers: fragments, the per-take buffer and the drained blob.

/// One chunk of encoded audio as emitted by a capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFragment(Vec<u8>);

impl AudioFragment {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for AudioFragment {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for AudioFragment {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Ordered fragments of one record/stop cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingBuffer {
    fragments: Vec<AudioFragment>,
}

impl RecordingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: AudioFragment) {
        self.fragments.push(fragment);
    }

    pub fn extend(&mut self, fragments: impl IntoIterator<Item = AudioFragment>) {
        self.fragments.extend(fragments);
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    pub fn fragments(&self) -> &[AudioFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.fragments.iter().map(AudioFragment::len).sum()
    }

    /// All fragments joined in emission order. Leaves the buffer untouched.
    pub fn concatenated(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.total_bytes());
        for fragment in &self.fragments {
            payload.extend_from_slice(fragment.as_bytes());
        }
        payload
    }
}

/// A finished take: one binary payload tagged with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    bytes: Vec<u8>,
    mime_type: String,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Upload file name, e.g. `answer.webm`.
    pub fn file_name(&self) -> String {
        format!("answer.{}", extension_for_mime(&self.mime_type))
    }
}

/// File extension conventionally used for an audio media type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    // Parameters like "audio/webm;codecs=opus" don't change the container
    let essence = mime_type.split(';').next().unwrap_or("").trim();
    match essence {
        "audio/webm" => "webm",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/flac" => "flac",
        _ => "bin",
    }
}

/// Media type for an audio file extension, if recognised.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "webm" => Some("audio/webm"),
        "wav" => Some("audio/wav"),
        "ogg" | "oga" => Some("audio/ogg"),
        "mp3" => Some("audio/mpeg"),
        "m4a" | "mp4" => Some("audio/mp4"),
        "flac" => Some("audio/flac"),
        _ => None,
    }
}
