//! Default configuration constants for mockview.
//!
//! Shared between the config types, the HTTP client and the audio layer so the
//! same value never gets spelled twice.

/// Default base URL of the evaluation service.
pub const BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds.
///
/// Scoring and report generation call a language model on the server side
/// and routinely take tens of seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default capture sample rate in Hz for microphone recording.
pub const SAMPLE_RATE: u32 = 16000;

/// Media type of answers recorded by browser-style container sources.
pub const AUDIO_MIME_TYPE: &str = "audio/webm";

/// Media type of answers captured from the microphone as PCM.
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Media type of uploaded CV documents.
pub const CV_MIME_TYPE: &str = "application/pdf";

/// Size of one fragment emitted by file-backed audio sources.
pub const FILE_FRAGMENT_BYTES: usize = 16 * 1024;

/// Message the service sends instead of a question once the bank is exhausted.
pub const INTERVIEW_COMPLETE_MESSAGE: &str = "Interview complete";

/// Tracks the service ships a question bank and keyword list for.
pub const KNOWN_ROLES: &[&str] = &["software_engineer", "cybersecurity", "data_analyst"];

/// Default interview track.
pub const DEFAULT_ROLE: &str = "software_engineer";
