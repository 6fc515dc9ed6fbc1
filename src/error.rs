//! Error types for mockview.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockviewError {
    // Audio capture errors
    #[error("Audio device unavailable: {message}")]
    DeviceUnavailable { message: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    // Flow precondition errors
    #[error("Cannot {operation} while {state}")]
    InvalidState { operation: String, state: String },

    #[error("No file selected")]
    NoFileSelected,

    #[error("Prerequisite missing: {message}")]
    PrerequisiteMissing { message: String },

    // Remote service errors
    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("Service error from {endpoint} (status {status}): {message}")]
    Service {
        endpoint: String,
        status: u16,
        message: String,
    },

    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl MockviewError {
    /// Shorthand for an [`MockviewError::InvalidState`] error.
    pub fn invalid_state(operation: impl Into<String>, state: impl std::fmt::Display) -> Self {
        MockviewError::InvalidState {
            operation: operation.into(),
            state: state.to_string(),
        }
    }

    /// Text suitable for showing to the person driving the session.
    pub fn user_message(&self) -> String {
        match self {
            MockviewError::DeviceUnavailable { message } => {
                format!("Microphone unavailable ({message}). Check permissions and try again.")
            }
            MockviewError::InvalidState { operation, state } => {
                format!("You can't {operation} right now ({state}).")
            }
            MockviewError::NoFileSelected => "Upload a PDF first!".to_string(),
            MockviewError::PrerequisiteMissing { message } => message.clone(),
            MockviewError::Network { .. } => {
                "Could not reach the interview service. Check your connection and try again."
                    .to_string()
            }
            MockviewError::Service { message, .. } if self.is_user_retryable() => {
                format!("The service said: {message}. Try again in a moment.")
            }
            MockviewError::Service { message, .. } => format!("The service said: {message}"),
            other => other.to_string(),
        }
    }

    /// Whether asking the user to try the same action again makes sense.
    ///
    /// Nothing is retried automatically; this only shapes [`Self::user_message`].
    pub fn is_user_retryable(&self) -> bool {
        match self {
            MockviewError::Network { .. } => true,
            MockviewError::Service { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MockviewError>;
