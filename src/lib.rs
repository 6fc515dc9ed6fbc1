//! mockview - guided mock interviews and CV analysis
//!
//! Drives a remote evaluation service through two flows: a spoken
//! question-and-answer interview and a CV parse/evaluate round trip.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod client;
pub mod config;
pub mod cv;
pub mod defaults;
pub mod error;
pub mod interview;
pub mod logging;
pub mod mode;
pub mod view;

#[cfg(feature = "cli")]
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod output;

// Seams
pub use audio::recorder::AudioSource;
pub use client::SessionService;
pub use view::View;

// Flows
pub use audio::controller::{AudioCapture, CaptureState};
pub use cv::{CvFile, CvFlow, CvRecord};
pub use interview::{InterviewFlow, InterviewPhase, NextStep, Session};
pub use mode::{Mode, ModeSelector};

// Error handling
pub use error::{MockviewError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(hash_part.len(), 7, "Git hash should be 7 chars, got: {}", ver);
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
