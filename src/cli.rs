//! Command-line interface for mockview
//!
//! Provides argument parsing using clap derive macros.

use crate::defaults::KNOWN_ROLES;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Guided mock interviews and CV analysis
#[derive(Parser, Debug)]
#[command(name = "mockview", version, about = "Guided mock interviews and CV analysis")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Evaluation service base URL (e.g., http://127.0.0.1:8000)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout. Examples: 30s, 2m. 0 disables it
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_timeout_secs)]
    pub timeout: Option<u64>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: flow transitions, -vv: requests)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a timeout string into seconds.
///
/// Supports bare numbers (seconds) and any `humantime` duration (`30s`, `2m`, `1m30s`).
fn parse_timeout_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Whether the service has a question bank for `role`.
///
/// Matches the service's own normalisation: case-insensitive, spaces
/// count as underscores.
pub fn is_known_role(role: &str) -> bool {
    let normalized = role.trim().to_lowercase().replace(' ', "_");
    KNOWN_ROLES.contains(&normalized.as_str())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a mock interview
    Interview(InterviewArgs),

    /// Parse and evaluate a CV
    Cv(CvArgs),

    /// List available audio input devices
    #[cfg(feature = "cpal-audio")]
    Devices,

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct InterviewArgs {
    /// Interview track (e.g., software_engineer, cybersecurity, data_analyst)
    #[arg(long, short = 'r', value_name = "ROLE")]
    pub role: Option<String>,

    /// Pre-recorded answer, used instead of the microphone (repeat for each question)
    #[arg(long = "answer", short = 'a', value_name = "FILE")]
    pub answers: Vec<PathBuf>,

    /// Audio input device
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,
}

#[derive(Args, Debug)]
pub struct CvArgs {
    /// CV document to upload (PDF)
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: PathBuf,

    /// Role to evaluate against
    #[arg(long, short = 'r', value_name = "ROLE")]
    pub role: Option<String>,

    /// Parse, then evaluate the parsed CV
    #[arg(long, conflicts_with = "full")]
    pub evaluate: bool,

    /// Parse and evaluate in a single request
    #[arg(long)]
    pub full: bool,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interview_defaults() {
        let cli = Cli::try_parse_from(["mockview", "interview"]).unwrap();
        match cli.command {
            Commands::Interview(args) => {
                assert!(args.role.is_none());
                assert!(args.answers.is_empty());
                assert!(args.device.is_none());
            }
            other => panic!("Expected Interview command, got {other:?}"),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        assert!(cli.timeout.is_none());
    }

    #[test]
    fn test_parse_interview_with_answers() {
        let cli = Cli::try_parse_from([
            "mockview",
            "interview",
            "--role",
            "cybersecurity",
            "--answer",
            "a1.webm",
            "-a",
            "a2.webm",
        ])
        .unwrap();
        match cli.command {
            Commands::Interview(args) => {
                assert_eq!(args.role.as_deref(), Some("cybersecurity"));
                assert_eq!(
                    args.answers,
                    vec![PathBuf::from("a1.webm"), PathBuf::from("a2.webm")]
                );
            }
            other => panic!("Expected Interview command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_cv_evaluate() {
        let cli =
            Cli::try_parse_from(["mockview", "cv", "--file", "cv.pdf", "--evaluate"]).unwrap();
        match cli.command {
            Commands::Cv(args) => {
                assert_eq!(args.file, PathBuf::from("cv.pdf"));
                assert!(args.evaluate);
                assert!(!args.full);
            }
            other => panic!("Expected Cv command, got {other:?}"),
        }
    }

    #[test]
    fn test_cv_requires_file() {
        assert!(Cli::try_parse_from(["mockview", "cv"]).is_err());
    }

    #[test]
    fn test_cv_evaluate_conflicts_with_full() {
        assert!(
            Cli::try_parse_from(["mockview", "cv", "-f", "cv.pdf", "--evaluate", "--full"])
                .is_err()
        );
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["mockview"]).is_err());
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from([
            "mockview",
            "cv",
            "-f",
            "cv.pdf",
            "--base-url",
            "http://localhost:9000",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_timeout_accepts_humantime() {
        let cli = Cli::try_parse_from(["mockview", "--timeout", "2m", "config", "path"]).unwrap();
        assert_eq!(cli.timeout, Some(120));

        let cli = Cli::try_parse_from(["mockview", "--timeout", "45", "config", "show"]).unwrap();
        assert_eq!(cli.timeout, Some(45));
    }

    #[test]
    fn test_timeout_rejects_garbage() {
        assert!(Cli::try_parse_from(["mockview", "--timeout", "soon", "config", "show"]).is_err());
    }

    #[test]
    fn test_parse_config_actions() {
        let cli = Cli::try_parse_from(["mockview", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["mockview", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_known_roles_use_service_normalisation() {
        assert!(is_known_role("software_engineer"));
        assert!(is_known_role("Data Analyst"));
        assert!(is_known_role(" cybersecurity "));
        assert!(!is_known_role("astronaut"));
        assert!(!is_known_role(""));
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["mockview", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
