use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use mockview::app::{CvAction, InterviewOptions, run_cv, run_interview};
use mockview::cli::{Cli, Commands, ConfigAction, CvArgs, is_known_role};
use mockview::client::{HttpSessionClient, SessionService};
use mockview::config::Config;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    mockview::logging::init(cli.verbose, cli.quiet);
    tracing::debug!("mockview {}", mockview::version_string());

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Interview(args) => {
            let service = connect(&config)?;
            let options = InterviewOptions {
                role: resolve_role(args.role, &config),
                answers: args.answers,
                device: args.device,
                quiet: cli.quiet,
            };
            run_interview(&config, service, options)
                .await
                .context("Interview ended with an error")?;
        }
        Commands::Cv(args) => {
            let service = connect(&config)?;
            let role = resolve_role(args.role.clone(), &config);
            run_cv(service, &args.file, &role, cv_action(&args))
                .await
                .with_context(|| format!("CV analysis of {} failed", args.file.display()))?;
        }
        #[cfg(feature = "cpal-audio")]
        Commands::Devices => {
            list_audio_devices()?;
        }
        Commands::Config { action } => {
            handle_config_command(action, &config, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "mockview",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Command-line flags (--base-url, --timeout)
/// 2. Environment variables
/// 3. Custom config path from CLI (--config), which must exist
/// 4. Default config path (~/.config/mockview/config.toml), or built-in defaults
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path()?)?,
    };
    let mut config = config.with_env_overrides();

    if let Some(base_url) = &cli.base_url {
        config.service.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.service.timeout_secs = timeout;
    }
    Ok(config)
}

/// Pick the role from the flag or the config. Unknown roles are passed on
/// with a warning; the service has the final say.
fn resolve_role(flag: Option<String>, config: &Config) -> String {
    let role = flag.unwrap_or_else(|| config.interview.role.clone());
    if !is_known_role(&role) {
        tracing::warn!(
            "Role '{}' is not one of {}",
            role,
            mockview::defaults::KNOWN_ROLES.join(", ")
        );
    }
    role
}

fn connect(config: &Config) -> Result<Arc<dyn SessionService>> {
    let client = HttpSessionClient::new(&config.service)?;
    tracing::info!("Using evaluation service at {}", client.base_url());
    Ok(Arc::new(client))
}

fn cv_action(args: &CvArgs) -> CvAction {
    if args.full {
        CvAction::FullAnalysis
    } else if args.evaluate {
        CvAction::ParseAndEvaluate
    } else {
        CvAction::Parse
    }
}

fn handle_config_command(
    action: ConfigAction,
    config: &Config,
    custom_path: Option<&Path>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            let path: PathBuf = match custom_path {
                Some(path) => path.to_path_buf(),
                None => Config::default_path()?,
            };
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("{} {}", path.display(), "(not created yet)".dimmed());
            }
        }
    }
    Ok(())
}

/// List available audio input devices.
#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = mockview::audio::capture::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}
