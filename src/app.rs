//! Terminal driver.
//!
//! Wires the HTTP client, an audio source and the terminal view into the
//! mode selector, then feeds the active flow from the keyboard or from
//! pre-recorded answer files.

use crate::audio::controller::AudioCapture;
use crate::audio::file::{FileAudioSource, mime_for_path};
use crate::audio::recorder::AudioSource;
use crate::client::SessionService;
use crate::config::Config;
use crate::cv::CvFile;
use crate::error::Result;
use crate::interview::{InterviewFlow, InterviewPhase, NextStep};
use crate::mode::{Mode, ModeSelector};
use crate::output::TerminalView;
use crate::view::View;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// How often the recording loop drains the device while waiting for a key.
const PUMP_INTERVAL: Duration = Duration::from_millis(250);

/// Options for `mockview interview`.
#[derive(Debug, Clone, Default)]
pub struct InterviewOptions {
    pub role: String,
    pub answers: Vec<PathBuf>,
    pub device: Option<String>,
    pub quiet: bool,
}

/// What `mockview cv` should do after loading the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvAction {
    Parse,
    ParseAndEvaluate,
    FullAnalysis,
}

/// Run one interview, interactively or from answer files.
pub async fn run_interview(
    config: &Config,
    service: Arc<dyn SessionService>,
    options: InterviewOptions,
) -> Result<()> {
    let (source, mime_type) = open_audio_source(config, &options)?;
    let view = Arc::new(TerminalView::stdout());
    let scripted = !options.answers.is_empty();

    let mut selector = ModeSelector::new(service, view.clone() as Arc<dyn View>)
        .with_capture(AudioCapture::new(source), mime_type);
    selector.select_mode(Mode::Interview)?;
    let flow = selector.interview()?;
    flow.start_interview(&options.role).await?;

    if scripted {
        answer_from_files(flow).await
    } else {
        answer_from_keyboard(flow, &view, options.quiet).await
    }
}

fn open_audio_source(
    config: &Config,
    options: &InterviewOptions,
) -> Result<(Box<dyn AudioSource>, String)> {
    if let Some(first) = options.answers.first() {
        let mime_type = mime_for_path(first).unwrap_or(config.audio.mime_type.as_str());
        let source = FileAudioSource::from_files(&options.answers)?;
        info!(
            "Answering from {} file(s) as {}",
            options.answers.len(),
            mime_type
        );
        return Ok((Box::new(source), mime_type.to_string()));
    }

    microphone(config, options.device.as_deref())
}

#[cfg(feature = "cpal-audio")]
fn microphone(config: &Config, device: Option<&str>) -> Result<(Box<dyn AudioSource>, String)> {
    use crate::audio::capture::CpalAudioSource;

    let device = device.or(config.audio.device.as_deref());
    let source = CpalAudioSource::new(device)?.with_sample_rate(config.audio.sample_rate);
    Ok((
        Box::new(source),
        crate::defaults::WAV_MIME_TYPE.to_string(),
    ))
}

#[cfg(not(feature = "cpal-audio"))]
fn microphone(_config: &Config, _device: Option<&str>) -> Result<(Box<dyn AudioSource>, String)> {
    Err(crate::error::MockviewError::DeviceUnavailable {
        message: "built without microphone support; pass --answer FILE for each question"
            .to_string(),
    })
}

/// Use one file per question until the interview ends.
///
/// Running out of files before the last question is an error.
async fn answer_from_files(flow: &mut InterviewFlow) -> Result<()> {
    loop {
        flow.start_recording()?;
        flow.pump_audio()?;
        flow.stop_recording()?;
        flow.submit_answer().await?;

        if let NextStep::Finishing = flow.next_question().await? {
            flow.finish().await?;
            return Ok(());
        }
    }
}

/// Keyboard loop: Enter toggles recording, `s` submits, `n` advances, `q` quits.
///
/// Failed commands are already shown through the view, so the loop keeps going.
/// Once the questions run out, `n` fetches the final report, and pressing it
/// again retries a failed fetch.
async fn answer_from_keyboard(
    flow: &mut InterviewFlow,
    view: &TerminalView,
    quiet: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(PUMP_INTERVAL);

    loop {
        if !quiet {
            println!("{}", view.hints().dimmed());
        }

        let line = loop {
            tokio::select! {
                line = lines.next_line() => break line?,
                _ = ticker.tick() => {
                    flow.pump_audio()?;
                }
            }
        };
        let Some(line) = line else {
            debug!("stdin closed, leaving the interview");
            return Ok(());
        };

        let key = line.trim();
        if key == "q" {
            return Ok(());
        }
        if let Err(e) = handle_key(flow, key).await {
            debug!("Command failed: {}", e);
        }

        if flow.is_done() {
            return Ok(());
        }
    }
}

async fn handle_key(flow: &mut InterviewFlow, key: &str) -> Result<()> {
    match key {
        "" if flow.phase() == InterviewPhase::Recording => flow.stop_recording().map(drop),
        "" => flow.start_recording(),
        "s" => flow.submit_answer().await.map(drop),
        "n" if flow.phase() == InterviewPhase::Finishing => flow.finish().await.map(drop),
        "n" => match flow.next_question().await? {
            NextStep::Finishing => flow.finish().await.map(drop),
            NextStep::Question(_) => Ok(()),
        },
        other => {
            println!("Unknown command '{other}'");
            Ok(())
        }
    }
}

/// Run the CV flow once for `file`.
pub async fn run_cv(
    service: Arc<dyn SessionService>,
    file: &Path,
    role: &str,
    action: CvAction,
) -> Result<()> {
    let view: Arc<dyn View> = Arc::new(TerminalView::stdout());
    let mut selector = ModeSelector::new(service, view.clone());
    selector.select_mode(Mode::Cv)?;
    let flow = selector.cv()?;

    let cv = match CvFile::load(file).await {
        Ok(cv) => cv,
        Err(e) => {
            view.show_error(&e);
            return Err(e);
        }
    };

    match action {
        CvAction::Parse => {
            flow.parse(Some(&cv)).await?;
        }
        CvAction::ParseAndEvaluate => {
            flow.parse(Some(&cv)).await?;
            let evaluation = flow.evaluate(role).await?;
            if let Some(score) = evaluation.ats_score() {
                println!("ATS score: {}", score.bold());
            }
        }
        CvAction::FullAnalysis => {
            let analysis = flow.full_analysis(Some(&cv), role).await?;
            if let Some(score) = analysis.evaluation.ats_score() {
                println!("ATS score: {}", score.bold());
            }
        }
    }
    Ok(())
}
