//! Top-level mode selection between the interview and CV flows.

use crate::audio::controller::AudioCapture;
use crate::client::SessionService;
use crate::cv::CvFlow;
use crate::error::{MockviewError, Result};
use crate::interview::InterviewFlow;
use crate::view::{Section, View};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interview,
    Cv,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Interview => write!(f, "interview"),
            Mode::Cv => write!(f, "cv"),
        }
    }
}

impl FromStr for Mode {
    type Err = MockviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interview" => Ok(Mode::Interview),
            "cv" | "resume" => Ok(Mode::Cv),
            other => Err(MockviewError::Other(format!(
                "Unknown mode '{other}'. Use 'interview' or 'cv'."
            ))),
        }
    }
}

/// The flow a selector has activated.
pub enum ActiveFlow {
    Unselected,
    Interview(InterviewFlow),
    Cv(CvFlow),
}

impl ActiveFlow {
    pub fn mode(&self) -> Option<Mode> {
        match self {
            ActiveFlow::Unselected => None,
            ActiveFlow::Interview(_) => Some(Mode::Interview),
            ActiveFlow::Cv(_) => Some(Mode::Cv),
        }
    }
}

/// Picks exactly one flow per run.
///
/// Once a mode is chosen, choosing again is rejected until [`ModeSelector::reset`].
pub struct ModeSelector {
    service: Arc<dyn SessionService>,
    view: Arc<dyn View>,
    /// Held while no interview owns it.
    capture: Option<AudioCapture>,
    mime_type: String,
    active: ActiveFlow,
}

impl ModeSelector {
    pub fn new(service: Arc<dyn SessionService>, view: Arc<dyn View>) -> Self {
        Self {
            service,
            view,
            capture: None,
            mime_type: crate::defaults::AUDIO_MIME_TYPE.to_string(),
            active: ActiveFlow::Unselected,
        }
    }

    /// Audio capture for interviews, and the media type its takes are sent as.
    pub fn with_capture(mut self, capture: AudioCapture, mime_type: impl Into<String>) -> Self {
        self.capture = Some(capture);
        self.mime_type = mime_type.into();
        self
    }

    /// Show the mode choice.
    pub fn open(&self) {
        self.view.show_section(Section::ModeSelection);
    }

    pub fn mode(&self) -> Option<Mode> {
        self.active.mode()
    }

    pub fn active(&self) -> &ActiveFlow {
        &self.active
    }

    pub fn select_mode(&mut self, mode: Mode) -> Result<()> {
        if let Some(current) = self.active.mode() {
            let error = MockviewError::invalid_state(
                format!("switch to {mode} mode"),
                format!("{current} mode is active"),
            );
            self.view.show_error(&error);
            return Err(error);
        }

        self.active = match mode {
            Mode::Interview => {
                let Some(capture) = self.capture.take() else {
                    let error = MockviewError::DeviceUnavailable {
                        message: "no audio source is configured".to_string(),
                    };
                    self.view.show_error(&error);
                    return Err(error);
                };
                let mut flow = InterviewFlow::new(
                    self.service.clone(),
                    self.view.clone(),
                    capture,
                    self.mime_type.clone(),
                );
                flow.activate()?;
                ActiveFlow::Interview(flow)
            }
            Mode::Cv => {
                let flow = CvFlow::new(self.service.clone(), self.view.clone());
                flow.activate();
                ActiveFlow::Cv(flow)
            }
        };

        self.view.hide_section(Section::ModeSelection);
        info!("Selected {} mode", mode);
        Ok(())
    }

    pub fn interview(&mut self) -> Result<&mut InterviewFlow> {
        match &mut self.active {
            ActiveFlow::Interview(flow) => Ok(flow),
            other => Err(MockviewError::invalid_state(
                "use the interview",
                describe(other.mode()),
            )),
        }
    }

    pub fn cv(&mut self) -> Result<&mut CvFlow> {
        match &mut self.active {
            ActiveFlow::Cv(flow) => Ok(flow),
            other => Err(MockviewError::invalid_state(
                "use CV analysis",
                describe(other.mode()),
            )),
        }
    }

    /// Drop the active flow and show the mode choice again.
    pub fn reset(&mut self) {
        match std::mem::replace(&mut self.active, ActiveFlow::Unselected) {
            ActiveFlow::Interview(flow) => {
                self.capture = Some(flow.into_capture());
                for section in [
                    Section::RoleSelection,
                    Section::Interview,
                    Section::Evaluation,
                    Section::FinalReport,
                ] {
                    self.view.hide_section(section);
                }
            }
            ActiveFlow::Cv(_) => self.view.hide_section(Section::Cv),
            ActiveFlow::Unselected => {}
        }
        self.view.show_section(Section::ModeSelection);
    }
}

fn describe(mode: Option<Mode>) -> String {
    match mode {
        Some(mode) => format!("{mode} mode is active"),
        None => "no mode is selected".to_string(),
    }
}
