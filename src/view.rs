//! View capability: the intents the flows issue to whatever renders them.
//!
//! The flows never read anything back from the view.

use crate::error::MockviewError;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    ModeSelection,
    RoleSelection,
    Interview,
    Evaluation,
    FinalReport,
    Cv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Question,
    Transcript,
    Status,
    Error,
}

/// Controls a renderer can offer. Each one is disabled while the request it
/// triggered is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    StartInterview,
    StartRecording,
    StopRecording,
    Submit,
    NextQuestion,
    FinalReport,
    ParseCv,
    EvaluateCv,
    FullAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonTarget {
    Evaluation,
    FinalReport,
    CvOutput,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::ModeSelection => "mode selection",
            Section::RoleSelection => "role selection",
            Section::Interview => "interview",
            Section::Evaluation => "evaluation",
            Section::FinalReport => "final report",
            Section::Cv => "CV analysis",
        };
        f.write_str(name)
    }
}

impl fmt::Display for JsonTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonTarget::Evaluation => "Evaluation",
            JsonTarget::FinalReport => "Final report",
            JsonTarget::CvOutput => "CV analysis",
        };
        f.write_str(name)
    }
}

/// Trait for rendering flow state.
///
/// Methods take `&self` so one view can be shared by the mode selector and
/// whichever flow is active.
pub trait View: Send + Sync {
    fn show_section(&self, section: Section);

    fn hide_section(&self, section: Section);

    fn set_text(&self, field: Field, value: &str);

    fn set_enabled(&self, control: Control, enabled: bool);

    fn render_json(&self, target: JsonTarget, value: &Value);

    /// Surface a failure to the user.
    fn show_error(&self, error: &MockviewError) {
        self.set_text(Field::Error, &error.user_message());
    }
}

/// One call made against a [`View`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewIntent {
    Show(Section),
    Hide(Section),
    SetText(Field, String),
    SetEnabled(Control, bool),
    RenderJson(JsonTarget, Value),
}

/// View that records every intent in order.
///
/// Clones share the same log, so a test can keep a handle after handing
/// the view to a flow.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    intents: Arc<Mutex<Vec<ViewIntent>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intents(&self) -> Vec<ViewIntent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether `section` is visible after replaying every intent.
    pub fn is_visible(&self, section: Section) -> bool {
        self.lock()
            .iter()
            .rev()
            .find_map(|intent| match intent {
                ViewIntent::Show(s) if *s == section => Some(true),
                ViewIntent::Hide(s) if *s == section => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn is_enabled(&self, control: Control) -> Option<bool> {
        self.lock().iter().rev().find_map(|intent| match intent {
            ViewIntent::SetEnabled(c, enabled) if *c == control => Some(*enabled),
            _ => None,
        })
    }

    /// Latest text set on `field`.
    pub fn text(&self, field: Field) -> Option<String> {
        self.lock().iter().rev().find_map(|intent| match intent {
            ViewIntent::SetText(f, value) if *f == field => Some(value.clone()),
            _ => None,
        })
    }

    pub fn json(&self, target: JsonTarget) -> Option<Value> {
        self.lock().iter().rev().find_map(|intent| match intent {
            ViewIntent::RenderJson(t, value) if *t == target => Some(value.clone()),
            _ => None,
        })
    }

    fn push(&self, intent: ViewIntent) {
        self.lock().push(intent);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ViewIntent>> {
        self.intents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl View for RecordingView {
    fn show_section(&self, section: Section) {
        self.push(ViewIntent::Show(section));
    }

    fn hide_section(&self, section: Section) {
        self.push(ViewIntent::Hide(section));
    }

    fn set_text(&self, field: Field, value: &str) {
        self.push(ViewIntent::SetText(field, value.to_string()));
    }

    fn set_enabled(&self, control: Control, enabled: bool) {
        self.push(ViewIntent::SetEnabled(control, enabled));
    }

    fn render_json(&self, target: JsonTarget, value: &Value) {
        self.push(ViewIntent::RenderJson(target, value.clone()));
    }
}
