//! Terminal rendering of view intents.

use crate::view::{Control, Field, JsonTarget, Section, View};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Clear the current terminal line (replaces the recording indicator etc.)
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Pretty-print a JSON document, falling back to compact form.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Key hint for each control.
///
/// Starting the interview and the CV actions come from command-line
/// arguments, so they have no key.
fn control_hint(control: Control) -> Option<&'static str> {
    match control {
        Control::StartRecording => Some("[Enter] record"),
        Control::StopRecording => Some("[Enter] stop"),
        Control::Submit => Some("[s] submit"),
        Control::NextQuestion => Some("[n] next question"),
        Control::FinalReport => Some("[n] final report"),
        Control::StartInterview
        | Control::ParseCv
        | Control::EvaluateCv
        | Control::FullAnalysis => None,
    }
}

const CONTROL_ORDER: [Control; 9] = [
    Control::StartInterview,
    Control::StartRecording,
    Control::StopRecording,
    Control::Submit,
    Control::NextQuestion,
    Control::FinalReport,
    Control::ParseCv,
    Control::EvaluateCv,
    Control::FullAnalysis,
];

struct TerminalState {
    out: Box<dyn Write + Send>,
    enabled: HashSet<Control>,
}

/// [`View`] that writes to a terminal.
///
/// Sections become headings, text fields become labelled lines and JSON
/// documents are pretty-printed. Hiding a section is a no-op.
pub struct TerminalView {
    state: Mutex<TerminalState>,
    color: bool,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                out,
                enabled: HashSet::new(),
            }),
            color,
        }
    }

    /// Write to stdout, with color when stdout is a terminal.
    pub fn stdout() -> Self {
        use std::io::IsTerminal;
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self::new(Box::new(io::stdout()), color)
    }

    /// Hints for the controls that are currently enabled, e.g. `[Enter] record  [q] quit`.
    pub fn hints(&self) -> String {
        let state = self.lock();
        let mut hints: Vec<&str> = CONTROL_ORDER
            .iter()
            .filter(|control| state.enabled.contains(control))
            .filter_map(|control| control_hint(*control))
            .collect();
        hints.push("[q] quit");
        hints.join("  ")
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        self.lock().enabled.contains(&control)
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn write_line(&self, line: &str) {
        let mut state = self.lock();
        // A closed stdout is not worth failing a flow over.
        writeln!(state.out, "{line}").ok();
        state.out.flush().ok();
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl View for TerminalView {
    fn show_section(&self, section: Section) {
        let title = match section {
            Section::ModeSelection => "Choose a mode: interview or cv",
            Section::RoleSelection => "Choose a role",
            Section::Interview => "Interview",
            Section::Evaluation => "Evaluation",
            Section::FinalReport => "Final report",
            Section::Cv => "CV analysis",
        };
        self.write_line(&self.paint(BOLD, &format!("== {title} ==")));
    }

    fn hide_section(&self, _section: Section) {}

    fn set_text(&self, field: Field, value: &str) {
        if value.is_empty() {
            return;
        }
        let line = match field {
            Field::Question => format!("{} {}", self.paint(CYAN, "Question:"), value),
            Field::Transcript => format!("{} {}", self.paint(DIM, "You said:"), value),
            Field::Status => self.paint(GREEN, value),
            Field::Error => self.paint(RED, &format!("Error: {value}")),
        };
        self.write_line(&line);
    }

    fn set_enabled(&self, control: Control, enabled: bool) {
        let mut state = self.lock();
        if enabled {
            state.enabled.insert(control);
        } else {
            state.enabled.remove(&control);
        }
    }

    fn render_json(&self, target: JsonTarget, value: &Value) {
        self.write_line(&self.paint(DIM, &format!("-- {target} --")));
        self.write_line(&format_json(value));
    }
}
