//! Wire types for the evaluation service.
//!
//! Payloads the service leaves unstructured (evaluations, reports, parsed
//! CVs) are kept as JSON with a few typed readers on top.

use crate::defaults::INTERVIEW_COMPLETE_MESSAGE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One server operation. Every endpoint is a `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    StartInterview,
    Transcribe,
    SubmitAnswer,
    NextQuestion,
    FinalReport,
    CvParse,
    CvEvaluate,
    CvFullAnalysis,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::StartInterview,
        Endpoint::Transcribe,
        Endpoint::SubmitAnswer,
        Endpoint::NextQuestion,
        Endpoint::FinalReport,
        Endpoint::CvParse,
        Endpoint::CvEvaluate,
        Endpoint::CvFullAnalysis,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::StartInterview => "start-interview",
            Endpoint::Transcribe => "transcribe",
            Endpoint::SubmitAnswer => "submit-answer",
            Endpoint::NextQuestion => "get-next-question",
            Endpoint::FinalReport => "final-report",
            Endpoint::CvParse => "cv-parse",
            Endpoint::CvEvaluate => "cv-evaluate",
            Endpoint::CvFullAnalysis => "cv-full-analysis",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

/// Response of `start-interview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedInterview {
    pub session_id: String,
    pub question: String,
}

/// Response of `transcribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    pub transcript: String,
}

/// Outcome of `get-next-question`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextQuestion {
    Question(String),
    Complete,
}

impl NextQuestion {
    /// Decode the legacy wire shape: `{"question": ..}` or `{"message": "Interview complete"}`.
    ///
    /// Returns `None` for anything else.
    pub fn from_wire(body: &Value) -> Option<Self> {
        if let Some(question) = body.get("question").and_then(Value::as_str) {
            return Some(NextQuestion::Question(question.to_string()));
        }
        match body.get("message").and_then(Value::as_str) {
            Some(message) if message.trim() == INTERVIEW_COMPLETE_MESSAGE => {
                Some(NextQuestion::Complete)
            }
            _ => None,
        }
    }
}

/// Interviewer's hint for what comes after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextActionKind {
    FollowUp,
    Clarify,
    Next,
    Challenge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    #[serde(rename = "action")]
    pub kind: NextActionKind,
    #[serde(default)]
    pub question: Option<String>,
}

/// Feedback for one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evaluation(Value);

impl Evaluation {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    /// Numeric score, read from the nested `evaluation` object when present.
    pub fn score(&self) -> Option<f64> {
        self.0
            .get("evaluation")
            .and_then(|e| e.get("score"))
            .or_else(|| self.0.get("score"))
            .and_then(Value::as_f64)
    }

    pub fn next_action(&self) -> Option<NextAction> {
        let hint = self.0.get("next_action")?;
        serde_json::from_value(hint.clone()).ok()
    }
}

/// Aggregate report for a finished interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalReport(Value);

impl FinalReport {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn overall_score(&self) -> Option<f64> {
        self.0.get("overall_score").and_then(Value::as_f64)
    }
}

/// Structured CV as returned by `cv-parse`.
///
/// The exact response text is kept so it can be sent back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCv {
    raw: String,
    value: Value,
}

impl ParsedCv {
    /// Parse the response text of `cv-parse`.
    pub fn from_raw(raw: impl Into<String>) -> serde_json::Result<Self> {
        let raw = raw.into();
        let value = serde_json::from_str(&raw)?;
        Ok(Self { raw, value })
    }

    pub fn from_json(value: Value) -> Self {
        Self {
            raw: value.to_string(),
            value,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn as_json(&self) -> &Value {
        &self.value
    }

    pub fn candidate_name(&self) -> Option<&str> {
        self.value
            .get("personal_info")
            .and_then(|info| info.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// ATS and role-fit feedback for a CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CvEvaluation(Value);

impl CvEvaluation {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn ats_score(&self) -> Option<f64> {
        self.0.pointer("/ats/ats_score").and_then(Value::as_f64)
    }

    pub fn role_fit_score(&self) -> Option<f64> {
        self.0.pointer("/role_fit/score").and_then(Value::as_f64)
    }
}

/// Response of `cv-full-analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullCvAnalysis {
    pub parsed: Value,
    pub evaluation: CvEvaluation,
}

impl FullCvAnalysis {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "parsed": self.parsed,
            "evaluation": self.evaluation.as_json(),
        })
    }
}

/// Error text from a failed response body.
///
/// Looks at `detail`, `error` and `message` in a JSON body, then falls back
/// to the raw text.
pub fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(message) = ["detail", "error", "message"]
            .iter()
            .find_map(|key| value.get(*key).map(describe))
    {
        return Some(message);
    }

    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The legacy service reports some failures as `200 {"error": "..."}`.
pub fn embedded_error(body: &Value) -> Option<String> {
    body.get("error").map(describe)
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
