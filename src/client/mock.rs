//! Scripted in-memory service for tests and offline runs.

use crate::audio::buffer::AudioBlob;
use crate::client::SessionService;
use crate::client::protocol::{
    CvEvaluation, Endpoint, Evaluation, FinalReport, FullCvAnalysis, NextQuestion,
    ParsedCv, StartedInterview, Transcription, embedded_error,
};
use crate::cv::CvFile;
use crate::error::{MockviewError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// A request as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    StartInterview { role: String },
    Transcribe { mime_type: String, bytes: Vec<u8> },
    SubmitAnswer { session_id: String, answer: String },
    NextQuestion { session_id: String },
    FinalReport { session_id: String },
    ParseCv { file_name: String, bytes: Vec<u8> },
    EvaluateCv { role: String, body: String },
    FullCvAnalysis { role: String, file_name: String },
}

impl ServiceCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ServiceCall::StartInterview { .. } => Endpoint::StartInterview,
            ServiceCall::Transcribe { .. } => Endpoint::Transcribe,
            ServiceCall::SubmitAnswer { .. } => Endpoint::SubmitAnswer,
            ServiceCall::NextQuestion { .. } => Endpoint::NextQuestion,
            ServiceCall::FinalReport { .. } => Endpoint::FinalReport,
            ServiceCall::ParseCv { .. } => Endpoint::CvParse,
            ServiceCall::EvaluateCv { .. } => Endpoint::CvEvaluate,
            ServiceCall::FullCvAnalysis { .. } => Endpoint::CvFullAnalysis,
        }
    }
}

/// Failure the mock can be told to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Network(String),
    Service { status: u16, message: String },
}

impl MockFailure {
    fn into_error(self, endpoint: Endpoint) -> MockviewError {
        match self {
            MockFailure::Network(message) => MockviewError::Network {
                endpoint: endpoint.to_string(),
                message,
            },
            MockFailure::Service { status, message } => MockviewError::Service {
                endpoint: endpoint.to_string(),
                status,
                message,
            },
        }
    }
}

type Reply = std::result::Result<Value, MockFailure>;

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<Endpoint, VecDeque<Reply>>,
    calls: Vec<ServiceCall>,
}

/// Mock evaluation service.
///
/// Replies are queued per endpoint and consumed in order. An endpoint with
/// nothing queued answers with a plausible default, so a test only scripts
/// what it cares about. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockSessionService {
    state: Mutex<MockState>,
}

impl MockSessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw JSON body for `endpoint`.
    pub fn with_reply(self, endpoint: Endpoint, body: Value) -> Self {
        self.push(endpoint, Ok(body));
        self
    }

    /// Queue a failure for `endpoint`.
    pub fn with_failure(self, endpoint: Endpoint, failure: MockFailure) -> Self {
        self.push(endpoint, Err(failure));
        self
    }

    pub fn with_session(self, session_id: &str, first_question: &str) -> Self {
        self.with_reply(
            Endpoint::StartInterview,
            json!({"session_id": session_id, "question": first_question}),
        )
    }

    pub fn with_transcript(self, transcript: &str) -> Self {
        self.with_reply(Endpoint::Transcribe, json!({"transcript": transcript}))
    }

    pub fn with_question(self, question: &str) -> Self {
        self.with_reply(Endpoint::NextQuestion, json!({"question": question}))
    }

    pub fn with_completion(self) -> Self {
        self.with_reply(
            Endpoint::NextQuestion,
            json!({"message": crate::defaults::INTERVIEW_COMPLETE_MESSAGE}),
        )
    }

    /// Queue a failure on a shared handle, e.g. after a flow already holds it.
    pub fn push_failure(&self, endpoint: Endpoint, failure: MockFailure) {
        self.push(endpoint, Err(failure));
    }

    pub fn push_reply(&self, endpoint: Endpoint, body: Value) {
        self.push(endpoint, Ok(body));
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    fn push(&self, endpoint: Endpoint, reply: Reply) {
        self.lock()
            .replies
            .entry(endpoint)
            .or_default()
            .push_back(reply);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and hand out the next reply for its endpoint.
    fn respond(&self, call: ServiceCall) -> Result<Value> {
        let endpoint = call.endpoint();
        let mut state = self.lock();
        state.calls.push(call);
        let reply = state
            .replies
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(default_reply(endpoint)));
        drop(state);

        let body = reply.map_err(|failure| failure.into_error(endpoint))?;
        if let Some(message) = embedded_error(&body) {
            return Err(MockviewError::Service {
                endpoint: endpoint.to_string(),
                status: 200,
                message,
            });
        }
        Ok(body)
    }

    fn respond_typed<T: DeserializeOwned>(&self, call: ServiceCall) -> Result<T> {
        let endpoint = call.endpoint();
        let body = self.respond(call)?;
        serde_json::from_value(body).map_err(|e| MockviewError::Service {
            endpoint: endpoint.to_string(),
            status: 200,
            message: format!("malformed response: {e}"),
        })
    }
}

fn default_reply(endpoint: Endpoint) -> Value {
    match endpoint {
        Endpoint::StartInterview => {
            json!({"session_id": "mock-session", "question": "Tell me about yourself."})
        }
        Endpoint::Transcribe => json!({"transcript": "mock transcription"}),
        Endpoint::SubmitAnswer => json!({
            "evaluation": {"score": 50, "strengths": [], "weaknesses": []},
            "next_action": {"action": "next", "question": ""}
        }),
        Endpoint::NextQuestion => json!({"message": crate::defaults::INTERVIEW_COMPLETE_MESSAGE}),
        Endpoint::FinalReport => json!({"overall_score": 50}),
        Endpoint::CvParse => json!({"personal_info": {"name": ""}, "skills": []}),
        Endpoint::CvEvaluate => json!({"ats": {"ats_score": 50}}),
        Endpoint::CvFullAnalysis => json!({
            "parsed": {"skills": []},
            "evaluation": {"ats": {"ats_score": 50}}
        }),
    }
}

#[async_trait]
impl SessionService for MockSessionService {
    async fn start_interview(&self, role: &str) -> Result<StartedInterview> {
        self.respond_typed(ServiceCall::StartInterview {
            role: role.to_string(),
        })
    }

    async fn transcribe(&self, audio: &AudioBlob) -> Result<String> {
        let transcription: Transcription = self.respond_typed(ServiceCall::Transcribe {
            mime_type: audio.mime_type().to_string(),
            bytes: audio.bytes().to_vec(),
        })?;
        Ok(transcription.transcript)
    }

    async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<Evaluation> {
        self.respond(ServiceCall::SubmitAnswer {
            session_id: session_id.to_string(),
            answer: answer.to_string(),
        })
        .map(Evaluation::new)
    }

    async fn next_question(&self, session_id: &str) -> Result<NextQuestion> {
        let body = self.respond(ServiceCall::NextQuestion {
            session_id: session_id.to_string(),
        })?;
        NextQuestion::from_wire(&body).ok_or_else(|| MockviewError::Service {
            endpoint: Endpoint::NextQuestion.to_string(),
            status: 200,
            message: "malformed response: neither a question nor a completion message"
                .to_string(),
        })
    }

    async fn final_report(&self, session_id: &str) -> Result<FinalReport> {
        self.respond(ServiceCall::FinalReport {
            session_id: session_id.to_string(),
        })
        .map(FinalReport::new)
    }

    async fn parse_cv(&self, file: &CvFile) -> Result<ParsedCv> {
        self.respond(ServiceCall::ParseCv {
            file_name: file.file_name.clone(),
            bytes: file.bytes.clone(),
        })
        .map(ParsedCv::from_json)
    }

    async fn evaluate_cv(&self, role: &str, parsed: &ParsedCv) -> Result<CvEvaluation> {
        self.respond(ServiceCall::EvaluateCv {
            role: role.to_string(),
            body: parsed.raw().to_string(),
        })
        .map(CvEvaluation::new)
    }

    async fn full_cv_analysis(&self, role: &str, file: &CvFile) -> Result<FullCvAnalysis> {
        self.respond_typed(ServiceCall::FullCvAnalysis {
            role: role.to_string(),
            file_name: file.file_name.clone(),
        })
    }
}
