//! Interview flow state machine.
//!
//! ```text
//! Idle -> RoleSelect -> Questioning -> Recording -> ReadyToSubmit
//!   -> Evaluating -> ShowingEvaluation -> Questioning | Finishing -> Done
//! ```
//!
//! A failed operation reports the error through the view and leaves the
//! flow in the phase it was in before the call.

use crate::audio::buffer::AudioBlob;
use crate::audio::controller::AudioCapture;
use crate::client::SessionService;
use crate::client::protocol::{Evaluation, FinalReport, NextQuestion};
use crate::error::{MockviewError, Result};
use crate::interview::session::{InterviewPhase, Session, SessionStatus};
use crate::view::{Control, Field, JsonTarget, Section, View};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What `next_question` led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// A new question is showing.
    Question(String),
    /// No questions left; call [`InterviewFlow::finish`] for the report.
    Finishing,
}

pub struct InterviewFlow {
    service: Arc<dyn SessionService>,
    view: Arc<dyn View>,
    capture: AudioCapture,
    mime_type: String,
    phase: InterviewPhase,
    session: Option<Session>,
    /// Drained take whose transcription has not succeeded yet.
    pending_take: Option<AudioBlob>,
    transcript: Option<String>,
    evaluation: Option<Evaluation>,
    report: Option<FinalReport>,
}

impl InterviewFlow {
    pub fn new(
        service: Arc<dyn SessionService>,
        view: Arc<dyn View>,
        capture: AudioCapture,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            service,
            view,
            capture,
            mime_type: mime_type.into(),
            phase: InterviewPhase::Idle,
            session: None,
            pending_take: None,
            transcript: None,
            evaluation: None,
            report: None,
        }
    }

    pub fn phase(&self) -> InterviewPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Transcript of the current answer, kept even when submitting it failed.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn report(&self) -> Option<&FinalReport> {
        self.report.as_ref()
    }

    pub fn capture(&self) -> &AudioCapture {
        &self.capture
    }

    pub fn is_done(&self) -> bool {
        self.phase == InterviewPhase::Done
    }

    /// Hand the capture controller back, dropping any take in progress.
    pub fn into_capture(mut self) -> AudioCapture {
        self.capture.discard();
        self.capture
    }

    /// Open the role selection.
    pub fn activate(&mut self) -> Result<()> {
        self.require("open the interview", &[InterviewPhase::Idle])?;
        self.phase = InterviewPhase::RoleSelect;
        self.view.show_section(Section::RoleSelection);
        self.view.set_enabled(Control::StartInterview, true);
        Ok(())
    }

    /// Open a session for `role` and show its first question.
    ///
    /// A session starts once, so the start control stays disabled after
    /// success.
    pub async fn start_interview(&mut self, role: &str) -> Result<&Session> {
        self.require("start an interview", &[InterviewPhase::RoleSelect])?;
        let role = role.trim();
        if role.is_empty() {
            return Err(self.fail(MockviewError::PrerequisiteMissing {
                message: "Choose a role first!".to_string(),
            }));
        }

        self.view.set_enabled(Control::StartInterview, false);
        let started = match self.service.start_interview(role).await {
            Ok(started) => started,
            Err(e) => {
                self.view.set_enabled(Control::StartInterview, true);
                return Err(self.fail(e));
            }
        };
        info!(
            "Interview {} started for role {}",
            started.session_id, role
        );

        self.phase = InterviewPhase::Questioning;
        self.view.hide_section(Section::RoleSelection);
        self.view.show_section(Section::Interview);
        self.view.set_text(Field::Question, &started.question);
        self.view.set_text(Field::Transcript, "");
        self.set_controls(true, false, false, false);

        Ok(self.session.insert(Session::new(
            started.session_id,
            role.to_string(),
            started.question,
        )))
    }

    /// Begin a take. From `ReadyToSubmit` this replaces the pending answer.
    pub fn start_recording(&mut self) -> Result<()> {
        self.require(
            "start recording",
            &[InterviewPhase::Questioning, InterviewPhase::ReadyToSubmit],
        )?;

        self.view.set_enabled(Control::StartRecording, false);
        if let Err(e) = self.capture.start() {
            self.view.set_enabled(Control::StartRecording, true);
            return Err(self.fail(e));
        }

        self.pending_take = None;
        self.transcript = None;
        self.phase = InterviewPhase::Recording;
        self.view.set_text(Field::Transcript, "");
        self.set_controls(false, true, false, false);
        debug!("Recording answer");
        Ok(())
    }

    /// Collect fragments emitted so far. A no-op outside `Recording`.
    pub fn pump_audio(&mut self) -> Result<usize> {
        if self.phase != InterviewPhase::Recording {
            return Ok(0);
        }
        self.capture.pump()
    }

    /// Finish the take and release the device.
    ///
    /// If the device fails to finalize, the take is dropped and the flow
    /// goes back to `Questioning`.
    pub fn stop_recording(&mut self) -> Result<usize> {
        self.require("stop recording", &[InterviewPhase::Recording])?;

        self.view.set_enabled(Control::StopRecording, false);
        match self.capture.stop() {
            Ok(fragments) => {
                self.phase = InterviewPhase::ReadyToSubmit;
                self.set_controls(true, false, true, false);
                debug!("Recorded {} fragments", fragments);
                Ok(fragments)
            }
            Err(e) => {
                self.capture.discard();
                self.phase = InterviewPhase::Questioning;
                self.set_controls(true, false, false, false);
                Err(self.fail(e))
            }
        }
    }

    /// Transcribe the take, submit the transcript and show the evaluation.
    ///
    /// On failure the flow stays in `ReadyToSubmit`. A take whose
    /// transcription failed is kept for the retry, and a transcript whose
    /// submission failed is reused without transcribing again.
    pub async fn submit_answer(&mut self) -> Result<&Evaluation> {
        self.require("submit an answer", &[InterviewPhase::ReadyToSubmit])?;
        let session_id = self.session_id()?;

        self.phase = InterviewPhase::Evaluating;
        self.set_status(SessionStatus::Evaluating);
        self.set_controls(false, false, false, false);

        match self.transcribe_and_submit(&session_id).await {
            Ok(evaluation) => {
                if let Some(score) = evaluation.score() {
                    info!("Answer scored {}", score);
                }
                self.phase = InterviewPhase::ShowingEvaluation;
                self.set_status(SessionStatus::AwaitingNext);
                self.view.show_section(Section::Evaluation);
                self.view
                    .render_json(JsonTarget::Evaluation, evaluation.as_json());
                self.set_controls(false, false, false, true);
                Ok(self.evaluation.insert(evaluation))
            }
            Err(e) => {
                self.phase = InterviewPhase::ReadyToSubmit;
                self.set_status(SessionStatus::AwaitingAnswer);
                self.set_controls(true, false, true, false);
                Err(self.fail(e))
            }
        }
    }

    async fn transcribe_and_submit(&mut self, session_id: &str) -> Result<Evaluation> {
        let transcript = match self.transcript.clone() {
            Some(transcript) => transcript,
            None => {
                let take = self.take_answer()?;
                let transcript = match self.service.transcribe(&take).await {
                    Ok(transcript) => transcript,
                    Err(e) => {
                        self.pending_take = Some(take);
                        return Err(e);
                    }
                };
                self.view.set_text(Field::Transcript, &transcript);
                self.transcript.insert(transcript).clone()
            }
        };

        self.service.submit_answer(session_id, &transcript).await
    }

    fn take_answer(&mut self) -> Result<AudioBlob> {
        if let Some(take) = self.pending_take.take() {
            return Ok(take);
        }
        if self.capture.buffer().is_empty() {
            return Err(MockviewError::PrerequisiteMissing {
                message: "Nothing was recorded. Record your answer first!".to_string(),
            });
        }
        self.capture.drain_as_blob(&self.mime_type)
    }

    /// Ask for the next question, or learn that the interview is over.
    pub async fn next_question(&mut self) -> Result<NextStep> {
        self.require(
            "move to the next question",
            &[InterviewPhase::ShowingEvaluation],
        )?;
        let session_id = self.session_id()?;

        self.view.set_enabled(Control::NextQuestion, false);
        let next = match self.service.next_question(&session_id).await {
            Ok(next) => next,
            Err(e) => {
                self.view.set_enabled(Control::NextQuestion, true);
                return Err(self.fail(e));
            }
        };

        match next {
            NextQuestion::Question(text) => {
                self.evaluation = None;
                self.transcript = None;
                self.pending_take = None;
                self.capture.discard();
                if let Some(session) = self.session.as_mut() {
                    session.advance(text.clone());
                    info!("Question {}", session.question.ordinal);
                }
                self.phase = InterviewPhase::Questioning;
                self.view.hide_section(Section::Evaluation);
                self.view.set_text(Field::Transcript, "");
                self.view.set_text(Field::Question, &text);
                self.set_controls(true, false, false, false);
                Ok(NextStep::Question(text))
            }
            NextQuestion::Complete => {
                info!("No questions left, finishing interview {}", session_id);
                self.evaluation = None;
                self.phase = InterviewPhase::Finishing;
                self.view.hide_section(Section::Evaluation);
                self.view.set_text(Field::Status, "Interview complete");
                self.set_controls(false, false, false, false);
                self.view.set_enabled(Control::FinalReport, true);
                Ok(NextStep::Finishing)
            }
        }
    }

    /// Fetch the final report. A failed fetch can be retried.
    pub async fn finish(&mut self) -> Result<&FinalReport> {
        self.require("fetch the final report", &[InterviewPhase::Finishing])?;
        let session_id = self.session_id()?;

        self.view.set_enabled(Control::FinalReport, false);
        let report = match self.service.final_report(&session_id).await {
            Ok(report) => report,
            Err(e) => {
                self.view.set_enabled(Control::FinalReport, true);
                return Err(self.fail(e));
            }
        };
        if let Some(score) = report.overall_score() {
            info!("Interview {} finished with overall score {}", session_id, score);
        }

        self.phase = InterviewPhase::Done;
        self.set_status(SessionStatus::Complete);
        self.view.hide_section(Section::Interview);
        self.view.hide_section(Section::Evaluation);
        self.view.show_section(Section::FinalReport);
        self.view
            .render_json(JsonTarget::FinalReport, report.as_json());
        self.set_controls(false, false, false, false);
        Ok(self.report.insert(report))
    }

    fn require(&self, operation: &str, allowed: &[InterviewPhase]) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(self.fail(MockviewError::invalid_state(operation, self.phase)))
        }
    }

    fn session_id(&self) -> Result<String> {
        self.session
            .as_ref()
            .map(|session| session.id.clone())
            .ok_or_else(|| self.fail(MockviewError::invalid_state("continue", self.phase)))
    }

    fn set_status(&mut self, status: SessionStatus) {
        if let Some(session) = self.session.as_mut() {
            session.status = status;
        }
    }

    fn set_controls(&self, start: bool, stop: bool, submit: bool, next: bool) {
        self.view.set_enabled(Control::StartRecording, start);
        self.view.set_enabled(Control::StopRecording, stop);
        self.view.set_enabled(Control::Submit, submit);
        self.view.set_enabled(Control::NextQuestion, next);
    }

    fn fail(&self, error: MockviewError) -> MockviewError {
        warn!("Interview flow: {}", error);
        self.view.show_error(&error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recorder::MockAudioSource;
    use crate::client::mock::{MockFailure, MockSessionService, ServiceCall};
    use crate::client::protocol::Endpoint;
    use crate::view::{RecordingView, ViewIntent};
    use serde_json::json;

    struct Fixture {
        flow: InterviewFlow,
        service: Arc<MockSessionService>,
        view: RecordingView,
        mic: MockAudioSource,
    }

    fn fixture(service: MockSessionService) -> Fixture {
        let service = Arc::new(service);
        let view = RecordingView::new();
        let mic = MockAudioSource::new().with_fragments([&b"frag-a"[..], &b"frag-b"[..]]);
        let flow = InterviewFlow::new(
            service.clone(),
            Arc::new(view.clone()),
            AudioCapture::new(Box::new(mic.clone())),
            "audio/webm",
        );
        Fixture {
            flow,
            service,
            view,
            mic,
        }
    }

    async fn ready_to_submit(service: MockSessionService) -> Fixture {
        let mut fx = fixture(service);
        fx.flow.activate().unwrap();
        fx.flow.start_interview("backend").await.unwrap();
        fx.flow.start_recording().unwrap();
        fx.flow.stop_recording().unwrap();
        fx
    }

    async fn showing_evaluation(service: MockSessionService) -> Fixture {
        let mut fx = ready_to_submit(service).await;
        fx.flow.submit_answer().await.unwrap();
        fx
    }

    #[tokio::test]
    async fn test_start_interview_creates_session_and_shows_question() {
        let mut fx = fixture(MockSessionService::new().with_session("s-1", "Q1"));
        fx.flow.activate().unwrap();

        let session = fx.flow.start_interview("backend").await.unwrap();

        assert_eq!(session.id, "s-1");
        assert_eq!(session.question.text, "Q1");
        assert_eq!(session.status, SessionStatus::AwaitingAnswer);
        assert_eq!(fx.flow.phase(), InterviewPhase::Questioning);
        assert_eq!(fx.view.text(Field::Question).as_deref(), Some("Q1"));
        assert!(fx.view.is_visible(Section::Interview));
        assert!(!fx.view.is_visible(Section::RoleSelection));
        assert_eq!(fx.view.is_enabled(Control::StartRecording), Some(true));
        assert_eq!(fx.view.is_enabled(Control::StopRecording), Some(false));
    }

    #[tokio::test]
    async fn test_start_interview_before_activation_is_invalid_state() {
        let mut fx = fixture(MockSessionService::new());

        assert!(matches!(
            fx.flow.start_interview("backend").await,
            Err(MockviewError::InvalidState { .. })
        ));
        assert!(fx.service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_start_interview_stays_in_role_select() {
        let mut fx = fixture(
            MockSessionService::new().with_reply(Endpoint::StartInterview, json!({"error": "Invalid role"})),
        );
        fx.flow.activate().unwrap();

        let err = fx.flow.start_interview("astronaut").await.unwrap_err();

        assert!(matches!(err, MockviewError::Service { .. }));
        assert_eq!(fx.flow.phase(), InterviewPhase::RoleSelect);
        assert_eq!(fx.view.is_enabled(Control::StartInterview), Some(true));
        assert!(fx.flow.session().is_none());
        assert_eq!(
            fx.view.text(Field::Error).as_deref(),
            Some("The service said: Invalid role")
        );
    }

    #[tokio::test]
    async fn test_start_control_is_disabled_while_starting() {
        let mut fx = fixture(MockSessionService::new());
        fx.flow.activate().unwrap();
        assert_eq!(fx.view.is_enabled(Control::StartInterview), Some(true));
        fx.view.clear();

        fx.flow.start_interview("backend").await.unwrap();

        assert_eq!(
            fx.view.intents().first(),
            Some(&ViewIntent::SetEnabled(Control::StartInterview, false))
        );
        assert_eq!(fx.view.is_enabled(Control::StartInterview), Some(false));
    }

    #[tokio::test]
    async fn test_empty_role_is_rejected_before_network() {
        let mut fx = fixture(MockSessionService::new());
        fx.flow.activate().unwrap();

        assert!(matches!(
            fx.flow.start_interview("  ").await,
            Err(MockviewError::PrerequisiteMissing { .. })
        ));
        assert!(fx.service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_recording_toggles_controls_and_releases_device() {
        let mut fx = fixture(MockSessionService::new());
        fx.flow.activate().unwrap();
        fx.flow.start_interview("backend").await.unwrap();

        fx.flow.start_recording().unwrap();
        assert!(fx.mic.is_open());
        assert_eq!(fx.view.is_enabled(Control::StartRecording), Some(false));
        assert_eq!(fx.view.is_enabled(Control::StopRecording), Some(true));

        assert_eq!(fx.flow.stop_recording().unwrap(), 2);
        assert!(!fx.mic.is_open());
        assert_eq!(fx.flow.phase(), InterviewPhase::ReadyToSubmit);
        assert_eq!(fx.view.is_enabled(Control::StartRecording), Some(true));
        assert_eq!(fx.view.is_enabled(Control::StopRecording), Some(false));
        assert_eq!(fx.view.is_enabled(Control::Submit), Some(true));
    }

    #[tokio::test]
    async fn test_device_denied_keeps_questioning() {
        let mut fx = fixture(MockSessionService::new());
        fx.flow.activate().unwrap();
        fx.flow.start_interview("backend").await.unwrap();
        fx.mic.set_start_failure(Some("permission denied"));

        let err = fx.flow.start_recording().unwrap_err();

        assert!(matches!(err, MockviewError::DeviceUnavailable { .. }));
        assert_eq!(fx.flow.phase(), InterviewPhase::Questioning);
        assert_eq!(fx.view.is_enabled(Control::StartRecording), Some(true));
        assert!(fx.view.text(Field::Error).unwrap().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_read_failure_on_stop_drops_the_take() {
        let mut fx = fixture(MockSessionService::new());
        fx.flow.activate().unwrap();
        fx.flow.start_interview("backend").await.unwrap();
        fx.flow.start_recording().unwrap();
        fx.mic.fail_next_read("stream overrun");

        let err = fx.flow.stop_recording().unwrap_err();

        assert!(matches!(err, MockviewError::Audio { .. }));
        assert_eq!(fx.flow.phase(), InterviewPhase::Questioning);
        assert!(fx.flow.capture().buffer().is_empty());
        assert!(!fx.mic.is_open());
        assert_eq!(fx.view.is_enabled(Control::Submit), Some(false));
        assert!(fx.view.text(Field::Error).unwrap().contains("stream overrun"));
    }

    #[tokio::test]
    async fn test_stop_without_recording_is_invalid_state() {
        let mut fx = fixture(MockSessionService::new());
        fx.flow.activate().unwrap();
        fx.flow.start_interview("backend").await.unwrap();

        assert!(matches!(
            fx.flow.stop_recording(),
            Err(MockviewError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_sends_drained_take_and_transcript() {
        let mut fx = ready_to_submit(
            MockSessionService::new()
                .with_session("s-1", "Q1")
                .with_transcript("hello"),
        )
        .await;

        let evaluation = fx.flow.submit_answer().await.unwrap().clone();

        let calls = fx.service.calls();
        assert_eq!(
            calls[1],
            ServiceCall::Transcribe {
                mime_type: "audio/webm".to_string(),
                bytes: b"frag-afrag-b".to_vec(),
            }
        );
        assert_eq!(
            calls[2],
            ServiceCall::SubmitAnswer {
                session_id: "s-1".to_string(),
                answer: "hello".to_string(),
            }
        );
        assert_eq!(fx.flow.phase(), InterviewPhase::ShowingEvaluation);
        assert_eq!(fx.flow.session().unwrap().status, SessionStatus::AwaitingNext);
        assert_eq!(fx.view.text(Field::Transcript).as_deref(), Some("hello"));
        assert_eq!(
            fx.view.json(JsonTarget::Evaluation),
            Some(evaluation.as_json().clone())
        );
        assert_eq!(fx.view.is_enabled(Control::NextQuestion), Some(true));
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_transcript_and_reuses_it() {
        let mut fx = ready_to_submit(
            MockSessionService::new()
                .with_transcript("my answer")
                .with_failure(Endpoint::SubmitAnswer, MockFailure::Network("reset".into())),
        )
        .await;

        let err = fx.flow.submit_answer().await.unwrap_err();

        assert!(matches!(err, MockviewError::Network { .. }));
        assert_eq!(fx.flow.phase(), InterviewPhase::ReadyToSubmit);
        assert_eq!(fx.flow.transcript(), Some("my answer"));
        assert_eq!(fx.view.text(Field::Transcript).as_deref(), Some("my answer"));

        fx.flow.submit_answer().await.unwrap();
        assert_eq!(fx.service.call_count(Endpoint::Transcribe), 1);
        assert_eq!(fx.service.call_count(Endpoint::SubmitAnswer), 2);
        assert_eq!(
            fx.service.calls().last(),
            Some(&ServiceCall::SubmitAnswer {
                session_id: "mock-session".to_string(),
                answer: "my answer".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_failed_transcription_keeps_the_take() {
        let mut fx = ready_to_submit(MockSessionService::new().with_failure(
            Endpoint::Transcribe,
            MockFailure::Service {
                status: 502,
                message: "whisper down".into(),
            },
        ))
        .await;

        assert!(fx.flow.submit_answer().await.is_err());
        assert_eq!(fx.flow.phase(), InterviewPhase::ReadyToSubmit);
        assert_eq!(fx.flow.transcript(), None);

        fx.flow.submit_answer().await.unwrap();
        let transcribed: Vec<_> = fx
            .service
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                ServiceCall::Transcribe { bytes, .. } => Some(bytes),
                _ => None,
            })
            .collect();
        assert_eq!(transcribed, vec![b"frag-afrag-b".to_vec(); 2]);
    }

    #[tokio::test]
    async fn test_rerecording_discards_pending_answer() {
        let mut fx = ready_to_submit(
            MockSessionService::new()
                .with_transcript("first")
                .with_failure(Endpoint::SubmitAnswer, MockFailure::Network("x".into()))
                .with_transcript("second"),
        )
        .await;
        fx.flow.submit_answer().await.unwrap_err();
        assert_eq!(fx.flow.transcript(), Some("first"));

        fx.flow.start_recording().unwrap();
        assert_eq!(fx.flow.transcript(), None);
        fx.flow.stop_recording().unwrap();
        fx.flow.submit_answer().await.unwrap();

        assert_eq!(fx.flow.transcript(), Some("second"));
        assert_eq!(fx.service.call_count(Endpoint::Transcribe), 2);
    }

    #[tokio::test]
    async fn test_empty_take_is_not_submitted() {
        let service = Arc::new(MockSessionService::new());
        let view = RecordingView::new();
        let mut flow = InterviewFlow::new(
            service.clone(),
            Arc::new(view),
            AudioCapture::new(Box::new(MockAudioSource::new())),
            "audio/webm",
        );
        flow.activate().unwrap();
        flow.start_interview("backend").await.unwrap();
        flow.start_recording().unwrap();
        flow.stop_recording().unwrap();

        assert!(matches!(
            flow.submit_answer().await,
            Err(MockviewError::PrerequisiteMissing { .. })
        ));
        assert_eq!(flow.phase(), InterviewPhase::ReadyToSubmit);
        assert_eq!(service.call_count(Endpoint::Transcribe), 0);
    }

    #[tokio::test]
    async fn test_next_question_clears_previous_answer() {
        let mut fx = showing_evaluation(MockSessionService::new().with_question("Q2")).await;

        let step = fx.flow.next_question().await.unwrap();

        assert_eq!(step, NextStep::Question("Q2".to_string()));
        assert_eq!(fx.flow.phase(), InterviewPhase::Questioning);
        assert!(fx.flow.evaluation().is_none());
        assert!(fx.flow.transcript().is_none());
        assert!(fx.flow.capture().buffer().is_empty());
        let session = fx.flow.session().unwrap();
        assert_eq!(session.question.text, "Q2");
        assert_eq!(session.question.ordinal, 2);
        assert!(!fx.view.is_visible(Section::Evaluation));
        assert_eq!(fx.view.text(Field::Transcript).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_completion_signal_moves_to_finishing_on_first_question() {
        let mut fx = showing_evaluation(MockSessionService::new().with_completion()).await;

        assert_eq!(fx.flow.next_question().await.unwrap(), NextStep::Finishing);
        assert_eq!(fx.flow.phase(), InterviewPhase::Finishing);
        assert!(fx.flow.evaluation().is_none());
        assert!(!fx.view.is_visible(Section::Evaluation));
        assert_eq!(fx.view.is_enabled(Control::NextQuestion), Some(false));
        assert_eq!(fx.view.is_enabled(Control::FinalReport), Some(true));
    }

    #[tokio::test]
    async fn test_failed_next_question_stays_on_evaluation() {
        let mut fx = showing_evaluation(MockSessionService::new().with_failure(
            Endpoint::NextQuestion,
            MockFailure::Network("timeout".into()),
        ))
        .await;

        assert!(fx.flow.next_question().await.is_err());
        assert_eq!(fx.flow.phase(), InterviewPhase::ShowingEvaluation);
        assert!(fx.flow.evaluation().is_some());
        assert_eq!(fx.view.is_enabled(Control::NextQuestion), Some(true));
    }

    #[tokio::test]
    async fn test_failed_report_can_be_retried() {
        let mut fx = showing_evaluation(
            MockSessionService::new()
                .with_completion()
                .with_failure(
                    Endpoint::FinalReport,
                    MockFailure::Service {
                        status: 500,
                        message: "boom".into(),
                    },
                )
                .with_reply(Endpoint::FinalReport, json!({"overall_score": 64})),
        )
        .await;
        fx.flow.next_question().await.unwrap();

        fx.view.clear();
        assert!(fx.flow.finish().await.is_err());
        assert_eq!(fx.flow.phase(), InterviewPhase::Finishing);
        assert_eq!(
            fx.view.intents().first(),
            Some(&ViewIntent::SetEnabled(Control::FinalReport, false))
        );
        assert_eq!(fx.view.is_enabled(Control::FinalReport), Some(true));

        let report = fx.flow.finish().await.unwrap();
        assert_eq!(report.overall_score(), Some(64.0));
        assert!(fx.flow.is_done());
    }

    #[tokio::test]
    async fn test_done_rejects_everything() {
        let mut fx = showing_evaluation(MockSessionService::new().with_completion()).await;
        fx.flow.next_question().await.unwrap();
        fx.flow.finish().await.unwrap();
        let calls_before = fx.service.calls().len();

        assert!(fx.view.is_visible(Section::FinalReport));
        assert!(!fx.view.is_visible(Section::Interview));
        assert_eq!(fx.flow.session().unwrap().status, SessionStatus::Complete);

        assert!(matches!(fx.flow.activate(), Err(MockviewError::InvalidState { .. })));
        assert!(matches!(
            fx.flow.start_interview("backend").await,
            Err(MockviewError::InvalidState { .. })
        ));
        assert!(matches!(fx.flow.start_recording(), Err(MockviewError::InvalidState { .. })));
        assert!(matches!(fx.flow.stop_recording(), Err(MockviewError::InvalidState { .. })));
        assert!(matches!(
            fx.flow.submit_answer().await,
            Err(MockviewError::InvalidState { .. })
        ));
        assert!(matches!(
            fx.flow.next_question().await,
            Err(MockviewError::InvalidState { .. })
        ));
        assert!(matches!(fx.flow.finish().await, Err(MockviewError::InvalidState { .. })));
        assert_eq!(fx.service.calls().len(), calls_before);
        assert!(!fx.mic.is_open());
    }

    #[tokio::test]
    async fn test_into_capture_releases_device_mid_take() {
        let mut fx = fixture(MockSessionService::new());
        fx.flow.activate().unwrap();
        fx.flow.start_interview("backend").await.unwrap();
        fx.flow.start_recording().unwrap();

        let capture = fx.flow.into_capture();

        assert!(!fx.mic.is_open());
        assert!(capture.buffer().is_empty());
    }
}
