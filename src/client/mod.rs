//! Remote session client: one call per service operation.

pub mod http;
pub mod mock;
pub mod protocol;

use crate::audio::buffer::AudioBlob;
use crate::cv::CvFile;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use http::HttpSessionClient;
pub use mock::{MockFailure, MockSessionService, ServiceCall};
pub use protocol::{
    CvEvaluation, Endpoint, Evaluation, FinalReport, FullCvAnalysis, NextQuestion,
    ParsedCv, StartedInterview,
};

/// Trait for the evaluation service.
///
/// Each method is a single round trip with no retry. Implementations never
/// touch flow state; callers apply results themselves.
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn start_interview(&self, role: &str) -> Result<StartedInterview>;

    /// Turn a recorded answer into text.
    async fn transcribe(&self, audio: &AudioBlob) -> Result<String>;

    async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<Evaluation>;

    /// Either the next question or the completion signal.
    async fn next_question(&self, session_id: &str) -> Result<NextQuestion>;

    async fn final_report(&self, session_id: &str) -> Result<FinalReport>;

    async fn parse_cv(&self, file: &CvFile) -> Result<ParsedCv>;

    /// Score a previously parsed CV. The parsed payload is sent as-is.
    async fn evaluate_cv(&self, role: &str, parsed: &ParsedCv) -> Result<CvEvaluation>;

    /// Parse and evaluate in one round trip.
    async fn full_cv_analysis(&self, role: &str, file: &CvFile) -> Result<FullCvAnalysis>;
}

/// Implement SessionService for Arc<T> so tests can keep a handle on the service.
#[async_trait]
impl<T: SessionService + ?Sized> SessionService for Arc<T> {
    async fn start_interview(&self, role: &str) -> Result<StartedInterview> {
        (**self).start_interview(role).await
    }

    async fn transcribe(&self, audio: &AudioBlob) -> Result<String> {
        (**self).transcribe(audio).await
    }

    async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<Evaluation> {
        (**self).submit_answer(session_id, answer).await
    }

    async fn next_question(&self, session_id: &str) -> Result<NextQuestion> {
        (**self).next_question(session_id).await
    }

    async fn final_report(&self, session_id: &str) -> Result<FinalReport> {
        (**self).final_report(session_id).await
    }

    async fn parse_cv(&self, file: &CvFile) -> Result<ParsedCv> {
        (**self).parse_cv(file).await
    }

    async fn evaluate_cv(&self, role: &str, parsed: &ParsedCv) -> Result<CvEvaluation> {
        (**self).evaluate_cv(role, parsed).await
    }

    async fn full_cv_analysis(&self, role: &str, file: &CvFile) -> Result<FullCvAnalysis> {
        (**self).full_cv_analysis(role, file).await
    }
}
