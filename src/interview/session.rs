use std::fmt;

/// Server-side progress of one interview, as tracked by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    AwaitingAnswer,
    Evaluating,
    AwaitingNext,
    Complete,
}

/// A question and its 1-based position in the interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub ordinal: u32,
}

/// One interview instance, created from a successful start-interview response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub role: String,
    pub question: Question,
    pub status: SessionStatus,
}

impl Session {
    pub fn new(id: String, role: String, first_question: String) -> Self {
        Self {
            id,
            role,
            question: Question {
                text: first_question,
                ordinal: 1,
            },
            status: SessionStatus::AwaitingAnswer,
        }
    }

    /// Replace the current question with the next one.
    pub fn advance(&mut self, text: String) {
        self.question = Question {
            text,
            ordinal: self.question.ordinal + 1,
        };
        self.status = SessionStatus::AwaitingAnswer;
    }
}

/// Where the interview flow is. Each operation is legal only in specific phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewPhase {
    Idle,
    RoleSelect,
    Questioning,
    Recording,
    ReadyToSubmit,
    Evaluating,
    ShowingEvaluation,
    Finishing,
    Done,
}

impl fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InterviewPhase::Idle => "the interview has not been opened",
            InterviewPhase::RoleSelect => "choosing a role",
            InterviewPhase::Questioning => "waiting for an answer",
            InterviewPhase::Recording => "recording",
            InterviewPhase::ReadyToSubmit => "an answer is ready to submit",
            InterviewPhase::Evaluating => "the answer is being evaluated",
            InterviewPhase::ShowingEvaluation => "showing the evaluation",
            InterviewPhase::Finishing => "the interview is finishing",
            InterviewPhase::Done => "the interview is over",
        };
        f.write_str(text)
    }
}
