//! Mock interview: session model and the flow state machine.

pub mod flow;
pub mod session;

pub use flow::{InterviewFlow, NextStep};
pub use session::{InterviewPhase, Question, Session, SessionStatus};
