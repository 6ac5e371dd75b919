//! Session domain: identifiers, questions, answers, slots, progress

pub mod contact;
pub mod id;
pub mod mode;
pub mod progress;
pub mod question;
pub mod slots;

pub use contact::ContactInfo;
pub use id::SessionId;
pub use mode::InterviewMode;
pub use question::{AnswerState, Question, QuestionState, RoundBoard, TranscriptEntry};
pub use slots::{RiskFlag, Severity, SlotFill, SlotStatus, SlotValue};
