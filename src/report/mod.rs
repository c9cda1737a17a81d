//! Feedback and transcript composition for finished sessions.

pub mod feedback;
pub mod transcript;

pub use feedback::{build_feedback, FeedbackSummary};
pub use transcript::{
    build_transcript_report, report_file_name, write_report, TranscriptReport,
};
