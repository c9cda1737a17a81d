//! Plain-text transcript report offered for download.
//!
//! The layout is a stable external format; trainees keep these files.
//!
//! It follows the browser download's layout but is not byte-identical to it:
//! trainee lines are labelled `TRAINEE:` rather than `STUDENT:`, there is no
//! leading blank line, and no line carries trailing whitespace or indentation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::ReportError;
use crate::session::Session;

const TITLE: &str = "PSYCHOTHERAPY TRAINING SESSION REPORT";
const UNAVAILABLE: &str = "N/A";

/// A composed report and the file name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptReport {
    pub file_name: String,
    pub contents: String,
}

/// `M/D/YYYY`
fn format_date(at: DateTime<Local>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

/// `h:mm:ss AM`
fn format_time(at: DateTime<Local>) -> String {
    at.format("%-I:%M:%S %p").to_string()
}

/// `therapy-training-report-<YYYY-MM-DD>.txt`, dated in UTC.
pub fn report_file_name(now: DateTime<Local>) -> String {
    format!(
        "therapy-training-report-{}.txt",
        now.with_timezone(&Utc).format("%Y-%m-%d")
    )
}

/// Render the transcript report. A session that has not ended reports its
/// date, end time and duration as `N/A`.
pub fn build_transcript_report(session: &Session) -> String {
    let ended = session.ended_at();
    let duration = session
        .duration_minutes()
        .map(|m| m.to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string());

    let mut lines = vec![
        TITLE.to_string(),
        "=".repeat(TITLE.len()),
        String::new(),
        format!(
            "Session Date: {}",
            ended.map(format_date).unwrap_or_else(|| UNAVAILABLE.to_string())
        ),
        format!(
            "Session End Time: {}",
            ended.map(format_time).unwrap_or_else(|| UNAVAILABLE.to_string())
        ),
        format!("Duration: {duration} minutes"),
        String::new(),
        "PATIENT PROFILE:".to_string(),
    ];

    match session.profile() {
        Some(profile) => {
            lines.push(format!("- Age: {}", profile.age_years()));
            lines.push(format!(
                "- Primary Symptoms: {}",
                profile.symptom_category().label()
            ));
            lines.push(format!("- Behavior: {}", profile.behavior()));
            lines.push(format!("- Communication Tone: {}", profile.tone()));
        }
        None => {
            for label in ["Age", "Primary Symptoms", "Behavior", "Communication Tone"] {
                lines.push(format!("- {label}: {UNAVAILABLE}"));
            }
        }
    }

    lines.push(String::new());
    lines.push("SESSION TRANSCRIPT:".to_string());
    lines.extend(session.messages().iter().map(|m| {
        format!(
            "[{}] {}: {}",
            format_time(m.sent_at),
            m.speaker.transcript_label(),
            m.text
        )
    }));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push("END OF REPORT".to_string());

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// Save a report into `dir`, returning the full path written.
pub async fn write_report(dir: &Path, report: &TranscriptReport) -> Result<PathBuf, ReportError> {
    let path = dir.join(&report.file_name);
    tokio::fs::write(&path, report.contents.as_bytes())
        .await
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), bytes = report.contents.len(), "Transcript report written");
    Ok(path)
}
