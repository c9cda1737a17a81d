//! Templated trainee feedback.

use serde::Serialize;

use crate::session::Session;

/// Feedback shown on the final page. Deterministic for a given session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSummary {
    pub duration_minutes: i64,
    pub trainee_message_count: usize,
    pub patient_age: u8,
    pub symptom_label: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
}

impl FeedbackSummary {
    /// Plain-text rendering with one bullet per line.
    pub fn render(&self) -> String {
        let mut out = vec![
            "SESSION SUMMARY".to_string(),
            format!("Session Duration: {} minutes", self.duration_minutes),
            format!("Trainee Responses: {}", self.trainee_message_count),
            format!(
                "Patient Profile: {} (Age {})",
                self.symptom_label, self.patient_age
            ),
        ];

        for (title, items) in [
            ("STRENGTHS", &self.strengths),
            ("AREAS FOR IMPROVEMENT", &self.improvements),
            ("RECOMMENDATIONS", &self.recommendations),
        ] {
            out.push(String::new());
            out.push(title.to_string());
            out.extend(items.iter().map(|item| format!("- {item}")));
        }

        out.join("\n")
    }
}

/// Compose feedback for a session. `None` until the session has ended.
pub fn build_feedback(session: &Session) -> Option<FeedbackSummary> {
    let profile = session.profile()?;
    let duration_minutes = session.duration_minutes()?;
    let count = session.trainee_message_count();
    let symptom_label = profile.symptom_category().label();

    let strengths = vec![
        "Maintained professional communication throughout the session.".to_string(),
        format!("Showed active engagement with {count} therapeutic responses."),
        "Demonstrated willingness to practice in a simulated environment.".to_string(),
        format!("Completed a full session duration of {duration_minutes} minutes."),
    ];

    let improvements = vec![
        "Consider incorporating more open-ended questions to encourage patient elaboration."
            .to_string(),
        "Practice reflective listening techniques to validate patient experiences.".to_string(),
        "Focus on building rapport before moving to deeper therapeutic work.".to_string(),
    ];

    let recommendations = vec![
        format!("Review therapeutic questioning techniques specifically for {symptom_label}."),
        "Practice more sessions with similar patient profiles to master initial engagement."
            .to_string(),
        "Continue building clinical skills through supervised practice and case studies."
            .to_string(),
    ];

    Some(FeedbackSummary {
        duration_minutes,
        trainee_message_count: count,
        patient_age: profile.age_years(),
        symptom_label: symptom_label.to_string(),
        strengths,
        improvements,
        recommendations,
    })
}
