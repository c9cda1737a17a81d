//! Patient profile, chat message and session data models.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::Phase;

/// The patient's primary presenting problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomCategory {
    Anxiety,
    Depression,
    Trauma,
    Social,
    Panic,
    Bipolar,
}

/// Suggested behavior and tone for a symptom category ("quick profile").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileTemplate {
    pub behavior: &'static str,
    pub tone: &'static str,
}

impl SymptomCategory {
    pub const ALL: [SymptomCategory; 6] = [
        Self::Anxiety,
        Self::Depression,
        Self::Trauma,
        Self::Social,
        Self::Panic,
        Self::Bipolar,
    ];

    /// Human-readable label used in feedback and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anxiety => "Anxiety",
            Self::Depression => "Depression",
            Self::Trauma => "Trauma / PTSD",
            Self::Social => "Social Anxiety",
            Self::Panic => "Panic Disorder",
            Self::Bipolar => "Bipolar Disorder",
        }
    }

    /// Quick-profile template for this category.
    pub fn template(&self) -> ProfileTemplate {
        let (behavior, tone) = match self {
            Self::Anxiety => (
                "restless, fidgety, avoids eye contact",
                "rapid speech, worried, seeking reassurance",
            ),
            Self::Depression => (
                "withdrawn, low energy, minimal responses",
                "flat, monotone, hopeless",
            ),
            Self::Trauma => (
                "hypervigilant, startled easily, guarded",
                "cautious, defensive, emotional triggers",
            ),
            Self::Social => (
                "shy, nervous, self-conscious",
                "quiet, apologetic, self-deprecating",
            ),
            Self::Panic => (
                "anxious, checking exits, physical symptoms",
                "fearful, urgent, catastrophizing",
            ),
            Self::Bipolar => (
                "mood swings, either energetic or lethargic",
                "varies between elevated and depressed",
            ),
        };
        ProfileTemplate { behavior, tone }
    }
}

impl std::fmt::Display for SymptomCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Anxiety => "anxiety",
            Self::Depression => "depression",
            Self::Trauma => "trauma",
            Self::Social => "social",
            Self::Panic => "panic",
            Self::Bipolar => "bipolar",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SymptomCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.to_string() == lower)
            .ok_or_else(|| format!("Unknown symptom category: {s}"))
    }
}

/// A validated patient profile.
///
/// Only [`crate::session::validate_profile`] builds one, so holding a
/// `Profile` means every field passed validation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    age_years: u8,
    symptom_category: SymptomCategory,
    behavior: String,
    tone: String,
}

impl Profile {
    pub(crate) fn new(
        age_years: u8,
        symptom_category: SymptomCategory,
        behavior: String,
        tone: String,
    ) -> Self {
        Self {
            age_years,
            symptom_category,
            behavior,
            tone,
        }
    }

    pub fn age_years(&self) -> u8 {
        self.age_years
    }

    pub fn symptom_category(&self) -> SymptomCategory {
        self.symptom_category
    }

    pub fn behavior(&self) -> &str {
        &self.behavior
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }
}

/// Who sent a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Trainee,
    Patient,
}

impl Speaker {
    /// Upper-case label used in transcript lines.
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Self::Trainee => "TRAINEE",
            Self::Patient => "PATIENT",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trainee => write!(f, "trainee"),
            Self::Patient => write!(f, "patient"),
        }
    }
}

/// One chat message. Text is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    pub sent_at: DateTime<Local>,
}

/// The single active training session.
///
/// Replaced wholesale on reset; fields are only mutated through the
/// controller, which enforces the phase rules.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    profile: Option<Profile>,
    messages: Vec<Message>,
    started_at: Option<DateTime<Local>>,
    ended_at: Option<DateTime<Local>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            profile: None,
            messages: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase derived from which fields are populated.
    pub fn phase(&self) -> Phase {
        match (&self.profile, self.ended_at) {
            (None, _) => Phase::Profile,
            (Some(_), None) => Phase::Chat,
            (Some(_), Some(_)) => Phase::Feedback,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Local>> {
        self.ended_at
    }

    /// Number of messages the trainee has sent.
    pub fn trainee_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.speaker == Speaker::Trainee)
            .count()
    }

    /// Whole minutes between start and end, rounded to nearest.
    /// `None` until the session has both timestamps.
    pub fn duration_minutes(&self) -> Option<i64> {
        let started = self.started_at?;
        let ended = self.ended_at?;
        let millis = (ended - started).num_milliseconds();
        Some((millis as f64 / 60_000.0).round() as i64)
    }

    /// Enter the chat phase with a validated profile.
    pub(crate) fn begin(&mut self, profile: Profile, now: DateTime<Local>) {
        self.profile = Some(profile);
        self.started_at = Some(now);
        self.ended_at = None;
        self.messages.clear();
    }

    /// Append a message. Callers guarantee `text` is non-empty and the
    /// session is in the chat phase.
    pub(crate) fn push(&mut self, speaker: Speaker, text: String, now: DateTime<Local>) -> &Message {
        self.messages.push(Message {
            speaker,
            text,
            sent_at: now,
        });
        // Non-empty: just pushed.
        &self.messages[self.messages.len() - 1]
    }

    /// Close the session.
    pub(crate) fn finish(&mut self, now: DateTime<Local>) {
        self.ended_at = Some(now);
    }
}
