//! Session phase machine — tracks which page the trainee is on.

use serde::{Deserialize, Serialize};

/// The phases of a training session.
///
/// Progresses linearly: Profile → Chat → Feedback, and back to Profile only
/// through a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Profile,
    Chat,
    Feedback,
}

impl Phase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Profile, Chat) | (Chat, Feedback) | (Feedback, Profile)
        )
    }

    /// Whether this phase closes the session (only a reset follows).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Feedback)
    }

    /// The phase that follows this one in the cycle.
    pub fn next(&self) -> Phase {
        match self {
            Self::Profile => Self::Chat,
            Self::Chat => Self::Feedback,
            Self::Feedback => Self::Profile,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Profile
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Profile => "profile",
            Self::Chat => "chat",
            Self::Feedback => "feedback",
        };
        write!(f, "{s}")
    }
}
