//! Profile form validation.
//!
//! Two checks exist side by side. [`is_ready`] is the loose live check that
//! enables the start control as soon as every field has something in it.
//! [`validate_profile`] is the full check run on submit; only it produces a
//! [`Profile`].

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationErrors};

use super::model::{Profile, SymptomCategory};

/// Youngest patient age accepted.
pub const MIN_AGE: i64 = 18;
/// Oldest patient age accepted.
pub const MAX_AGE: i64 = 100;

/// Status line shown while the form is incomplete.
pub const STATUS_INCOMPLETE: &str = "Please fill all fields to continue";
/// Status line shown once every field has a value.
pub const STATUS_READY: &str = "Ready to start training session";

/// Profile form fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Age,
    Symptom,
    Behavior,
    Tone,
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Age => write!(f, "Age"),
            Self::Symptom => write!(f, "Symptom category"),
            Self::Behavior => write!(f, "Behavior"),
            Self::Tone => write!(f, "Tone"),
        }
    }
}

/// Raw, untrusted form values as typed by the trainee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfileInput {
    pub age: String,
    pub symptom: String,
    pub behavior: String,
    pub tone: String,
}

impl RawProfileInput {
    pub fn new(
        age: impl Into<String>,
        symptom: impl Into<String>,
        behavior: impl Into<String>,
        tone: impl Into<String>,
    ) -> Self {
        Self {
            age: age.into(),
            symptom: symptom.into(),
            behavior: behavior.into(),
            tone: tone.into(),
        }
    }

    /// Fill behavior and tone from the category's quick-profile template.
    pub fn apply_template(&mut self, category: SymptomCategory) {
        let template = category.template();
        self.behavior = template.behavior.to_string();
        self.tone = template.tone.to_string();
    }
}

/// Pass/fail for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldVerdict {
    pub field: ProfileField,
    pub error: Option<ValidationError>,
}

impl FieldVerdict {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of full validation: one verdict per field, plus the profile when
/// every field passed.
#[derive(Debug, Clone)]
pub struct ProfileValidation {
    verdicts: [FieldVerdict; 4],
    profile: Option<Profile>,
}

impl ProfileValidation {
    pub fn is_valid(&self) -> bool {
        self.profile.is_some()
    }

    /// Verdicts in form order: age, symptom, behavior, tone.
    pub fn verdicts(&self) -> &[FieldVerdict] {
        &self.verdicts
    }

    pub fn error_for(&self, field: ProfileField) -> Option<ValidationError> {
        self.verdicts
            .iter()
            .find(|v| v.field == field)
            .and_then(|v| v.error)
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.verdicts.iter().filter_map(|v| v.error).collect()
    }

    /// Take the validated profile, or every field error.
    pub fn into_profile(self) -> Result<Profile, ValidationErrors> {
        match self.profile {
            Some(profile) => Ok(profile),
            None => Err(ValidationErrors(self.errors())),
        }
    }
}

/// Live readiness check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub status: &'static str,
}

/// Loose live check: every field non-empty after trimming. No range or
/// category enforcement.
pub fn is_ready(raw: &RawProfileInput) -> bool {
    [&raw.age, &raw.symptom, &raw.behavior, &raw.tone]
        .iter()
        .all(|v| !v.trim().is_empty())
}

/// [`is_ready`] plus the status line to show beside the start control.
pub fn readiness(raw: &RawProfileInput) -> Readiness {
    let ready = is_ready(raw);
    Readiness {
        ready,
        status: if ready { STATUS_READY } else { STATUS_INCOMPLETE },
    }
}

/// Full validation of the profile form. Pure; presenting the errors is the
/// caller's job.
pub fn validate_profile(raw: &RawProfileInput) -> ProfileValidation {
    let age = check_age(&raw.age);
    let symptom = check_symptom(&raw.symptom);
    let behavior = check_text(&raw.behavior, ProfileField::Behavior);
    let tone = check_text(&raw.tone, ProfileField::Tone);

    let verdicts = [
        FieldVerdict {
            field: ProfileField::Age,
            error: age.err(),
        },
        FieldVerdict {
            field: ProfileField::Symptom,
            error: symptom.err(),
        },
        FieldVerdict {
            field: ProfileField::Behavior,
            error: behavior.as_ref().err().copied(),
        },
        FieldVerdict {
            field: ProfileField::Tone,
            error: tone.as_ref().err().copied(),
        },
    ];

    let profile = match (age, symptom, behavior, tone) {
        (Ok(age), Ok(symptom), Ok(behavior), Ok(tone)) => {
            Some(Profile::new(age, symptom, behavior, tone))
        }
        _ => None,
    };

    if profile.is_none() {
        tracing::debug!(
            errors = ?verdicts.iter().filter_map(|v| v.error).collect::<Vec<_>>(),
            "Profile failed validation"
        );
    }

    ProfileValidation { verdicts, profile }
}

/// Leading integer of `raw`, so `"30.5"` and `"30 years"` read as 30.
fn leading_integer(raw: &str) -> &str {
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    &raw[..raw.len() - unsigned.len() + digits]
}

fn check_age(raw: &str) -> Result<u8, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::AgeMissing);
    }
    match leading_integer(trimmed).parse::<i64>() {
        Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => {
            u8::try_from(age).map_err(|_| ValidationError::AgeOutOfRange)
        }
        Ok(_) => Err(ValidationError::AgeOutOfRange),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(ValidationError::AgeOutOfRange)
            }
            _ => Err(ValidationError::AgeMissing),
        },
    }
}

fn check_symptom(raw: &str) -> Result<SymptomCategory, ValidationError> {
    raw.parse().map_err(|_| ValidationError::SymptomMissing)
}

fn check_text(raw: &str, field: ProfileField) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::FieldMissing { field })
    } else {
        Ok(trimmed.to_string())
    }
}
