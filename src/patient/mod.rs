//! Simulated patient — the counterpart the trainee talks to.
//!
//! Replies come from an async [`PatientResponder`]. The shipped
//! implementation draws canned lines keyed by symptom category; a
//! language-model backed responder can replace it without touching callers.

pub mod responder;

pub use responder::{
    pool_for, CannedResponder, PatientResponder, ANXIETY_POOL, DEFAULT_POOL, DEPRESSION_POOL,
    GREETINGS, TRAUMA_POOL,
};
