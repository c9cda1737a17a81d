//! Training session core — profile collection, chat, feedback.
//!
//! A session moves through three phases. The trainee fills out a patient
//! profile (validated by [`validator`]), chats with the simulated patient,
//! and ends the session to receive feedback. [`SessionController`] owns the
//! single active [`Session`] and applies commands to it; [`SessionRuntime`]
//! adds the reply delays and fans events out to subscribers.

pub mod clock;
pub mod controller;
pub mod model;
pub mod runtime;
pub mod state;
pub mod validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{SessionController, SessionEvent};
pub use model::{Message, Profile, ProfileTemplate, Session, Speaker, SymptomCategory};
pub use runtime::SessionRuntime;
pub use state::Phase;
pub use validator::{
    is_ready, readiness, validate_profile, FieldVerdict, ProfileField, ProfileValidation,
    RawProfileInput, Readiness,
};
