//! SessionController — drives a training session through its phases.
//!
//! Every command mutates the owned [`Session`] and returns the
//! [`SessionEvent`]s the presentation layer should react to. Patient replies
//! are two-step: a command schedules one (`PatientReplyScheduled`), and the
//! host calls [`SessionController::deliver_patient_reply`] once the delay has
//! elapsed. At most one reply is outstanding at a time.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TrainerConfig;
use crate::error::{Error, SessionError};
use crate::patient::{CannedResponder, PatientResponder};
use crate::report::{
    build_feedback, build_transcript_report, report_file_name, FeedbackSummary, TranscriptReport,
};

use super::clock::{Clock, SystemClock};
use super::model::{Message, Profile, Session, Speaker};
use super::state::Phase;
use super::validator::{validate_profile, RawProfileInput};

/// Stand-in when a responder hands back blank text.
const SILENT_REPLY: &str = "...";

/// Effect descriptions emitted by controller commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The visible page changed.
    PhaseChanged { from: Phase, to: Phase },
    /// A message was added to the transcript.
    MessageAppended { message: Message },
    /// A patient message is due after `delay`.
    PatientReplyScheduled { delay: Duration },
    /// Whether the trainee input surface should accept text.
    InputEnabled { enabled: bool },
    /// Progress bar value in [0, 100].
    ProgressUpdated { percent: f64 },
    /// Feedback composed at session end.
    FeedbackReady { feedback: FeedbackSummary },
    /// The session was discarded and replaced with an empty one.
    SessionReset,
}

/// What the outstanding patient turn will say.
#[derive(Debug, Clone)]
enum PendingReply {
    Greeting,
    Reply { trainee_message: String },
}

/// Owns the single active session and applies commands to it.
pub struct SessionController<P = CannedResponder, C = SystemClock> {
    config: TrainerConfig,
    responder: P,
    clock: C,
    session: Session,
    pending: Option<PendingReply>,
}

impl SessionController {
    /// Controller with an entropy-seeded canned responder and the wall clock.
    pub fn with_defaults(config: TrainerConfig) -> Self {
        Self::new(config, CannedResponder::from_entropy(), SystemClock)
    }
}

impl<P: PatientResponder, C: Clock> SessionController<P, C> {
    pub fn new(config: TrainerConfig, responder: P, clock: C) -> Self {
        Self {
            config,
            responder,
            clock,
            session: Session::new(),
            pending: None,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Whether the trainee may submit a message right now.
    pub fn input_enabled(&self) -> bool {
        self.phase() == Phase::Chat && self.pending.is_none()
    }

    /// Delay before the outstanding patient reply, if one is scheduled.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| match p {
            PendingReply::Greeting => self.config.greeting_delay,
            PendingReply::Reply { .. } => self.config.response_delay,
        })
    }

    /// Share of the target trainee message count reached, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        let target = self.config.progress_target.max(1) as f64;
        let sent = self.session.trainee_message_count() as f64;
        (sent * 100.0 / target).min(100.0)
    }

    /// Validate raw form input and start a session with it.
    pub fn start_from_input(&mut self, raw: &RawProfileInput) -> Result<Vec<SessionEvent>, Error> {
        let profile = validate_profile(raw).into_profile()?;
        Ok(self.start_session(profile)?)
    }

    /// Enter the chat phase and schedule the patient's greeting.
    pub fn start_session(&mut self, profile: Profile) -> Result<Vec<SessionEvent>, SessionError> {
        let from = self.phase();
        if !from.can_transition_to(Phase::Chat) {
            return Err(self.reject("start a session"));
        }

        let category = profile.symptom_category();
        self.session.begin(profile, self.clock.now());
        self.pending = Some(PendingReply::Greeting);

        info!(
            session_id = %self.session.id,
            symptom = %category,
            "Training session started"
        );

        Ok(vec![
            SessionEvent::PhaseChanged {
                from,
                to: Phase::Chat,
            },
            SessionEvent::ProgressUpdated { percent: 0.0 },
            SessionEvent::InputEnabled { enabled: false },
            SessionEvent::PatientReplyScheduled {
                delay: self.config.greeting_delay,
            },
        ])
    }

    /// Record a trainee message and schedule the patient's reply.
    ///
    /// Blank text is ignored without error. A second message while a reply
    /// is outstanding is rejected.
    pub fn submit_trainee_message(&mut self, text: &str) -> Result<Vec<SessionEvent>, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if self.phase() != Phase::Chat {
            return Err(self.reject("send a message"));
        }
        if self.pending.is_some() {
            warn!(session_id = %self.session.id, "Trainee message rejected: reply pending");
            return Err(SessionError::ReplyPending);
        }

        let message = self
            .session
            .push(Speaker::Trainee, text.to_string(), self.clock.now())
            .clone();
        self.pending = Some(PendingReply::Reply {
            trainee_message: text.to_string(),
        });

        debug!(
            session_id = %self.session.id,
            count = self.session.trainee_message_count(),
            "Trainee message recorded"
        );

        Ok(vec![
            SessionEvent::MessageAppended { message },
            SessionEvent::InputEnabled { enabled: false },
            SessionEvent::PatientReplyScheduled {
                delay: self.config.response_delay,
            },
        ])
    }

    /// Append the outstanding patient message and re-enable input.
    pub async fn deliver_patient_reply(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let category = match self.session.profile() {
            Some(profile) if self.phase() == Phase::Chat => profile.symptom_category(),
            _ => return Err(self.reject("deliver a patient reply")),
        };
        let pending = self.pending.take().ok_or(SessionError::NoReplyPending)?;

        let text = match pending {
            PendingReply::Greeting => self.responder.initial_greeting().await,
            PendingReply::Reply { trainee_message } => {
                self.responder.respond(category, &trainee_message).await
            }
        };
        let text = match text.trim() {
            "" => {
                warn!(session_id = %self.session.id, "Responder returned blank text");
                SILENT_REPLY.to_string()
            }
            trimmed => trimmed.to_string(),
        };

        let message = self
            .session
            .push(Speaker::Patient, text, self.clock.now())
            .clone();

        Ok(vec![
            SessionEvent::MessageAppended { message },
            SessionEvent::ProgressUpdated {
                percent: self.progress_percent(),
            },
            SessionEvent::InputEnabled { enabled: true },
        ])
    }

    /// Close the chat and compose feedback. An outstanding reply is dropped.
    pub fn end_session(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let from = self.phase();
        if !from.can_transition_to(Phase::Feedback) {
            return Err(self.reject("end the session"));
        }
        if self.pending.take().is_some() {
            debug!(session_id = %self.session.id, "Dropping outstanding patient reply");
        }

        self.session.finish(self.clock.now());

        info!(
            session_id = %self.session.id,
            messages = self.session.messages().len(),
            duration_min = ?self.session.duration_minutes(),
            "Training session ended"
        );

        let mut events = vec![
            SessionEvent::PhaseChanged {
                from,
                to: Phase::Feedback,
            },
            SessionEvent::InputEnabled { enabled: false },
        ];
        if let Some(feedback) = build_feedback(&self.session) {
            events.push(SessionEvent::FeedbackReady { feedback });
        }
        Ok(events)
    }

    /// Feedback for the closed session. Recomputed on every call.
    pub fn feedback(&self) -> Option<FeedbackSummary> {
        build_feedback(&self.session)
    }

    /// Transcript report text and download file name. Feedback phase only.
    pub fn request_report(&self) -> Result<TranscriptReport, SessionError> {
        if self.phase() != Phase::Feedback {
            return Err(self.reject("export a report"));
        }
        Ok(TranscriptReport {
            file_name: report_file_name(self.clock.now()),
            contents: build_transcript_report(&self.session),
        })
    }

    /// Discard the current session, whatever its phase.
    pub fn reset_session(&mut self) -> Vec<SessionEvent> {
        let previous = std::mem::take(&mut self.session);
        self.pending = None;

        info!(
            old_session_id = %previous.id,
            session_id = %self.session.id,
            "Session reset"
        );

        let mut events = vec![SessionEvent::SessionReset];
        let from = previous.phase();
        if from != Phase::Profile {
            events.push(SessionEvent::PhaseChanged {
                from,
                to: Phase::Profile,
            });
        }
        events.push(SessionEvent::ProgressUpdated { percent: 0.0 });
        events
    }

    fn reject(&self, command: &'static str) -> SessionError {
        let phase = self.phase();
        warn!(session_id = %self.session.id, %phase, command, "Command rejected");
        SessionError::InvalidPhase { command, phase }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::patient::{ANXIETY_POOL, DEFAULT_POOL, GREETINGS};
    use crate::session::clock::ManualClock;
    use crate::session::SymptomCategory;

    type TestController = SessionController<CannedResponder<StepRng>, ManualClock>;

    fn start_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 14, 0, 0).unwrap()
    }

    fn controller() -> (TestController, ManualClock) {
        let clock = ManualClock::new(start_time());
        let responder = CannedResponder::new(StepRng::new(0, 0));
        (
            SessionController::new(TrainerConfig::default(), responder, clock.clone()),
            clock,
        )
    }

    fn profile(symptom: &str) -> Profile {
        validate_profile(&RawProfileInput::new("30", symptom, "restless", "rapid speech"))
            .into_profile()
            .unwrap()
    }

    async fn started(symptom: &str) -> (TestController, ManualClock) {
        let (mut ctl, clock) = controller();
        ctl.start_session(profile(symptom)).unwrap();
        ctl.deliver_patient_reply().await.unwrap();
        (ctl, clock)
    }

    #[test]
    fn starts_in_profile_phase() {
        let (ctl, _) = controller();
        assert_eq!(ctl.phase(), Phase::Profile);
        assert!(!ctl.input_enabled());
        assert_eq!(ctl.progress_percent(), 0.0);
    }

    #[test]
    fn start_schedules_greeting() {
        let (mut ctl, _) = controller();
        let events = ctl.start_session(profile("anxiety")).unwrap();

        assert_eq!(
            events[0],
            SessionEvent::PhaseChanged {
                from: Phase::Profile,
                to: Phase::Chat
            }
        );
        assert!(events.contains(&SessionEvent::PatientReplyScheduled {
            delay: std::time::Duration::from_millis(1000)
        }));
        assert_eq!(ctl.phase(), Phase::Chat);
        assert_eq!(ctl.session().started_at(), Some(start_time()));
        assert!(ctl.session().messages().is_empty());
        assert!(!ctl.input_enabled(), "input stays closed until the greeting lands");
    }

    #[test]
    fn start_from_input_rejects_invalid_profile() {
        let (mut ctl, _) = controller();
        let err = ctl
            .start_from_input(&RawProfileInput::new("12", "anxiety", "x", "y"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(ctl.phase(), Phase::Profile);
    }

    #[tokio::test]
    async fn greeting_is_first_message() {
        let (ctl, _) = started("anxiety").await;
        let messages = ctl.session().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].speaker, Speaker::Patient);
        assert_eq!(messages[0].text, GREETINGS[0]);
        assert!(ctl.input_enabled());
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let (mut ctl, _) = started("anxiety").await;
        let err = ctl.start_session(profile("trauma")).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidPhase {
                command: "start a session",
                phase: Phase::Chat
            }
        );
        assert_eq!(
            ctl.session().profile().unwrap().symptom_category(),
            SymptomCategory::Anxiety
        );
    }

    #[tokio::test]
    async fn blank_message_is_a_no_op() {
        let (mut ctl, _) = started("anxiety").await;
        let events = ctl.submit_trainee_message("   \n").unwrap();
        assert!(events.is_empty());
        assert_eq!(ctl.session().messages().len(), 1);
        assert!(ctl.input_enabled());
    }

    #[tokio::test]
    async fn trainee_turn_appends_then_replies() {
        let (mut ctl, clock) = started("anxiety").await;
        clock.advance(ChronoDuration::seconds(30));

        let events = ctl.submit_trainee_message("  How are you feeling?  ").unwrap();
        assert!(matches!(
            &events[0],
            SessionEvent::MessageAppended { message }
                if message.speaker == Speaker::Trainee && message.text == "How are you feeling?"
        ));
        assert!(!ctl.input_enabled());
        assert_eq!(
            ctl.pending_delay(),
            Some(std::time::Duration::from_millis(1500))
        );

        clock.advance(ChronoDuration::seconds(2));
        let events = ctl.deliver_patient_reply().await.unwrap();
        assert!(events.contains(&SessionEvent::ProgressUpdated { percent: 5.0 }));
        assert!(events.contains(&SessionEvent::InputEnabled { enabled: true }));

        let messages = ctl.session().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].speaker, Speaker::Patient);
        assert!(ANXIETY_POOL.contains(&messages[2].text.as_str()));
        assert!(messages[1].sent_at < messages[2].sent_at);
    }

    #[tokio::test]
    async fn second_submission_while_pending_is_rejected() {
        let (mut ctl, _) = started("depression").await;
        ctl.submit_trainee_message("first").unwrap();
        assert_eq!(
            ctl.submit_trainee_message("second"),
            Err(SessionError::ReplyPending)
        );
        assert_eq!(ctl.session().trainee_message_count(), 1);
    }

    #[tokio::test]
    async fn submitting_during_greeting_delay_is_rejected() {
        let (mut ctl, _) = controller();
        ctl.start_session(profile("social")).unwrap();
        assert_eq!(
            ctl.submit_trainee_message("hello?"),
            Err(SessionError::ReplyPending)
        );
    }

    #[tokio::test]
    async fn deliver_without_pending_is_rejected() {
        let (mut ctl, _) = started("panic").await;
        assert_eq!(
            ctl.deliver_patient_reply().await.unwrap_err(),
            SessionError::NoReplyPending
        );
    }

    #[tokio::test]
    async fn default_pool_for_other_categories() {
        let (mut ctl, _) = started("bipolar").await;
        ctl.submit_trainee_message("What brings you in?").unwrap();
        ctl.deliver_patient_reply().await.unwrap();
        let last = ctl.session().messages().last().unwrap();
        assert!(DEFAULT_POOL.contains(&last.text.as_str()));
    }

    #[tokio::test]
    async fn progress_caps_at_one_hundred() {
        let (mut ctl, _) = started("anxiety").await;
        for i in 0..25 {
            ctl.submit_trainee_message(&format!("question {i}")).unwrap();
            ctl.deliver_patient_reply().await.unwrap();
            if i == 4 {
                assert_eq!(ctl.progress_percent(), 25.0);
            }
        }
        assert_eq!(ctl.progress_percent(), 100.0);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let (mut ctl, _) = controller();
        assert!(matches!(
            ctl.end_session(),
            Err(SessionError::InvalidPhase {
                phase: Phase::Profile,
                ..
            })
        ));
        assert!(ctl.session().ended_at().is_none());
    }

    #[tokio::test]
    async fn end_composes_feedback() {
        let (mut ctl, clock) = started("anxiety").await;
        ctl.submit_trainee_message("How are you feeling?").unwrap();
        ctl.deliver_patient_reply().await.unwrap();
        clock.advance(ChronoDuration::minutes(7));

        let events = ctl.end_session().unwrap();
        assert_eq!(ctl.phase(), Phase::Feedback);
        let feedback = events
            .iter()
            .find_map(|e| match e {
                SessionEvent::FeedbackReady { feedback } => Some(feedback.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(feedback.trainee_message_count, 1);
        assert_eq!(feedback.duration_minutes, 7);
        assert_eq!(ctl.feedback(), Some(feedback));

        // No second end.
        assert!(ctl.end_session().is_err());
    }

    #[tokio::test]
    async fn end_drops_outstanding_reply() {
        let (mut ctl, _) = started("trauma").await;
        ctl.submit_trainee_message("Can you tell me what happened?").unwrap();
        ctl.end_session().unwrap();

        assert!(ctl.pending_delay().is_none());
        assert!(ctl.deliver_patient_reply().await.is_err());
        assert_eq!(ctl.session().messages().len(), 2);
        assert!(ctl.submit_trainee_message("hello").is_err());
    }

    #[tokio::test]
    async fn report_only_after_end() {
        let (mut ctl, _) = started("anxiety").await;
        assert!(ctl.request_report().is_err());

        ctl.end_session().unwrap();
        let report = ctl.request_report().unwrap();
        assert!(report.contents.contains("SESSION TRANSCRIPT:"));
        assert!(report.file_name.starts_with("therapy-training-report-"));

        // Idempotent.
        assert_eq!(ctl.request_report().unwrap(), report);
    }

    #[tokio::test]
    async fn reset_from_any_phase_yields_empty_session() {
        // Profile phase
        let (mut ctl, _) = controller();
        let events = ctl.reset_session();
        assert_eq!(events[0], SessionEvent::SessionReset);
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::PhaseChanged { .. })));

        // Chat phase with a reply outstanding
        let (mut ctl, _) = started("anxiety").await;
        ctl.submit_trainee_message("hi").unwrap();
        let old_id = ctl.session().id;
        let events = ctl.reset_session();
        assert!(events.contains(&SessionEvent::PhaseChanged {
            from: Phase::Chat,
            to: Phase::Profile
        }));
        assert_ne!(ctl.session().id, old_id);
        assert!(ctl.pending_delay().is_none());

        // Feedback phase
        let (mut ctl, _) = started("anxiety").await;
        ctl.end_session().unwrap();
        ctl.reset_session();

        let session = ctl.session();
        assert_eq!(ctl.phase(), Phase::Profile);
        assert!(session.profile().is_none());
        assert!(session.messages().is_empty());
        assert!(session.started_at().is_none());
        assert!(session.ended_at().is_none());
        assert_eq!(ctl.progress_percent(), 0.0);
    }

    #[tokio::test]
    async fn blank_responder_output_is_replaced() {
        struct Mute;

        #[async_trait::async_trait]
        impl PatientResponder for Mute {
            async fn initial_greeting(&mut self) -> String {
                "  ".to_string()
            }
            async fn respond(&mut self, _: SymptomCategory, _: &str) -> String {
                String::new()
            }
        }

        let clock = ManualClock::new(start_time());
        let mut ctl = SessionController::new(TrainerConfig::default(), Mute, clock);
        ctl.start_session(profile("anxiety")).unwrap();
        ctl.deliver_patient_reply().await.unwrap();
        assert_eq!(ctl.session().messages()[0].text, SILENT_REPLY);
    }
}
