//! SessionRuntime — async driver around [`SessionController`].
//!
//! Waits out the configured reply delays and broadcasts every
//! [`SessionEvent`] to subscribers. Each call awaits its own patient reply
//! before returning, so there is never more than one turn in flight.

use std::path::PathBuf;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{Error, SessionError};
use crate::patient::{CannedResponder, PatientResponder};
use crate::report::{write_report, FeedbackSummary};

use super::clock::{Clock, SystemClock};
use super::controller::{SessionController, SessionEvent};
use super::model::{Message, Profile};
use super::validator::RawProfileInput;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

pub struct SessionRuntime<P = CannedResponder, C = SystemClock> {
    controller: SessionController<P, C>,
    tx: broadcast::Sender<SessionEvent>,
}

impl<P: PatientResponder, C: Clock> SessionRuntime<P, C> {
    pub fn new(controller: SessionController<P, C>) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self { controller, tx }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn controller(&self) -> &SessionController<P, C> {
        &self.controller
    }

    /// Start a session and wait for the patient's greeting.
    pub async fn start(&mut self, profile: Profile) -> Result<Option<Message>, SessionError> {
        let events = self.controller.start_session(profile)?;
        self.publish(events);
        self.settle().await
    }

    /// Validate form input, then [`start`](Self::start).
    pub async fn start_from_input(
        &mut self,
        raw: &RawProfileInput,
    ) -> Result<Option<Message>, Error> {
        let events = self.controller.start_from_input(raw)?;
        self.publish(events);
        Ok(self.settle().await?)
    }

    /// Send a trainee message and wait for the patient's reply.
    /// Returns `None` when the message was blank.
    pub async fn submit(&mut self, text: &str) -> Result<Option<Message>, SessionError> {
        let events = self.controller.submit_trainee_message(text)?;
        if events.is_empty() {
            return Ok(None);
        }
        self.publish(events);
        self.settle().await
    }

    /// End the chat and return the composed feedback.
    pub fn end(&mut self) -> Result<Option<FeedbackSummary>, SessionError> {
        let events = self.controller.end_session()?;
        let feedback = events.iter().find_map(|e| match e {
            SessionEvent::FeedbackReady { feedback } => Some(feedback.clone()),
            _ => None,
        });
        self.publish(events);
        Ok(feedback)
    }

    /// Discard the session and return to profile entry.
    pub fn reset(&mut self) {
        let events = self.controller.reset_session();
        self.publish(events);
    }

    /// Write the transcript report into the configured report directory.
    pub async fn export_report(&self) -> Result<PathBuf, Error> {
        let report = self.controller.request_report()?;
        let path = write_report(&self.controller.config().report_dir, &report).await?;
        Ok(path)
    }

    /// Wait out and deliver any scheduled patient reply.
    async fn settle(&mut self) -> Result<Option<Message>, SessionError> {
        let mut delivered = None;
        while let Some(delay) = self.controller.pending_delay() {
            if !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "Waiting before patient reply");
                tokio::time::sleep(delay).await;
            }
            let events = self.controller.deliver_patient_reply().await?;
            delivered = events.iter().find_map(|e| match e {
                SessionEvent::MessageAppended { message } => Some(message.clone()),
                _ => None,
            });
            self.publish(events);
        }
        Ok(delivered)
    }

    fn publish(&self, events: Vec<SessionEvent>) {
        for event in events {
            // Ok if nobody is listening
            let _ = self.tx.send(event);
        }
    }
}
