//! End-to-end session flow through the public API.
//!
//! Uses paused tokio time so the configured reply delays elapse instantly,
//! and a manual clock so timestamps are predictable.

use chrono::{Duration as ChronoDuration, Local, TimeZone};

use therapy_trainer::config::TrainerConfig;
use therapy_trainer::patient::{CannedResponder, ANXIETY_POOL, GREETINGS};
use therapy_trainer::session::{
    ManualClock, Phase, RawProfileInput, SessionController, SessionEvent, SessionRuntime, Speaker,
};

fn runtime(seed: u64) -> (SessionRuntime<CannedResponder, ManualClock>, ManualClock) {
    let clock = ManualClock::new(Local.with_ymd_and_hms(2025, 6, 2, 15, 30, 0).unwrap());
    let controller = SessionController::new(
        TrainerConfig::default(),
        CannedResponder::seeded(seed),
        clock.clone(),
    );
    (SessionRuntime::new(controller), clock)
}

fn anxiety_profile() -> RawProfileInput {
    RawProfileInput::new("30", "anxiety", "restless", "rapid speech")
}

#[tokio::test(start_paused = true)]
async fn anxiety_session_end_to_end() {
    let (mut rt, clock) = runtime(1);

    let greeting = rt.start_from_input(&anxiety_profile()).await.unwrap().unwrap();
    assert!(GREETINGS.contains(&greeting.text.as_str()));

    clock.advance(ChronoDuration::seconds(40));
    rt.submit("How are you feeling?").await.unwrap();

    let messages = rt.controller().session().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].speaker, Speaker::Patient);
    assert_eq!(messages[1].speaker, Speaker::Trainee);
    assert_eq!(messages[1].text, "How are you feeling?");
    assert_eq!(messages[2].speaker, Speaker::Patient);
    assert!(ANXIETY_POOL.contains(&messages[2].text.as_str()));

    clock.advance(ChronoDuration::minutes(4));
    let feedback = rt.end().unwrap().unwrap();
    assert_eq!(feedback.trainee_message_count, 1);
    assert_eq!(feedback.duration_minutes, 5);
    assert_eq!(feedback.symptom_label, "Anxiety");
}

#[tokio::test(start_paused = true)]
async fn transcript_alternates_after_greeting() {
    for n in [0usize, 1, 7, 22] {
        let (mut rt, clock) = runtime(n as u64);
        rt.start_from_input(&anxiety_profile()).await.unwrap();
        for i in 0..n {
            clock.advance(ChronoDuration::seconds(10));
            rt.submit(&format!("question {i}")).await.unwrap();
        }

        let messages = rt.controller().session().messages();
        assert_eq!(messages.len(), 2 * n + 1, "n = {n}");
        assert_eq!(messages[0].speaker, Speaker::Patient);
        for (i, pair) in messages[1..].chunks(2).enumerate() {
            assert_eq!(pair[0].speaker, Speaker::Trainee);
            assert_eq!(pair[0].text, format!("question {i}"));
            assert_eq!(pair[1].speaker, Speaker::Patient);
        }
        assert!(messages.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));

        let expected = (n as f64 * 100.0 / 20.0).min(100.0);
        assert_eq!(rt.controller().progress_percent(), expected);
    }
}

#[tokio::test(start_paused = true)]
async fn events_track_phase_cycle() {
    let (mut rt, _clock) = runtime(9);
    let mut rx = rt.subscribe();

    rt.start_from_input(&anxiety_profile()).await.unwrap();
    rt.submit("What brings you here today?").await.unwrap();
    rt.end().unwrap();
    rt.reset();

    let mut phases = Vec::new();
    let mut input_states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::PhaseChanged { to, .. } => phases.push(to),
            SessionEvent::InputEnabled { enabled } => input_states.push(enabled),
            _ => {}
        }
    }
    assert_eq!(phases, vec![Phase::Chat, Phase::Feedback, Phase::Profile]);
    // closed for greeting, open, closed for reply, open, closed at end
    assert_eq!(input_states, vec![false, true, false, true, false]);
}

#[tokio::test(start_paused = true)]
async fn reset_then_new_session() {
    let (mut rt, _clock) = runtime(4);
    rt.start_from_input(&anxiety_profile()).await.unwrap();
    rt.submit("Hi").await.unwrap();
    rt.reset();

    let session = rt.controller().session();
    assert_eq!(rt.controller().phase(), Phase::Profile);
    assert!(session.profile().is_none());
    assert!(session.messages().is_empty());
    assert!(session.started_at().is_none());
    assert!(session.ended_at().is_none());

    let raw = RawProfileInput::new("64", "depression", "withdrawn", "flat");
    rt.start_from_input(&raw).await.unwrap();
    assert_eq!(rt.controller().session().messages().len(), 1);
    assert_eq!(
        rt.controller().session().profile().unwrap().age_years(),
        64
    );
}

#[tokio::test(start_paused = true)]
async fn event_json_shape() {
    let (mut rt, _clock) = runtime(2);
    let mut rx = rt.subscribe();
    rt.start_from_input(&anxiety_profile()).await.unwrap();

    let first = rx.try_recv().unwrap();
    let json = serde_json::to_value(&first).unwrap();
    assert_eq!(json["type"], "phase_changed");
    assert_eq!(json["from"], "profile");
    assert_eq!(json["to"], "chat");
}
