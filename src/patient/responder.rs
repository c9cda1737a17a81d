//! Patient response generation.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::session::SymptomCategory;

/// Opening lines, one of which starts every session.
pub const GREETINGS: [&str; 5] = [
    "Hi... I'm not really sure how this works.",
    "Hello. I was told I should come here.",
    "Um, hi. This is my first time doing something like this.",
    "Hello doctor. I'm feeling pretty nervous about this.",
    "Hi there. I guess we should start talking?",
];

pub const ANXIETY_POOL: [&str; 4] = [
    "I keep worrying about everything... what if something bad happens?",
    "I can't stop thinking about all the things that could go wrong.",
    "Do you think I'm overreacting? I feel like I am but I can't help it.",
    "My heart keeps racing and I don't know why.",
];

pub const DEPRESSION_POOL: [&str; 4] = [
    "I just don't see the point in anything anymore.",
    "Nothing seems to make me happy like it used to.",
    "I feel tired all the time, even when I sleep.",
    "It's hard to explain... everything just feels heavy.",
];

pub const TRAUMA_POOL: [&str; 4] = [
    "I don't really like talking about what happened.",
    "Sometimes I get these flashbacks and I freeze up.",
    "I know it's in the past, but it doesn't feel that way.",
    "I jump at every little sound now.",
];

/// Shared pool for categories without their own lines.
pub const DEFAULT_POOL: [&str; 4] = [
    "I'm not sure how to answer that.",
    "Can you tell me more about what you mean?",
    "That's something I've been thinking about too.",
    "I appreciate you asking.",
];

/// Returned only if a pool is somehow empty.
const FALLBACK_REPLY: &str = "...";

/// Reply pool for a symptom category.
pub fn pool_for(category: SymptomCategory) -> &'static [&'static str] {
    match category {
        SymptomCategory::Anxiety => &ANXIETY_POOL,
        SymptomCategory::Depression => &DEPRESSION_POOL,
        SymptomCategory::Trauma => &TRAUMA_POOL,
        SymptomCategory::Social | SymptomCategory::Panic | SymptomCategory::Bipolar => {
            &DEFAULT_POOL
        }
    }
}

/// Produces the simulated patient's side of the conversation.
#[async_trait]
pub trait PatientResponder: Send {
    /// The line the patient opens the session with.
    async fn initial_greeting(&mut self) -> String;

    /// The patient's reply to one trainee message.
    async fn respond(&mut self, category: SymptomCategory, trainee_message: &str) -> String;
}

/// Draws uniformly from fixed line pools using an injected random source.
///
/// Replies do not look at what the trainee wrote; only the symptom category
/// picks the pool.
pub struct CannedResponder<R = StdRng> {
    rng: R,
}

impl CannedResponder<StdRng> {
    /// Responder seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic responder for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CannedResponder<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one greeting.
    pub fn draw_greeting(&mut self) -> String {
        draw(&GREETINGS, &mut self.rng)
    }

    /// Draw one reply from the category's pool.
    pub fn draw_reply(&mut self, category: SymptomCategory, _trainee_message: &str) -> String {
        draw(pool_for(category), &mut self.rng)
    }
}

fn draw<R: Rng>(pool: &[&str], rng: &mut R) -> String {
    pool.choose(rng)
        .copied()
        .unwrap_or(FALLBACK_REPLY)
        .to_string()
}

#[async_trait]
impl<R: Rng + Send> PatientResponder for CannedResponder<R> {
    async fn initial_greeting(&mut self) -> String {
        self.draw_greeting()
    }

    async fn respond(&mut self, category: SymptomCategory, trainee_message: &str) -> String {
        self.draw_reply(category, trainee_message)
    }
}
