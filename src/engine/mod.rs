//! Mood-response engine: text → mood profile → templated reply.
//!
//! Everything in here is pure. Randomness is injected by the caller so
//! template picks are reproducible under a seeded generator.

pub mod analyzer;
pub mod responder;
pub mod templates;
pub mod types;

pub use analyzer::MoodAnalyzer;
pub use responder::ResponseGenerator;
pub use types::{AdviceTopic, ChatReply, Intent, Response, ResponseContext};
