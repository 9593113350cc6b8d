use rand::seq::SliceRandom;
use rand::Rng;

use super::templates::{self, Template};
use super::types::{AdviceTopic, Intent, Response, ResponseContext};
use crate::config::DEFAULT_PARTICIPANT_NAME;
use crate::models::MoodProfile;

/// Maps an intent plus mood profile to an interpolated template.
///
/// Pure given its inputs and the caller's random source.
#[derive(Debug, Clone)]
pub struct ResponseGenerator {
    fallback_name: String,
}

impl ResponseGenerator {
    pub fn new(fallback_name: impl Into<String>) -> Self {
        Self {
            fallback_name: fallback_name.into(),
        }
    }

    /// Pick and fill a template. Never fails: empty candidate sets and
    /// unknown advice topics resolve to the generic encouragement.
    pub fn respond<R: Rng + ?Sized>(
        &self,
        intent: &Intent,
        profile: &MoodProfile,
        participant_name: &str,
        context: &ResponseContext,
        rng: &mut R,
    ) -> Response {
        let template = candidate_templates(intent, profile)
            .choose(rng)
            .copied()
            .unwrap_or(templates::ENCOURAGEMENT);
        self.render(&template, participant_name, context)
    }

    /// Every response `respond` could return for these inputs.
    pub fn candidates(
        &self,
        intent: &Intent,
        profile: &MoodProfile,
        participant_name: &str,
        context: &ResponseContext,
    ) -> Vec<Response> {
        candidate_templates(intent, profile)
            .iter()
            .map(|tpl| self.render(tpl, participant_name, context))
            .collect()
    }

    /// Fill an arbitrary template with the resolved name and greeting.
    pub fn render(
        &self,
        template: &Template,
        participant_name: &str,
        context: &ResponseContext,
    ) -> Response {
        Response {
            content: templates::interpolate(
                template.text,
                self.resolve_name(participant_name),
                templates::greeting(context.time_of_day),
            ),
            tone: template.tone,
        }
    }

    fn resolve_name<'a>(&'a self, participant_name: &'a str) -> &'a str {
        let trimmed = participant_name.trim();
        if trimmed.is_empty() {
            &self.fallback_name
        } else {
            trimmed
        }
    }
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PARTICIPANT_NAME)
    }
}

fn candidate_templates(intent: &Intent, profile: &MoodProfile) -> &'static [Template] {
    match intent {
        Intent::Personal { .. } => templates::personal_candidates(profile.mood),
        Intent::Welcome => templates::welcome_candidates(profile.mood),
        Intent::Affirmation => &templates::AFFIRMATIONS,
        Intent::Advice { topic } => {
            std::slice::from_ref(templates::advice_template(AdviceTopic::from_tag(topic)))
        }
        Intent::Emergency => std::slice::from_ref(&templates::EMERGENCY),
    }
}
