use serde::{Deserialize, Serialize};

use crate::models::enums::{FormType, MoodLabel, TimeOfDay, Tone};

/// Why a response is being generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Intent {
    /// Ordinary chat turn. The trigger text has already produced the profile.
    Personal { trigger: String },
    Welcome,
    Affirmation,
    /// Topic is free text; unknown topics get the generic encouragement.
    Advice { topic: String },
    Emergency,
}

impl Intent {
    pub fn personal(trigger: impl Into<String>) -> Self {
        Self::Personal {
            trigger: trigger.into(),
        }
    }

    pub fn advice(topic: impl Into<String>) -> Self {
        Self::Advice {
            topic: topic.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Personal { .. } => "personal",
            Self::Welcome => "welcome",
            Self::Affirmation => "affirmation",
            Self::Advice { .. } => "advice",
            Self::Emergency => "emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceTopic {
    Motivation,
    Stress,
    Confidence,
    Work,
}

impl AdviceTopic {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "motivation" => Some(Self::Motivation),
            "stress" => Some(Self::Stress),
            "confidence" => Some(Self::Confidence),
            "work" => Some(Self::Work),
            _ => None,
        }
    }
}

/// Ambient facts the caller knows about the moment of the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContext {
    pub time_of_day: TimeOfDay,
    pub recent_mood: MoodLabel,
}

impl ResponseContext {
    pub fn new(time_of_day: TimeOfDay, recent_mood: MoodLabel) -> Self {
        Self {
            time_of_day,
            recent_mood,
        }
    }
}

/// A generated reply. `tone` is for styling and analytics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub content: String,
    pub tone: Tone,
}

/// Everything the chat surface can render as an assistant turn.
///
/// The engine only produces `Mood`. The other variants belong to the
/// keyword-routed marketing bot and share this shape so one renderer
/// handles both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatReply {
    Mood(Response),
    QuickReplies {
        #[serde(flatten)]
        response: Response,
        #[serde(rename = "quickReplies")]
        options: Vec<String>,
    },
    FormPrompt {
        #[serde(flatten)]
        response: Response,
        #[serde(rename = "formType")]
        form_type: FormType,
    },
}

impl ChatReply {
    pub fn response(&self) -> &Response {
        match self {
            Self::Mood(response) => response,
            Self::QuickReplies { response, .. } => response,
            Self::FormPrompt { response, .. } => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_wire_shape() {
        let json = serde_json::to_value(Intent::advice("stress")).unwrap();
        assert_eq!(json["kind"], "advice");
        assert_eq!(json["topic"], "stress");

        let parsed: Intent = serde_json::from_str(r#"{"kind":"welcome"}"#).unwrap();
        assert_eq!(parsed, Intent::Welcome);

        let parsed: Intent =
            serde_json::from_str(r#"{"kind":"personal","trigger":"hola"}"#).unwrap();
        assert_eq!(parsed.kind(), "personal");
    }

    #[test]
    fn advice_topic_tags() {
        assert_eq!(AdviceTopic::from_tag("stress"), Some(AdviceTopic::Stress));
        assert_eq!(AdviceTopic::from_tag(" Work "), Some(AdviceTopic::Work));
        assert_eq!(AdviceTopic::from_tag("cooking"), None);
    }

    #[test]
    fn mood_reply_is_tagged() {
        let reply = ChatReply::Mood(Response {
            content: "Hola".into(),
            tone: Tone::Carinoso,
        });
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "mood");
        assert_eq!(json["content"], "Hola");
        assert_eq!(json["tone"], "cariñoso");
    }

    #[test]
    fn form_prompt_requires_form_type() {
        let reply = ChatReply::FormPrompt {
            response: Response {
                content: "Déjanos tus datos".into(),
                tone: Tone::Informativo,
            },
            form_type: FormType::Quote,
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "form_prompt");
        assert_eq!(json["formType"], "quote");
        assert_eq!(reply.response().tone, Tone::Informativo);
    }

    #[test]
    fn quick_replies_carry_options() {
        let reply = ChatReply::QuickReplies {
            response: Response {
                content: "¿En qué te ayudo?".into(),
                tone: Tone::Sereno,
            },
            options: vec!["Precios".into(), "Contacto".into()],
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "quick_replies");
        assert_eq!(json["quickReplies"][1], "Contacto");
    }
}
