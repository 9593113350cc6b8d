//! Chat session state as a value object plus its transitions.
//!
//! `reduce` is pure: it never touches the store, the clock or the engine.
//! The controller feeds it actions and keeps the latest value.

use serde::Serialize;
use thiserror::Error;

use crate::models::enums::MoodLabel;
use crate::models::{Conversation, Message, MoodProfile};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Chat session is closed")]
    SessionClosed,

    #[error("A reply is still being prepared")]
    TurnInFlight,

    #[error("Message cannot be empty")]
    EmptyMessage,
}

/// Everything the chat surface needs to render one participant's chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSession {
    pub participant_name: String,
    pub is_open: bool,
    /// Set from submission until the reply lands; input is disabled meanwhile.
    pub awaiting_reply: bool,
    pub conversation: Conversation,
}

impl ChatSession {
    pub fn new(participant_id: impl Into<String>, participant_name: impl Into<String>) -> Self {
        Self {
            participant_name: participant_name.into(),
            is_open: false,
            awaiting_reply: false,
            conversation: Conversation::new(participant_id),
        }
    }

    pub fn participant_id(&self) -> &str {
        &self.conversation.participant_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.conversation.messages
    }

    pub fn current_mood(&self) -> MoodLabel {
        self.conversation.current_mood
    }

    pub fn input_enabled(&self) -> bool {
        self.is_open && !self.awaiting_reply
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// History arrived from the store (possibly empty). Replaces the transcript.
    Opened { conversation: Conversation },
    /// Stops future turns. A reply already being prepared still lands.
    Closed,
    UserSubmitted(Message),
    /// A button-driven intent (affirmation, advice, emergency) was requested.
    AssistantRequested,
    /// `profile` is present when the reply answers analysed user text.
    AssistantReplied {
        message: Message,
        profile: Option<MoodProfile>,
    },
    /// Explicit pick from the mood selector.
    MoodSelected(MoodLabel),
    /// Inline notice after a failed save. Already-rendered turns stay.
    PersistenceFailed(Message),
}

pub fn reduce(session: &ChatSession, action: SessionAction) -> Result<ChatSession, ChatError> {
    let mut next = session.clone();
    match action {
        SessionAction::Opened { conversation } => {
            next.conversation.messages = conversation.messages;
            next.conversation.current_mood = conversation.current_mood;
            next.is_open = true;
            next.awaiting_reply = false;
        }
        SessionAction::Closed => {
            next.is_open = false;
        }
        SessionAction::UserSubmitted(message) => {
            ensure_can_start_turn(session)?;
            if message.content.trim().is_empty() {
                return Err(ChatError::EmptyMessage);
            }
            next.conversation.append(message);
            next.awaiting_reply = true;
        }
        SessionAction::AssistantRequested => {
            ensure_can_start_turn(session)?;
            next.awaiting_reply = true;
        }
        SessionAction::AssistantReplied { message, profile } => {
            next.conversation.append(message);
            if let Some(profile) = profile {
                next.conversation.observe(&profile);
            }
            next.awaiting_reply = false;
        }
        SessionAction::MoodSelected(mood) => {
            next.conversation.current_mood = mood;
        }
        SessionAction::PersistenceFailed(notice) => {
            next.conversation.append(notice);
        }
    }
    Ok(next)
}

fn ensure_can_start_turn(session: &ChatSession) -> Result<(), ChatError> {
    if !session.is_open {
        return Err(ChatError::SessionClosed);
    }
    if session.awaiting_reply {
        return Err(ChatError::TurnInFlight);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Tone;

    fn open_session() -> ChatSession {
        reduce(
            &ChatSession::new("p1", "Ana"),
            SessionAction::Opened {
                conversation: Conversation::new("p1"),
            },
        )
        .unwrap()
    }

    fn reply(text: &str) -> Message {
        Message::from_assistant(text, Tone::Carinoso, None)
    }

    #[test]
    fn new_session_is_closed() {
        let session = ChatSession::new("p1", "Ana");
        assert!(!session.input_enabled());
        assert_eq!(
            reduce(&session, SessionAction::UserSubmitted(Message::from_user("hola"))),
            Err(ChatError::SessionClosed)
        );
    }

    #[test]
    fn submit_disables_input_until_reply() {
        let session = open_session();
        let session =
            reduce(&session, SessionAction::UserSubmitted(Message::from_user("hola"))).unwrap();
        assert!(session.awaiting_reply);
        assert!(!session.input_enabled());

        let overlapping =
            reduce(&session, SessionAction::UserSubmitted(Message::from_user("¿sigues?")));
        assert_eq!(overlapping, Err(ChatError::TurnInFlight));

        let session = reduce(
            &session,
            SessionAction::AssistantReplied {
                message: reply("Aquí estoy"),
                profile: None,
            },
        )
        .unwrap();
        assert!(session.input_enabled());
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn blank_submission_is_rejected() {
        let session = open_session();
        assert_eq!(
            reduce(&session, SessionAction::UserSubmitted(Message::from_user("   "))),
            Err(ChatError::EmptyMessage)
        );
    }

    #[test]
    fn reply_after_close_still_lands() {
        let session = open_session();
        let session =
            reduce(&session, SessionAction::UserSubmitted(Message::from_user("hola"))).unwrap();
        let session = reduce(&session, SessionAction::Closed).unwrap();
        let session = reduce(
            &session,
            SessionAction::AssistantReplied {
                message: reply("Hasta pronto"),
                profile: None,
            },
        )
        .unwrap();
        assert_eq!(session.messages().len(), 2);
        assert!(!session.input_enabled());
    }

    #[test]
    fn significant_reply_updates_badge_trivial_does_not() {
        let mut sad = MoodProfile::for_label(MoodLabel::Sad);
        sad.sentiment = -0.8;

        let session = reduce(
            &open_session(),
            SessionAction::AssistantReplied {
                message: reply("Lo siento"),
                profile: Some(sad),
            },
        )
        .unwrap();
        assert_eq!(session.current_mood(), MoodLabel::Sad);

        let session = reduce(
            &session,
            SessionAction::AssistantReplied {
                message: reply("Cuéntame más"),
                profile: Some(MoodProfile::baseline()),
            },
        )
        .unwrap();
        assert_eq!(session.current_mood(), MoodLabel::Sad);
    }

    #[test]
    fn mood_selector_always_wins() {
        let session = reduce(&open_session(), SessionAction::MoodSelected(MoodLabel::Motivated))
            .unwrap();
        assert_eq!(session.current_mood(), MoodLabel::Motivated);
    }

    #[test]
    fn open_replaces_transcript_and_keeps_participant() {
        let mut loaded = Conversation::new("someone-else");
        loaded.messages.push(Message::from_user("antes"));
        loaded.current_mood = MoodLabel::Stressed;

        let session = reduce(
            &ChatSession::new("p1", "Ana"),
            SessionAction::Opened {
                conversation: loaded,
            },
        )
        .unwrap();
        assert_eq!(session.participant_id(), "p1");
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.current_mood(), MoodLabel::Stressed);
    }

    #[test]
    fn requested_reply_guards_like_a_turn() {
        let session = reduce(&open_session(), SessionAction::AssistantRequested).unwrap();
        assert_eq!(
            reduce(&session, SessionAction::AssistantRequested),
            Err(ChatError::TurnInFlight)
        );
    }
}
