//! Chat session orchestration.
//!
//! `ChatSessionController` owns one participant's session. It runs the
//! analyzer and generator for every turn, paces replies with the thinking
//! delay and hands saves to a single background worker so they reach the
//! store in submission order without blocking the chat.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot};

use crate::config::ChatConfig;
use crate::engine::templates::PERSISTENCE_NOTICE;
use crate::engine::{Intent, MoodAnalyzer, ResponseContext, ResponseGenerator};
use crate::models::enums::{MoodLabel, TimeOfDay};
use crate::models::{Conversation, Message, MoodProfile};
use crate::session::{reduce, ChatError, ChatSession, SessionAction};
use crate::store::{ConversationStateStore, StoreError};

/// One completed user turn as it now sits in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub user: Message,
    pub reply: Message,
    pub profile: MoodProfile,
}

enum PersistCommand {
    Append {
        participant_id: String,
        messages: Vec<Message>,
        profile: Option<MoodProfile>,
        current_mood: MoodLabel,
    },
    Flush(oneshot::Sender<()>),
}

pub struct ChatSessionController<S: ConversationStateStore> {
    store: Arc<S>,
    config: ChatConfig,
    analyzer: MoodAnalyzer,
    generator: ResponseGenerator,
    /// Template picks. Seeded in tests so replies are reproducible.
    rng: StdRng,
    /// Thinking-delay draws, kept apart so pacing never shifts template picks.
    pacing: StdRng,
    session: ChatSession,
    persist_tx: mpsc::UnboundedSender<PersistCommand>,
    failures_rx: mpsc::UnboundedReceiver<StoreError>,
}

impl<S: ConversationStateStore> ChatSessionController<S> {
    /// Must be called inside a Tokio runtime: spawns the save worker.
    pub fn new(
        store: Arc<S>,
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        config: ChatConfig,
    ) -> Self {
        Self::with_rng(
            store,
            participant_id,
            participant_name,
            config,
            StdRng::from_entropy(),
        )
    }

    pub fn with_rng(
        store: Arc<S>,
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        config: ChatConfig,
        rng: StdRng,
    ) -> Self {
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();
        tokio::spawn(persistence_worker(store.clone(), persist_rx, failures_tx));

        Self {
            generator: ResponseGenerator::new(config.fallback_name.clone()),
            analyzer: MoodAnalyzer::new(),
            session: ChatSession::new(participant_id, participant_name),
            store,
            config,
            rng,
            pacing: StdRng::from_entropy(),
            persist_tx,
            failures_rx,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Load history and greet when there is none.
    ///
    /// Pending saves are flushed first. A failed load is not fatal: the
    /// session opens empty and gets the welcome.
    pub async fn open(&mut self) -> &ChatSession {
        self.flush_persistence().await;

        let participant_id = self.session.participant_id().to_string();
        let conversation = match self.store.load_conversation(&participant_id).await {
            Ok(conversation) => conversation,
            Err(e) => {
                tracing::warn!(participant_id = %participant_id, error = %e, "Conversation load failed, starting empty");
                Conversation::new(participant_id.as_str())
            }
        };
        tracing::info!(
            participant_id = %participant_id,
            messages = conversation.messages.len(),
            mood = %conversation.current_mood,
            "Chat session opened"
        );
        self.apply(SessionAction::Opened { conversation });

        if self.session.messages().is_empty() {
            let profile = MoodProfile::for_label(self.session.current_mood());
            let welcome = self.generate(&Intent::Welcome, &profile);
            self.apply(SessionAction::AssistantReplied {
                message: Message::from_assistant(welcome.content, welcome.tone, None),
                profile: None,
            });
        }
        &self.session
    }

    /// Stop accepting turns. A reply already being prepared still lands.
    pub fn close(&mut self) {
        self.apply(SessionAction::Closed);
        tracing::info!(participant_id = %self.session.participant_id(), "Chat session closed");
    }

    /// Explicit pick from the mood selector. Saved with the next turn.
    pub fn select_mood(&mut self, mood: MoodLabel) {
        self.apply(SessionAction::MoodSelected(mood));
    }

    /// Run one ordinary turn: analyze, update the badge, pause, reply, save.
    pub async fn send(&mut self, text: &str) -> Result<Turn, ChatError> {
        self.drain_failures();

        let user = Message::from_user(text);
        self.session = reduce(&self.session, SessionAction::UserSubmitted(user))?;
        let user = self.last_message();

        let profile = self.analyzer.analyze(&user.content);
        tracing::debug!(
            mood = %profile.mood,
            sentiment = profile.sentiment,
            stress = profile.stress_level,
            energy = profile.energy_level,
            "Message analyzed"
        );

        let response = self.generate(&Intent::personal(user.content.as_str()), &profile);
        self.think().await;

        self.apply(SessionAction::AssistantReplied {
            message: Message::from_assistant(response.content, response.tone, Some(profile.sentiment)),
            profile: Some(profile.clone()),
        });
        let reply = self.last_message();

        self.persist(vec![user.clone(), reply.clone()], Some(profile.clone()));
        Ok(Turn {
            user,
            reply,
            profile,
        })
    }

    /// Button-driven reply (affirmation, advice, emergency, welcome).
    /// A personal intent is treated as if its trigger had been typed.
    pub async fn request(&mut self, intent: Intent) -> Result<Message, ChatError> {
        if let Intent::Personal { trigger } = &intent {
            return self.send(trigger).await.map(|turn| turn.reply);
        }

        self.drain_failures();
        self.session = reduce(&self.session, SessionAction::AssistantRequested)?;

        let profile = MoodProfile::for_label(self.session.current_mood());
        let response = self.generate(&intent, &profile);
        self.think().await;

        self.apply(SessionAction::AssistantReplied {
            message: Message::from_assistant(response.content, response.tone, None),
            profile: None,
        });
        let reply = self.last_message();
        tracing::debug!(intent = intent.kind(), tone = ?reply.tone, "Intent answered");

        // No user text was analysed, so the save carries no analysis.
        self.persist(vec![reply.clone()], None);
        Ok(reply)
    }

    /// Wait until every queued save has been attempted, then surface any
    /// failures as notices.
    pub async fn flush_persistence(&mut self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.persist_tx.send(PersistCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
        self.drain_failures();
    }

    fn generate(&mut self, intent: &Intent, profile: &MoodProfile) -> crate::engine::Response {
        let context = ResponseContext::new(TimeOfDay::now(), self.session.current_mood());
        self.generator.respond(
            intent,
            profile,
            &self.session.participant_name,
            &context,
            &mut self.rng,
        )
    }

    async fn think(&mut self) {
        let delay = self.config.thinking_delay;
        if delay.is_none() {
            return;
        }
        let min = delay.min.as_millis() as u64;
        let max = (delay.max.as_millis() as u64).max(min);
        let pause = Duration::from_millis(self.pacing.gen_range(min..=max));
        tokio::time::sleep(pause).await;
    }

    fn persist(&mut self, messages: Vec<Message>, profile: Option<MoodProfile>) {
        let command = PersistCommand::Append {
            participant_id: self.session.participant_id().to_string(),
            messages,
            profile,
            current_mood: self.session.current_mood(),
        };
        if self.persist_tx.send(command).is_err() {
            tracing::error!("Save worker is gone, conversation not persisted");
            self.push_persistence_notice();
        }
    }

    /// One notice per failed save.
    fn drain_failures(&mut self) {
        while self.failures_rx.try_recv().is_ok() {
            tracing::warn!("Surfacing persistence failure to the participant");
            self.push_persistence_notice();
        }
    }

    fn push_persistence_notice(&mut self) {
        let context = ResponseContext::new(TimeOfDay::now(), self.session.current_mood());
        let notice = self
            .generator
            .render(&PERSISTENCE_NOTICE, &self.session.participant_name, &context);
        self.apply(SessionAction::PersistenceFailed(Message::from_assistant(
            notice.content,
            notice.tone,
            None,
        )));
    }

    /// For actions that cannot be refused.
    fn apply(&mut self, action: SessionAction) {
        match reduce(&self.session, action) {
            Ok(next) => self.session = next,
            Err(e) => tracing::warn!(error = %e, "Session action refused"),
        }
    }

    fn last_message(&self) -> Message {
        self.session
            .messages()
            .last()
            .cloned()
            .unwrap_or_else(|| Message::from_user(""))
    }
}

async fn persistence_worker<S: ConversationStateStore>(
    store: Arc<S>,
    mut commands: mpsc::UnboundedReceiver<PersistCommand>,
    failures: mpsc::UnboundedSender<StoreError>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            PersistCommand::Append {
                participant_id,
                messages,
                profile,
                current_mood,
            } => {
                let count = messages.len();
                match store
                    .append_messages(&participant_id, messages, profile, current_mood)
                    .await
                {
                    Ok(()) => {
                        tracing::debug!(participant_id = %participant_id, count, "Conversation saved")
                    }
                    Err(e) => {
                        tracing::warn!(participant_id = %participant_id, error = %e, "Conversation save failed");
                        let _ = failures.send(e);
                    }
                }
            }
            PersistCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::templates;
    use crate::models::enums::{MessageAuthor, Tone};
    use crate::store::{MemoryConversationStore, SqliteConversationStore};
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Delegates to memory but can be told to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryConversationStore,
        fail_loads: AtomicBool,
        fail_saves: AtomicBool,
    }

    impl ConversationStateStore for FlakyStore {
        fn load_conversation(
            &self,
            participant_id: &str,
        ) -> impl Future<Output = Result<Conversation, StoreError>> + Send {
            let fail = self.fail_loads.load(Ordering::SeqCst);
            let inner = self.inner.clone();
            let participant_id = participant_id.to_string();
            async move {
                if fail {
                    return Err(StoreError::Rejected("offline".into()));
                }
                inner.load_conversation(&participant_id).await
            }
        }

        fn append_messages(
            &self,
            participant_id: &str,
            messages: Vec<Message>,
            profile: Option<MoodProfile>,
            current_mood: MoodLabel,
        ) -> impl Future<Output = Result<(), StoreError>> + Send {
            let fail = self.fail_saves.load(Ordering::SeqCst);
            let inner = self.inner.clone();
            let participant_id = participant_id.to_string();
            async move {
                if fail {
                    return Err(StoreError::Rejected("offline".into()));
                }
                inner
                    .append_messages(&participant_id, messages, profile, current_mood)
                    .await
            }
        }
    }

    fn controller<S: ConversationStateStore>(store: Arc<S>) -> ChatSessionController<S> {
        ChatSessionController::with_rng(
            store,
            "p1",
            "Ana",
            ChatConfig::immediate(),
            StdRng::seed_from_u64(11),
        )
    }

    #[tokio::test]
    async fn open_with_empty_history_greets_once() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store.clone());

        chat.open().await;
        assert_eq!(chat.session().messages().len(), 1);
        let welcome = &chat.session().messages()[0];
        assert_eq!(welcome.author, MessageAuthor::Assistant);
        assert!(welcome.content.contains("Ana"));

        // Welcome is never persisted, so reopening greets again instead of stacking.
        chat.open().await;
        assert_eq!(chat.session().messages().len(), 1);
        let stored = store.load_conversation("p1").await.unwrap();
        assert!(stored.messages.is_empty());
    }

    #[tokio::test]
    async fn stressed_message_updates_badge_and_gets_empathy() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store.clone());
        chat.open().await;

        let turn = chat
            .send("estoy muy estresado y agotado, no puedo con todo")
            .await
            .unwrap();
        assert_eq!(turn.profile.mood, MoodLabel::Stressed);
        assert!(turn.profile.stress_level >= 6);
        assert_eq!(turn.reply.tone, Some(Tone::Empatico));
        assert_eq!(chat.session().current_mood(), MoodLabel::Stressed);

        chat.flush_persistence().await;
        let stored = store.load_conversation("p1").await.unwrap();
        assert_eq!(stored.messages.len(), 2);
        assert_eq!(stored.messages[0].id, turn.user.id);
        assert_eq!(stored.messages[1].id, turn.reply.id);
        assert_eq!(stored.current_mood, MoodLabel::Stressed);
    }

    #[tokio::test]
    async fn neutral_message_keeps_badge() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store);
        chat.open().await;
        chat.select_mood(MoodLabel::Sad);

        let turn = chat.send("hoy fui al mercado").await.unwrap();
        assert_eq!(turn.profile.mood, MoodLabel::Neutral);
        assert_eq!(chat.session().current_mood(), MoodLabel::Sad);
    }

    #[tokio::test]
    async fn reopen_restores_history_and_mood() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store.clone());
        chat.open().await;
        chat.send("me siento triste y sin ganas").await.unwrap();
        chat.send("gracias por escucharme").await.unwrap();
        chat.flush_persistence().await;

        let mut again = controller(store);
        again.open().await;
        let before: Vec<_> = chat.session().messages()[1..].iter().map(|m| m.id.clone()).collect();
        let after: Vec<_> = again.session().messages().iter().map(|m| m.id.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(again.session().current_mood(), MoodLabel::Sad);
    }

    #[tokio::test]
    async fn advice_request_is_deterministic_and_saved() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store.clone());
        chat.open().await;

        let reply = chat.request(Intent::advice("stress")).await.unwrap();
        assert!(reply.content.contains("4-7-8"));
        assert_eq!(reply.tone, Some(Tone::Empatico));

        chat.flush_persistence().await;
        let stored = store.load_conversation("p1").await.unwrap();
        assert_eq!(stored.messages.len(), 1);
        assert_eq!(stored.messages[0].id, reply.id);
    }

    #[tokio::test]
    async fn personal_request_runs_a_full_turn() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store);
        chat.open().await;

        let reply = chat
            .request(Intent::personal("estoy feliz"))
            .await
            .unwrap();
        assert_eq!(reply.author, MessageAuthor::Assistant);
        assert_eq!(chat.session().messages().len(), 3);
    }

    #[tokio::test]
    async fn closed_session_refuses_turns() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store);
        chat.open().await;
        chat.close();

        assert_eq!(chat.send("hola").await, Err(ChatError::SessionClosed));
        assert_eq!(
            chat.request(Intent::Affirmation).await,
            Err(ChatError::SessionClosed)
        );
    }

    #[tokio::test]
    async fn blank_message_is_a_no_op() {
        let store = Arc::new(MemoryConversationStore::new());
        let mut chat = controller(store);
        chat.open().await;

        assert_eq!(chat.send("   ").await, Err(ChatError::EmptyMessage));
        assert_eq!(chat.session().messages().len(), 1);
        assert!(chat.session().input_enabled());
    }

    #[tokio::test]
    async fn failed_load_opens_empty_with_welcome() {
        let store = Arc::new(FlakyStore::default());
        store.fail_loads.store(true, Ordering::SeqCst);
        let mut chat = controller(store);

        chat.open().await;
        assert!(chat.session().is_open);
        assert_eq!(chat.session().messages().len(), 1);
    }

    #[tokio::test]
    async fn failed_save_keeps_turn_and_adds_one_notice() {
        let store = Arc::new(FlakyStore::default());
        store.fail_saves.store(true, Ordering::SeqCst);
        let mut chat = controller(store);
        chat.open().await;

        let turn = chat.send("estoy feliz").await.unwrap();
        chat.flush_persistence().await;

        let messages = chat.session().messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].id, turn.user.id);
        assert_eq!(messages[2].id, turn.reply.id);
        assert_eq!(messages[3].tone, Some(templates::PERSISTENCE_NOTICE.tone));
        assert!(messages[3].content.contains("Ana"));

        // Nothing new failed, so no second notice.
        chat.flush_persistence().await;
        assert_eq!(chat.session().messages().len(), 4);
    }

    #[tokio::test]
    async fn saves_reach_sqlite_in_order() {
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let mut chat = controller(store.clone());
        chat.open().await;

        let mut expected = Vec::new();
        for text in ["hola", "estoy motivado", "estoy triste y sin ganas"] {
            let turn = chat.send(text).await.unwrap();
            expected.push(turn.user.id);
            expected.push(turn.reply.id);
        }
        chat.flush_persistence().await;

        let stored = store.load_conversation("p1").await.unwrap();
        let ids: Vec<_> = stored.messages.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, expected);
        assert_eq!(stored.current_mood, MoodLabel::Sad);
    }

    #[tokio::test]
    async fn only_analysed_turns_enter_mood_history() {
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let mut chat = controller(store.clone());
        chat.open().await;

        chat.send("estoy triste y sin ganas").await.unwrap();
        chat.request(Intent::Affirmation).await.unwrap();
        chat.request(Intent::advice("stress")).await.unwrap();
        chat.flush_persistence().await;

        let history = store.mood_history("p1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].profile.mood, MoodLabel::Sad);

        let stored = store.load_conversation("p1").await.unwrap();
        assert_eq!(stored.messages.len(), 4);
    }

    #[tokio::test]
    async fn thinking_delay_does_not_change_replies() {
        let texts = ["hola", "estoy feliz", "me siento solo y triste"];
        let paced_config = ChatConfig {
            thinking_delay: crate::config::ThinkingDelay {
                min: Duration::from_millis(1),
                max: Duration::from_millis(5),
            },
            ..ChatConfig::default()
        };

        let mut immediate = ChatSessionController::with_rng(
            Arc::new(MemoryConversationStore::new()),
            "p1",
            "Ana",
            ChatConfig::immediate(),
            StdRng::seed_from_u64(21),
        );
        let mut paced = ChatSessionController::with_rng(
            Arc::new(MemoryConversationStore::new()),
            "p1",
            "Ana",
            paced_config,
            StdRng::seed_from_u64(21),
        );
        immediate.open().await;
        paced.open().await;

        for text in texts {
            let a = immediate.send(text).await.unwrap();
            let b = paced.send(text).await.unwrap();
            assert_eq!(a.reply.content, b.reply.content);
            assert_eq!(a.reply.tone, b.reply.tone);
        }
        let a = immediate.request(Intent::Affirmation).await.unwrap();
        let b = paced.request(Intent::Affirmation).await.unwrap();
        assert_eq!(a.content, b.content);
    }

    #[tokio::test]
    async fn thinking_delay_pauses_reply() {
        let store = Arc::new(MemoryConversationStore::new());
        let config = ChatConfig {
            thinking_delay: crate::config::ThinkingDelay {
                min: Duration::from_millis(20),
                max: Duration::from_millis(40),
            },
            ..ChatConfig::default()
        };
        let mut chat =
            ChatSessionController::with_rng(store, "p1", "Ana", config, StdRng::seed_from_u64(3));
        chat.open().await;

        let started = std::time::Instant::now();
        chat.send("hola").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
