//! One-on-one dialogue session orchestration.
//!
//! Drives a single user turn end-to-end against the persistence and
//! generation seams: sequence the user's utterance, persist it, assemble
//! the staged prompt from history, generate the reply, persist that too,
//! and let the store roll up old turns.
//!
//! Persistence failures never abort a turn. Reads degrade to an empty
//! history (a new conversation), and writes that fail are collected on the
//! returned outcome so the caller can surface them next to the reply
//! instead of losing the generated text.

use std::sync::Arc;

use crate::conversation::{ConversationStore, SubjectKey, TurnRole};
use crate::dialogue::{build_prompt_from_store, DialogueContext};
use crate::errors::{GenerationError, StoreError};
use crate::llm::TextGeneration;

/// Result of one dialogue turn.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The generated reply.
    pub reply: String,
    /// Persistence failures encountered while recording the turn.
    pub store_errors: Vec<StoreError>,
}

impl TurnOutcome {
    /// Whether both turns were recorded cleanly.
    pub fn fully_persisted(&self) -> bool {
        self.store_errors.is_empty()
    }
}

/// A staged dialogue bound to one subject thread.
pub struct DialogueSession {
    store: Arc<dyn ConversationStore>,
    generator: Arc<dyn TextGeneration>,
    subject: SubjectKey,
    context: DialogueContext,
}

impl DialogueSession {
    /// Bind a session to an explicit subject thread.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        generator: Arc<dyn TextGeneration>,
        subject: SubjectKey,
        context: DialogueContext,
    ) -> Self {
        Self { store, generator, subject, context }
    }

    /// Start a fresh subject thread for the context's user.
    pub fn start_new(
        store: Arc<dyn ConversationStore>,
        generator: Arc<dyn TextGeneration>,
        context: DialogueContext,
    ) -> Self {
        let last = store.last_subject_seq(&context.user_name).unwrap_or_else(|e| {
            log::warn!("session: subject lookup failed, starting from 0: {}", e);
            0
        });
        let subject = SubjectKey::new(context.user_name.clone(), last + 1);
        Self::new(store, generator, subject, context)
    }

    /// Continue the user's most recent subject thread, or start the first
    /// one when none exists.
    pub fn resume_latest(
        store: Arc<dyn ConversationStore>,
        generator: Arc<dyn TextGeneration>,
        context: DialogueContext,
    ) -> Self {
        let last = store.last_subject_seq(&context.user_name).unwrap_or_else(|e| {
            log::warn!("session: subject lookup failed, starting from 0: {}", e);
            0
        });
        let subject = SubjectKey::new(context.user_name.clone(), last.max(1));
        Self::new(store, generator, subject, context)
    }

    /// The subject thread this session appends to.
    pub fn subject(&self) -> &SubjectKey {
        &self.subject
    }

    fn next_sequence(&self, store_errors: &mut Vec<StoreError>) -> i64 {
        match self.store.fetch_latest_sequence(&self.subject) {
            Ok(latest) => latest + 1,
            Err(e) => {
                log::warn!("session: sequence lookup failed, assuming fresh subject: {}", e);
                store_errors.push(e);
                1
            }
        }
    }

    /// Run one full dialogue turn for `user_input`.
    ///
    /// Only a generation failure aborts; the prompt is still assembled
    /// (from whatever history was readable) and the reply returned even
    /// when persistence is limping.
    pub async fn respond(&self, user_input: &str) -> Result<TurnOutcome, GenerationError> {
        let mut store_errors = Vec::new();

        let user_seq = self.next_sequence(&mut store_errors);
        if let Err(e) =
            self.store
                .append_turn(&self.subject, user_seq, TurnRole::User, user_input)
        {
            log::error!("session: failed to record user turn: {}", e);
            store_errors.push(e);
        }

        let prompt =
            build_prompt_from_store(self.store.as_ref(), &self.subject, &self.context, user_input);
        let reply = self.generator.generate(&prompt).await?;

        let assistant_seq = self.next_sequence(&mut store_errors).max(user_seq + 1);
        if let Err(e) =
            self.store
                .append_turn(&self.subject, assistant_seq, TurnRole::Assistant, &reply)
        {
            log::error!("session: failed to record assistant turn: {}", e);
            store_errors.push(e);
        }

        if let Err(e) = self.store.maybe_archive(&self.subject) {
            log::error!("session: archive rollup failed: {}", e);
            store_errors.push(e);
        }

        Ok(TurnOutcome { reply, store_errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::SqliteConversationStore;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct ScriptedGenerator {
        reply: String,
    }

    #[async_trait]
    impl TextGeneration for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            // The session must hand a fully assembled prompt over.
            assert!(prompt.contains("<persona>"));
            assert!(prompt.contains("<current_input>"));
            Ok(self.reply.clone())
        }
    }

    fn context() -> DialogueContext {
        DialogueContext {
            user_name: "홍길동".into(),
            preliminary_info: String::new(),
            topic: "신규 라인업".into(),
            report_content: "보고 본문".into(),
        }
    }

    fn sqlite_store(dir: &tempfile::TempDir) -> Arc<SqliteConversationStore> {
        Arc::new(SqliteConversationStore::new(dir.path().join("talk.db")).unwrap())
    }

    #[tokio::test]
    async fn test_respond_persists_question_then_answer() {
        let dir = tempfile::tempdir().unwrap();
        let store = sqlite_store(&dir);
        let generator = Arc::new(ScriptedGenerator { reply: "어떤 자료를 참고하셨나요?".into() });
        let session =
            DialogueSession::start_new(store.clone(), generator, context());

        let outcome = session.respond("보고 검토 부탁드립니다").await.unwrap();
        assert_eq!(outcome.reply, "어떤 자료를 참고하셨나요?");
        assert!(outcome.fully_persisted());

        let turns = store.fetch_turns(session.subject()).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[0].text, "보고 검토 부탁드립니다");
        assert_eq!(turns[1].role, TurnRole::Assistant);
        assert_eq!(store.fetch_latest_sequence(session.subject()).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_start_new_bumps_subject_counter() {
        let dir = tempfile::tempdir().unwrap();
        let store = sqlite_store(&dir);
        let generator = Arc::new(ScriptedGenerator { reply: "답변".into() });

        let first = DialogueSession::start_new(store.clone(), generator.clone(), context());
        assert_eq!(first.subject().subject_seq, 1);
        first.respond("첫 보고").await.unwrap();

        let second = DialogueSession::start_new(store.clone(), generator.clone(), context());
        assert_eq!(second.subject().subject_seq, 2);

        let resumed = DialogueSession::resume_latest(store, generator, context());
        assert_eq!(resumed.subject().subject_seq, 1);
    }

    #[tokio::test]
    async fn test_consecutive_turns_extend_the_same_thread() {
        let dir = tempfile::tempdir().unwrap();
        let store = sqlite_store(&dir);
        let generator = Arc::new(ScriptedGenerator { reply: "답변".into() });
        let session = DialogueSession::start_new(store.clone(), generator, context());

        session.respond("첫 질문").await.unwrap();
        session.respond("두번째 질문").await.unwrap();

        assert_eq!(store.fetch_latest_sequence(session.subject()).unwrap(), 4);
        let turns = store.fetch_turns(session.subject()).unwrap();
        assert_eq!(turns[2].text, "두번째 질문");
    }
}
