//! Conversation turn model and the persistence seam.
//!
//! Turns are an append-only sequence per subject, keyed by a monotonically
//! increasing sequence number. Older turns may be rolled up into a single
//! archived summary; when that happens the summary is replayed ahead of the
//! live turns.

pub mod sqlite_store;

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

pub use sqlite_store::SqliteConversationStore;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The human participant.
    User,
    /// The simulated counterpart.
    Assistant,
    /// A rolled-up archive of earlier turns.
    Summary,
}

impl TurnRole {
    /// Storage tag for this role.
    pub fn as_tag(&self) -> &'static str {
        match self {
            TurnRole::User => "Q",
            TurnRole::Assistant => "A",
            TurnRole::Summary => "SUMMARY",
        }
    }

    /// Map a storage tag back to a role. Anything that is not a user or
    /// summary tag reads as an assistant turn.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Q" => TurnRole::User,
            "SUMMARY" => TurnRole::Summary,
            _ => TurnRole::Assistant,
        }
    }
}

/// One persisted conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub role: TurnRole,
    /// The turn's text, verbatim.
    pub text: String,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self { role, text: text.into() }
    }
}

/// Identifies one conversation thread: a user plus a per-user subject
/// counter. Starting a fresh discussion bumps the counter; continuing an
/// old one reuses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectKey {
    /// The user this thread belongs to.
    pub user_name: String,
    /// Per-user subject counter, starting at 1.
    pub subject_seq: i64,
}

impl SubjectKey {
    pub fn new(user_name: impl Into<String>, subject_seq: i64) -> Self {
        Self { user_name: user_name.into(), subject_seq }
    }
}

/// Persistence seam for conversation turns.
///
/// Implementations are free to fail; callers on the read path treat a
/// failure the same as an empty result (a missing history is a new
/// conversation, not an error).
pub trait ConversationStore: Send + Sync {
    /// Append one turn under `subject` at `sequence_no`.
    fn append_turn(
        &self,
        subject: &SubjectKey,
        sequence_no: i64,
        role: TurnRole,
        text: &str,
    ) -> Result<(), StoreError>;

    /// Live turns for `subject` in chronological (oldest-first) order.
    fn fetch_turns(&self, subject: &SubjectKey) -> Result<Vec<Turn>, StoreError>;

    /// Highest sequence number appended for `subject`, 0 when none exist.
    fn fetch_latest_sequence(&self, subject: &SubjectKey) -> Result<i64, StoreError>;

    /// The archived rollup of earlier turns, when one exists.
    fn fetch_archived_summary(&self, subject: &SubjectKey) -> Result<Option<String>, StoreError>;

    /// Highest subject counter used by `user_name`, 0 when the user has no
    /// conversations yet.
    fn last_subject_seq(&self, user_name: &str) -> Result<i64, StoreError>;

    /// Give the store a chance to roll up old turns after an append.
    ///
    /// The default keeps everything live; stores with a bounded live
    /// window override this.
    fn maybe_archive(&self, subject: &SubjectKey) -> Result<(), StoreError> {
        let _ = subject;
        Ok(())
    }
}
