//! # Roundtable
//!
//! Core library of a multi-persona meeting simulator. A caller configures
//! a panel of role-played team-lead personas, and this crate turns that
//! configuration into the prompt material an external LLM runtime
//! executes: per-agent instruction lists for team discussions, and a
//! staged four-phase prompt for the one-on-one division-head dialogue.
//! Conversation turns are persisted through a pluggable store so the
//! staged dialogue can be re-derived from its own transcript every turn.
//!
//! The crate is deliberately free of internal concurrency: each component
//! is a pure function of its inputs plus the two collaborator seams
//! ([`conversation::ConversationStore`] and [`llm::TextGeneration`]).

pub mod config;
pub mod conversation;
pub mod dialogue;
pub mod errors;
pub mod instructions;
pub mod llm;
pub mod persona;
pub mod session;
pub mod team;

pub use config::{ReasoningDepth, RunConfig, TeamMode, ThinkingFramework};
pub use conversation::{ConversationStore, SqliteConversationStore, SubjectKey, Turn, TurnRole};
pub use dialogue::{build_prompt, DialogueContext, END_MARKER, POST_CLOSURE_REDIRECT};
pub use errors::{ConfigurationError, GenerationError, StoreError};
pub use instructions::{compose_agent_instructions, team_mode_instructions};
pub use llm::{OpenAiChat, TextGeneration};
pub use persona::{Persona, PersonaStore};
pub use session::{DialogueSession, TurnOutcome};
pub use team::{build_agents, run_discussion, AgentSpec, TeamRuntime};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
