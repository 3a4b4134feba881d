//! Persona data model.
//!
//! A persona is one configured meeting participant: a display name, the
//! role it speaks for, a free-text behavior guide, and a strategic goal.
//! Personas are authored and edited through [`store::PersonaStore`]; the
//! instruction composer and prompt builders treat them as read-only values.

pub mod store;

use serde::{Deserialize, Serialize};

pub use store::PersonaStore;

/// Identity key for a persona.
///
/// Session-level overlays (thinking frameworks) are keyed by this id rather
/// than the display name so they survive a rename.
pub type PersonaId = i64;

/// One configured meeting participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Identity key.
    pub id: PersonaId,
    /// Display/selection name. Unique among currently selectable personas.
    pub name: String,
    /// The role this persona represents, e.g. "마케팅 파트 리더".
    pub role: String,
    /// Free-text behavior guide, optionally multi-line. Each line becomes
    /// one instruction item.
    pub personality: String,
    /// Strategic goal text handed to the agent definition.
    pub strategic_focus: String,
}

impl Persona {
    /// Behavior-guide lines in original order.
    ///
    /// Blank lines are dropped; an empty guide yields an empty list.
    pub fn behavior_lines(&self) -> Vec<String> {
        self.personality
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}
