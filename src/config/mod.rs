//! Run configuration values.
//!
//! Everything here is a plain value the caller snapshots per request:
//! reasoning depth, team aggregation mode, per-persona thinking-framework
//! overlays, and the participant selection. None of it is persisted with
//! the personas themselves — the framework overlay in particular is keyed
//! by persona id so it survives a rename, and lives only for the duration
//! of one run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::persona::PersonaId;

/// Coarse verbosity/rigor dial for agent instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningDepth {
    /// Quick answers, minimal search, bullet summaries.
    Low,
    /// Balanced accuracy and speed.
    Mid,
    /// Exhaustive verification and structured reporting.
    High,
}

impl Default for ReasoningDepth {
    fn default() -> Self {
        ReasoningDepth::Mid
    }
}

impl ReasoningDepth {
    /// Configuration key for this depth.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningDepth::Low => "low",
            ReasoningDepth::Mid => "mid",
            ReasoningDepth::High => "high",
        }
    }

    /// Parse a configuration key.
    ///
    /// Unknown keys fall back to [`ReasoningDepth::High`]; callers that
    /// need strict validation should match on the key themselves first.
    pub fn parse_or_default(key: &str) -> Self {
        match key {
            "low" => ReasoningDepth::Low,
            "mid" => ReasoningDepth::Mid,
            _ => ReasoningDepth::High,
        }
    }
}

/// Aggregation style for multi-agent team output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamMode {
    /// A leading agent decomposes the task and merges independent
    /// contributions.
    Coordinate,
    /// Peer agents debate over bounded rounds toward a joint conclusion.
    Collaborate,
}

impl Default for TeamMode {
    fn default() -> Self {
        TeamMode::Coordinate
    }
}

impl TeamMode {
    /// Configuration key for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamMode::Coordinate => "coordinate",
            TeamMode::Collaborate => "collaborate",
        }
    }

    /// Parse a configuration key, falling back to coordinate mode.
    pub fn parse_or_default(key: &str) -> Self {
        match key {
            "collaborate" => TeamMode::Collaborate,
            _ => TeamMode::Coordinate,
        }
    }
}

/// Named analytical overlay appended verbatim to an agent's instructions.
///
/// Each variant other than [`ThinkingFramework::None`] maps to one fixed
/// formula-and-method text block; see [`crate::instructions::frameworks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingFramework {
    /// No overlay.
    None,
    /// Genius insight formula.
    Gi,
    /// Multi-dimensional analysis.
    Mda,
    /// Creative connection matrix.
    Cc,
    /// Problem redefinition algorithm.
    Pr,
    /// Innovative solution generation.
    Is,
    /// Insight amplification.
    Ia,
    /// Thinking evolution equation.
    Te,
    /// Complexity solution matrix.
    Cs,
    /// Intuitive leap.
    Il,
    /// Integrated wisdom.
    Iw,
}

impl Default for ThinkingFramework {
    fn default() -> Self {
        ThinkingFramework::None
    }
}

impl ThinkingFramework {
    /// All selectable variants, in display order.
    pub const ALL: [ThinkingFramework; 11] = [
        ThinkingFramework::None,
        ThinkingFramework::Gi,
        ThinkingFramework::Mda,
        ThinkingFramework::Cc,
        ThinkingFramework::Pr,
        ThinkingFramework::Is,
        ThinkingFramework::Ia,
        ThinkingFramework::Te,
        ThinkingFramework::Cs,
        ThinkingFramework::Il,
        ThinkingFramework::Iw,
    ];

    /// Configuration key for this framework.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingFramework::None => "none",
            ThinkingFramework::Gi => "gi",
            ThinkingFramework::Mda => "mda",
            ThinkingFramework::Cc => "cc",
            ThinkingFramework::Pr => "pr",
            ThinkingFramework::Is => "is",
            ThinkingFramework::Ia => "ia",
            ThinkingFramework::Te => "te",
            ThinkingFramework::Cs => "cs",
            ThinkingFramework::Il => "il",
            ThinkingFramework::Iw => "iw",
        }
    }

    /// Korean display label shown in the framework selector.
    pub fn label(&self) -> &'static str {
        match self {
            ThinkingFramework::None => "기본(없음)",
            ThinkingFramework::Gi => "천재적 통찰 공식(GI)",
            ThinkingFramework::Mda => "다차원 분석(MDA)",
            ThinkingFramework::Cc => "창의적 연결 매트릭스",
            ThinkingFramework::Pr => "문제 재정의 알고리즘",
            ThinkingFramework::Is => "혁신적 솔루션 생성 공식",
            ThinkingFramework::Ia => "인사이트 증폭 공식",
            ThinkingFramework::Te => "사고의 진화 방정식",
            ThinkingFramework::Cs => "복잡성 해결 매트릭스",
            ThinkingFramework::Il => "직관적 도약 공식",
            ThinkingFramework::Iw => "통합적 지혜 공식",
        }
    }

    /// Parse a configuration key, falling back to no overlay.
    pub fn parse_or_default(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|fw| fw.as_str() == key)
            .unwrap_or(ThinkingFramework::None)
    }

    /// Look up a framework by its display label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|fw| fw.label() == label)
    }
}

/// Per-request configuration snapshot for one team run.
///
/// The caller copies its current selection state into this struct before
/// kicking off a run, so concurrent edits to the selection UI cannot bleed
/// into an in-flight discussion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Display names of the personas participating in this run.
    pub selected_names: Vec<String>,
    /// Reasoning depth applied to every participant.
    pub depth: ReasoningDepth,
    /// Team aggregation mode.
    pub mode: TeamMode,
    /// Framework overlay per persona id. Absent ids get no overlay.
    pub frameworks: HashMap<PersonaId, ThinkingFramework>,
}

impl RunConfig {
    /// Overlay for one persona, defaulting to none.
    pub fn framework_for(&self, id: PersonaId) -> ThinkingFramework {
        self.frameworks
            .get(&id)
            .copied()
            .unwrap_or(ThinkingFramework::None)
    }
}
