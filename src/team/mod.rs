//! Team composition and the multi-agent execution seam.
//!
//! Builds the agent definitions for a meeting run from the persona roster
//! and the request's [`RunConfig`], and wraps the external runtime's chunk
//! stream with the one output post-processing rule this crate owns:
//! sub-task completion log lines are re-wrapped as inline code so they read
//! as status markers instead of meeting content.

use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RunConfig;
use crate::instructions::{compose_agent_instructions, team_mode_instructions};
use crate::llm::ChunkStream;
use crate::persona::Persona;

/// Display name for the assembled meeting team.
pub const TEAM_NAME: &str = "KS 회의팀";

/// Agent definition handed to the external multi-agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique id for this run's agent instance.
    pub id: Uuid,
    /// Display name, taken from the persona.
    pub name: String,
    /// Role sentence asserting who the agent speaks as.
    pub role_text: String,
    /// Ordered instruction list from the composer.
    pub instructions: Vec<String>,
    /// The persona's strategic goal.
    pub goal_text: String,
}

/// Role sentence for a persona's role label.
fn role_sentence(role: &str) -> String {
    format!("당신은 한국 패션 아웃도어 브랜드의 {} 역할입니다.", role)
}

/// Build the agent definitions for the selected participants.
///
/// Selection is by display name against `personas`; names that match no
/// persona are skipped with a warning. Framework overlays come from the
/// config's id-keyed map, so a renamed persona keeps its overlay.
pub fn build_agents(personas: &[Persona], config: &RunConfig) -> Vec<AgentSpec> {
    let mut agents = Vec::new();
    for name in &config.selected_names {
        let Some(persona) = personas.iter().find(|p| &p.name == name) else {
            log::warn!("team: selected persona {:?} not in roster, skipping", name);
            continue;
        };
        let framework = config.framework_for(persona.id);
        agents.push(AgentSpec {
            id: Uuid::new_v4(),
            name: persona.name.clone(),
            role_text: role_sentence(&persona.role),
            instructions: compose_agent_instructions(persona, config.depth, framework),
            goal_text: persona.strategic_focus.clone(),
        });
    }
    agents
}

/// External multi-agent orchestration runtime.
pub trait TeamRuntime: Send + Sync {
    /// Execute `task` with the given agents and team-level directives,
    /// yielding reply chunks in delivery order.
    fn run(
        &self,
        task: &str,
        agents: Vec<AgentSpec>,
        team_instructions: Vec<String>,
    ) -> ChunkStream;
}

static SUBTASK_LOG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*\)\s+completed in \d+\.\d+s.*").unwrap());

/// Re-wrap sub-task completion log lines as inline code.
///
/// Ordinary chunks pass through untouched.
pub fn decorate_chunk(chunk: &str) -> String {
    if SUBTASK_LOG_LINE.is_match(chunk) {
        format!("\n\n`{}`\n\n", chunk.trim())
    } else {
        chunk.to_string()
    }
}

/// Apply [`decorate_chunk`] across a runtime's chunk stream.
pub fn decorate_stream(stream: ChunkStream) -> ChunkStream {
    Box::pin(stream.map(|chunk| chunk.map(|text| decorate_chunk(&text))))
}

/// Compose agents and team directives from `config` and run the topic
/// through `runtime`, returning the decorated chunk stream.
pub fn run_discussion(
    runtime: &dyn TeamRuntime,
    personas: &[Persona],
    config: &RunConfig,
    topic: &str,
) -> ChunkStream {
    let agents = build_agents(personas, config);
    let team_instructions = team_mode_instructions(config.mode, config.depth);
    decorate_stream(runtime.run(topic, agents, team_instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReasoningDepth, TeamMode, ThinkingFramework};
    use crate::errors::GenerationError;
    use crate::instructions::{depth, overlay_lines};
    use futures::stream;

    fn roster() -> Vec<Persona> {
        vec![
            Persona {
                id: 1,
                name: "기획팀장".into(),
                role: "기획 리더".into(),
                personality: "A\nB".into(),
                strategic_focus: "G".into(),
            },
            Persona {
                id: 2,
                name: "마케팅팀장".into(),
                role: "마케팅 리더".into(),
                personality: String::new(),
                strategic_focus: "M".into(),
            },
        ]
    }

    fn config(names: &[&str]) -> RunConfig {
        RunConfig {
            selected_names: names.iter().map(|s| s.to_string()).collect(),
            depth: ReasoningDepth::Mid,
            mode: TeamMode::Coordinate,
            frameworks: Default::default(),
        }
    }

    #[test]
    fn test_build_agents_selection_and_composition() {
        let agents = build_agents(&roster(), &config(&["기획팀장"]));
        assert_eq!(agents.len(), 1);
        let agent = &agents[0];
        assert_eq!(agent.name, "기획팀장");
        assert_eq!(agent.role_text, "당신은 한국 패션 아웃도어 브랜드의 기획 리더 역할입니다.");
        assert_eq!(agent.goal_text, "G");
        assert_eq!(agent.instructions[0], "A");
        assert_eq!(agent.instructions[1], "B");
        assert_eq!(agent.instructions[2], depth::DEPTH_MID[0]);
    }

    #[test]
    fn test_build_agents_framework_keyed_by_id_survives_rename() {
        let mut personas = roster();
        let mut cfg = config(&["상품기획팀장"]);
        cfg.frameworks.insert(1, ThinkingFramework::Gi);
        // Rename persona 1; the overlay stays attached via the id.
        personas[0].name = "상품기획팀장".into();

        let agents = build_agents(&personas, &cfg);
        assert_eq!(agents.len(), 1);
        let gi = overlay_lines(ThinkingFramework::Gi);
        let tail = &agents[0].instructions[agents[0].instructions.len() - gi.len()..];
        assert_eq!(tail, gi.as_slice());
    }

    #[test]
    fn test_build_agents_skips_unknown_names() {
        let agents = build_agents(&roster(), &config(&["없는팀장", "마케팅팀장"]));
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "마케팅팀장");
    }

    #[test]
    fn test_decorate_wraps_subtask_log_lines() {
        let log_line = "transfer_task_to_member(...) completed in 3.14s";
        assert_eq!(decorate_chunk(log_line), format!("\n\n`{}`\n\n", log_line));
        assert_eq!(decorate_chunk("일반 토론 내용입니다."), "일반 토론 내용입니다.");
        // No decimal duration, no rewrap.
        assert_eq!(decorate_chunk("f() completed in 3s"), "f() completed in 3s");
    }

    struct EchoRuntime;

    impl TeamRuntime for EchoRuntime {
        fn run(
            &self,
            task: &str,
            agents: Vec<AgentSpec>,
            team_instructions: Vec<String>,
        ) -> ChunkStream {
            let chunks = vec![
                Ok(format!("주제: {}", task)),
                Ok(format!("참여자 {}명, 지침 {}개", agents.len(), team_instructions.len())),
                Ok("analyze_market(...) completed in 1.25s".to_string()),
            ];
            Box::pin(stream::iter(chunks))
        }
    }

    #[tokio::test]
    async fn test_run_discussion_decorates_runtime_output() {
        let out: Vec<String> =
            run_discussion(&EchoRuntime, &roster(), &config(&["기획팀장", "마케팅팀장"]), "신제품")
                .map(|c| c.unwrap())
                .collect()
                .await;
        assert_eq!(out[0], "주제: 신제품");
        assert_eq!(out[1], "참여자 2명, 지침 7개");
        assert_eq!(out[2], "\n\n`analyze_market(...) completed in 1.25s`\n\n");
    }

    #[tokio::test]
    async fn test_decorate_stream_passes_errors_through() {
        let stream: ChunkStream = Box::pin(stream::iter(vec![
            Ok("내용".to_string()),
            Err(GenerationError::MalformedResponse { message: "boom".into() }),
        ]));
        let collected: Vec<_> = decorate_stream(stream).collect().await;
        assert!(collected[0].is_ok());
        assert!(collected[1].is_err());
    }
}
