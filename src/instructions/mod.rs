//! Instruction composition for meeting agents.
//!
//! Builds the ordered instruction list attached to one agent definition,
//! and the team-level collaboration directives. Both builders are pure
//! functions of their inputs: same persona + configuration in, same list
//! out, no error paths. Unknown configuration keys resolve through the
//! documented fallbacks on the enums in [`crate::config`].

pub mod depth;
pub mod frameworks;

use crate::config::{ReasoningDepth, TeamMode, ThinkingFramework};
use crate::persona::Persona;

pub use depth::{depth_instructions, team_depth_line};
pub use frameworks::{overlay_lines, overlay_text};

/// Compose the ordered instruction list for one agent.
///
/// Order is fixed: the persona's behavior-guide lines, then the depth
/// bundle, then the framework overlay (when one is selected). An empty
/// behavior guide contributes nothing; the depth bundle is always present.
pub fn compose_agent_instructions(
    persona: &Persona,
    depth: ReasoningDepth,
    framework: ThinkingFramework,
) -> Vec<String> {
    let mut instructions = persona.behavior_lines();
    instructions.extend(depth_instructions(depth).iter().map(|s| s.to_string()));
    instructions.extend(overlay_lines(framework));
    instructions
}

/// Base directives for coordinate mode: a lead decomposes the task and
/// merges independent contributions.
pub const COORDINATE_INSTRUCTIONS: [&str; 6] = [
    "리더는 문제를 하위 과업으로 분해하고 각 에이전트의 전문성에 맞게 역할을 배정합니다.",
    "각 에이전트는 배정된 과업을 독립적으로 수행하고, 결과를 간결한 요약(핵심 3~5개 불릿)과 근거/출처와 함께 제출합니다.",
    "에이전트 간 직접 토론은 최소화하고, 필요한 경우 리더의 요청에만 응답해 보완합니다.",
    "리더는 모든 산출물을 통합하여 최종 보고서를 작성합니다: 실행요약 → 세부결과(에이전트별 섹션) → 리스크/대안 → 결론.",
    "수치·날짜·출처는 명시적으로 기재하고, 최신성과 신뢰도를 확인합니다.",
    "모든 사고과정 및 내용은 한국어로 작성합니다.",
];

/// Base directives for collaborate mode: bounded-round peer debate toward
/// a joint conclusion.
pub const COLLABORATE_INSTRUCTIONS: [&str; 6] = [
    "각 에이전트는 자신의 역할 관점에서 1차 입장을 제시합니다(핵심 주장/근거/우려).",
    "상반된 주장이 있을 경우, 최대 3라운드까지 반박·재반박을 수행하되, 매 라운드마다 합의 가능 지점을 식별합니다.",
    "합의가 어려운 항목은 가정/전제 차이를 명시하고, 트레이드오프에 대한 절충안을 제시합니다.",
    "최종 단계에서 팀은 공동 결론을 작성합니다: 실행요약(5~8줄) → 합의사항 → 이견/가정 → 권고안 → 후속 액션.",
    "수치·날짜·출처는 명시적으로 기재하고, 최신성과 신뢰도를 확인합니다.",
    "모든 사고과정 및 내용은 한국어로 작성합니다.",
];

/// Compose the team-level directive list: the fixed bundle for the mode
/// followed by one depth-selected closing line.
pub fn team_mode_instructions(mode: TeamMode, depth: ReasoningDepth) -> Vec<String> {
    let base: &[&str] = match mode {
        TeamMode::Coordinate => &COORDINATE_INSTRUCTIONS,
        TeamMode::Collaborate => &COLLABORATE_INSTRUCTIONS,
    };
    let mut instructions: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    instructions.push(team_depth_line(depth).to_string());
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(personality: &str) -> Persona {
        Persona {
            id: 1,
            name: "기획팀장".into(),
            role: "기획 리더".into(),
            personality: personality.into(),
            strategic_focus: "G".into(),
        }
    }

    #[test]
    fn test_compose_order_is_persona_then_depth() {
        let composed =
            compose_agent_instructions(&persona("A\nB"), ReasoningDepth::Mid, ThinkingFramework::None);
        assert_eq!(composed.len(), 2 + depth::DEPTH_MID.len());
        assert_eq!(composed[0], "A");
        assert_eq!(composed[1], "B");
        assert_eq!(composed[2], depth::DEPTH_MID[0]);
        assert_eq!(*composed.last().unwrap(), depth::DEPTH_MID[5]);
    }

    #[test]
    fn test_compose_appends_framework_overlay_last() {
        let composed =
            compose_agent_instructions(&persona("A\nB"), ReasoningDepth::Mid, ThinkingFramework::Gi);
        let gi_lines = overlay_lines(ThinkingFramework::Gi);
        assert_eq!(composed.len(), 2 + depth::DEPTH_MID.len() + gi_lines.len());
        assert_eq!(&composed[2 + depth::DEPTH_MID.len()..], gi_lines.as_slice());
    }

    #[test]
    fn test_compose_with_empty_persona_text() {
        let composed =
            compose_agent_instructions(&persona(""), ReasoningDepth::Low, ThinkingFramework::None);
        assert_eq!(composed.len(), depth::DEPTH_LOW.len());
        assert_eq!(composed[0], depth::DEPTH_LOW[0]);
    }

    #[test]
    fn test_compose_is_deterministic_over_all_combinations() {
        let p = persona("첫째 지침\n둘째 지침");
        for depth in [ReasoningDepth::Low, ReasoningDepth::Mid, ReasoningDepth::High] {
            for fw in ThinkingFramework::ALL {
                let first = compose_agent_instructions(&p, depth, fw);
                let second = compose_agent_instructions(&p, depth, fw);
                assert_eq!(first, second);

                let mut expected = p.behavior_lines();
                expected.extend(depth_instructions(depth).iter().map(|s| s.to_string()));
                expected.extend(overlay_lines(fw));
                assert_eq!(first, expected);
            }
        }
    }

    #[test]
    fn test_unknown_depth_key_matches_explicit_high() {
        let p = persona("A");
        let fallback = compose_agent_instructions(
            &p,
            ReasoningDepth::parse_or_default("definitely-not-a-depth"),
            ThinkingFramework::None,
        );
        let explicit =
            compose_agent_instructions(&p, ReasoningDepth::High, ThinkingFramework::None);
        assert_eq!(fallback, explicit);
    }

    #[test]
    fn test_team_mode_bundle_plus_depth_line() {
        let coordinate = team_mode_instructions(TeamMode::Coordinate, ReasoningDepth::Low);
        assert_eq!(coordinate.len(), 7);
        assert_eq!(coordinate[0], COORDINATE_INSTRUCTIONS[0]);
        assert_eq!(*coordinate.last().unwrap(), team_depth_line(ReasoningDepth::Low));

        let collaborate = team_mode_instructions(TeamMode::Collaborate, ReasoningDepth::High);
        assert_eq!(collaborate.len(), 7);
        assert_eq!(collaborate[0], COLLABORATE_INSTRUCTIONS[0]);
        assert_eq!(*collaborate.last().unwrap(), team_depth_line(ReasoningDepth::High));
    }
}
