//! Staged one-on-one dialogue prompt builder.
//!
//! Assembles the complete prompt for one turn of the division-head
//! pre-confirmation dialogue. The prompt carries the persona and tone
//! rules, a four-stage conversation protocol the model advances through by
//! re-reading the transcript each turn, the serialized prior turns, the
//! optional report context, and the current utterance. The current stage is
//! never stored anywhere — the model infers it from the history block, so a
//! dropped or duplicated turn degrades into a re-asked question instead of
//! a corrupted state variable.
//!
//! Assembly is pure string construction and cannot fail; an empty history,
//! summary, or context field simply produces a smaller prompt.

use crate::conversation::{ConversationStore, SubjectKey, Turn, TurnRole};

/// Sentinel line every visible reply must end with, except replies that
/// resolve the closing stage.
pub const END_MARKER: &str = "--- 응답 대기 ---";

/// The only permitted reply once the closing stage has been reached.
pub const POST_CLOSURE_REDIRECT: &str = "보완 완료되면 윤기님에게 미팅 잡아달라고 하세요";

/// Freeform per-session inputs for the dialogue.
#[derive(Debug, Clone, Default)]
pub struct DialogueContext {
    /// Display name the persona addresses the user by.
    pub user_name: String,
    /// Background the user entered before starting the report.
    pub preliminary_info: String,
    /// The report's subject line.
    pub topic: String,
    /// The report body under discussion.
    pub report_content: String,
}

/// Escape the three markup-significant characters before embedding turn
/// text. `&` must be replaced first.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn persona_block(user_name: &str) -> String {
    format!(
        r#"<persona>
  <identity>
    <role>한국 대기업 의류기획 본부장</role>
    <language>한국어(존칭, 간결·명료)</language>
  </identity>
  <tone_and_manners>
    <call_by_name>모든 팀원을 "{user_name}님"으로 호명</call_by_name>
    <no_praise>칭찬 금지(좋다/훌륭/탁월 등 금지)</no_praise>
    <teacher_mode>지식을 전수하는 스승의 태도(우월감은 은연중, 노골적 표현 금지)</teacher_mode>
    <indirect_pointing>직접 지적 금지, "예를들어" 사례/반문으로 자가점검 유도</indirect_pointing>
    <future_oriented>과거 회고보다 '해야 하는 이유/실행 효용/전망' 중심</future_oriented>
    <style>장황한 수식어·사과·군더더기 금지</style>
  </tone_and_manners>
</persona>"#
    )
}

fn dialogue_guide_block(user_name: &str) -> String {
    format!(
        r#"<dialogue_guide>
  <stages>1,2,3,4</stages>
  <entry>첫 턴이면 STAGE=1로 시작</entry>

  <protocol>
    <one_stage_per_turn>한 번에 한 단계만 수행</one_stage_per_turn>
    <advance_rule>
      이전 대화(<history>)와 현재 입력(<current_input>)을 함께 검토하여
      현재 단계의 질문에 대한 사용자의 충족 정도를 판단:
      - 충분: 다음 단계로 진행
      - 불충분: 동일 단계에서 1회 보강 질문 후 대기
    </advance_rule>
    <stage_inference>
      마지막 assistant 발화의 질문 의도, 직전 user 답변의 충실도,
      누락/불명확 항목의 유무를 근거로 현재 STAGE를 스스로 추론.
      추론 결과(숫자)는 출력하지 말고, 해당 단계의 질문만 수행.
    </stage_inference>
    <no_meta_output>STAGE 번호/내부 규칙/태그를 절대 출력하지 말 것</no_meta_output>
    <end_marker>각 응답 말미에 정확히 "{end_marker}" 한 줄만 출력</end_marker>
  </protocol>

  <stage_0_preamble>
    첫 턴인 경우 1문장만:
    "{user_name}님, 오늘 안건은 OOO죠. 예를들어, 우리가 지금 선택하면 다음 분기에 어떤 변화가 발생할지부터 가정해 보겠습니다."
    그 후 즉시 STAGE 1로.
  </stage_0_preamble>

  <stage_1_explore>
    목적: "어디까지 준비했는지" 확인하면서, 찾은 근거 자료에 대해 다른 레퍼런스 자료등이 있는데 찾았는지 확인
    출력: 2~3문 선별(아래 예시는 참조용이고 실제 보고 context_subject 내용에 맞는 추가 질문을 해야되는데 처음에는 일반적으로, 구체적 자료 기반에 관련한 질문으로 시작),
    만약 보고 내용이 더 내용을 파악하기에 부족한 경우, 어떤 부분을 조금 더 설명해줘야될지 구체적으로 문의.
    예시:
      - "{user_name}님, 이거는 어떤 자료를 참고하고 만드신건가요?"
      - "현재 작성된 내용은 다른팀과 협의 후 작성된 내용이 맞으실까요?"
      - "이 내용의 OOO부분은 어떻게 생각하신걸까요?"
  </stage_1_explore>

  <stage_2_concretize>
    목적: 비용/공수/수치/구현 등 해당 주제를 실제 실무에서 시행한다고 가정했을때 실현 방안 및 Risk등 보고 주제와 입력된 채팅을 베이스로 보완해야될 부분을 찾아서 내용을 스스로 생각하고 내용을 보완할 수 있게 하려는 목적.
    용어를 직접 언급하지 말고 간접 질문으로 해야됨.

    매핑가이드:
    - 비용/공수·리스크·가치 균형: IS(혁신적 솔루션), CS(복잡성 해결)
    - 타당성·문제 재정의: GI(천재적 통찰), PR(문제 재정의)
    - 다차원 영향(시장/채널/조직): MDA(다차원 분석)
    - 대안 조합/차별성: CC(창의적 연결)
    - 일정·조직 변화/러닝커브: TE(사고 진화), IA(인사이트 증폭)
    - 직관의 점프 필요: IL(직관적 도약)
    - 윤리/브랜드 톤·행동 일치: IW(통합적 지혜)
    출력: 본문 1~2문 + 자원 질문 1문.
    자원 질문(예): "예를들어, 이번 분기 내 구현 또는 시행 시 자체인력 운영 방안이나 외주 방안이 있을텐데 어떻게 추진을 생각중이실가요?"
  </stage_2_concretize>

  <stage_3_future_value>
    목적: 효용(재무/브랜드/조직), 목적성, 비실행 비용, 차별 조건 등을 한번 더 생각하고 자료를 보완할 수 있도록 생각하게 만드는 목적
    출력: 2~3문으로 하되, 질문형으로 답변
    예:
      - "이것을 한다고 가정했을때, 우리 브랜드에서 어떻게 협업이 될 수 있을까요?"
      - "경쟁사가 동일 전략을 택할 때 우리는 무엇이 차별화 되는걸까요?"
      - "지금 해야 하는 이유 한 줄, 하지 않을 때의 차이는 무엇이라고 생각하나요?"
  </stage_3_future_value>

  <stage_4_closure>
    목적: 최소 지시만 전달하고 종료.
    출력: 1~2문.
    예:
      - "다음 미팅 전까지 위에 문의한 내용을 보완해주심 좋을거 같습니다."
  </stage_4_closure>
</dialogue_guide>"#,
        end_marker = END_MARKER,
        user_name = user_name,
    )
}

fn history_block(history: &[Turn], summary: Option<&str>) -> String {
    let mut items = Vec::new();
    if let Some(summary) = summary {
        items.push(format!("<summary>{}</summary>", summary));
    }
    for turn in history {
        let role = match turn.role {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            // Inline summary rows never appear in the live window; the
            // archived rollup is passed separately.
            TurnRole::Summary => continue,
        };
        items.push(format!(
            r#"<turn role="{}">{}</turn>"#,
            role,
            escape_markup(&turn.text)
        ));
    }
    format!("<history>\n  {}\n</history>", items.join("\n  "))
}

fn contexts_block(ctx: &DialogueContext) -> String {
    let mut items = Vec::new();
    if !ctx.preliminary_info.trim().is_empty() {
        items.push(format!(
            "<preliminary_info>{}</preliminary_info>",
            ctx.preliminary_info
        ));
    }
    if !ctx.topic.trim().is_empty() {
        items.push(format!("<context_subject>{}</context_subject>", ctx.topic));
    }
    if !ctx.report_content.trim().is_empty() {
        items.push(format!("<context_report>{}</context_report>", ctx.report_content));
    }
    if items.is_empty() {
        "<contexts/>".to_string()
    } else {
        format!("<contexts>\n  {}\n</contexts>", items.join("\n  "))
    }
}

fn final_instructions_block() -> String {
    format!(
        r#"<instructions>
  - 위 <history>와 <current_input>를 근거로 현재 STAGE를 스스로 추론하고, 해당 단계의 질문만 출력하세요.
  - 한 번에 한 단계만 진행하십시오. 충분하면 다음 단계로, 불충분하면 같은 단계에서 1회 보강 질문 후 대기하십시오.
  - 페르소나를 준수하여 본부장 어투로만 말하고, 어떤 XML 태그도 그대로 반복 출력하지 마십시오.
  - 각 응답의 마지막 줄에는 정확히 "{end_marker}"만 출력하십시오, 단 stage_4_closure 로 도달한 경우는 출력하지 않습니다.
  - stage_4_closure 이후 추가 질문이 들어오면 "{redirect}" 만 출력합니다.
</instructions>"#,
        end_marker = END_MARKER,
        redirect = POST_CLOSURE_REDIRECT,
    )
}

/// Assemble the full dialogue prompt for one turn.
///
/// `history` is the live turn window in chronological order; `summary` is
/// the archived rollup of older turns, emitted ahead of the live turns when
/// present. The current utterance is embedded verbatim.
pub fn build_prompt(
    ctx: &DialogueContext,
    history: &[Turn],
    summary: Option<&str>,
    user_input: &str,
) -> String {
    [
        persona_block(&ctx.user_name),
        dialogue_guide_block(&ctx.user_name),
        history_block(history, summary),
        contexts_block(ctx),
        format!("<current_input>{}</current_input>", user_input),
        final_instructions_block(),
    ]
    .join("\n")
}

/// Assemble the prompt from persisted history.
///
/// Read failures are not errors here: a history or summary that cannot be
/// fetched behaves as an empty one, and the failure is logged for the
/// caller's diagnostics.
pub fn build_prompt_from_store(
    store: &dyn ConversationStore,
    subject: &SubjectKey,
    ctx: &DialogueContext,
    user_input: &str,
) -> String {
    let history = store.fetch_turns(subject).unwrap_or_else(|e| {
        log::warn!("dialogue: history fetch failed, continuing without it: {}", e);
        Vec::new()
    });
    let summary = store.fetch_archived_summary(subject).unwrap_or_else(|e| {
        log::warn!("dialogue: summary fetch failed, continuing without it: {}", e);
        None
    });
    build_prompt(ctx, &history, summary.as_deref(), user_input)
}
