//! Prompt composition for the generation stage.
//!
//! The engine never writes the final answer itself; it hands the
//! generator one composed prompt: fixed system instructions, the
//! requester profile, the assembled policy context, and the question.

use crate::policy::UserContext;

use super::GenerationRequest;

/// Grounding rules for the policy assistant. The generator must answer
/// from the supplied policy blocks only and cite them by number.
pub const SYSTEM_INSTRUCTIONS: &str = "당신은 청년정책 전문 AI 어시스턴트입니다.

**답변 원칙:**
1. 제공된 정책 정보만을 기반으로 답변하고, 추측이나 가상의 정보는 제공하지 않습니다.
2. 정책을 언급할 때는 [1], [2] 형식으로 출처 번호를 표시합니다.
3. 신청기간과 사업기간을 구분하여 안내합니다.
4. 정확한 연락처나 URL이 없으면 해당 기관의 공식 홈페이지를 안내합니다.
5. 불확실한 정보는 해당 기관에 문의하도록 안내합니다.
6. 친근하고 도움이 되는 톤을 유지합니다.";

/// One-line requester profile ("나이: 25세, 거주지: 성북구, 대학생"),
/// `None` when the profile is empty.
pub fn build_profile_summary(user: &UserContext) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(age) = user.age {
        parts.push(format!("나이: {}세", age));
    }
    if let Some(region) = &user.region {
        parts.push(format!("거주지: {}", region));
    }
    if user.student == Some(true) {
        parts.push("대학생".to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Compose the single prompt sent to the generator.
pub fn compose(request: &GenerationRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str(&request.system_instructions);
    prompt.push_str("\n\n");

    if let Some(profile) = &request.profile_summary {
        prompt.push_str(&format!("사용자 정보: {}\n\n", profile));
    }

    prompt.push_str(&format!(
        "정책 정보:\n{}\n\n질문: {}\n\n답변:",
        request.context_text, request.user_message
    ));

    prompt
}
