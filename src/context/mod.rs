//! Context assembly for the generation stage.
//!
//! Turns ranked candidates into the numbered Korean policy blocks the
//! generator is prompted with, plus the parallel citation list callers
//! surface to end users. Deterministic: same candidates in, same context
//! and citations out.

use serde::Serialize;

use crate::ranking::Candidate;

/// Context string returned when no candidate survived retrieval
pub const EMPTY_CONTEXT: &str = "관련 정책 정보를 찾을 수 없습니다.";

/// Body text allowance per context block
const BODY_CHARS: usize = 800;
/// Snippet allowance per citation, before the ellipsis
const SNIPPET_CHARS: usize = 200;

/// One user-facing reference, parallel to a `[정책 N]` block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    /// `ref_N`, matching the block number
    pub id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Operating agency
    pub source: String,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Assemble the generation context and citations from ranked candidates.
///
/// An empty candidate list yields the sentinel context and no citations,
/// never an error.
pub fn assemble(candidates: &[Candidate]) -> (String, Vec<Citation>) {
    if candidates.is_empty() {
        return (EMPTY_CONTEXT.to_string(), Vec::new());
    }

    let mut blocks = Vec::with_capacity(candidates.len());
    let mut citations = Vec::with_capacity(candidates.len());

    for (i, candidate) in candidates.iter().enumerate() {
        let n = i + 1;
        blocks.push(context_block(candidate, n));
        citations.push(citation(candidate, n));
    }

    (blocks.join("\n"), citations)
}

fn context_block(candidate: &Candidate, n: usize) -> String {
    let record = &candidate.record;

    let categories = record
        .categories
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");
    let url = non_empty(&record.source_url, "URL 없음");

    format!(
        "\n[정책 {}]\n제목: {}\n기관: {}\n지역: {}\n카테고리: {}\n상태: {}\n출처: {}\n\n내용:\n{}...\n\n---\n",
        n,
        non_empty(&record.title, "제목 없음"),
        non_empty(&record.agency, "기관 없음"),
        non_empty(&record.region, "지역 없음"),
        categories,
        record.status.label(),
        url,
        truncate_chars(&record.body, BODY_CHARS),
    )
}

fn citation(candidate: &Candidate, n: usize) -> Citation {
    let record = &candidate.record;

    let mut snippet = truncate_chars(&record.body, SNIPPET_CHARS)
        .replace('\n', " ")
        .trim()
        .to_string();
    if record.body.chars().count() > SNIPPET_CHARS {
        snippet.push_str("...");
    }

    Citation {
        id: format!("ref_{}", n),
        title: non_empty(&record.title, "제목 없음").to_string(),
        url: non_empty(&record.source_url, "#").to_string(),
        snippet,
        source: non_empty(&record.agency, "기관 없음").to_string(),
        last_updated: record.updated_at,
    }
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// First `max` characters, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Category, PolicyRecord, PolicyStatus};
    use crate::ranking::Origin;
    use chrono::Utc;

    fn candidate(title: &str, body: &str) -> Candidate {
        Candidate::new(
            PolicyRecord {
                id: format!("t_{}", title),
                title: title.to_string(),
                agency: "성북구청".to_string(),
                region: "성북구".to_string(),
                categories: vec![Category::Housing, Category::Welfare],
                summary: String::new(),
                body: body.to_string(),
                eligibility: Default::default(),
                benefit: Default::default(),
                apply_method: Default::default(),
                application_period_text: "상시".to_string(),
                period_start: None,
                period_end: None,
                status: PolicyStatus::Ongoing,
                source_name: "온통청년".to_string(),
                source_url: "https://www.youthcenter.go.kr/go/1".to_string(),
                updated_at: Utc::now(),
            },
            Origin::External,
        )
    }

    #[test]
    fn test_empty_candidates_yield_sentinel() {
        let (context, citations) = assemble(&[]);
        assert_eq!(context, EMPTY_CONTEXT);
        assert!(citations.is_empty());
    }

    #[test]
    fn test_blocks_are_numbered_and_separated() {
        let candidates = vec![
            candidate("청년 월세 지원", "본문 하나"),
            candidate("청년 수당", "본문 둘"),
        ];

        let (context, citations) = assemble(&candidates);
        assert!(context.contains("[정책 1]"));
        assert!(context.contains("[정책 2]"));
        assert!(context.contains("---"));
        assert!(context.contains("제목: 청년 월세 지원"));
        assert!(context.contains("카테고리: 주거, 복지"));
        assert!(context.contains("상태: 상시모집"));
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].id, "ref_1");
        assert_eq!(citations[1].id, "ref_2");
    }

    #[test]
    fn test_body_truncated_at_800_chars() {
        let long_body = "가".repeat(1000);
        let (context, _) = assemble(&[candidate("긴 정책", &long_body)]);

        // 800 chars of body followed by the ellipsis
        let expected = format!("{}...", "가".repeat(800));
        assert!(context.contains(&expected));
        assert!(!context.contains(&"가".repeat(801)));
    }

    #[test]
    fn test_short_body_still_ellipsized_in_context() {
        let (context, _) = assemble(&[candidate("짧은 정책", "짧은 본문")]);
        assert!(context.contains("짧은 본문..."));
    }

    #[test]
    fn test_snippet_caps_at_200_chars_plus_ellipsis() {
        let long_body = "나".repeat(500);
        let (_, citations) = assemble(&[candidate("정책", &long_body)]);

        let snippet = &citations[0].snippet;
        assert_eq!(snippet.chars().count(), 203);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_short_snippet_has_no_ellipsis() {
        let (_, citations) = assemble(&[candidate("정책", "짧은 본문")]);
        assert_eq!(citations[0].snippet, "짧은 본문");
    }

    #[test]
    fn test_snippet_newlines_become_spaces() {
        let (_, citations) = assemble(&[candidate("정책", "첫 줄\n둘째 줄\n셋째 줄")]);
        assert_eq!(citations[0].snippet, "첫 줄 둘째 줄 셋째 줄");
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let mut c = candidate("", "본문");
        c.record.agency = String::new();
        c.record.source_url = String::new();

        let (context, citations) = assemble(&[c]);
        assert!(context.contains("제목: 제목 없음"));
        assert!(context.contains("기관: 기관 없음"));
        assert!(context.contains("출처: URL 없음"));
        assert_eq!(citations[0].title, "제목 없음");
        assert_eq!(citations[0].url, "#");
        assert_eq!(citations[0].source, "기관 없음");
    }
}
