//! Candidate merging, deduplication, and ranking.
//!
//! Sources hand the engine overlapping result sets. This module flattens
//! them in source order, keeps the first occurrence of every normalized
//! title, rescores everything with one transparent keyword heuristic, and
//! caps the output. Pure functions, no I/O.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::policy::PolicyRecord;

/// Most candidates a query answer may carry
pub const DEFAULT_RESULT_CAP: usize = 8;

const TITLE_WEIGHT: u32 = 3;
const EXTERNAL_BONUS: u32 = 2;

/// Which retrieval path produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Relational store search
    Local,
    /// External catalog
    External,
    /// BM25 + embedding ensemble
    Hybrid,
}

/// One scored retrieval result
#[derive(Debug, Clone)]
pub struct Candidate {
    pub record: PolicyRecord,
    pub relevance_score: f32,
    pub origin: Origin,
}

impl Candidate {
    pub fn new(record: PolicyRecord, origin: Origin) -> Self {
        Self {
            record,
            relevance_score: 0.0,
            origin,
        }
    }
}

/// Dedup key: trimmed, case-folded title.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Merge candidate sets into one ranked, capped list.
///
/// Flattening preserves source order, so the order of `sets` decides who
/// wins a duplicated title. Candidates without a title are dropped.
/// Incoming scores are replaced by the keyword heuristic: every candidate
/// competes under the same measure regardless of which retriever found it.
pub fn merge_and_rank(sets: Vec<Vec<Candidate>>, query: &str, cap: usize) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Candidate> = Vec::new();

    for set in sets {
        for candidate in set {
            let key = normalize_title(&candidate.record.title);
            if key.is_empty() {
                continue;
            }
            if seen.insert(key) {
                merged.push(candidate);
            }
        }
    }

    let keywords: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    for candidate in &mut merged {
        candidate.relevance_score = relevance(candidate, &keywords) as f32;
    }

    // stable sort keeps source order among equal scores
    merged.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    merged.truncate(cap);
    merged
}

fn relevance(candidate: &Candidate, keywords: &[String]) -> u32 {
    let title = candidate.record.title.to_lowercase();
    let body = candidate.record.body.to_lowercase();

    let title_hits = keywords
        .iter()
        .filter(|k| title.contains(k.as_str()))
        .count() as u32;
    let body_hits = keywords
        .iter()
        .filter(|k| body.contains(k.as_str()))
        .count() as u32;
    let bonus = if candidate.origin == Origin::External {
        EXTERNAL_BONUS
    } else {
        0
    };

    title_hits * TITLE_WEIGHT + body_hits + bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Category, PolicyStatus};
    use chrono::Utc;
    use quickcheck_macros::quickcheck;

    fn candidate(title: &str, body: &str, origin: Origin) -> Candidate {
        Candidate::new(
            PolicyRecord {
                id: format!("t_{}", title),
                title: title.to_string(),
                agency: "서울시".to_string(),
                region: "성북구".to_string(),
                categories: vec![Category::Other],
                summary: String::new(),
                body: body.to_string(),
                eligibility: Default::default(),
                benefit: Default::default(),
                apply_method: Default::default(),
                application_period_text: String::new(),
                period_start: None,
                period_end: None,
                status: PolicyStatus::Open,
                source_name: "서울청년포털".to_string(),
                source_url: String::new(),
                updated_at: Utc::now(),
            },
            origin,
        )
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let local = vec![candidate("청년 월세 지원", "local", Origin::Local)];
        let external = vec![candidate("  청년 월세 지원 ", "external", Origin::External)];

        let merged = merge_and_rank(vec![local, external], "월세", DEFAULT_RESULT_CAP);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].origin, Origin::Local);
        assert_eq!(merged[0].record.body, "local");
    }

    #[test]
    fn test_title_hits_outweigh_body_hits() {
        let sets = vec![vec![
            candidate("생활 안내", "월세 월세 월세 관련 안내", Origin::Local),
            candidate("월세 지원", "생활 안내", Origin::Local),
        ]];

        let merged = merge_and_rank(sets, "월세", DEFAULT_RESULT_CAP);
        assert_eq!(merged[0].record.title, "월세 지원");
    }

    #[test]
    fn test_external_bonus_breaks_near_ties() {
        let sets = vec![vec![
            candidate("청년 수당 안내", "수당", Origin::Local),
            candidate("청년 수당 정보", "수당", Origin::External),
        ]];

        let merged = merge_and_rank(sets, "수당", DEFAULT_RESULT_CAP);
        assert_eq!(merged[0].origin, Origin::External);
    }

    #[test]
    fn test_equal_scores_keep_source_order() {
        let sets = vec![vec![
            candidate("정책 하나", "", Origin::Local),
            candidate("정책 둘", "", Origin::Local),
            candidate("정책 셋", "", Origin::Local),
        ]];

        let merged = merge_and_rank(sets, "무관한 검색어", DEFAULT_RESULT_CAP);
        let titles: Vec<_> = merged.iter().map(|c| c.record.title.as_str()).collect();
        assert_eq!(titles, vec!["정책 하나", "정책 둘", "정책 셋"]);
    }

    #[test]
    fn test_cap_truncates() {
        let sets = vec![(0..20)
            .map(|i| candidate(&format!("정책 {}", i), "", Origin::Local))
            .collect()];

        let merged = merge_and_rank(sets, "정책", 8);
        assert_eq!(merged.len(), 8);
    }

    #[test]
    fn test_untitled_candidates_dropped() {
        let sets = vec![vec![
            candidate("", "본문", Origin::Local),
            candidate("   ", "본문", Origin::Local),
            candidate("정책", "본문", Origin::Local),
        ]];

        let merged = merge_and_rank(sets, "정책", DEFAULT_RESULT_CAP);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_empty_input_empty_output() {
        assert!(merge_and_rank(Vec::new(), "청년", DEFAULT_RESULT_CAP).is_empty());
        assert!(merge_and_rank(vec![Vec::new(), Vec::new()], "청년", 8).is_empty());
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let sets = vec![
            vec![
                candidate("청년 월세 지원", "월세 지원 상세", Origin::Local),
                candidate("청년 취업 성공 패키지", "취업 지원", Origin::Local),
            ],
            vec![
                candidate("청년 창업 자금", "창업 대출", Origin::External),
                candidate("청년 월세 지원", "중복", Origin::External),
            ],
        ];

        let first = merge_and_rank(sets, "청년 월세", DEFAULT_RESULT_CAP);
        let second = merge_and_rank(vec![first.clone()], "청년 월세", DEFAULT_RESULT_CAP);

        let first_ids: Vec<_> = first.iter().map(|c| c.record.id.as_str()).collect();
        let second_ids: Vec<_> = second.iter().map(|c| c.record.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[quickcheck]
    fn prop_output_bounded_by_input_and_cap(titles: Vec<String>, cap: usize) -> bool {
        let cap = cap % 32;
        let total = titles.len();
        let sets = vec![titles
            .iter()
            .map(|t| candidate(t, "", Origin::Local))
            .collect()];

        let merged = merge_and_rank(sets, "청년", cap);
        merged.len() <= total.min(cap)
    }

    #[quickcheck]
    fn prop_no_duplicate_titles(titles: Vec<String>) -> bool {
        let sets = vec![titles
            .iter()
            .map(|t| candidate(t, "", Origin::Local))
            .collect()];

        let merged = merge_and_rank(sets, "청년", usize::MAX);
        let mut seen = HashSet::new();
        merged
            .iter()
            .all(|c| seen.insert(normalize_title(&c.record.title)))
    }
}
