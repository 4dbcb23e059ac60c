//! Keyword-driven category classification.
//!
//! Eight fixed labels cover the youth-policy domain. Classification is a
//! transparent keyword count, not a model: a reviewer must be able to see
//! exactly why a record landed in a category.

use serde::{Deserialize, Serialize};

/// Policy category taxonomy. Declaration order is the tie-break order for
/// equal scores, so [`Category::Employment`] wins a tie against everything
/// below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "취업")]
    Employment,
    #[serde(rename = "창업")]
    Startup,
    #[serde(rename = "주거")]
    Housing,
    #[serde(rename = "교육")]
    Education,
    #[serde(rename = "복지")]
    Welfare,
    #[serde(rename = "문화/예술")]
    Culture,
    #[serde(rename = "참여권리")]
    Participation,
    #[serde(rename = "기타")]
    Other,
}

/// All categories in declaration (tie-break) order
pub const ALL_CATEGORIES: [Category; 8] = [
    Category::Employment,
    Category::Startup,
    Category::Housing,
    Category::Education,
    Category::Welfare,
    Category::Culture,
    Category::Participation,
    Category::Other,
];

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Employment => "취업",
            Category::Startup => "창업",
            Category::Housing => "주거",
            Category::Education => "교육",
            Category::Welfare => "복지",
            Category::Culture => "문화/예술",
            Category::Participation => "참여권리",
            Category::Other => "기타",
        }
    }

    /// Resolve a stored label back to its category
    pub fn from_label(label: &str) -> Option<Category> {
        ALL_CATEGORIES
            .into_iter()
            .find(|category| category.label() == label)
    }

    /// Keywords that vote for this category
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Employment => &["취업", "일자리", "채용", "구직", "인턴", "구직활동"],
            Category::Startup => &["창업", "스타트업", "사업", "기업", "벤처"],
            Category::Housing => &["주거", "월세", "전세", "임대", "주택", "거주"],
            Category::Education => &["교육", "학습", "강의", "연수", "훈련", "스킬"],
            Category::Welfare => &["복지", "지원금", "수당", "급여", "생활비", "의료"],
            Category::Culture => &["문화", "예술", "공연", "전시", "축제", "체험"],
            Category::Participation => &["참여", "권리", "정치", "시민", "봉사", "활동"],
            Category::Other => &["기타", "종합", "통합", "일반"],
        }
    }

    /// Classify a record into exactly one category.
    ///
    /// Per keyword: a title hit scores 3 and skips the body check, a body
    /// hit scores 1. Highest total wins, ties go to the earlier
    /// declaration, and a zero score falls through to [`Category::Other`].
    pub fn classify(title: &str, body: &str) -> Category {
        let title = title.to_lowercase();
        let body = body.to_lowercase();

        let mut best = Category::Other;
        let mut best_score = 0u32;

        for category in ALL_CATEGORIES {
            let mut score = 0u32;
            for keyword in category.keywords() {
                if title.contains(keyword) {
                    score += 3;
                } else if body.contains(keyword) {
                    score += 1;
                }
            }
            // strictly-greater keeps the earliest category on ties
            if score > best_score {
                best = category;
                best_score = score;
            }
        }

        best
    }

    /// Every category the text gives any signal for, strongest first.
    ///
    /// Unlike [`Category::classify`] this can return an empty list; query
    /// text with no category keywords detects nothing rather than
    /// defaulting to 기타.
    pub fn detect(text: &str) -> Vec<Category> {
        let text = text.to_lowercase();

        let mut scored: Vec<(Category, u32)> = ALL_CATEGORIES
            .iter()
            .map(|category| {
                let score = category
                    .keywords()
                    .iter()
                    .filter(|keyword| text.contains(**keyword))
                    .count() as u32;
                (*category, score)
            })
            .filter(|(_, score)| *score > 0)
            .collect();

        // stable sort keeps declaration order within equal scores
        scored.sort_by_key(|(_, score)| std::cmp::Reverse(*score));
        scored.into_iter().map(|(category, _)| category).collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_title_beats_employment_body() {
        let category = Category::classify("청년 창업 지원 프로그램", "취업 준비생도 신청 가능");
        assert_eq!(category, Category::Startup);
    }

    #[test]
    fn test_housing_keywords() {
        let category = Category::classify("청년 월세 한시 특별지원", "무주택 청년의 주거 안정");
        assert_eq!(category, Category::Housing);
    }

    #[test]
    fn test_no_keywords_falls_to_other() {
        let category = Category::classify("알 수 없는 제목", "내용 없음");
        assert_eq!(category, Category::Other);
    }

    #[test]
    fn test_tie_goes_to_declaration_order() {
        // one title keyword each for employment and startup
        let category = Category::classify("취업 창업 통합 상담", "");
        assert_eq!(category, Category::Employment);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let title = "청년 문화 예술 공연 지원";
        let body = "전시 및 축제 참가비 지원";
        let first = Category::classify(title, body);
        for _ in 0..10 {
            assert_eq!(Category::classify(title, body), first);
        }
    }

    #[test]
    fn test_title_weight_dominates() {
        // 주거 once in title (3) vs 교육 keywords twice in body (2)
        let category = Category::classify("주거 지원", "교육 프로그램과 학습 모임 안내");
        assert_eq!(category, Category::Housing);
    }

    #[test]
    fn test_detect_orders_by_signal() {
        let detected = Category::detect("성북구 월세 전세 지원과 취업 상담");
        assert_eq!(detected.first(), Some(&Category::Housing));
        assert!(detected.contains(&Category::Employment));
    }

    #[test]
    fn test_detect_empty_for_no_signal() {
        assert!(Category::detect("안녕하세요").is_empty());
        assert!(Category::detect("아무 관련 없는 문장").is_empty());
    }

    #[test]
    fn test_from_label() {
        assert_eq!(Category::from_label("주거"), Some(Category::Housing));
        assert_eq!(Category::from_label("문화/예술"), Some(Category::Culture));
        assert_eq!(Category::from_label("없는분류"), None);
    }

    #[test]
    fn test_label_serde_round_trip() {
        let json = serde_json::to_string(&Category::Culture).unwrap();
        assert_eq!(json, "\"문화/예술\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Culture);
    }
}
