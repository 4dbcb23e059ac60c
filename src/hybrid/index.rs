//! In-process retrieval corpus.
//!
//! Each store record becomes one indexed document: a flattened Korean
//! text block for keyword scoring plus an optional embedding vector for
//! the semantic side.

use crate::policy::PolicyRecord;

/// One searchable document
#[derive(Debug, Clone)]
pub struct IndexedDoc {
    pub record: PolicyRecord,
    /// Flattened text the retrievers score against
    pub text: String,
    pub embedding: Option<Vec<f32>>,
}

/// Document corpus shared by both retrieval sides
#[derive(Debug, Default)]
pub struct PolicyIndex {
    docs: Vec<IndexedDoc>,
}

impl PolicyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<PolicyRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.push(record);
        }
        index
    }

    pub fn push(&mut self, record: PolicyRecord) {
        let text = document_text(&record);
        self.docs.push(IndexedDoc {
            record,
            text,
            embedding: None,
        });
    }

    pub fn docs(&self) -> &[IndexedDoc] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn set_embedding(&mut self, doc_index: usize, embedding: Vec<f32>) {
        if let Some(doc) = self.docs.get_mut(doc_index) {
            doc.embedding = Some(embedding);
        }
    }

    /// True when every document carries an embedding, so cosine ranking
    /// covers the whole corpus.
    pub fn fully_embedded(&self) -> bool {
        !self.docs.is_empty() && self.docs.iter().all(|d| d.embedding.is_some())
    }
}

/// Flatten a record into the labeled block both retrievers score against.
fn document_text(record: &PolicyRecord) -> String {
    let categories = record
        .categories
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "제목: {}\n기관: {}\n지역: {}\n카테고리: {}\n요약: {}\n상세내용: {}\n출처: {}",
        record.title,
        record.agency,
        record.region,
        categories,
        record.summary,
        record.body,
        record.source_url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Category, PolicyStatus};
    use chrono::Utc;

    fn record(title: &str) -> PolicyRecord {
        PolicyRecord {
            id: format!("t_{}", title),
            title: title.to_string(),
            agency: "서울시".to_string(),
            region: "성북구".to_string(),
            categories: vec![Category::Housing, Category::Welfare],
            summary: "무주택 청년 대상".to_string(),
            body: "월 20만원 임차료 지원".to_string(),
            eligibility: Default::default(),
            benefit: Default::default(),
            apply_method: Default::default(),
            application_period_text: "상시".to_string(),
            period_start: None,
            period_end: None,
            status: PolicyStatus::Ongoing,
            source_name: "서울청년포털".to_string(),
            source_url: "https://youth.seoul.go.kr".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_document_text_carries_all_fields() {
        let index = PolicyIndex::from_records(vec![record("청년 월세 지원")]);
        let text = &index.docs()[0].text;

        assert!(text.contains("제목: 청년 월세 지원"));
        assert!(text.contains("카테고리: 주거, 복지"));
        assert!(text.contains("상세내용: 월 20만원 임차료 지원"));
        assert!(text.contains("출처: https://youth.seoul.go.kr"));
    }

    #[test]
    fn test_fully_embedded() {
        let mut index = PolicyIndex::from_records(vec![record("a"), record("b")]);
        assert!(!index.fully_embedded());

        index.set_embedding(0, vec![0.1, 0.2]);
        assert!(!index.fully_embedded());

        index.set_embedding(1, vec![0.3, 0.4]);
        assert!(index.fully_embedded());
    }

    #[test]
    fn test_empty_index_not_fully_embedded() {
        assert!(!PolicyIndex::new().fully_embedded());
    }
}
