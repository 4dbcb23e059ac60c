//! BM25 keyword ranking over the policy index.
//!
//! Okapi BM25 with the conventional parameters (k1 = 1.2, b = 0.75) over
//! whitespace tokens. Korean policy text tokenizes coarsely this way, but
//! the labeled document blocks repeat the important terms enough for
//! ranking purposes, and the semantic side covers the rest.

use std::collections::HashMap;

use super::index::PolicyIndex;

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;

/// Rank index documents against `query`, best first. Only positive scores
/// are returned, at most `k` of them.
pub fn rank(index: &PolicyIndex, query: &str, k: usize) -> Vec<(usize, f32)> {
    let query_terms = tokenize(query);
    if query_terms.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let docs: Vec<Vec<String>> = index.docs().iter().map(|d| tokenize(&d.text)).collect();
    let doc_count = docs.len() as f32;
    let avg_len = docs.iter().map(|d| d.len() as f32).sum::<f32>() / doc_count;

    // document frequency per query term
    let mut df: HashMap<&str, f32> = HashMap::new();
    for term in &query_terms {
        let n = docs
            .iter()
            .filter(|doc| doc.iter().any(|t| t == term))
            .count() as f32;
        df.insert(term.as_str(), n);
    }

    let mut scored: Vec<(usize, f32)> = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let doc_len = doc.len() as f32;
            let mut score = 0.0;
            for term in &query_terms {
                let tf = doc.iter().filter(|t| *t == term).count() as f32;
                if tf == 0.0 {
                    continue;
                }
                let n = df.get(term.as_str()).copied().unwrap_or(0.0);
                let idf = ((doc_count - n + 0.5) / (n + 0.5) + 1.0).ln();
                let norm = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * doc_len / avg_len);
                score += idf * tf * (BM25_K1 + 1.0) / norm;
            }
            (i, score)
        })
        .filter(|(_, score)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| !t.is_empty())
        .collect()
}
