// txintent — Similarity Index
//
// Brute-force nearest-neighbour ranking by cosine similarity over an
// in-memory corpus. Corpora are small (thousands of rows), so a linear
// scan per query is enough.
//
// Ordering: descending score, ties keep corpus insertion order.
// Candidates whose vector length differs from the query are excluded.

use crate::atoms::types::{ProtocolRecord, TokenRecord};
use std::sync::Arc;

/// A record that carries a precomputed embedding.
pub trait Embedded {
    fn embedding(&self) -> &[f32];
    fn record_id(&self) -> &str;
}

impl Embedded for TokenRecord {
    fn embedding(&self) -> &[f32] {
        &self.embedding
    }
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Embedded for ProtocolRecord {
    fn embedding(&self) -> &[f32] {
        &self.embedding
    }
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// One ranked candidate.
#[derive(Debug, Clone)]
pub struct MatchResult<T> {
    pub score: f64,
    pub record: Arc<T>,
}

/// Cosine similarity between two vectors.
/// Zero when either norm is zero, the lengths differ, or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    let sim = dot / denom;
    if sim.is_finite() { sim } else { 0.0 }
}

/// Rank `candidates` against `query`, keeping those accepted by `filter`,
/// and return the best `top_n`.
pub fn rank<T, F>(query: &[f32], candidates: &[Arc<T>], filter: F, top_n: usize) -> Vec<MatchResult<T>>
where
    T: Embedded,
    F: Fn(&T) -> bool,
{
    if query.is_empty() || top_n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<MatchResult<T>> = candidates
        .iter()
        .filter(|c| c.embedding().len() == query.len() && filter(c.as_ref()))
        .map(|c| MatchResult { score: cosine_similarity(query, c.embedding()), record: Arc::clone(c) })
        .collect();

    // sort_by is stable: equal scores keep corpus order
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(id: &str, embedding: Vec<f32>) -> Arc<ProtocolRecord> {
        Arc::new(ProtocolRecord { id: id.into(), address: format!("0x{:0>40}", id.len()), embedding })
    }

    #[test]
    fn cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_zero_norm_is_zero_not_nan() {
        let s = cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(s, 0.0);
        assert!(!s.is_nan());
    }

    #[test]
    fn cosine_mismatched_length_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn rank_orders_descending_and_truncates() {
        let corpus = vec![
            protocol("far", vec![0.0, 1.0]),
            protocol("near", vec![1.0, 0.1]),
            protocol("mid", vec![1.0, 1.0]),
        ];
        let ranked = rank(&[1.0, 0.0], &corpus, |_| true, 2);
        let ids: Vec<&str> = ranked.iter().map(|m| m.record.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!(ranked[0].score >= ranked[1].score);
    }

    #[test]
    fn rank_ties_keep_insertion_order() {
        let corpus = vec![
            protocol("first", vec![2.0, 0.0]),
            protocol("second", vec![1.0, 0.0]),
            protocol("third", vec![3.0, 0.0]),
        ];
        let ranked = rank(&[1.0, 0.0], &corpus, |_| true, 5);
        let ids: Vec<&str> = ranked.iter().map(|m| m.record.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn rank_skips_mismatched_dimensions_and_filtered() {
        let corpus = vec![
            protocol("short", vec![1.0]),
            protocol("ok", vec![1.0, 0.0]),
            protocol("blocked", vec![1.0, 0.0]),
        ];
        let ranked = rank(&[1.0, 0.0], &corpus, |p| p.id != "blocked", 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].record.id, "ok");
    }

    #[test]
    fn rank_empty_query_returns_nothing() {
        let corpus = vec![protocol("a", vec![1.0])];
        assert!(rank(&[], &corpus, |_| true, 5).is_empty());
    }
}
