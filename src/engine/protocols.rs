// txintent — Protocol Search
//
// Resolves a free-text protocol reference ("deposit, USDC, ethereum") to a
// protocol entry-point address by embedding similarity. A top score below
// the confidence threshold means no match at all.

use crate::atoms::error::EngineResult;
use crate::atoms::traits::Embedder;
use crate::atoms::types::ProtocolRecord;
use crate::engine::corpus::Corpus;
use crate::engine::similarity::{rank, MatchResult};
use log::{debug, info};

#[derive(Debug, Clone)]
pub struct ProtocolSearchResult {
    pub suggested: MatchResult<ProtocolRecord>,
    pub other_options: Vec<MatchResult<ProtocolRecord>>,
}

/// Protocol search over one corpus snapshot.
pub struct ProtocolSearcher<'a> {
    corpus: &'a Corpus,
    embedder: &'a dyn Embedder,
    model: &'a str,
    top_n: usize,
    threshold: f64,
}

impl<'a> ProtocolSearcher<'a> {
    pub fn new(corpus: &'a Corpus, embedder: &'a dyn Embedder, model: &'a str, top_n: usize, threshold: f64) -> Self {
        ProtocolSearcher { corpus, embedder, model, top_n, threshold }
    }

    /// Best protocol for `query`, or `None` when the corpus is empty or the
    /// best score is under the threshold.
    pub async fn search_protocol(&self, query: &str) -> EngineResult<Option<ProtocolSearchResult>> {
        let query = query.trim();
        if query.is_empty() || self.corpus.protocols().is_empty() {
            return Ok(None);
        }

        let query_vec = self.embedder.embed(query, self.model).await?;
        let mut ranked = rank(&query_vec, self.corpus.protocols(), |_| true, self.top_n).into_iter();

        let Some(best) = ranked.next() else {
            debug!("[protocol-search] No comparable protocol vectors for '{}'", query);
            return Ok(None);
        };
        if best.score < self.threshold {
            info!(
                "[protocol-search] '{}' best {} scored {:.3} < {:.2}, rejecting",
                query, best.record.id, best.score, self.threshold
            );
            return Ok(None);
        }

        info!("[protocol-search] '{}' → {} ({:.3})", query, best.record.id, best.score);
        Ok(Some(ProtocolSearchResult { suggested: best, other_options: ranked.collect() }))
    }
}
