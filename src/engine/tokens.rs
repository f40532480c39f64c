// txintent — Token Search
//
// Two-phase resolution of free-text token references on one network:
//
//   1. Exact phase (no network I/O). Case-insensitive scan in corpus order:
//      first an equality tier (symbol, name, or any contract address equal to
//      the query), then a containment tier (name or symbol containing the
//      query). The first hit wins. If that token is not usable on the
//      requested network the phase yields nothing.
//   2. Embedding fallback. Runs only when phase 1 found nothing or when
//      alternates are requested. Ranks tokens usable on the network by
//      cosine similarity to the embedded query; the suggested token is
//      removed from the alternates.
//
// `suggested` comes only from phase 1; `other_options` only from phase 2.

use crate::atoms::error::EngineResult;
use crate::atoms::traits::Embedder;
use crate::atoms::types::{ChainPresence, Network, TokenRecord};
use crate::engine::corpus::Corpus;
use crate::engine::similarity::{rank, MatchResult};
use log::{debug, info};
use std::sync::Arc;

/// A phase-1 hit together with how it exists on the requested network.
#[derive(Debug, Clone)]
pub struct SuggestedToken {
    pub token: Arc<TokenRecord>,
    /// Never `Absent`.
    pub presence: ChainPresence,
}

impl SuggestedToken {
    /// Contract address, or `None` for the native asset.
    pub fn contract(&self) -> Option<&str> {
        match &self.presence {
            ChainPresence::Contract(addr) => Some(addr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenSearchResult {
    pub suggested: Option<SuggestedToken>,
    pub other_options: Vec<MatchResult<TokenRecord>>,
}

impl TokenSearchResult {
    /// Symbols of the alternates, best first.
    pub fn alternate_symbols(&self) -> Vec<String> {
        self.other_options.iter().map(|m| m.record.symbol.clone()).collect()
    }
}

/// Token search over one corpus snapshot.
pub struct TokenSearcher<'a> {
    corpus: &'a Corpus,
    embedder: &'a dyn Embedder,
    model: &'a str,
    top_n: usize,
}

impl<'a> TokenSearcher<'a> {
    pub fn new(corpus: &'a Corpus, embedder: &'a dyn Embedder, model: &'a str, top_n: usize) -> Self {
        TokenSearcher { corpus, embedder, model, top_n }
    }

    pub async fn search_token(
        &self,
        query: &str,
        network: &Network,
        with_alternates: bool,
    ) -> EngineResult<TokenSearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(TokenSearchResult::default());
        }

        let suggested = self.find_exact(query, network);
        if let Some(s) = &suggested {
            info!("[token-search] '{}' on {} → {} (exact phase)", query, network.name, s.token.symbol);
        }

        let other_options = if suggested.is_none() || with_alternates {
            let exclude = suggested.as_ref().map(|s| s.token.id.as_str());
            self.search_alternates(query, network, exclude).await?
        } else {
            Vec::new()
        };

        Ok(TokenSearchResult { suggested, other_options })
    }

    /// Phase 1. Synchronous: never touches the embedding service.
    pub fn find_exact(&self, query: &str, network: &Network) -> Option<SuggestedToken> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let tokens = self.corpus.tokens();

        let hit = tokens
            .iter()
            .find(|t| exact_match(t, &needle))
            .or_else(|| tokens.iter().find(|t| contains_match(t, &needle)))?;

        match hit.presence_on(network) {
            ChainPresence::Absent => {
                debug!(
                    "[token-search] '{}' matched {} but it is not usable on {}",
                    query, hit.symbol, network.name
                );
                None
            }
            presence => Some(SuggestedToken { token: Arc::clone(hit), presence }),
        }
    }

    /// Phase 2. Top-N by embedding similarity among tokens usable on `network`.
    async fn search_alternates(
        &self,
        query: &str,
        network: &Network,
        exclude_id: Option<&str>,
    ) -> EngineResult<Vec<MatchResult<TokenRecord>>> {
        let usable = self.corpus.tokens().iter().any(|t| t.is_usable_on(network));
        if !usable {
            debug!("[token-search] No tokens usable on {}, skipping embedding search", network.name);
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query, self.model).await?;
        // One extra slot so dropping the suggested token still leaves top_n.
        let mut ranked = rank(&query_vec, self.corpus.tokens(), |t| t.is_usable_on(network), self.top_n + 1);
        if let Some(id) = exclude_id {
            ranked.retain(|m| m.record.id != id);
        }
        ranked.truncate(self.top_n);

        debug!(
            "[token-search] '{}' on {}: {} alternates{}",
            query,
            network.name,
            ranked.len(),
            ranked.first().map(|m| format!(", best {} ({:.3})", m.record.symbol, m.score)).unwrap_or_default()
        );
        Ok(ranked)
    }
}

fn exact_match(token: &TokenRecord, needle: &str) -> bool {
    token.symbol.to_lowercase() == needle
        || token.name.to_lowercase() == needle
        || token.contracts.values().flatten().any(|addr| addr.to_lowercase() == needle)
}

fn contains_match(token: &TokenRecord, needle: &str) -> bool {
    token.symbol.to_lowercase().contains(needle) || token.name.to_lowercase().contains(needle)
}
