// txintent — Token & Protocol Corpus
//
// Read-only in-memory snapshot of the token and protocol corpora, each row
// carrying a precomputed embedding. Malformed rows are skipped at load with
// a warning; a bad row never fails the load.
//
// Hot reload: `CorpusStore` holds the current snapshot behind an `Arc`.
// A request clones the `Arc` once and keeps using it even if the store is
// swapped mid-flight, so it never mixes rows from two corpus versions.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{ProtocolRecord, TokenRecord};
use crate::engine::similarity::Embedded;
use log::{info, warn};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Immutable corpus snapshot.
#[derive(Debug, Default)]
pub struct Corpus {
    tokens: Vec<Arc<TokenRecord>>,
    protocols: Vec<Arc<ProtocolRecord>>,
    token_dims: Option<usize>,
    protocol_dims: Option<usize>,
}

impl Corpus {
    /// Build a snapshot, dropping malformed rows.
    /// `*_dims` pins the expected vector length; `None` infers it from the
    /// first well-formed row.
    pub fn new(
        tokens: Vec<TokenRecord>,
        protocols: Vec<ProtocolRecord>,
        token_dims: Option<usize>,
        protocol_dims: Option<usize>,
    ) -> Self {
        let tokens: Vec<TokenRecord> = tokens.into_iter().map(normalize_token).collect();
        let (tokens, token_dims) = sanitize(tokens, token_dims, "token");
        let (protocols, protocol_dims) = sanitize(protocols, protocol_dims, "protocol");
        info!(
            "[corpus] Snapshot ready: {} tokens (dims={:?}), {} protocols (dims={:?})",
            tokens.len(),
            token_dims,
            protocols.len(),
            protocol_dims
        );
        Corpus { tokens, protocols, token_dims, protocol_dims }
    }

    /// Load from JSON array files. A missing path yields an empty corpus side.
    pub fn load(
        token_path: Option<&Path>,
        protocol_path: Option<&Path>,
        token_dims: Option<usize>,
        protocol_dims: Option<usize>,
    ) -> EngineResult<Self> {
        let tokens: Vec<TokenRecord> = match token_path {
            Some(p) => read_rows(p)?,
            None => Vec::new(),
        };
        let protocols: Vec<ProtocolRecord> = match protocol_path {
            Some(p) => read_rows(p)?,
            None => Vec::new(),
        };
        Ok(Self::new(tokens, protocols, token_dims, protocol_dims))
    }

    pub fn tokens(&self) -> &[Arc<TokenRecord>] {
        &self.tokens
    }

    pub fn protocols(&self) -> &[Arc<ProtocolRecord>] {
        &self.protocols
    }

    pub fn token_dims(&self) -> Option<usize> {
        self.token_dims
    }

    pub fn protocol_dims(&self) -> Option<usize> {
        self.protocol_dims
    }
}

/// Rows are parsed one by one so a single bad row is skipped, not fatal.
fn read_rows<T: DeserializeOwned>(path: &Path) -> EngineResult<Vec<T>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EngineError::Corpus(format!("Cannot read {}: {}", path.display(), e)))?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(&text)
        .map_err(|e| EngineError::Corpus(format!("{} is not a JSON array: {}", path.display(), e)))?;

    let total = raw.len();
    let rows: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value(v) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("[corpus] {}: skipping row {}: {}", path.display(), i, e);
                None
            }
        })
        .collect();
    info!("[corpus] Read {}/{} rows from {}", rows.len(), total, path.display());
    Ok(rows)
}

/// Lowercase chain keys so lookups by canonical network name hit.
fn normalize_token(mut token: TokenRecord) -> TokenRecord {
    token.contracts = std::mem::take(&mut token.contracts)
        .into_iter()
        .map(|(chain, addr)| (chain.trim().to_lowercase(), addr))
        .collect::<BTreeMap<_, _>>();
    token
}

fn sanitize<T: Embedded>(rows: Vec<T>, expected_dims: Option<usize>, kind: &str) -> (Vec<Arc<T>>, Option<usize>) {
    let mut dims = expected_dims;
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        let embedding = row.embedding();
        let reason = if embedding.is_empty() {
            Some("empty embedding".to_string())
        } else if embedding.iter().any(|x| !x.is_finite()) {
            Some("non-finite embedding component".to_string())
        } else if dims.is_some_and(|d| d != embedding.len()) {
            Some(format!("embedding has {} dims, expected {}", embedding.len(), dims.unwrap_or_default()))
        } else if seen.contains(row.record_id()) {
            Some("duplicate id".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => {
                warn!("[corpus] Skipping {} '{}': {}", kind, row.record_id(), reason);
                skipped += 1;
            }
            None => {
                dims.get_or_insert(embedding.len());
                seen.insert(row.record_id().to_string());
                kept.push(Arc::new(row));
            }
        }
    }

    if skipped > 0 {
        warn!("[corpus] Skipped {} malformed {} rows", skipped, kind);
    }
    (kept, dims)
}

// ── Hot-reloadable holder ──────────────────────────────────────────────────

/// Shared holder of the current corpus snapshot.
#[derive(Debug, Default)]
pub struct CorpusStore {
    current: RwLock<Arc<Corpus>>,
}

impl CorpusStore {
    pub fn new(corpus: Corpus) -> Self {
        CorpusStore { current: RwLock::new(Arc::new(corpus)) }
    }

    /// The snapshot a request should use from start to finish.
    pub fn snapshot(&self) -> Arc<Corpus> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new snapshot; returns the previous one. In-flight requests
    /// keep the snapshot they already hold.
    pub fn replace(&self, corpus: Corpus) -> Arc<Corpus> {
        let next = Arc::new(corpus);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        info!("[corpus] Snapshot replaced");
        previous
    }
}
