// ── txintent Atoms: Collaborator Traits ────────────────────────────────────
// Seams to the external services the engine consumes. Real implementations
// live in engine/embedding.rs and engine/evm/ens.rs; tests plug in stubs.

use super::error::EngineResult;
use async_trait::async_trait;

/// Produces a fixed-length embedding vector for a text.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str, model: &str) -> EngineResult<Vec<f32>>;
}

/// Resolves a human-readable name (e.g. `vitalik.eth`) to an address.
/// `Ok(None)` means the name has no address record.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> EngineResult<Option<String>>;
}
