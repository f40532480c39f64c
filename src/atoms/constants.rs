// ── txintent Atoms: Constants ──────────────────────────────────────────────
// Named constants shared across the engine.

// ── Similarity search ──────────────────────────────────────────────────────
/// Number of ranked candidates returned by a similarity search.
pub const DEFAULT_TOP_N: usize = 5;

/// Minimum top score for a protocol match to be reported at all.
/// Belongs to the embedding model in use; revisit when the model changes.
pub const PROTOCOL_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Embedding model used for token fallback search.
pub const DEFAULT_TOKEN_EMBEDDING_MODEL: &str = "text-embedding-3-large";
/// Embedding model used for protocol search.
pub const DEFAULT_PROTOCOL_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com";

// ── Receiver resolution ────────────────────────────────────────────────────
pub const ENS_SUFFIX: &str = ".eth";

/// ENS registry (same address on mainnet and the public testnets).
pub const ENS_REGISTRY_ADDRESS: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

// ── Descriptions ───────────────────────────────────────────────────────────
/// Characters kept on each side of a shortened address.
pub const SHORT_ADDRESS_CHARS: usize = 6;

// ── Call data ──────────────────────────────────────────────────────────────
/// Call data of a plain native-currency transfer.
pub const EMPTY_CALL_DATA: &str = "0x";

// ── Registry placeholders ──────────────────────────────────────────────────
/// Placeholder substituted with the RPC provider key in network rpc templates.
pub const RPC_API_KEY_PLACEHOLDER: &str = "{api_key}";
