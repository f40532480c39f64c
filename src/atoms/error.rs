// ── txintent Atoms: Error Types ────────────────────────────────────────────
// Two closed error enums, built with `thiserror`.
//
//   • `EngineError` is the internal fault type: I/O, parsing, network, RPC,
//     embedding service, corpus and configuration failures. Every engine
//     function returns `EngineResult<T>`.
//   • `ActionError` is the outward result of a failed evaluation. It is
//     serializable as `{ "type": "...Error", "error": "<message>" }`.
//
// `From<EngineError> for ActionError` is the handler boundary conversion:
// any collaborator fault becomes `InvalidArgument` carrying its message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Internal error enum ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON-RPC endpoint returned an error object or a malformed result.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Embedding service returned no usable vector.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Token / protocol corpus could not be loaded.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Engine configuration or registry data is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors without a dedicated variant.
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

// ── String bridges ─────────────────────────────────────────────────────────
// Lets `?` lift the `Result<T, String>` helpers in engine/evm/primitives.rs.

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

/// All engine operations return this type.
pub type EngineResult<T> = Result<T, EngineError>;

// ── Outward error enum ─────────────────────────────────────────────────────

/// Terminal failure of an intent evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "error")]
pub enum ActionError {
    /// Malformed or unsupported chain, unresolvable receiver/spender,
    /// malformed amount, or any collaborator fault.
    #[error("{0}")]
    #[serde(rename = "InvalidArgumentError")]
    InvalidArgument(String),

    /// Action kind not in the registry, or recognized but not implemented.
    #[error("{0}")]
    #[serde(rename = "UnsupportedActionError")]
    UnsupportedAction(String),

    /// No usable token match; the message may list near-miss symbols.
    #[error("{0}")]
    #[serde(rename = "TokenNotFoundError")]
    TokenNotFound(String),
}

impl ActionError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn unsupported_action(message: impl Into<String>) -> Self {
        Self::UnsupportedAction(message.into())
    }

    pub fn token_not_found(message: impl Into<String>) -> Self {
        Self::TokenNotFound(message.into())
    }

    /// Wire name of the variant (`"InvalidArgumentError"`, ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "InvalidArgumentError",
            Self::UnsupportedAction(_) => "UnsupportedActionError",
            Self::TokenNotFound(_) => "TokenNotFoundError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m) | Self::UnsupportedAction(m) | Self::TokenNotFound(m) => m,
        }
    }
}

impl From<EngineError> for ActionError {
    fn from(e: EngineError) -> Self {
        // Collaborator faults surface with their original message.
        let message = match e {
            EngineError::Other(m) => m,
            other => other.to_string(),
        };
        ActionError::InvalidArgument(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_error_serializes_with_type_tag() {
        let err = ActionError::invalid_argument("Unsupported chain: Gnosis");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"type":"InvalidArgumentError","error":"Unsupported chain: Gnosis"}"#);
    }

    #[test]
    fn token_not_found_wire_name() {
        let err = ActionError::token_not_found("FOO is not found on Ethereum.");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "TokenNotFoundError");
        assert_eq!(err.kind_name(), "TokenNotFoundError");
        assert_eq!(err.message(), "FOO is not found on Ethereum.");
    }

    #[test]
    fn engine_error_becomes_invalid_argument() {
        let err: ActionError = EngineError::Rpc("execution reverted".into()).into();
        assert_eq!(err, ActionError::InvalidArgument("RPC error: execution reverted".into()));

        let err: ActionError = EngineError::from("Invalid address length").into();
        assert_eq!(err.message(), "Invalid address length");
    }
}
