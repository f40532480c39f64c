// txintent — Engine Configuration
//
// Loaded from TOML (default: <config_dir>/txintent/config.toml), then
// overridden by environment variables:
//   TXINTENT_EMBEDDING_URL   → embedding_base_url
//   TXINTENT_EMBEDDING_KEY   → embedding_api_key
//   TXINTENT_RPC_API_KEY     → rpc_api_key
//   TXINTENT_ENS_RPC_URL     → ens_rpc_url
//   TXINTENT_TOKEN_CORPUS    → token_corpus_path
//   TXINTENT_PROTOCOL_CORPUS → protocol_corpus_path

use crate::atoms::constants::{
    DEFAULT_EMBEDDING_BASE_URL, DEFAULT_PROTOCOL_EMBEDDING_MODEL, DEFAULT_TOKEN_EMBEDDING_MODEL, DEFAULT_TOP_N,
    PROTOCOL_CONFIDENCE_THRESHOLD,
};
use crate::atoms::error::{EngineError, EngineResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the embedding API (OpenAI-compatible or Ollama).
    pub embedding_base_url: String,
    /// Bearer key for the embedding API.
    pub embedding_api_key: Option<String>,
    /// Model used to embed token queries; must match the token corpus.
    pub token_embedding_model: String,
    /// Model used to embed protocol queries; must match the protocol corpus.
    pub protocol_embedding_model: String,
    /// Expected token embedding length. Inferred from the corpus when unset.
    pub token_embedding_dims: Option<usize>,
    /// Expected protocol embedding length. Inferred from the corpus when unset.
    pub protocol_embedding_dims: Option<usize>,
    /// Candidates returned by similarity search.
    pub top_n: usize,
    /// Minimum top score for a protocol match.
    pub protocol_threshold: f64,
    pub token_corpus_path: Option<PathBuf>,
    pub protocol_corpus_path: Option<PathBuf>,
    /// Replacement network registry (JSON). Built-in list when unset.
    pub networks_path: Option<PathBuf>,
    /// Replacement action registry (JSON). Built-in list when unset.
    pub actions_path: Option<PathBuf>,
    /// JSON-RPC endpoint for ENS lookups. Falls back to the Ethereum
    /// network template filled with `rpc_api_key`.
    pub ens_rpc_url: Option<String>,
    /// Key substituted into `{api_key}` of network rpc templates.
    pub rpc_api_key: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            embedding_base_url: DEFAULT_EMBEDDING_BASE_URL.into(),
            embedding_api_key: None,
            token_embedding_model: DEFAULT_TOKEN_EMBEDDING_MODEL.into(),
            protocol_embedding_model: DEFAULT_PROTOCOL_EMBEDDING_MODEL.into(),
            token_embedding_dims: None,
            protocol_embedding_dims: None,
            top_n: DEFAULT_TOP_N,
            protocol_threshold: PROTOCOL_CONFIDENCE_THRESHOLD,
            token_corpus_path: None,
            protocol_corpus_path: None,
            networks_path: None,
            actions_path: None,
            ens_rpc_url: None,
            rpc_api_key: None,
        }
    }
}

impl EngineConfig {
    /// `<config_dir>/txintent/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("txintent").join("config.toml"))
    }

    /// Load configuration. An explicit path must exist; the default path is
    /// optional. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => EngineConfig::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        info!("[config] Loaded {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TXINTENT_EMBEDDING_URL") {
            self.embedding_base_url = v;
        }
        if let Some(v) = lookup("TXINTENT_EMBEDDING_KEY") {
            self.embedding_api_key = Some(v);
        }
        if let Some(v) = lookup("TXINTENT_RPC_API_KEY") {
            self.rpc_api_key = Some(v);
        }
        if let Some(v) = lookup("TXINTENT_ENS_RPC_URL") {
            self.ens_rpc_url = Some(v);
        }
        if let Some(v) = lookup("TXINTENT_TOKEN_CORPUS") {
            self.token_corpus_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("TXINTENT_PROTOCOL_CORPUS") {
            self.protocol_corpus_path = Some(PathBuf::from(v));
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.top_n == 0 {
            return Err(EngineError::Config("top_n must be at least 1".into()));
        }
        if !(-1.0..=1.0).contains(&self.protocol_threshold) {
            return Err(EngineError::Config(format!(
                "protocol_threshold must be within [-1, 1], got {}",
                self.protocol_threshold
            )));
        }
        if self.token_embedding_dims == Some(0) || self.protocol_embedding_dims == Some(0) {
            return Err(EngineError::Config("embedding dims must be positive".into()));
        }
        Ok(())
    }
}
