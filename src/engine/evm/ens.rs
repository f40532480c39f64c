// txintent — ENS Name Resolution
//
// Resolves `name.eth` to an address with two read-only calls:
//   1. registry.resolver(namehash(name)) → resolver contract
//   2. resolver.addr(namehash(name))     → address
// A zero address at either step means the name has no address record.

use super::abi::{decode_address_word, encode_call, AbiArg};
use super::primitives::keccak256;
use super::rpc::eth_call;
use crate::atoms::constants::ENS_REGISTRY_ADDRESS;
use crate::atoms::error::EngineResult;
use crate::atoms::traits::NameResolver;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

/// EIP-137 namehash. Labels are lowercased; full ENSIP-15 normalization is not applied.
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&label_hash);
        node = keccak256(&buf);
    }
    node
}

/// ENS client over a JSON-RPC endpoint.
pub struct EnsClient {
    client: Client,
    rpc_url: String,
    registry: String,
}

impl EnsClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        EnsClient {
            client: Client::new(),
            rpc_url: rpc_url.into(),
            registry: ENS_REGISTRY_ADDRESS.to_string(),
        }
    }

    /// Point at a different registry deployment (local devnets).
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn call_for_address(&self, to: &str, function_name: &str, node: [u8; 32]) -> EngineResult<Option<String>> {
        let data = encode_call(function_name, &[AbiArg::Bytes32(node)])?;
        let result = eth_call(&self.client, &self.rpc_url, to, &data).await?;
        // Calls to accounts without code come back empty
        if result.trim_start_matches("0x").is_empty() {
            return Ok(None);
        }
        decode_address_word(&result)
    }
}

#[async_trait]
impl NameResolver for EnsClient {
    async fn resolve(&self, name: &str) -> EngineResult<Option<String>> {
        let node = namehash(name);
        let Some(resolver) = self.call_for_address(&self.registry, "resolver", node).await? else {
            info!("[ens] No resolver set for '{}'", name);
            return Ok(None);
        };
        debug!("[ens] '{}' uses resolver {}", name, resolver);
        let address = self.call_for_address(&resolver, "addr", node).await?;
        match &address {
            Some(addr) => info!("[ens] Resolved '{}' → {}", name, addr),
            None => info!("[ens] '{}' has no address record", name),
        }
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evm::primitives::hex_encode;

    #[test]
    fn namehash_of_empty_name_is_zero() {
        assert_eq!(namehash(""), [0u8; 32]);
    }

    #[test]
    fn namehash_eth_tld() {
        assert_eq!(
            hex_encode(&namehash("eth")),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
    }

    #[test]
    fn namehash_is_case_insensitive() {
        let expected = "0xee6c4522aab0003e8d14cd40a6af439055fd2577951148c14b6cea9a53475835";
        assert_eq!(hex_encode(&namehash("vitalik.eth")), expected);
        assert_eq!(hex_encode(&namehash(" Vitalik.ETH ")), expected);
    }
}
