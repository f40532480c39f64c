// txintent — ERC-20 Introspection
// Reads name(), symbol() and decimals() straight from a token contract.
// Used to check corpus rows against the chain; never sends a transaction.

use super::abi::{decode_abi_string, decode_uint8_word, encode_call};
use super::primitives::{eip55_checksum, parse_address};
use super::rpc::eth_call;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Erc20Info, Network};
use crate::engine::registry::NetworkRegistry;
use log::{debug, info};
use reqwest::Client;

/// Read-only ERC-20 client bound to one chain's RPC endpoint.
pub struct Erc20Reader {
    client: Client,
    rpc_url: String,
}

impl Erc20Reader {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Erc20Reader { client: Client::new(), rpc_url: rpc_url.into() }
    }

    /// Reader for `network`, filling its RPC template with `api_key`.
    pub fn for_network(network: &Network, api_key: Option<&str>) -> Self {
        Self::new(NetworkRegistry::rpc_url(network, api_key))
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch token metadata. The returned contract is EIP-55 checksummed.
    pub async fn get_token_info(&self, contract: &str) -> EngineResult<Erc20Info> {
        let address = parse_address(contract)?;
        let contract = eip55_checksum(&address);

        let name = decode_abi_string(&self.read(&contract, "name").await?)?;
        let symbol = decode_abi_string(&self.read(&contract, "symbol").await?)?;
        let decimals = decode_uint8_word(&self.read(&contract, "decimals").await?)?;

        info!("[erc20] {} is {} ({}), {} decimals", contract, symbol, name, decimals);
        Ok(Erc20Info { contract, name, symbol, decimals })
    }

    async fn read(&self, contract: &str, function_name: &str) -> EngineResult<String> {
        let data = encode_call(function_name, &[])?;
        let result = eth_call(&self.client, &self.rpc_url, contract, &data).await?;
        debug!("[erc20] {}.{}() → {} bytes", contract, function_name, result.len().saturating_sub(2) / 2);
        // No code at the address, or a contract without the getter
        if result.trim_start_matches("0x").is_empty() {
            return Err(EngineError::Rpc(format!("{}() returned no data from {}", function_name, contract)));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evm::abi::function_selector;
    use crate::engine::evm::primitives::hex_encode;

    #[test]
    fn getter_selectors() {
        assert_eq!(hex_encode(&function_selector("name()")), "0x06fdde03");
        assert_eq!(hex_encode(&function_selector("symbol()")), "0x95d89b41");
        assert_eq!(hex_encode(&function_selector("decimals()")), "0x313ce567");
    }

    #[test]
    fn for_network_fills_rpc_template() {
        let network = Network {
            id: 1,
            name: "ethereum".into(),
            rpc_url: "https://mainnet.example/v3/{api_key}".into(),
            symbol: "ETH".into(),
            decimals: 18,
        };
        let reader = Erc20Reader::for_network(&network, Some("k1"));
        assert_eq!(reader.rpc_url, "https://mainnet.example/v3/k1");
    }

    #[tokio::test]
    async fn invalid_contract_is_rejected_before_any_call() {
        // Unroutable endpoint; reaching it would fail differently
        let reader = Erc20Reader::new("http://0.0.0.0:1");
        let err = reader.get_token_info("0x1234").await.unwrap_err();
        assert!(err.to_string().contains("Invalid address"), "{}", err);
    }
}
