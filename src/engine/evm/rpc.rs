// txintent — JSON-RPC Helpers
// Read-only calls used by collaborators (ENS lookups). No signing, no broadcast.

use super::primitives::hex_encode;
use crate::atoms::error::{EngineError, EngineResult};
use log::debug;
use reqwest::Client;

/// Low-level JSON-RPC call
pub async fn rpc_call(
    client: &Client,
    rpc_url: &str,
    method: &str,
    params: serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    });

    debug!("[rpc] {} → {}", method, redact_url(rpc_url));
    let resp = client.post(rpc_url).json(&body).send().await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(EngineError::Rpc(format!("{} returned {} — {}", method, status, text)));
    }

    let result: serde_json::Value = resp.json().await?;

    if let Some(error) = result.get("error") {
        return Err(EngineError::Rpc(error.to_string()));
    }

    result
        .get("result")
        .cloned()
        .ok_or_else(|| EngineError::Rpc("RPC response missing 'result' field".into()))
}

/// Call a contract (read-only)
pub async fn eth_call(client: &Client, rpc_url: &str, to: &str, data: &[u8]) -> EngineResult<String> {
    let result = rpc_call(
        client,
        rpc_url,
        "eth_call",
        serde_json::json!([{ "to": to, "data": hex_encode(data) }, "latest"]),
    )
    .await?;
    result
        .as_str()
        .map(String::from)
        .ok_or(EngineError::Rpc("Invalid eth_call result".into()))
}

/// Drop the path of an RPC URL for logging; provider keys usually live there.
fn redact_url(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => match url[scheme_end + 3..].find('/') {
            Some(path_start) => &url[..scheme_end + 3 + path_start],
            None => url,
        },
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_url_strips_key_path() {
        assert_eq!(redact_url("https://mainnet.infura.io/v3/secret"), "https://mainnet.infura.io");
        assert_eq!(redact_url("http://127.0.0.1:8545"), "http://127.0.0.1:8545");
    }
}
