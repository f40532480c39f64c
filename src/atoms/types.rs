// ── txintent Atoms: Data Types ─────────────────────────────────────────────
// Registry rows, corpus records, intents and responses.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════

/// A supported network. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: u64,
    /// Canonical lowercase name ("ethereum", "polygon", ...).
    pub name: String,
    /// RPC endpoint template; may contain `{api_key}`.
    pub rpc_url: String,
    /// Native-currency symbol ("ETH", "POL", ...).
    pub symbol: String,
    /// Native-currency decimals.
    pub decimals: u8,
}

impl Network {
    /// Name as shown to users: "ethereum" → "Ethereum", "zksync era" → "Zksync Era".
    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }
}

/// Closed set of action kinds the intent parser can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Transfer,
    Approve,
    Swap,
    Bridge,
    Stake,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Transfer,
        ActionKind::Approve,
        ActionKind::Swap,
        ActionKind::Bridge,
        ActionKind::Stake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Transfer => "transfer",
            ActionKind::Approve => "approve",
            ActionKind::Swap => "swap",
            ActionKind::Bridge => "bridge",
            ActionKind::Stake => "stake",
        }
    }

    /// Parse the wire name. Exact lowercase match; anything else is unknown.
    pub fn parse(s: &str) -> Option<ActionKind> {
        ActionKind::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the action registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub action: ActionKind,
    /// Description template with `{amount}`, `{token}`, `{chain}` and
    /// `{receiver}` or `{spender}` placeholders.
    pub description: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Corpus records
// ═══════════════════════════════════════════════════════════════════════════

/// An ERC-20 (or native) token with its per-chain deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(deserialize_with = "de_string_or_number")]
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Chain name → contract address. `None` marks a chain where the token
    /// exists without a contract (the native asset).
    #[serde(alias = "network_to_contract", default)]
    pub contracts: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// Where a token lives on a given network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainPresence {
    /// Deployed as a contract at this address.
    Contract(String),
    /// The network's native currency.
    Native,
    /// Not usable on this network.
    Absent,
}

impl TokenRecord {
    /// Presence on `network`. A `null` mapping is native only when the
    /// symbol equals the network's native-currency symbol.
    pub fn presence_on(&self, network: &Network) -> ChainPresence {
        match self.contracts.get(&network.name) {
            Some(Some(addr)) => ChainPresence::Contract(addr.clone()),
            Some(None) if self.symbol.eq_ignore_ascii_case(&network.symbol) => ChainPresence::Native,
            _ => ChainPresence::Absent,
        }
    }

    pub fn is_usable_on(&self, network: &Network) -> bool {
        self.presence_on(network) != ChainPresence::Absent
    }
}

/// A DeFi protocol entry point resolvable from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    #[serde(deserialize_with = "de_string_or_number")]
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Intents and responses
// ═══════════════════════════════════════════════════════════════════════════

/// One parsed intent as emitted by the language model.
///
/// `action` stays a string so that unknown kinds reach the dispatcher and
/// fail as unsupported rather than as a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub action: String,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub amount: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub spender: Option<String>,
}

/// Executable transaction descriptor. All numeric fields are strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub action: ActionKind,
    pub description: String,
    pub chain: String,
    pub to: String,
    /// Native value in base units, decimal string.
    pub value: String,
    /// Hex call data, `"0x"` for a plain value transfer.
    pub data: String,
}

/// ERC-20 metadata as reported by the token contract itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Info {
    pub contract: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Result of evaluating one intent.
pub type ActionOutcome = Result<ActionResponse, super::error::ActionError>;

// ── Helpers ────────────────────────────────────────────────────────────────

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Corpus ids and amounts arrive as either JSON strings or numbers.
fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethereum() -> Network {
        Network {
            id: 1,
            name: "ethereum".into(),
            rpc_url: "https://mainnet.infura.io/v3/{api_key}".into(),
            symbol: "ETH".into(),
            decimals: 18,
        }
    }

    #[test]
    fn action_kind_parse_is_exact() {
        assert_eq!(ActionKind::parse("transfer"), Some(ActionKind::Transfer));
        assert_eq!(ActionKind::parse("swap"), Some(ActionKind::Swap));
        assert_eq!(ActionKind::parse("Transfer"), None);
        assert_eq!(ActionKind::parse("mint"), None);
    }

    #[test]
    fn display_name_is_title_cased() {
        assert_eq!(ethereum().display_name(), "Ethereum");
        let mut n = ethereum();
        n.name = "zksync era".into();
        assert_eq!(n.display_name(), "Zksync Era");
    }

    #[test]
    fn token_record_accepts_network_to_contract_alias() {
        let json = r#"{
            "id": 3408, "name": "USDC", "symbol": "USDC", "decimals": 6,
            "network_to_contract": {"ethereum": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"},
            "embedding": [0.1, 0.2]
        }"#;
        let token: TokenRecord = serde_json::from_str(json).unwrap();
        assert_eq!(token.id, "3408");
        assert_eq!(
            token.presence_on(&ethereum()),
            ChainPresence::Contract("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".into())
        );
    }

    #[test]
    fn null_contract_is_native_only_for_native_symbol() {
        let mut token = TokenRecord {
            id: "1027".into(),
            name: "Ethereum".into(),
            symbol: "ETH".into(),
            decimals: 18,
            contracts: BTreeMap::from([("ethereum".to_string(), None)]),
            embedding: vec![],
        };
        assert_eq!(token.presence_on(&ethereum()), ChainPresence::Native);

        token.symbol = "WEIRD".into();
        assert_eq!(token.presence_on(&ethereum()), ChainPresence::Absent);
    }

    #[test]
    fn intent_amount_accepts_numbers() {
        let intent: Intent = serde_json::from_str(
            r#"{"action":"transfer","chain":"Ethereum","amount":1.5,"token":"ETH","receiver":"bob.eth"}"#,
        )
        .unwrap();
        assert_eq!(intent.amount.as_deref(), Some("1.5"));
        assert_eq!(intent.spender, None);
    }

    #[test]
    fn response_serializes_action_lowercase() {
        let resp = ActionResponse {
            action: ActionKind::Approve,
            description: "d".into(),
            chain: "ethereum".into(),
            to: "0x0".into(),
            value: "0".into(),
            data: "0x".into(),
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["action"], "approve");
        assert_eq!(v["value"], "0");
    }
}
