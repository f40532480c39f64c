// txintent — Network & Action Registries
//
// Small closed lookup tables, loaded once and shared read-only.
// Chain names resolve by exact (trimmed, case-insensitive) name only;
// there is no fuzzy matching for chains.

use crate::atoms::constants::RPC_API_KEY_PLACEHOLDER;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{ActionKind, ActionSpec, Network};
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_NETWORKS: &str = include_str!("../../data/networks.json");
const BUILTIN_ACTIONS: &str = include_str!("../../data/actions.json");

// ═══════════════════════════════════════════════════════════════════════════
// Networks
// ═══════════════════════════════════════════════════════════════════════════

/// Supported networks, keyed by id and by lowercase name.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<Network>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<u64, usize>,
}

impl NetworkRegistry {
    /// Build from ordered rows. Names are normalized to trimmed lowercase;
    /// duplicate names or ids are rejected.
    pub fn new(rows: Vec<Network>) -> EngineResult<Self> {
        let mut networks = Vec::with_capacity(rows.len());
        let mut by_name = HashMap::new();
        let mut by_id = HashMap::new();

        for mut network in rows {
            network.name = network.name.trim().to_lowercase();
            if network.name.is_empty() {
                return Err(EngineError::Config(format!("Network {} has an empty name", network.id)));
            }
            let idx = networks.len();
            if by_name.insert(network.name.clone(), idx).is_some() {
                return Err(EngineError::Config(format!("Duplicate network name: {}", network.name)));
            }
            if by_id.insert(network.id, idx).is_some() {
                return Err(EngineError::Config(format!("Duplicate network id: {}", network.id)));
            }
            networks.push(network);
        }

        Ok(NetworkRegistry { networks, by_name, by_id })
    }

    pub fn from_json(text: &str) -> EngineResult<Self> {
        let rows: Vec<Network> = serde_json::from_str(text)?;
        Self::new(rows)
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let registry = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("[registry] Loaded {} networks from {}", registry.networks.len(), path.display());
        Ok(registry)
    }

    /// The list shipped in `data/networks.json`.
    pub fn builtin() -> EngineResult<Self> {
        Self::from_json(BUILTIN_NETWORKS)
    }

    /// Case-insensitive, whitespace-trimmed exact name lookup.
    pub fn resolve_chain(&self, text: &str) -> Option<&Network> {
        let key = text.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).map(|&i| &self.networks[i])
    }

    pub fn network_by_id(&self, id: u64) -> Option<&Network> {
        self.by_id.get(&id).map(|&i| &self.networks[i])
    }

    /// Networks in registry order.
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Fill the `{api_key}` placeholder of a network's rpc template.
    pub fn rpc_url(network: &Network, api_key: Option<&str>) -> String {
        network.rpc_url.replace(RPC_API_KEY_PLACEHOLDER, api_key.unwrap_or_default())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Actions
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct ActionRegistryFile {
    version: u32,
    actions: Vec<ActionSpec>,
}

/// Versioned list of action kinds with their description templates.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    version: u32,
    actions: Vec<ActionSpec>,
}

impl ActionRegistry {
    pub fn new(version: u32, actions: Vec<ActionSpec>) -> EngineResult<Self> {
        for (i, spec) in actions.iter().enumerate() {
            if actions[..i].iter().any(|prev| prev.action == spec.action) {
                return Err(EngineError::Config(format!("Duplicate action: {}", spec.action)));
            }
        }
        Ok(ActionRegistry { version, actions })
    }

    pub fn from_json(text: &str) -> EngineResult<Self> {
        let file: ActionRegistryFile = serde_json::from_str(text)?;
        Self::new(file.version, file.actions)
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let registry = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(
            "[registry] Loaded action registry v{} ({} actions) from {}",
            registry.version,
            registry.actions.len(),
            path.display()
        );
        Ok(registry)
    }

    /// The list shipped in `data/actions.json`.
    pub fn builtin() -> EngineResult<Self> {
        Self::from_json(BUILTIN_ACTIONS)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn supported_actions(&self) -> &[ActionSpec] {
        &self.actions
    }

    /// Description template for a registered kind.
    pub fn template(&self, kind: ActionKind) -> Option<&str> {
        self.actions.iter().find(|a| a.action == kind).map(|a| a.description.as_str())
    }
}

/// Substitute `{key}` placeholders in one pass over the template.
/// Unknown placeholders are left as-is; substituted values are never rescanned.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                // Not a placeholder we know; keep the brace and scan on
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
