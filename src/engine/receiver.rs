// txintent — Receiver / Spender Resolution
//
// Turns the free-text counterparty of an intent into an address.
// First success wins:
//   1. `*.eth`         → ENS lookup; no record is a failure (no fallback)
//   2. valid address   → accepted verbatim
//   3. anything else   → protocol search on "<action>, <token>, <chain>"

use crate::atoms::constants::ENS_SUFFIX;
use crate::atoms::error::EngineResult;
use crate::atoms::traits::NameResolver;
use crate::atoms::types::{ActionKind, Network};
use crate::engine::evm::is_valid_address;
use crate::engine::protocols::ProtocolSearcher;
use log::{info, warn};

/// How an address was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverSource {
    Ens,
    Address,
    Protocol { id: String, score: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReceiver {
    pub address: String,
    pub source: ReceiverSource,
}

/// Resolve `raw` to an address. `Ok(None)` means unresolvable; `Err` is a
/// collaborator fault (ENS RPC or embedding service).
pub async fn resolve_receiver(
    raw: &str,
    action: ActionKind,
    token: &str,
    network: &Network,
    names: &dyn NameResolver,
    protocols: &ProtocolSearcher<'_>,
) -> EngineResult<Option<ResolvedReceiver>> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if text.to_lowercase().ends_with(ENS_SUFFIX) {
        return match names.resolve(text).await? {
            Some(address) if is_valid_address(&address) => {
                info!("[receiver] {} → {} (ens)", text, address);
                Ok(Some(ResolvedReceiver { address, source: ReceiverSource::Ens }))
            }
            Some(address) => {
                warn!("[receiver] {} resolved to malformed address '{}'", text, address);
                Ok(None)
            }
            None => {
                info!("[receiver] {} has no address record", text);
                Ok(None)
            }
        };
    }

    if is_valid_address(text) {
        return Ok(Some(ResolvedReceiver { address: text.to_string(), source: ReceiverSource::Address }));
    }

    let query = format!("{}, {}, {}", action, token.trim(), network.name);
    let Some(found) = protocols.search_protocol(&query).await? else {
        info!("[receiver] '{}' matched no protocol", text);
        return Ok(None);
    };

    let best = found.suggested;
    if !is_valid_address(&best.record.address) {
        warn!("[receiver] Protocol {} has malformed address '{}'", best.record.id, best.record.address);
        return Ok(None);
    }
    info!("[receiver] '{}' → {} via protocol {} ({:.3})", text, best.record.address, best.record.id, best.score);
    Ok(Some(ResolvedReceiver {
        address: best.record.address.clone(),
        source: ReceiverSource::Protocol { id: best.record.id.clone(), score: best.score },
    }))
}
