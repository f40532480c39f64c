// txintent — Action Evaluator
//
// Top-level dispatcher. One intent goes through a fixed pipeline:
//
//   Received → ChainResolved → ReceiverResolved → TokenResolved
//            → AmountComputed → Encoded → Responded
//
// Any stage may fail with an `ActionError`, which ends the evaluation.
// Collaborator faults (embedding service, ENS RPC) become `InvalidArgument`
// with the original message. There are no retries.
//
// Each evaluation takes one corpus snapshot at the start and uses it
// throughout, so a concurrent hot reload never splits a request.

use crate::atoms::constants::{EMPTY_CALL_DATA, SHORT_ADDRESS_CHARS};
use crate::atoms::error::{ActionError, EngineError, EngineResult};
use crate::atoms::traits::{Embedder, NameResolver};
use crate::atoms::types::{ActionKind, ActionOutcome, ActionResponse, Intent};
use crate::engine::config::EngineConfig;
use crate::engine::corpus::{Corpus, CorpusStore};
use crate::engine::embedding::EmbeddingClient;
use crate::engine::evm::primitives::{amount_to_raw, shorten_address};
use crate::engine::evm::{encode_erc20_approve, encode_erc20_transfer, EnsClient};
use crate::engine::protocols::ProtocolSearcher;
use crate::engine::receiver::resolve_receiver;
use crate::engine::registry::{render_template, ActionRegistry, NetworkRegistry};
use crate::engine::tokens::TokenSearcher;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    ChainResolved,
    ReceiverResolved,
    TokenResolved,
    AmountComputed,
    Encoded,
    Responded,
}

/// Knobs that belong to the embedding models rather than to the engine.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub token_model: String,
    pub protocol_model: String,
    pub top_n: usize,
    pub protocol_threshold: f64,
}

impl From<&EngineConfig> for SearchSettings {
    fn from(config: &EngineConfig) -> Self {
        SearchSettings {
            token_model: config.token_embedding_model.clone(),
            protocol_model: config.protocol_embedding_model.clone(),
            top_n: config.top_n,
            protocol_threshold: config.protocol_threshold,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings::from(&EngineConfig::default())
    }
}

/// The two implemented kinds share one pipeline and differ only here.
#[derive(Debug, Clone, Copy)]
enum TokenAction {
    Transfer,
    Approve,
}

impl TokenAction {
    fn kind(self) -> ActionKind {
        match self {
            TokenAction::Transfer => ActionKind::Transfer,
            TokenAction::Approve => ActionKind::Approve,
        }
    }

    /// Intent field and template placeholder naming the counterparty.
    fn counterparty_field(self) -> &'static str {
        match self {
            TokenAction::Transfer => "receiver",
            TokenAction::Approve => "spender",
        }
    }

    fn invalid_counterparty(self, raw: &str) -> ActionError {
        match self {
            TokenAction::Transfer => ActionError::invalid_argument(format!("Invalid recipient: {}", raw)),
            TokenAction::Approve => ActionError::invalid_argument(format!("Invalid spender: {}", raw)),
        }
    }

    fn counterparty(self, intent: &Intent) -> Option<&str> {
        match self {
            TokenAction::Transfer => intent.receiver.as_deref(),
            TokenAction::Approve => intent.spender.as_deref(),
        }
    }
}

/// Name resolver used when no ENS endpoint is configured.
struct UnconfiguredResolver;

#[async_trait]
impl NameResolver for UnconfiguredResolver {
    async fn resolve(&self, name: &str) -> EngineResult<Option<String>> {
        Err(EngineError::Config(format!(
            "Cannot resolve {}: no ENS RPC endpoint configured (set ens_rpc_url or rpc_api_key)",
            name
        )))
    }
}

pub struct ActionEvaluator {
    networks: Arc<NetworkRegistry>,
    actions: Arc<ActionRegistry>,
    corpus: Arc<CorpusStore>,
    embedder: Arc<dyn Embedder>,
    names: Arc<dyn NameResolver>,
    settings: SearchSettings,
}

impl ActionEvaluator {
    pub fn new(
        networks: Arc<NetworkRegistry>,
        actions: Arc<ActionRegistry>,
        corpus: Arc<CorpusStore>,
        embedder: Arc<dyn Embedder>,
        names: Arc<dyn NameResolver>,
        settings: SearchSettings,
    ) -> Self {
        ActionEvaluator { networks, actions, corpus, embedder, names, settings }
    }

    /// Wire up registries, corpora and the network-backed collaborators.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let networks = match &config.networks_path {
            Some(path) => NetworkRegistry::from_file(path)?,
            None => NetworkRegistry::builtin()?,
        };
        let actions = match &config.actions_path {
            Some(path) => ActionRegistry::from_file(path)?,
            None => ActionRegistry::builtin()?,
        };
        let corpus = load_corpus(config)?;
        if corpus.tokens().is_empty() {
            warn!("[evaluator] Token corpus is empty; every token lookup will fail");
        }

        let names: Arc<dyn NameResolver> = match ens_endpoint(config, &networks) {
            Some(url) => Arc::new(EnsClient::new(url)),
            None => {
                warn!("[evaluator] No ENS endpoint configured; .eth names will not resolve");
                Arc::new(UnconfiguredResolver)
            }
        };

        info!(
            "[evaluator] Ready: {} networks, action registry v{}, {} tokens, {} protocols",
            networks.networks().len(),
            actions.version(),
            corpus.tokens().len(),
            corpus.protocols().len()
        );

        Ok(Self::new(
            Arc::new(networks),
            Arc::new(actions),
            Arc::new(CorpusStore::new(corpus)),
            Arc::new(EmbeddingClient::new(config)),
            names,
            SearchSettings::from(config),
        ))
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn corpus_store(&self) -> &CorpusStore {
        &self.corpus
    }

    /// Reload both corpora from the configured paths and swap them in.
    /// On error the current snapshot stays in place.
    pub fn reload_corpus(&self, config: &EngineConfig) -> EngineResult<()> {
        let corpus = load_corpus(config)?;
        self.corpus.replace(corpus);
        Ok(())
    }

    /// Evaluate one intent.
    pub async fn evaluate_action(&self, intent: &Intent) -> ActionOutcome {
        let rid = Uuid::new_v4().simple().to_string();
        let rid = &rid[..8];
        debug!("[evaluator] {} {:?}: action '{}'", rid, Stage::Received, intent.action);

        let outcome = self.dispatch(rid, intent).await;
        match &outcome {
            Ok(resp) => info!("[evaluator] {} {:?}: {} on {}", rid, Stage::Responded, resp.action, resp.chain),
            Err(e) => warn!("[evaluator] {} Failed: {} {}", rid, e.kind_name(), e),
        }
        outcome
    }

    /// Evaluate a JSON array of intents, one outcome per element in order.
    /// Only a top-level parse failure fails the whole batch.
    pub async fn evaluate_response(&self, text: &str) -> Result<Vec<ActionOutcome>, ActionError> {
        let items: Vec<serde_json::Value> = serde_json::from_str(text)
            .map_err(|e| ActionError::invalid_argument(format!("Malformed intent list: {}", e)))?;

        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let outcome = match serde_json::from_value::<Intent>(item) {
                Ok(intent) => self.evaluate_action(&intent).await,
                Err(e) => Err(ActionError::invalid_argument(format!("Malformed intent: {}", e))),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn dispatch(&self, rid: &str, intent: &Intent) -> ActionOutcome {
        let unsupported = || ActionError::unsupported_action(format!("Unsupported action: {}", intent.action));
        let kind = ActionKind::parse(&intent.action).ok_or_else(unsupported)?;
        let template = self.actions.template(kind).ok_or_else(unsupported)?;

        match kind {
            ActionKind::Transfer => self.run_token_action(rid, TokenAction::Transfer, intent, template).await,
            ActionKind::Approve => self.run_token_action(rid, TokenAction::Approve, intent, template).await,
            ActionKind::Swap | ActionKind::Bridge | ActionKind::Stake => {
                Err(ActionError::unsupported_action(format!("Not yet supported action: {}", kind)))
            }
        }
    }

    async fn run_token_action(&self, rid: &str, op: TokenAction, intent: &Intent, template: &str) -> ActionOutcome {
        let chain_text = required(intent.chain.as_deref(), "chain")?;
        let amount = required(intent.amount.as_deref(), "amount")?;
        let token_text = required(intent.token.as_deref(), "token")?;
        let counterparty_text = required(op.counterparty(intent), op.counterparty_field())?;

        let network = self
            .networks
            .resolve_chain(chain_text)
            .ok_or_else(|| ActionError::invalid_argument(format!("Unsupported chain: {}", chain_text)))?;
        debug!("[evaluator] {} {:?}: {}", rid, Stage::ChainResolved, network.name);

        let corpus = self.corpus.snapshot();
        let embedder = self.embedder.as_ref();

        let protocols = ProtocolSearcher::new(
            &corpus,
            embedder,
            &self.settings.protocol_model,
            self.settings.top_n,
            self.settings.protocol_threshold,
        );
        let counterparty =
            resolve_receiver(counterparty_text, op.kind(), token_text, network, self.names.as_ref(), &protocols)
                .await?
                .ok_or_else(|| op.invalid_counterparty(counterparty_text))?;
        debug!("[evaluator] {} {:?}: {} ({:?})", rid, Stage::ReceiverResolved, counterparty.address, counterparty.source);

        let tokens = TokenSearcher::new(&corpus, embedder, &self.settings.token_model, self.settings.top_n);
        let search = tokens.search_token(token_text, network, false).await?;
        let Some(token) = search.suggested.clone() else {
            let symbols = search.alternate_symbols();
            let message = if symbols.is_empty() {
                format!("{} is not found on {}.", token_text, network.display_name())
            } else {
                format!("{} is not found. Try the following: [{}]", token_text, symbols.join(", "))
            };
            return Err(ActionError::token_not_found(message));
        };
        debug!("[evaluator] {} {:?}: {} ({:?})", rid, Stage::TokenResolved, token.token.symbol, token.presence);

        let raw_amount = amount_to_raw(amount, token.token.decimals).map_err(ActionError::invalid_argument)?;
        debug!("[evaluator] {} {:?}: {} base units", rid, Stage::AmountComputed, raw_amount);

        let short_counterparty = shorten_address(&counterparty.address, SHORT_ADDRESS_CHARS);
        let chain_display = network.display_name();
        let description = render_template(
            template,
            &[
                ("amount", amount),
                ("token", token.token.symbol.as_str()),
                (op.counterparty_field(), short_counterparty.as_str()),
                ("chain", chain_display.as_str()),
            ],
        );

        let (to, value, data) = match (op, token.contract()) {
            (TokenAction::Transfer, None) => (counterparty.address.clone(), raw_amount, EMPTY_CALL_DATA.to_string()),
            (TokenAction::Transfer, Some(contract)) => {
                let data = encode_erc20_transfer(contract, &counterparty.address, &raw_amount)?;
                (contract.to_string(), "0".to_string(), data)
            }
            (TokenAction::Approve, None) => {
                return Err(ActionError::unsupported_action(format!(
                    "Approve action is not supported for native tokens: {}",
                    token.token.symbol
                )));
            }
            (TokenAction::Approve, Some(contract)) => {
                let data = encode_erc20_approve(contract, &counterparty.address, &raw_amount)?;
                (contract.to_string(), "0".to_string(), data)
            }
        };
        debug!("[evaluator] {} {:?}: to={} value={}", rid, Stage::Encoded, to, value);

        Ok(ActionResponse { action: op.kind(), description, chain: network.name.clone(), to, value, data })
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ActionError> {
    value.ok_or_else(|| ActionError::invalid_argument(format!("Missing field: {}", field)))
}

fn load_corpus(config: &EngineConfig) -> EngineResult<Corpus> {
    Corpus::load(
        config.token_corpus_path.as_deref(),
        config.protocol_corpus_path.as_deref(),
        config.token_embedding_dims,
        config.protocol_embedding_dims,
    )
}

/// Explicit `ens_rpc_url`, else the Ethereum mainnet template filled with
/// `rpc_api_key`.
fn ens_endpoint(config: &EngineConfig, networks: &NetworkRegistry) -> Option<String> {
    if let Some(url) = &config.ens_rpc_url {
        return Some(url.clone());
    }
    let key = config.rpc_api_key.as_deref()?;
    networks.network_by_id(1).map(|mainnet| NetworkRegistry::rpc_url(mainnet, Some(key)))
}

/// JSON form of an outcome: the response object, or `{type, error}`.
pub fn outcome_to_value(outcome: &ActionOutcome) -> serde_json::Value {
    let value = match outcome {
        Ok(resp) => serde_json::to_value(resp),
        Err(err) => serde_json::to_value(err),
    };
    value.unwrap_or_else(|e| serde_json::json!({ "type": "InvalidArgumentError", "error": e.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(ens: Option<&str>, key: Option<&str>) -> EngineConfig {
        EngineConfig {
            ens_rpc_url: ens.map(str::to_string),
            rpc_api_key: key.map(str::to_string),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn ens_endpoint_prefers_explicit_url() {
        let networks = NetworkRegistry::builtin().unwrap();
        assert_eq!(
            ens_endpoint(&config_with(Some("http://127.0.0.1:8545"), Some("k")), &networks).as_deref(),
            Some("http://127.0.0.1:8545")
        );
        let derived = ens_endpoint(&config_with(None, Some("k123")), &networks).unwrap();
        assert!(derived.ends_with("k123"));
        assert!(ens_endpoint(&config_with(None, None), &networks).is_none());
    }

    #[test]
    fn outcome_json_shapes() {
        let err: ActionOutcome = Err(ActionError::unsupported_action("Unsupported action: mint"));
        let v = outcome_to_value(&err);
        assert_eq!(v["type"], "UnsupportedActionError");
        assert_eq!(v["error"], "Unsupported action: mint");
    }

    #[test]
    fn search_settings_follow_config() {
        let s = SearchSettings::default();
        assert_eq!(s.top_n, 5);
        assert_eq!(s.protocol_model, "text-embedding-3-small");
    }

    #[tokio::test]
    async fn unconfigured_resolver_errors() {
        let err = UnconfiguredResolver.resolve("vitalik.eth").await.unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn from_config_without_corpora_still_dispatches() {
        let evaluator = ActionEvaluator::from_config(&EngineConfig::default()).unwrap();
        let intent = Intent { action: "swap".into(), ..Intent::default() };
        assert_eq!(
            evaluator.evaluate_action(&intent).await,
            Err(ActionError::unsupported_action("Not yet supported action: swap"))
        );
    }
}
