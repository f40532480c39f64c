// txintent — turns parsed natural-language intents ("send 10 USDC to
// vitalik.eth on Ethereum") into executable EVM transaction descriptors.
//
//   atoms/  — pure layer: constants, errors, data types, collaborator traits
//   engine/ — registries, corpora, resolvers, ABI encoding, evaluator

pub mod atoms;
pub mod engine;

pub use atoms::error::{ActionError, EngineError, EngineResult};
pub use atoms::traits::{Embedder, NameResolver};
pub use atoms::types::{
    ActionKind, ActionOutcome, ActionResponse, Erc20Info, Intent, Network, ProtocolRecord, TokenRecord,
};
pub use engine::config::EngineConfig;
pub use engine::corpus::{Corpus, CorpusStore};
pub use engine::evaluator::{outcome_to_value, ActionEvaluator, SearchSettings};
