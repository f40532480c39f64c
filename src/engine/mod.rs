// txintent Engine — intent resolution and call-data encoding.
// Resolves chain, counterparty and token references from a parsed intent,
// then builds a deterministic transaction descriptor.

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod evaluator;
pub mod evm;
pub mod protocols;
pub mod receiver;
pub mod registry;
pub mod similarity;
pub mod tokens;
