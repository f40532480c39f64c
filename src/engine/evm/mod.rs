// txintent — EVM Module
//
//   primitives — keccak256, hex encode/decode, address validation, amount conversion
//   abi        — call-data encoding (selector + static words), ERC-20 builders
//   rpc        — read-only JSON-RPC helpers
//   ens        — ENS name resolution over JSON-RPC
//   erc20      — on-chain ERC-20 metadata (name, symbol, decimals)

pub mod abi;
pub mod ens;
pub mod erc20;
pub mod primitives;
pub(crate) mod rpc;

pub use abi::{encode, encode_erc20_approve, encode_erc20_transfer, AbiArg};
pub use ens::{namehash, EnsClient};
pub use erc20::Erc20Reader;
pub use primitives::is_valid_address;
