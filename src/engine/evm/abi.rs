// txintent — EVM ABI Encoding
// Static-argument call-data encoding: 4-byte selector + one 32-byte word per argument.

use super::primitives::{hex_decode, hex_encode, is_valid_address, keccak256, parse_address, parse_u256_decimal};
use crate::atoms::error::{EngineError, EngineResult};

/// A typed, statically-sized ABI argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiArg {
    /// 0x-prefixed 20-byte address, validated before encoding.
    Address(String),
    /// Unsigned integer as a decimal string (base units).
    Uint256(String),
    Bool(bool),
    Bytes32([u8; 32]),
}

impl AbiArg {
    /// Canonical type name used in the function signature.
    pub fn type_name(&self) -> &'static str {
        match self {
            AbiArg::Address(_) => "address",
            AbiArg::Uint256(_) => "uint256",
            AbiArg::Bool(_) => "bool",
            AbiArg::Bytes32(_) => "bytes32",
        }
    }

    fn encode_word(&self) -> EngineResult<Vec<u8>> {
        match self {
            AbiArg::Address(addr) => Ok(abi_encode_address(&parse_address(addr)?)),
            AbiArg::Uint256(dec) => Ok(abi_encode_uint256(&parse_u256_decimal(dec)?)),
            AbiArg::Bool(b) => {
                let mut word = vec![0u8; 32];
                word[31] = u8::from(*b);
                Ok(word)
            }
            AbiArg::Bytes32(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// Compute 4-byte function selector from signature
pub fn function_selector(sig: &str) -> [u8; 4] {
    let hash = keccak256(sig.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    sel
}

/// Canonical signature, e.g. `transfer(address,uint256)`.
pub fn function_signature(function_name: &str, args: &[AbiArg]) -> String {
    let types: Vec<&str> = args.iter().map(AbiArg::type_name).collect();
    format!("{}({})", function_name, types.join(","))
}

/// ABI-encode an address (left-padded to 32 bytes)
pub fn abi_encode_address(addr: &[u8; 20]) -> Vec<u8> {
    let mut encoded = vec![0u8; 12]; // 12 zero bytes
    encoded.extend_from_slice(addr);
    encoded
}

/// ABI-encode a uint256 from big-endian bytes
pub fn abi_encode_uint256(val: &[u8; 32]) -> Vec<u8> {
    val.to_vec()
}

/// Selector followed by one word per argument, in declaration order.
pub fn encode_call(function_name: &str, args: &[AbiArg]) -> EngineResult<Vec<u8>> {
    let signature = function_signature(function_name, args);
    let mut data = function_selector(&signature).to_vec();
    for arg in args {
        data.extend_from_slice(&arg.encode_word()?);
    }
    Ok(data)
}

/// Encode a call against `contract` as 0x-prefixed lowercase hex.
/// The contract and every address argument must be valid addresses.
pub fn encode(contract: &str, function_name: &str, args: &[AbiArg]) -> EngineResult<String> {
    if !is_valid_address(contract) {
        return Err(EngineError::Other(format!("Invalid contract address: {}", contract)));
    }
    for arg in args {
        if let AbiArg::Address(addr) = arg {
            if !is_valid_address(addr) {
                return Err(EngineError::Other(format!("Invalid address argument: {}", addr)));
            }
        }
    }
    Ok(hex_encode(&encode_call(function_name, args)?))
}

/// Encode ERC-20 transfer(address, uint256)
pub fn encode_erc20_transfer(contract: &str, recipient: &str, amount_raw: &str) -> EngineResult<String> {
    if !is_valid_address(recipient) {
        return Err(EngineError::Other(format!("Invalid recipient address: {}", recipient)));
    }
    encode(
        contract,
        "transfer",
        &[AbiArg::Address(recipient.to_string()), AbiArg::Uint256(amount_raw.to_string())],
    )
}

/// Encode ERC-20 approve(address, uint256)
pub fn encode_erc20_approve(contract: &str, spender: &str, amount_raw: &str) -> EngineResult<String> {
    if !is_valid_address(spender) {
        return Err(EngineError::Other(format!("Invalid spender address: {}", spender)));
    }
    encode(
        contract,
        "approve",
        &[AbiArg::Address(spender.to_string()), AbiArg::Uint256(amount_raw.to_string())],
    )
}

/// Decode an address returned as a single 32-byte word.
/// Returns `None` for the zero address.
pub fn decode_address_word(hex_data: &str) -> EngineResult<Option<String>> {
    let bytes = hex_decode(hex_data)?;
    if bytes.len() < 32 {
        return Err(EngineError::Rpc(format!("Expected 32-byte address word, got {} bytes", bytes.len())));
    }
    let addr = &bytes[12..32];
    if addr.iter().all(|&b| b == 0) {
        return Ok(None);
    }
    Ok(Some(super::primitives::eip55_checksum(addr)))
}

/// Decode a `string` return value (offset word, length word, bytes).
/// Older tokens (MKR, SAI) return `bytes32` instead; those are read up to the first NUL.
pub fn decode_abi_string(hex_data: &str) -> EngineResult<String> {
    let bytes = hex_decode(hex_data)?;
    if bytes.len() == 32 {
        let text: Vec<u8> = bytes.iter().copied().take_while(|&b| b != 0).collect();
        return String::from_utf8(text).map_err(|_| EngineError::Rpc("Invalid UTF-8 in bytes32 string".into()));
    }
    if bytes.len() < 64 {
        return Err(EngineError::Rpc(format!("Expected ABI string, got {} bytes", bytes.len())));
    }
    let offset = word_to_usize(&bytes[..32])?;
    let len_end = offset.checked_add(32).filter(|&end| end <= bytes.len());
    let Some(len_end) = len_end else {
        return Err(EngineError::Rpc("String offset exceeds response".into()));
    };
    let len = word_to_usize(&bytes[offset..len_end])?;
    let data_end = len_end.checked_add(len).filter(|&end| end <= bytes.len());
    let Some(data_end) = data_end else {
        return Err(EngineError::Rpc("String data exceeds response".into()));
    };
    String::from_utf8(bytes[len_end..data_end].to_vec()).map_err(|_| EngineError::Rpc("Invalid UTF-8 in string".into()))
}

/// Decode a `uint8` return value (one 32-byte word).
pub fn decode_uint8_word(hex_data: &str) -> EngineResult<u8> {
    let bytes = hex_decode(hex_data)?;
    if bytes.len() < 32 {
        return Err(EngineError::Rpc(format!("Expected 32-byte uint word, got {} bytes", bytes.len())));
    }
    if bytes[..31].iter().any(|&b| b != 0) {
        return Err(EngineError::Rpc("uint8 value out of range".into()));
    }
    Ok(bytes[31])
}

/// Offsets and lengths in return data; anything past usize is malformed.
fn word_to_usize(word: &[u8]) -> EngineResult<usize> {
    const USIZE_BYTES: usize = std::mem::size_of::<usize>();
    let (high, low) = word.split_at(32 - USIZE_BYTES);
    if high.iter().any(|&b| b != 0) {
        return Err(EngineError::Rpc("ABI word too large".into()));
    }
    let mut buf = [0u8; USIZE_BYTES];
    buf.copy_from_slice(low);
    Ok(usize::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_selector_transfer() {
        // keccak256("transfer(address,uint256)") first 4 bytes = 0xa9059cbb
        let sel = function_selector("transfer(address,uint256)");
        assert_eq!(hex_encode(&sel), "0xa9059cbb");
    }

    #[test]
    fn function_selector_approve() {
        let sel = function_selector("approve(address,uint256)");
        assert_eq!(hex_encode(&sel), "0x095ea7b3");
    }

    #[test]
    fn signature_from_typed_args() {
        let args = [AbiArg::Bytes32([0u8; 32])];
        assert_eq!(function_signature("resolver", &args), "resolver(bytes32)");
        assert_eq!(function_signature("decimals", &[]), "decimals()");
    }

    #[test]
    fn encode_transfer_matches_reference_vector() {
        let data = encode_erc20_transfer(
            "0x8E50bf47FF159b19C808D15E6eDFf57Dee6e9B44",
            "0x00e5DF023726d46F689F157E29d2586FCE0Ca1eD",
            "1000000",
        )
        .unwrap();
        assert_eq!(
            data,
            "0xa9059cbb00000000000000000000000000e5df023726d46f689f157e29d2586fce0ca1ed00000000000000000000000000000000000000000000000000000000000f4240"
        );
    }

    #[test]
    fn encode_approve_layout() {
        let data = encode_erc20_approve(
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
            "1",
        )
        .unwrap();
        assert!(data.starts_with("0x095ea7b3"));
        // 0x + selector + 2 words
        assert_eq!(data.len(), 2 + 8 + 64 * 2);
        assert!(data.ends_with("0001"));
    }

    #[test]
    fn encode_rejects_invalid_contract_or_argument() {
        assert!(encode_erc20_transfer("0x1234", "0x00e5DF023726d46F689F157E29d2586FCE0Ca1eD", "1").is_err());
        assert!(encode_erc20_transfer(
            "0x8E50bf47FF159b19C808D15E6eDFf57Dee6e9B44",
            "vitalik.eth",
            "1"
        )
        .is_err());
        assert!(encode(
            "0x8E50bf47FF159b19C808D15E6eDFf57Dee6e9B44",
            "transfer",
            &[AbiArg::Address("0xnothex".into()), AbiArg::Uint256("1".into())]
        )
        .is_err());
    }

    #[test]
    fn encode_bool_word() {
        let data = encode_call("setPaused", &[AbiArg::Bool(true)]).unwrap();
        assert_eq!(data.len(), 36);
        assert_eq!(data[35], 1);
        assert!(data[4..35].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_address_word_zero_is_none() {
        let zero = format!("0x{}", "00".repeat(32));
        assert_eq!(decode_address_word(&zero).unwrap(), None);

        let word = format!("0x{}{}", "00".repeat(12), "d8da6bf26964af9d7eed9e03e53415d37aa96045");
        assert_eq!(
            decode_address_word(&word).unwrap().as_deref(),
            Some("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
        );
        assert!(decode_address_word("0x01").is_err());
    }

    fn abi_string(text: &str) -> String {
        let mut body = format!("{:064x}{:064x}", 32, text.len());
        let mut data = text.as_bytes().to_vec();
        data.resize(text.len().div_ceil(32) * 32, 0);
        body.push_str(&hex_encode(&data)[2..]);
        format!("0x{}", body)
    }

    #[test]
    fn decode_abi_string_standard_layout() {
        assert_eq!(decode_abi_string(&abi_string("USD Coin")).unwrap(), "USD Coin");
        assert_eq!(decode_abi_string(&abi_string("")).unwrap(), "");
        let long = "A token name well past a single thirty-two byte word";
        assert_eq!(decode_abi_string(&abi_string(long)).unwrap(), long);
    }

    #[test]
    fn decode_abi_string_bytes32_fallback() {
        // "MKR" as bytes32
        let word = format!("0x4d4b52{}", "00".repeat(29));
        assert_eq!(decode_abi_string(&word).unwrap(), "MKR");
    }

    #[test]
    fn decode_abi_string_rejects_truncated_data() {
        // Claims 64 bytes of text, carries none
        let truncated = format!("0x{:064x}{:064x}", 32, 64);
        assert!(decode_abi_string(&truncated).is_err());
        let bad_offset = format!("0x{:064x}{:064x}", 4096, 3);
        assert!(decode_abi_string(&bad_offset).is_err());
        let huge_offset = format!("0x{}{:064x}", "ff".repeat(32), 3);
        assert!(decode_abi_string(&huge_offset).is_err());
        assert!(decode_abi_string("0x").is_err());
    }

    #[test]
    fn decode_uint8_word_bounds() {
        assert_eq!(decode_uint8_word(&format!("0x{:064x}", 6)).unwrap(), 6);
        assert_eq!(decode_uint8_word(&format!("0x{:064x}", 18)).unwrap(), 18);
        assert!(decode_uint8_word(&format!("0x{:064x}", 256)).is_err());
        assert!(decode_uint8_word("0x12").is_err());
    }
}
