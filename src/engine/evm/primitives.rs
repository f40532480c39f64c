// txintent — EVM Primitives
// Hex, keccak, address validation and decimal amount conversion.
// Amounts are handled as decimal strings end to end; no binary floats.

use regex::Regex;
use std::sync::LazyLock;

/// Plain decimal: "10", "1.5", ".5", "2." — no sign, no exponent.
/// ASCII digits only (`\d` is Unicode-aware in `regex`).
static DECIMAL_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("static regex"));

/// Keccak-256 hash (Ethereum's hash function)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    use tiny_keccak::{Hasher, Keccak};
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Hex-encode bytes with 0x prefix
pub fn hex_encode(data: &[u8]) -> String {
    format!("0x{}", data.iter().map(|b| format!("{:02x}", b)).collect::<String>())
}

/// Hex-decode a 0x-prefixed string.
/// Left-pads odd lengths so RPC quantities like "0x0" decode.
pub fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Vec::new());
    }
    let padded;
    let hex_str = if s.len() % 2 != 0 {
        padded = format!("0{}", s);
        &padded
    } else {
        s
    };
    if !hex_str.is_ascii() {
        return Err(format!("Hex decode: non-ASCII input '{}'", s));
    }
    (0..hex_str.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex_str[i..i + 2], 16).map_err(|e| format!("Hex decode: {}", e)))
        .collect()
}

/// EIP-55 mixed-case checksum address
pub fn eip55_checksum(addr_bytes: &[u8]) -> String {
    let hex_addr: String = addr_bytes.iter().map(|b| format!("{:02x}", b)).collect();
    let hash = keccak256(hex_addr.as_bytes());
    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in hex_addr.chars().enumerate() {
        let hash_nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if hash_nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

/// Syntactic address check: `0x` + 40 hex digits. A mixed-case body must
/// carry a valid EIP-55 checksum; single-case bodies are accepted as-is.
pub fn is_valid_address(text: &str) -> bool {
    let Some(body) = text.strip_prefix("0x") else {
        return false;
    };
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }
    match hex_decode(body) {
        Ok(bytes) => &eip55_checksum(&bytes)[2..] == body,
        Err(_) => false,
    }
}

/// Parse an address string to 20 bytes
pub fn parse_address(addr: &str) -> Result<[u8; 20], String> {
    let addr = addr.trim();
    if !is_valid_address(addr) {
        return Err(format!("Invalid address: '{}'", addr));
    }
    let bytes = hex_decode(addr)?;
    let mut arr = [0u8; 20];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Parse a U256 from decimal string
pub fn parse_u256_decimal(s: &str) -> Result<[u8; 32], String> {
    let mut result = [0u8; 32];

    if s.is_empty() {
        return Err("Empty decimal string".into());
    }
    if s.contains('e') || s.contains('E') {
        return Err("Scientific notation not supported, use plain decimal".into());
    }

    let mut digits: Vec<u8> = Vec::with_capacity(s.len());
    for c in s.chars() {
        if !c.is_ascii_digit() {
            return Err(format!("Invalid decimal character: {}", c));
        }
        digits.push(c as u8 - b'0');
    }

    // Repeated division by 256, least significant byte first
    let mut big = digits;
    let mut byte_pos = 31i32;
    while !big.iter().all(|&d| d == 0) {
        if byte_pos < 0 {
            return Err(format!("Value exceeds 256 bits: {}", s));
        }
        let mut remainder = 0u16;
        let mut quotient = Vec::with_capacity(big.len());
        for &d in &big {
            let val = remainder * 10 + d as u16;
            let q = val / 256;
            remainder = val % 256;
            if !quotient.is_empty() || q > 0 {
                quotient.push(q as u8);
            }
        }
        result[byte_pos as usize] = remainder as u8;
        byte_pos -= 1;
        big = quotient;
    }
    Ok(result)
}

/// Convert a human amount to base units as a decimal string.
/// e.g., "1.5" with 18 decimals → "1500000000000000000".
/// Digits beyond `decimals` are rounded half-up.
pub fn amount_to_raw(amount: &str, decimals: u8) -> Result<String, String> {
    let amount = amount.trim();
    if !DECIMAL_AMOUNT.is_match(amount) {
        return Err(format!("Invalid amount: '{}'", amount));
    }
    let (integer_part, decimal_part) = match amount.split_once('.') {
        Some((i, d)) => (i, d),
        None => (amount, ""),
    };
    let dec = decimals as usize;

    let (kept, round_up) = if decimal_part.len() > dec {
        let (kept, dropped) = decimal_part.split_at(dec);
        (kept, dropped.as_bytes()[0] >= b'5')
    } else {
        (decimal_part, false)
    };

    let padded_decimals = format!("{:0<width$}", kept, width = dec);
    let mut raw = format!("{}{}", integer_part, padded_decimals);
    if round_up {
        raw = increment_decimal(&raw);
    }
    // Strip leading zeros but keep at least "0"
    let trimmed = match raw.trim_start_matches('0') {
        "" => "0",
        t => t,
    };
    parse_u256_decimal(trimmed).map_err(|e| format!("Invalid amount: '{}' ({})", amount, e))?;
    Ok(trimmed.to_string())
}

/// Add one to a string of ASCII digits.
fn increment_decimal(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }
    format!("1{}", String::from_utf8_lossy(&bytes))
}

/// Shorten an address for display: "0x00e5DF...0Ca1eD".
/// Non-address text is returned unchanged.
pub fn shorten_address(address: &str, n: usize) -> String {
    if address.starts_with("0x") && address.len() > 2 + 2 * n && address.is_ascii() {
        format!("{}...{}", &address[..2 + n], &address[address.len() - n..])
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_empty_input() {
        assert_eq!(
            hex_encode(&keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn hex_decode_handles_minimal_quantities() {
        assert_eq!(hex_decode("0x0").unwrap(), vec![0]);
        assert_eq!(hex_decode("0x1a3").unwrap(), vec![0x01, 0xa3]);
        assert!(hex_decode("0xzz").is_err());
    }

    #[test]
    fn checksummed_addresses_are_valid() {
        assert!(is_valid_address("0x00e5DF023726d46F689F157E29d2586FCE0Ca1eD"));
        assert!(is_valid_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
        assert!(is_valid_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"));
    }

    #[test]
    fn single_case_addresses_are_valid() {
        assert!(is_valid_address("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"));
        assert!(is_valid_address("0xA0B86991C6218B36C1D19D4A2E9EB0CE3606EB48"));
    }

    #[test]
    fn bad_checksum_or_shape_is_rejected() {
        // Last character case flipped
        assert!(!is_valid_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB4B"));
        assert!(!is_valid_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eb48"));
        assert!(!is_valid_address("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("vitalik.eth"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn eip55_roundtrip_on_known_address() {
        let bytes = parse_address("0x8E50bf47FF159b19C808D15E6eDFf57Dee6e9B44").unwrap();
        assert_eq!(eip55_checksum(&bytes), "0x8E50bf47FF159b19C808D15E6eDFf57Dee6e9B44");
    }

    #[test]
    fn parse_u256_small_values() {
        let v = parse_u256_decimal("1000000").unwrap();
        assert_eq!(&v[29..], &[0x0f, 0x42, 0x40]);
        assert!(v[..29].iter().all(|&b| b == 0));
        assert_eq!(parse_u256_decimal("0").unwrap(), [0u8; 32]);
    }

    #[test]
    fn parse_u256_max_and_overflow() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert_eq!(parse_u256_decimal(max).unwrap(), [0xffu8; 32]);
        let over = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(parse_u256_decimal(over).is_err());
        assert!(parse_u256_decimal("12a").is_err());
    }

    #[test]
    fn amount_to_raw_integers_and_fractions() {
        assert_eq!(amount_to_raw("10", 6).unwrap(), "10000000");
        assert_eq!(amount_to_raw("1.5", 18).unwrap(), "1500000000000000000");
        assert_eq!(amount_to_raw("0.1", 18).unwrap(), "100000000000000000");
        assert_eq!(amount_to_raw(".5", 1).unwrap(), "5");
        assert_eq!(amount_to_raw("2.", 2).unwrap(), "200");
        assert_eq!(amount_to_raw("0", 6).unwrap(), "0");
        assert_eq!(amount_to_raw("7", 0).unwrap(), "7");
    }

    #[test]
    fn amount_to_raw_rounds_half_up() {
        assert_eq!(amount_to_raw("0.0000001", 6).unwrap(), "0");
        assert_eq!(amount_to_raw("0.0000005", 6).unwrap(), "1");
        assert_eq!(amount_to_raw("1.9999995", 6).unwrap(), "2000000");
        assert_eq!(amount_to_raw("9.99", 1).unwrap(), "100");
        assert_eq!(amount_to_raw("0.4", 0).unwrap(), "0");
    }

    #[test]
    fn amount_to_raw_rejects_malformed() {
        for bad in ["", ".", "-1", "1e5", "abc", "1.2.3", "1,5", "+3"] {
            assert!(amount_to_raw(bad, 6).is_err(), "{} should be rejected", bad);
        }
        // 2^256 ≈ 1.16e77
        let huge = format!("1{}", "0".repeat(78));
        assert!(amount_to_raw(&huge, 0).is_err());
        assert!(amount_to_raw("1", 255).unwrap_err().contains("256 bits"));
    }

    #[test]
    fn amount_to_raw_rejects_non_ascii_digits() {
        // Arabic-Indic and fullwidth digits
        for bad in ["1.5\u{0661}\u{0661}\u{0661}", "\u{0661}", "\u{FF11}.5", "1.\u{0665}"] {
            assert!(amount_to_raw(bad, 6).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn shorten_address_keeps_prefix_and_suffix() {
        assert_eq!(
            shorten_address("0x00e5DF023726d46F689F157E29d2586FCE0Ca1eD", 6),
            "0x00e5DF...0Ca1eD"
        );
        assert_eq!(shorten_address("bob", 6), "bob");
    }
}
