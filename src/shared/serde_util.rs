//! Custom serde helpers for node and wallet wire formats.

/// (De)serializes `Vec<u8>` as a `0x`-prefixed hex string.
///
/// Calldata and log payloads travel as hex strings in JSON-RPC.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Decode a hex string with or without the `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| format!("Invalid hex '{}': {}", s, e))
}

/// Parse a JSON-RPC quantity (`"0x1a"`) into a `u64`.
pub fn parse_quantity(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| format!("Quantity '{}' is missing the 0x prefix", s))?;
    if digits.is_empty() {
        return Err(format!("Quantity '{}' has no digits", s));
    }
    u64::from_str_radix(digits, 16).map_err(|e| format!("Invalid quantity '{}': {}", s, e))
}

/// Format a `u64` as a JSON-RPC quantity.
pub fn format_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}
