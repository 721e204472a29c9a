//! Minimal Solidity ABI support for static types.
//!
//! Every argument and return value these contracts use is a single 32-byte
//! word (`address`, `bool`, `uint256`), so encoding is a selector followed by
//! words and decoding is word indexing. `uint256` values are carried as
//! `u128`; anything wider is rejected as [`AbiError::Overflow`].

use sha3::{Digest, Keccak256};

use crate::error::AbiError;
use crate::shared::Address;

/// One ABI word.
pub type Word = [u8; 32];

pub const WORD_LEN: usize = 32;

/// keccak256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of keccak256 of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// keccak256 of a canonical event signature (topic0).
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

// ─── Encoding ────────────────────────────────────────────────────────────────

pub fn word_u128(value: u128) -> Word {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn word_bool(value: bool) -> Word {
    let mut word = [0u8; 32];
    word[31] = value as u8;
    word
}

pub fn word_address(address: &Address) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// `selector ++ args`
pub fn encode_call(selector: [u8; 4], args: &[Word]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD_LEN);
    data.extend_from_slice(&selector);
    for arg in args {
        data.extend_from_slice(arg);
    }
    data
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// The `index`-th word of `data`.
pub fn word_at(data: &[u8], index: usize) -> Result<&[u8], AbiError> {
    let start = index * WORD_LEN;
    let end = start + WORD_LEN;
    data.get(start..end).ok_or(AbiError::ShortData {
        expected: end,
        actual: data.len(),
    })
}

pub fn decode_u128(word: &[u8]) -> Result<u128, AbiError> {
    if word.len() != WORD_LEN {
        return Err(AbiError::ShortData {
            expected: WORD_LEN,
            actual: word.len(),
        });
    }
    if word[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

pub fn decode_bool(word: &[u8]) -> Result<bool, AbiError> {
    match decode_u128(word) {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        Ok(_) | Err(AbiError::Overflow) => Err(AbiError::InvalidBool),
        Err(e) => Err(e),
    }
}

pub fn decode_address(word: &[u8]) -> Result<Address, AbiError> {
    if word.len() != WORD_LEN {
        return Err(AbiError::ShortData {
            expected: WORD_LEN,
            actual: word.len(),
        });
    }
    if word[..12].iter().any(|b| *b != 0) {
        return Err(AbiError::InvalidAddress);
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address::new(bytes))
}

/// Decode a view function that returns a single `uint256`.
pub fn decode_uint_return(data: &[u8]) -> Result<u128, AbiError> {
    decode_u128(word_at(data, 0)?)
}
