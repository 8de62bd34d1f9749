//! Token configuration strings.
//!
//! A configuration string is the shareable form of a token identity:
//!
//! ```text
//! [name:symbol:uid:checksum]
//! ```
//!
//! The checksum is the first 4 bytes of sha256(sha256("name:symbol:uid")),
//! lowercase hex. Token names may themselves contain `:`; the uid and
//! checksum are fixed-width fields, so parsing consumes fields from the
//! right.

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::token::{Token, is_valid_uid, validate_name, validate_symbol};

/// Length of the hex-encoded checksum field.
pub const CHECKSUM_HEX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigStringError {
    #[error("Invalid configuration string: missing surrounding brackets")]
    NotDelimited,
    #[error("Invalid configuration string: expected [name:symbol:uid:checksum]")]
    Malformed,
    #[error("Invalid token uid in configuration string")]
    InvalidUid,
    #[error("Configuration string checksum mismatch (expected {expected}, found {found})")]
    ChecksumMismatch { expected: String, found: String },
    #[error("Invalid token name in configuration string: {0}")]
    InvalidName(String),
    #[error("Invalid token symbol in configuration string: {0}")]
    InvalidSymbol(String),
}

/// Checksum over the partial configuration string "name:symbol:uid".
fn checksum(payload: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

/// Derive the configuration string for a token.
///
/// Pure derivation from (uid, name, symbol); the fields are not validated
/// here. [`parse_configuration_string`] applies the network rules.
pub fn configuration_string(token: &Token) -> String {
    let partial = format!("{}:{}:{}", token.name, token.symbol, token.uid);
    let check = hex::encode(checksum(partial.as_bytes()));
    format!("[{}:{}]", partial, check)
}

/// Parse and validate a configuration string back into a token identity.
pub fn parse_configuration_string(input: &str) -> Result<Token, ConfigStringError> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(ConfigStringError::NotDelimited)?;

    // Fields from the right: checksum, uid, then "name:symbol" (the name may
    // contain ':', the symbol may not).
    let mut fields = inner.rsplitn(3, ':');
    let found_checksum = fields.next().ok_or(ConfigStringError::Malformed)?;
    let uid = fields.next().ok_or(ConfigStringError::Malformed)?;
    let name_symbol = fields.next().ok_or(ConfigStringError::Malformed)?;
    let (name, symbol) = name_symbol
        .rsplit_once(':')
        .ok_or(ConfigStringError::Malformed)?;

    if !is_valid_uid(uid) {
        return Err(ConfigStringError::InvalidUid);
    }

    let partial = format!("{}:{}:{}", name, symbol, uid);
    let expected = hex::encode(checksum(partial.as_bytes()));
    if found_checksum != expected {
        return Err(ConfigStringError::ChecksumMismatch {
            expected,
            found: found_checksum.to_string(),
        });
    }

    validate_name(name).map_err(|e| ConfigStringError::InvalidName(e.to_string()))?;
    validate_symbol(symbol).map_err(|e| ConfigStringError::InvalidSymbol(e.to_string()))?;

    Ok(Token::new(uid, name, symbol))
}

/// True if the input looks like a configuration string attempt (as opposed
/// to a bare uid), used to pick the add-token path.
pub fn looks_like_configuration_string(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.starts_with('[') || trimmed.contains(':')
}
