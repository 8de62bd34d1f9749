//! Token identity and detail types.
//!
//! A custom token on the Tokari network is identified by the 64-hex-char hash
//! of its creation transaction (the uid) plus a human-chosen name and symbol.
//! The uid is the only trust anchor; name and symbol are display metadata.

use color_eyre::eyre::{Result, eyre};
use serde::{Deserialize, Serialize};

/// Name of the network's native token. Custom tokens may not reuse it.
pub const NATIVE_TOKEN_NAME: &str = "Tokari";
/// Symbol of the network's native token. Custom tokens may not reuse it.
pub const NATIVE_TOKEN_SYMBOL: &str = "TKA";

/// Maximum length of a token name in bytes.
pub const MAX_NAME_LEN: usize = 30;
/// Maximum length of a token symbol in bytes.
pub const MAX_SYMBOL_LEN: usize = 5;

/// Number of base units per whole token (2 decimal places).
pub const UNITS_PER_TOKEN: u64 = 100;

/// A token identity: uid plus display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub uid: String,
    pub name: String,
    pub symbol: String,
}

impl Token {
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Display form used in lists: "Name (SYM)".
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }
}

/// Capability flags reported by the network for a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAuthorities {
    /// New supply can still be created.
    pub mint: bool,
    /// Existing supply can still be destroyed.
    pub melt: bool,
}

/// Network-reported details for a token.
///
/// Defaults to zeros so a dialog can render before its fetch completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub total_supply: u64,
    pub total_transactions: u64,
    pub authorities: TokenAuthorities,
}

/// A token recorded in the local trusted-token registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredToken {
    pub token: Token,
    /// Unix seconds at registration time.
    pub registered_at: u64,
}

/// Check that a string is a valid token uid (64 lowercase hex chars).
pub fn is_valid_uid(uid: &str) -> bool {
    uid.len() == 64
        && uid
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Validate a token name against the network rules.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(eyre!("Token name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(eyre!(
            "Token name too long: {} bytes (maximum {})",
            name.len(),
            MAX_NAME_LEN
        ));
    }
    if !name.bytes().all(|b| (0x20..0x7f).contains(&b)) {
        return Err(eyre!("Token name must be printable ASCII"));
    }
    if name.eq_ignore_ascii_case(NATIVE_TOKEN_NAME) {
        return Err(eyre!(
            "Token name is reserved for the native token: {}",
            NATIVE_TOKEN_NAME
        ));
    }
    Ok(())
}

/// Validate a token symbol against the network rules.
pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(eyre!("Token symbol must not be empty"));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(eyre!(
            "Token symbol too long: {} bytes (maximum {})",
            symbol.len(),
            MAX_SYMBOL_LEN
        ));
    }
    if !symbol.bytes().all(|b| (0x20..0x7f).contains(&b)) {
        return Err(eyre!("Token symbol must be printable ASCII"));
    }
    if symbol.eq_ignore_ascii_case(NATIVE_TOKEN_SYMBOL) {
        return Err(eyre!(
            "Token symbol is reserved for the native token: {}",
            NATIVE_TOKEN_SYMBOL
        ));
    }
    Ok(())
}

/// Format a base-unit amount for display (2 decimal places).
pub fn format_amount(amount: u64) -> String {
    let int_part = amount / UNITS_PER_TOKEN;
    let frac_part = amount % UNITS_PER_TOKEN;
    format!("{}.{:02}", int_part, frac_part)
}
