//! Token registration: capability seams and the validation pipeline.
//!
//! Registration is deliberately two-phase so the UI can cancel cleanly:
//! [`validate_token_to_add`] is asynchronous and read-only (it may hit the
//! network), while the registry write is a separate synchronous
//! [`TokenRegistry::add_token`] call the caller performs only once it knows
//! the result is still wanted.

use async_trait::async_trait;
use color_eyre::eyre::Result;
use thiserror::Error;

use super::config_string::{ConfigStringError, parse_configuration_string};
use super::token::{RegisteredToken, Token, TokenDetails};

/// Read access to the network, as seen by the wallet.
///
/// Everything behind this seam (transaction handling, sync, indexing) is the
/// node's problem; the wallet only ever asks about tokens.
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Look up a token's identity (name, symbol) by uid.
    async fn get_token(&self, uid: &str) -> Result<Token>;

    /// Fetch supply, transaction count and authority flags for a token.
    async fn get_token_details(&self, uid: &str) -> Result<TokenDetails>;

    /// Node heartbeat; returns a short human-readable status line.
    async fn status(&self) -> Result<String>;
}

/// The local trusted-token registry capability.
///
/// Name and symbol lookups are case-insensitive: two registered tokens may
/// not differ only in casing.
pub trait TokenRegistry: Send + Sync {
    fn add_token(&self, token: &Token) -> Result<()>;
    /// Remove a token. Removing an unknown uid is a no-op.
    fn remove_token(&self, uid: &str) -> Result<()>;
    fn get(&self, uid: &str) -> Result<Option<RegisteredToken>>;
    fn contains(&self, uid: &str) -> Result<bool>;
    /// All registered tokens, sorted by name.
    fn all_tokens(&self) -> Result<Vec<RegisteredToken>>;
    fn find_by_name(&self, name: &str) -> Result<Option<RegisteredToken>>;
    fn find_by_symbol(&self, symbol: &str) -> Result<Option<RegisteredToken>>;
}

/// Why a token could not be registered. The `Display` text is shown to the
/// user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Config(#[from] ConfigStringError),
    #[error("You already have this token: {uid} ({name})")]
    AlreadyRegistered { uid: String, name: String },
    #[error("You already have a token with this name: {0}")]
    NameInUse(String),
    #[error("You already have a token with this symbol: {0}")]
    SymbolInUse(String),
    #[error("Token name does not match the network record: {local} != {network}")]
    NameMismatch { local: String, network: String },
    #[error("Token symbol does not match the network record: {local} != {network}")]
    SymbolMismatch { local: String, network: String },
    #[error("Could not verify token with the network: {0}")]
    Network(String),
    #[error("Token registry failure: {0}")]
    Storage(String),
}

fn storage_err(e: color_eyre::eyre::Report) -> RegisterError {
    RegisterError::Storage(e.to_string())
}

/// Validate a configuration string against the local registry and the
/// network record. Returns the token identity to register on success.
///
/// Checks, in order:
/// 1. the configuration string itself (format, checksum, field rules);
/// 2. the uid is not already registered;
/// 3. no registered token already uses the name or the symbol;
/// 4. the network knows the uid and agrees on name and symbol.
pub async fn validate_token_to_add(
    config: &str,
    registry: &dyn TokenRegistry,
    wallet: &dyn WalletService,
) -> Result<Token, RegisterError> {
    let token = parse_configuration_string(config)?;

    if let Some(existing) = registry.get(&token.uid).map_err(storage_err)? {
        return Err(RegisterError::AlreadyRegistered {
            uid: existing.token.uid,
            name: existing.token.name,
        });
    }
    if registry
        .find_by_name(&token.name)
        .map_err(storage_err)?
        .is_some()
    {
        return Err(RegisterError::NameInUse(token.name));
    }
    if registry
        .find_by_symbol(&token.symbol)
        .map_err(storage_err)?
        .is_some()
    {
        return Err(RegisterError::SymbolInUse(token.symbol));
    }

    let network = wallet
        .get_token(&token.uid)
        .await
        .map_err(|e| RegisterError::Network(e.to_string()))?;
    if network.name != token.name {
        return Err(RegisterError::NameMismatch {
            local: token.name,
            network: network.name,
        });
    }
    if network.symbol != token.symbol {
        return Err(RegisterError::SymbolMismatch {
            local: token.symbol,
            network: network.symbol,
        });
    }

    Ok(token)
}
