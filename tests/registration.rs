//! Registration pipeline tests over a real LMDB-backed registry.
//!
//! The node is mocked; everything below the `WalletService` seam is exercised
//! for real: configuration-string parsing, the duplicate checks against the
//! persistent store, and the final registry write.

use std::collections::HashMap;

use async_trait::async_trait;
use color_eyre::eyre::{Result, eyre};
use tempfile::TempDir;

use tokari_wallet::domain::config_string::configuration_string;
use tokari_wallet::domain::registration::{
    RegisterError, TokenRegistry, WalletService, validate_token_to_add,
};
use tokari_wallet::domain::token::{Token, TokenDetails};
use tokari_wallet::infra::store::Store;

/// Node stub that knows a fixed set of tokens.
struct FakeNode {
    tokens: HashMap<String, Token>,
}

impl FakeNode {
    fn new(tokens: &[Token]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|t| (t.uid.clone(), t.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl WalletService for FakeNode {
    async fn get_token(&self, uid: &str) -> Result<Token> {
        self.tokens
            .get(uid)
            .cloned()
            .ok_or_else(|| eyre!("Unknown token: {}", uid))
    }

    async fn get_token_details(&self, _uid: &str) -> Result<TokenDetails> {
        Ok(TokenDetails::default())
    }

    async fn status(&self) -> Result<String> {
        Ok("testnet".to_string())
    }
}

fn open_store(dir: &TempDir) -> Store {
    Store::with_path(dir.path().join("registry.mdb")).expect("failed to open store")
}

fn token(hex_byte: &str, name: &str, symbol: &str) -> Token {
    Token::new(hex_byte.repeat(32), name, symbol)
}

#[tokio::test]
async fn validate_then_register_persists_token() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let t = token("ab", "Test Coin", "TST");
    let node = FakeNode::new(&[t.clone()]);

    let config = configuration_string(&t);
    let validated = validate_token_to_add(&config, &store, &node).await.unwrap();
    assert_eq!(validated, t);

    // The write is the caller's second phase.
    store.add_token(&validated).unwrap();
    assert!(store.contains(&t.uid).unwrap());
    assert_eq!(store.all_tokens().unwrap().len(), 1);
}

#[tokio::test]
async fn registering_twice_is_rejected_by_the_store_check() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let t = token("ab", "Test Coin", "TST");
    let node = FakeNode::new(&[t.clone()]);
    store.add_token(&t).unwrap();

    let err = validate_token_to_add(&configuration_string(&t), &store, &node)
        .await
        .unwrap_err();
    assert!(matches!(err, RegisterError::AlreadyRegistered { .. }));
    assert_eq!(
        err.to_string(),
        format!("You already have this token: {} (Test Coin)", t.uid)
    );
}

#[tokio::test]
async fn name_collision_across_different_uids_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.add_token(&token("ab", "Test Coin", "AAA")).unwrap();

    let incoming = token("cd", "test coin", "BBB");
    let node = FakeNode::new(&[incoming.clone()]);
    let err = validate_token_to_add(&configuration_string(&incoming), &store, &node)
        .await
        .unwrap_err();
    assert_eq!(err, RegisterError::NameInUse("test coin".to_string()));
    assert!(!store.contains(&incoming.uid).unwrap());
}

#[tokio::test]
async fn symbol_collision_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.add_token(&token("ab", "First", "TST")).unwrap();

    let incoming = token("cd", "Second", "TST");
    let node = FakeNode::new(&[incoming.clone()]);
    let err = validate_token_to_add(&configuration_string(&incoming), &store, &node)
        .await
        .unwrap_err();
    assert_eq!(err, RegisterError::SymbolInUse("TST".to_string()));
}

#[tokio::test]
async fn network_identity_mismatch_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    // Node says this uid belongs to a token with a different name.
    let claimed = token("ab", "Test Coin", "TST");
    let mut actual = claimed.clone();
    actual.name = "Impostor".to_string();
    let node = FakeNode::new(&[actual]);

    let err = validate_token_to_add(&configuration_string(&claimed), &store, &node)
        .await
        .unwrap_err();
    assert!(matches!(err, RegisterError::NameMismatch { .. }));
    assert!(err.to_string().contains("Impostor"));
}

#[tokio::test]
async fn unknown_uid_reports_node_message() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let t = token("ab", "Test Coin", "TST");
    let node = FakeNode::new(&[]);

    let err = validate_token_to_add(&configuration_string(&t), &store, &node)
        .await
        .unwrap_err();
    match &err {
        RegisterError::Network(msg) => assert!(msg.contains("Unknown token")),
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_config_string_never_touches_the_store() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let node = FakeNode::new(&[]);

    let err = validate_token_to_add("[not:a:token]", &store, &node)
        .await
        .unwrap_err();
    assert!(matches!(err, RegisterError::Config(_)));
    assert!(store.all_tokens().unwrap().is_empty());
}

#[tokio::test]
async fn full_flow_reregister_after_unregister() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let t = token("ab", "Test Coin", "TST");
    let node = FakeNode::new(&[t.clone()]);
    let config = configuration_string(&t);

    let validated = validate_token_to_add(&config, &store, &node).await.unwrap();
    store.add_token(&validated).unwrap();

    store.remove_token(&t.uid).unwrap();
    assert!(!store.contains(&t.uid).unwrap());

    // After unregistering, the same configuration string is accepted again.
    let validated = validate_token_to_add(&config, &store, &node).await.unwrap();
    store.add_token(&validated).unwrap();
    assert!(store.contains(&t.uid).unwrap());
}
