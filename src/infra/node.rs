use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::{Result, eyre};
use serde::Deserialize;

use crate::domain::registration::WalletService;
use crate::domain::token::{Token, TokenAuthorities, TokenDetails};

/// Tokari node API response for a token lookup. Failed lookups come back
/// with `success: false` and a message instead of the token fields.
#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    success: bool,
    message: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    total_supply: Option<u64>,
    transactions_count: Option<u64>,
    can_mint: Option<bool>,
    can_melt: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
    message: Option<String>,
    network: Option<String>,
    version: Option<String>,
}

/// Split a token-info response into identity and details.
fn parse_token_info(resp: TokenInfoResponse, uid: &str) -> Result<(Token, TokenDetails)> {
    if !resp.success {
        return Err(eyre!(
            resp.message.unwrap_or_else(|| "Unknown node error".to_string())
        ));
    }
    let name = resp.name.ok_or_else(|| eyre!("Node response missing token name"))?;
    let symbol = resp
        .symbol
        .ok_or_else(|| eyre!("Node response missing token symbol"))?;
    let details = TokenDetails {
        total_supply: resp.total_supply.unwrap_or(0),
        total_transactions: resp.transactions_count.unwrap_or(0),
        authorities: TokenAuthorities {
            mint: resp.can_mint.unwrap_or(false),
            melt: resp.can_melt.unwrap_or(false),
        },
    };
    Ok((Token::new(uid, name, symbol), details))
}

/// Tokari node HTTP client.
pub struct NodeClient {
    base_url: String,
    client: reqwest::Client,
}

impl NodeClient {
    pub fn new(node_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: node_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn node_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_token_info(&self, uid: &str) -> Result<TokenInfoResponse> {
        let url = format!("{}/v1/tokens/{}", self.base_url, uid);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(eyre!("Node returned HTTP {}", resp.status()));
        }
        Ok(resp.json::<TokenInfoResponse>().await?)
    }
}

#[async_trait]
impl WalletService for NodeClient {
    async fn get_token(&self, uid: &str) -> Result<Token> {
        let info = self.fetch_token_info(uid).await?;
        let (token, _) = parse_token_info(info, uid)?;
        Ok(token)
    }

    async fn get_token_details(&self, uid: &str) -> Result<TokenDetails> {
        let info = self.fetch_token_info(uid).await?;
        let (_, details) = parse_token_info(info, uid)?;
        Ok(details)
    }

    async fn status(&self) -> Result<String> {
        let url = format!("{}/v1/status", self.base_url);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(eyre!("Node returned HTTP {}", resp.status()));
        }
        let status = resp.json::<StatusResponse>().await?;
        if !status.success {
            return Err(eyre!(
                status.message.unwrap_or_else(|| "Unknown node error".to_string())
            ));
        }
        Ok(format!(
            "{} {}",
            status.network.unwrap_or_else(|| "unknown".to_string()),
            status.version.unwrap_or_default()
        )
        .trim_end()
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_info_success() {
        let raw = r#"{
            "success": true,
            "name": "Test Coin",
            "symbol": "TST",
            "total_supply": 12345,
            "transactions_count": 7,
            "can_mint": true,
            "can_melt": false
        }"#;
        let resp: TokenInfoResponse = serde_json::from_str(raw).unwrap();
        let uid = "ab".repeat(32);
        let (token, details) = parse_token_info(resp, &uid).unwrap();
        assert_eq!(token, Token::new(uid, "Test Coin", "TST"));
        assert_eq!(details.total_supply, 12345);
        assert_eq!(details.total_transactions, 7);
        assert!(details.authorities.mint);
        assert!(!details.authorities.melt);
    }

    #[test]
    fn test_parse_token_info_failure_carries_message() {
        let raw = r#"{"success": false, "message": "Unknown token"}"#;
        let resp: TokenInfoResponse = serde_json::from_str(raw).unwrap();
        let err = parse_token_info(resp, "00").unwrap_err();
        assert_eq!(err.to_string(), "Unknown token");
    }

    #[test]
    fn test_parse_token_info_missing_optional_fields() {
        // Older nodes omit supply and authority fields.
        let raw = r#"{"success": true, "name": "Bare", "symbol": "BRE"}"#;
        let resp: TokenInfoResponse = serde_json::from_str(raw).unwrap();
        let (_, details) = parse_token_info(resp, &"00".repeat(32)).unwrap();
        assert_eq!(details, TokenDetails::default());
    }

    #[test]
    fn test_status_response_decodes() {
        let raw = r#"{"success": true, "network": "testnet", "version": "0.4.1"}"#;
        let status: StatusResponse = serde_json::from_str(raw).unwrap();
        assert!(status.success);
        assert_eq!(status.network.as_deref(), Some("testnet"));
        assert_eq!(status.version.as_deref(), Some("0.4.1"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = NodeClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.node_url(), "http://localhost:8080");
    }
}
