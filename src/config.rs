use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Get the data directory for the application.
pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = std::env::var("TOKARI_WALLET_DATA") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "tokari", "tokari-wallet") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Get the config directory for the application.
pub fn get_config_dir() -> PathBuf {
    if let Ok(s) = std::env::var("TOKARI_WALLET_CONFIG") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "tokari", "tokari-wallet") {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub node_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::testnet()
    }
}

impl Config {
    /// Create config from CLI args.
    pub fn new(network: &str, node_url: Option<&str>) -> Self {
        let mut config = Self::from_network(network);
        if let Some(url) = node_url {
            config.network.node_url = url.to_string();
        }
        config
    }

    pub fn testnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "testnet".to_string(),
                node_url: "https://node.testnet.tokari.network".to_string(),
            },
        }
    }

    pub fn mainnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "mainnet".to_string(),
                node_url: "https://node.tokari.network".to_string(),
            },
        }
    }

    pub fn localnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "localnet".to_string(),
                node_url: "http://127.0.0.1:8583".to_string(),
            },
        }
    }

    pub fn from_network(network: &str) -> Self {
        match network {
            "mainnet" => Self::mainnet(),
            "localnet" => Self::localnet(),
            _ => Self::testnet(),
        }
    }
}
