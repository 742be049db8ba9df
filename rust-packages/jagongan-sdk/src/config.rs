//! Client configuration.
//!
//! Values come from the environment (a `.env` file is loaded first if present)
//! and fall back to devnet defaults. Front ends overlay their own flags on top.

use std::path::PathBuf;
use std::str::FromStr;

use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;

use crate::error::{JagonganError, Result};

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

pub const ENV_RPC_URL: &str = "JAGONGAN_RPC_URL";
pub const ENV_PROGRAM_ID: &str = "JAGONGAN_PROGRAM_ID";
pub const ENV_COMMITMENT: &str = "JAGONGAN_COMMITMENT";
pub const ENV_KEYPAIR: &str = "JAGONGAN_KEYPAIR";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub commitment: CommitmentConfig,
    /// Keypair used as the signing wallet. `None` means read-only.
    pub keypair_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            program_id: crate::ID,
            commitment: CommitmentConfig::confirmed(),
            keypair_path: default_keypair_path(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_RPC_URL) {
            config.rpc_url = url;
        }
        if let Some(id) = lookup(ENV_PROGRAM_ID) {
            config.program_id = Pubkey::from_str(&id)
                .map_err(|e| JagonganError::Config(format!("{}: {}", ENV_PROGRAM_ID, e)))?;
        }
        if let Some(level) = lookup(ENV_COMMITMENT) {
            config.commitment = CommitmentConfig::from_str(&level)
                .map_err(|e| JagonganError::Config(format!("{}: {}", ENV_COMMITMENT, e)))?;
        }
        if let Some(path) = lookup(ENV_KEYPAIR) {
            config.keypair_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

/// `~/.config/solana/id.json`, the Solana CLI default wallet.
fn default_keypair_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/solana/id.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.program_id, crate::ID);
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
    }

    #[test]
    fn test_lookup_overrides() {
        let program_id = Pubkey::new_unique();
        let vars: HashMap<&str, String> = HashMap::from([
            (ENV_RPC_URL, "http://127.0.0.1:8899".to_string()),
            (ENV_PROGRAM_ID, program_id.to_string()),
            (ENV_COMMITMENT, "finalized".to_string()),
            (ENV_KEYPAIR, "/tmp/wallet.json".to_string()),
        ]);

        let config = ClientConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();

        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.program_id, program_id);
        assert_eq!(config.commitment, CommitmentConfig::finalized());
        assert_eq!(config.keypair_path, Some(PathBuf::from("/tmp/wallet.json")));
    }

    #[test]
    fn test_invalid_program_id() {
        let result = ClientConfig::from_lookup(|key| {
            (key == ENV_PROGRAM_ID).then(|| "not-a-pubkey".to_string())
        });
        assert!(matches!(result, Err(JagonganError::Config(_))));
    }
}
