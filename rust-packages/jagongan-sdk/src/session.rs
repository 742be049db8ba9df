//! The signing collaborator: who is acting, and how they sign.

use std::fmt;
use std::sync::Arc;

use solana_program::pubkey::Pubkey;
use solana_sdk::signer::Signer;

use crate::error::{JagonganError, Result};

/// Connected wallet, or none (logged-out view, no writes).
#[derive(Clone, Default)]
pub struct Session {
    signer: Option<Arc<dyn Signer + Send + Sync>>,
}

impl Session {
    pub fn connected(signer: Arc<dyn Signer + Send + Sync>) -> Self {
        Self { signer: Some(signer) }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    pub fn identity(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|signer| signer.pubkey())
    }

    pub fn signer(&self) -> Result<&(dyn Signer + Send + Sync)> {
        self.signer.as_deref().ok_or(JagonganError::WalletNotConnected)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("identity", &self.identity()).finish()
    }
}
