//! The seam between the client and the on-chain program.
//!
//! The program is a black box: enumeration of every account of one type, point
//! lookup by address, and transaction submission. [`RpcProgram`] talks to a
//! real cluster; tests substitute an in-memory double.

use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::state::{AccountKind, ProgramAccount, Record};

#[async_trait]
pub trait RemoteProgram: Send + Sync {
    fn program_id(&self) -> Pubkey;

    /// Every account of `kind`, unordered, as raw data.
    async fn fetch_all(&self, kind: AccountKind) -> Result<Vec<(Pubkey, Vec<u8>)>>;

    /// Point lookup. `Ok(None)` means the account does not exist.
    async fn fetch(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Sign, send and wait for confirmation. No client-side timeout.
    async fn submit(&self, instruction: Instruction, signer: &(dyn Signer + Send + Sync)) -> Result<Signature>;
}

/// Fetch and decode every account of type `T`.
///
/// Accounts that carry the right discriminator but fail to decode are skipped.
pub async fn fetch_records<T: ProgramAccount>(program: &dyn RemoteProgram) -> Result<Vec<Record<T>>> {
    let raw = program.fetch_all(T::KIND).await?;
    let total = raw.len();
    let records: Vec<Record<T>> = raw
        .into_iter()
        .filter_map(|(address, data)| match Record::decode(address, &data) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(%address, error = %e, "skipping undecodable account");
                None
            }
        })
        .collect();
    debug!(kind = T::KIND.name(), total, decoded = records.len(), "fetched accounts");
    Ok(records)
}

/// Fetch and decode one account of type `T`.
pub async fn fetch_record<T: ProgramAccount>(
    program: &dyn RemoteProgram,
    address: &Pubkey,
) -> Result<Option<Record<T>>> {
    match program.fetch(address).await? {
        Some(data) => Record::decode(*address, &data).map(Some),
        None => Ok(None),
    }
}

/// [`RemoteProgram`] over the nonblocking Solana RPC client.
pub struct RpcProgram {
    rpc: RpcClient,
    program_id: Pubkey,
    commitment: CommitmentConfig,
}

impl RpcProgram {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment),
            program_id: config.program_id,
            commitment: config.commitment,
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

#[async_trait]
impl RemoteProgram for RpcProgram {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    async fn fetch_all(&self, kind: AccountKind) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                0,
                &kind.discriminator(),
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..Default::default()
            },
            ..Default::default()
        };
        let accounts = self
            .rpc
            .get_program_accounts_with_config(&self.program_id, config)
            .await?;
        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }

    async fn fetch(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.commitment)
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn submit(&self, instruction: Instruction, signer: &(dyn Signer + Send + Sync)) -> Result<Signature> {
        let payer = signer.pubkey();
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let tx = Transaction::new_signed_with_payer(&[instruction], Some(&payer), &[signer], blockhash);
        let signature = self.rpc.send_and_confirm_transaction(&tx).await?;
        info!(%signature, %payer, "transaction confirmed");
        Ok(signature)
    }
}
