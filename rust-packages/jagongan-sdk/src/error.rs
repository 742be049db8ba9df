//! Error definitions for the Jagongan client.

use solana_client::client_error::ClientError;
use solana_program::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JagonganError {
    #[error("RPC client error: {0}")]
    RpcError(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Address constraint violated for account {0}")]
    AddressConstraint(Pubkey),

    #[error("Program rejected transaction: {0}")]
    ProgramRejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Input rejected on the client before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is {len} bytes, limit is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Tip amount must be greater than zero")]
    ZeroAmount,
}

impl From<ClientError> for JagonganError {
    fn from(err: ClientError) -> Self {
        // A transaction error means the program (or runtime) saw and refused it.
        match err.get_transaction_error() {
            Some(tx_err) => JagonganError::ProgramRejected(tx_err.to_string()),
            None => JagonganError::RpcError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, JagonganError>;
