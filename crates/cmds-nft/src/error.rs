use solana_client::client_error::ClientError;
use solana_sdk::pubkey::Pubkey;
use std::{path::PathBuf, result::Result as StdResult};
use thiserror::Error as ThisError;

pub type Result<T> = StdResult<T, Error>;

/// Every failure aborts the run; the variant tells which step failed.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    ChainOperation(#[from] ChainOperationError),
}

#[derive(Debug, ThisError)]
pub enum PersistenceError {
    #[error("failed to read keypair file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write keypair file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("keypair file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

#[derive(Debug, ThisError)]
#[error("rpc endpoint {url} unreachable: {}", nft_lib::solana::verbose_solana_error(.source))]
pub struct ConnectivityError {
    pub url: String,
    pub source: ClientError,
}

#[derive(Debug, ThisError)]
pub enum UploadError {
    #[error("failed to read file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Bundlr(#[from] bundlr_sdk::error::BundlrError),
    #[error("bundlr isn't available on solana testnet")]
    BundlrNotAvailableOnTestnet,
    #[error("bundlr api returned an invalid response: {0}")]
    BundlrApiInvalidResponse(String),
    #[error("failed to register funding tx to bundlr. tx_id={0};")]
    BundlrTxRegisterFailed(String),
    #[error("failed to fund bundlr: {0}")]
    Funding(#[source] Box<ChainOperationError>),
    #[error("storage returned an empty uri")]
    EmptyUri,
    #[error("storage call timed out")]
    Timeout,
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[derive(Debug, ThisError)]
pub enum ChainOperationError {
    #[error("{}", nft_lib::solana::verbose_solana_error(.0))]
    Rpc(#[from] ClientError),
    #[error(transparent)]
    Program(#[from] solana_sdk::program_error::ProgramError),
    #[error(transparent)]
    Signer(#[from] solana_sdk::signer::SignerError),
    #[error("no metadata account for mint {0}")]
    AccountNotFound(Pubkey),
    #[error("invalid metadata account {account}: {reason}")]
    InvalidMetadata { account: Pubkey, reason: String },
    #[error("insufficient solana balance, needed={needed}; have={balance};")]
    InsufficientSolanaBalance { needed: u64, balance: u64 },
    #[error("{signer} is not the update authority of {mint}, expected {update_authority}")]
    NotUpdateAuthority {
        mint: Pubkey,
        signer: Pubkey,
        update_authority: Pubkey,
    },
    #[error("token {0} is immutable")]
    Immutable(Pubkey),
}

impl UploadError {
    pub fn custom<E: Into<anyhow::Error>>(e: E) -> Self {
        UploadError::Any(e.into())
    }
}

impl From<ChainOperationError> for UploadError {
    fn from(e: ChainOperationError) -> Self {
        UploadError::Funding(Box::new(e))
    }
}
