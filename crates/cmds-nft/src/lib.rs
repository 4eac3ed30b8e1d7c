//! Mint or update a Metaplex NFT: load an identity, connect to Solana, upload
//! an image and its metadata to Bundlr, then create or update the token.

pub mod error;

pub mod connection;
pub mod identity;
pub mod nft;
pub mod pipeline;
pub mod utils;

pub use error::{
    ChainOperationError, ConnectivityError, Error, PersistenceError, Result, UploadError,
};
pub use pipeline::{run, MintPipeline, RunReport};

pub mod prelude {
    pub use async_trait::async_trait;
    pub use nft_lib::{solana::KeypairExt, MintConfig, SolanaNet, TokenMode};
    pub use serde::{Deserialize, Serialize};
    pub use solana_client::nonblocking::rpc_client::RpcClient;
    pub use solana_sdk::{
        instruction::Instruction,
        pubkey::Pubkey,
        signature::{Keypair, Signature},
        signer::Signer,
    };
    pub use std::sync::Arc;
}
