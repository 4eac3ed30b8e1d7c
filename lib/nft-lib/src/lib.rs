//! Shared types for minting and updating NFTs.
//!
//! Table of contents:
//! - [`config`]: run configuration and Solana network selection.
//! - [`solana`]: utilities for working with Solana.

pub mod config;
pub mod solana;

pub use config::{MintConfig, SolanaNet, StorageConfig, TokenMode, UnknownNetwork};
