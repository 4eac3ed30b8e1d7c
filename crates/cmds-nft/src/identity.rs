//! Signing identity: a keypair persisted in a local file, created on first use.

use crate::{error::PersistenceError, prelude::*, ConnectivityError};
use solana_sdk::{native_token::LAMPORTS_PER_SOL, signer::keypair::keypair_from_seed};
use std::{io::ErrorKind, path::Path};
use tokio::io::AsyncWriteExt;

const KEYPAIR_LEN: usize = 64;

const AIRDROP_AMOUNT: u64 = LAMPORTS_PER_SOL;

/// Load the keypair stored at `path`, or generate one and store it there.
///
/// An existing file that cannot be read or decoded is an error; it is never
/// replaced by a fresh keypair.
pub async fn load_or_generate(path: &Path) -> Result<Keypair, PersistenceError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let keypair = parse_keypair(&text).map_err(|reason| PersistenceError::Corrupt {
                path: path.to_owned(),
                reason,
            })?;
            tracing::debug!("loaded keypair from {}", path.display());
            Ok(keypair)
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            let keypair = Keypair::new();
            save(path, &keypair).await?;
            tracing::info!("generated new keypair, saved to {}", path.display());
            Ok(keypair)
        }
        Err(source) => Err(PersistenceError::Read {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Accepts the Solana CLI JSON byte array or a base58 encoded secret key.
fn parse_keypair(text: &str) -> Result<Keypair, String> {
    let text = text.trim();
    let bytes = if text.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(text).map_err(|e| e.to_string())?
    } else {
        bs58::decode(text).into_vec().map_err(|e| e.to_string())?
    };

    if bytes.len() != KEYPAIR_LEN {
        return Err(format!(
            "expected {} bytes, found {}",
            KEYPAIR_LEN,
            bytes.len()
        ));
    }

    let keypair = keypair_from_seed(&bytes[..32]).map_err(|e| e.to_string())?;
    if keypair.pubkey().to_bytes()[..] != bytes[32..] {
        return Err("public key does not match secret key".to_owned());
    }

    Ok(keypair)
}

async fn save(path: &Path, keypair: &Keypair) -> Result<(), PersistenceError> {
    let write_error = |source| PersistenceError::Write {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_error)?;
    }

    let text = serde_json::to_string(&keypair.to_bytes().to_vec())
        .map_err(|e| write_error(e.into()))?;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await.map_err(write_error)?;
    file.write_all(text.as_bytes())
        .await
        .map_err(write_error)?;
    file.sync_all().await.map_err(write_error)?;

    Ok(())
}

/// Request an airdrop when the balance of `pubkey` is below `threshold`.
///
/// Never airdrops on mainnet. Returns the airdrop signature, if one was made.
pub async fn airdrop_if_needed(
    client: &RpcClient,
    pubkey: &Pubkey,
    cluster: SolanaNet,
    threshold: Option<u64>,
) -> Result<Option<Signature>, ConnectivityError> {
    let threshold = match (cluster, threshold) {
        (SolanaNet::Mainnet, _) | (_, None) => {
            tracing::debug!("airdrop disabled");
            return Ok(None);
        }
        (_, Some(threshold)) => threshold,
    };

    let rpc_error = |source| ConnectivityError {
        url: client.url(),
        source,
    };

    let balance = client.get_balance(pubkey).await.map_err(rpc_error)?;
    tracing::info!("current balance: {} lamports", balance);
    if balance >= threshold {
        return Ok(None);
    }

    tracing::info!("airdropping {} lamports to {}", AIRDROP_AMOUNT, pubkey);
    let signature = client
        .request_airdrop(pubkey, AIRDROP_AMOUNT)
        .await
        .map_err(rpc_error)?;
    client
        .poll_for_signature(&signature)
        .await
        .map_err(rpc_error)?;

    let balance = client.get_balance(pubkey).await.map_err(rpc_error)?;
    tracing::info!("new balance: {} lamports", balance);

    Ok(Some(signature))
}
