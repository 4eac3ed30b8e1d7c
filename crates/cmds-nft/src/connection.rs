use crate::{prelude::*, ConnectivityError};
use solana_sdk::commitment_config::CommitmentConfig;

/// Open a client for `cluster` and make sure the endpoint answers.
pub async fn connect(cluster: SolanaNet) -> Result<Arc<RpcClient>, ConnectivityError> {
    connect_url(cluster.url()).await
}

pub async fn connect_url(url: String) -> Result<Arc<RpcClient>, ConnectivityError> {
    let client = RpcClient::new_with_commitment(url.clone(), CommitmentConfig::confirmed());

    let version = client
        .get_version()
        .await
        .map_err(|source| ConnectivityError {
            url: url.clone(),
            source,
        })?;
    tracing::info!("connected to {} (solana-core {})", url, version.solana_core);

    Ok(Arc::new(client))
}
