use super::OnChainNft;
use crate::{error::ChainOperationError, prelude::*};
use mpl_token_metadata::accounts::Metadata;

/// Fetch and decode the metadata account of `mint`.
pub async fn find_by_mint(
    client: &RpcClient,
    mint: Pubkey,
) -> Result<OnChainNft, ChainOperationError> {
    let (metadata_account, _) = Metadata::find_pda(&mint);

    let account = client
        .get_account_with_commitment(&metadata_account, client.commitment())
        .await?
        .value
        .ok_or(ChainOperationError::AccountNotFound(mint))?;

    if account.owner != mpl_token_metadata::ID {
        return Err(ChainOperationError::InvalidMetadata {
            account: metadata_account,
            reason: format!("owned by {}", account.owner),
        });
    }

    decode(metadata_account, &account.data)
}

fn decode(metadata_account: Pubkey, data: &[u8]) -> Result<OnChainNft, ChainOperationError> {
    let metadata =
        Metadata::from_bytes(data).map_err(|e| ChainOperationError::InvalidMetadata {
            account: metadata_account,
            reason: e.to_string(),
        })?;

    Ok(OnChainNft::from_metadata(metadata_account, metadata))
}
