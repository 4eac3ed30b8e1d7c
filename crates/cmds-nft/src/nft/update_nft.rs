use super::{OnChainNft, UpdateNftArgs};
use crate::{error::ChainOperationError, prelude::*, utils};
use mpl_token_metadata::instructions::{
    UpdateMetadataAccountV2, UpdateMetadataAccountV2InstructionArgs,
};

/// Only the update authority may change a mutable token.
pub fn check_can_update(nft: &OnChainNft, signer: &Pubkey) -> Result<(), ChainOperationError> {
    if nft.update_authority != *signer {
        return Err(ChainOperationError::NotUpdateAuthority {
            mint: nft.mint,
            signer: *signer,
            update_authority: nft.update_authority,
        });
    }
    if !nft.is_mutable {
        return Err(ChainOperationError::Immutable(nft.mint));
    }
    Ok(())
}

pub fn instruction(nft: &OnChainNft, args: &UpdateNftArgs) -> Instruction {
    UpdateMetadataAccountV2 {
        metadata: nft.metadata_account,
        update_authority: nft.update_authority,
    }
    .instruction(UpdateMetadataAccountV2InstructionArgs {
        data: args.merge(nft),
        new_update_authority: args.new_update_authority,
        primary_sale_happened: args.primary_sale_happened,
        is_mutable: args.is_mutable,
    })
}

/// Apply `args` to `nft`; no transaction is sent when `args` changes nothing.
pub async fn update_nft(
    client: &RpcClient,
    update_authority: &Keypair,
    nft: &OnChainNft,
    args: UpdateNftArgs,
) -> Result<Option<Signature>, ChainOperationError> {
    check_can_update(nft, &update_authority.pubkey())?;

    if args.is_noop() {
        tracing::info!("nothing to update on {}", nft.mint);
        return Ok(None);
    }

    let signature = utils::sign_and_submit(
        client,
        &update_authority.pubkey(),
        &[update_authority],
        &[instruction(nft, &args)],
        0,
    )
    .await?;

    Ok(Some(signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nft::tests::deagle_nft;

    #[test]
    fn test_wrong_authority() {
        let nft = deagle_nft(Pubkey::new_unique());
        let signer = Pubkey::new_unique();
        let result = check_can_update(&nft, &signer);
        assert!(matches!(
            result,
            Err(ChainOperationError::NotUpdateAuthority { signer: s, .. }) if s == signer
        ));
    }

    #[test]
    fn test_immutable() {
        let mut nft = deagle_nft(Pubkey::new_unique());
        nft.is_mutable = false;
        let result = check_can_update(&nft, &nft.update_authority);
        assert!(matches!(result, Err(ChainOperationError::Immutable(_))));
    }

    #[test]
    fn test_instruction_accounts() {
        let nft = deagle_nft(Pubkey::new_unique());
        let ix = instruction(
            &nft,
            &UpdateNftArgs {
                uri: Some("https://arweave.net/new".to_owned()),
                ..Default::default()
            },
        );
        assert_eq!(ix.program_id, mpl_token_metadata::ID);
        assert_eq!(ix.accounts[0].pubkey, nft.metadata_account);
        assert!(ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, nft.update_authority);
        assert!(ix.accounts[1].is_signer);
    }

    #[tokio::test]
    async fn test_noop_sends_nothing() {
        let nft = deagle_nft(Pubkey::new_unique());
        let authority = Keypair::new();
        let nft = OnChainNft {
            update_authority: authority.pubkey(),
            ..nft
        };
        let client = RpcClient::new("http://127.0.0.1:1".to_owned());
        let result = update_nft(&client, &authority, &nft, UpdateNftArgs::default())
            .await
            .unwrap();
        assert_eq!(result, None);
    }
}
