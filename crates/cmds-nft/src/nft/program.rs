use super::{
    create_nft::create_nft, find_by_mint::find_by_mint, update_nft::update_nft, CreateNftArgs,
    NftProgram, OnChainNft, UpdateNftArgs,
};
use crate::{error::ChainOperationError, prelude::*};
use nft_lib::solana::explorer_url;

/// Metaplex token-metadata program, signed by the identity keypair.
pub struct MetaplexProgram {
    client: Arc<RpcClient>,
    authority: Keypair,
    cluster: SolanaNet,
}

impl MetaplexProgram {
    pub fn new(client: Arc<RpcClient>, authority: Keypair, cluster: SolanaNet) -> Self {
        Self {
            client,
            authority,
            cluster,
        }
    }
}

#[async_trait]
impl NftProgram for MetaplexProgram {
    async fn create(&self, args: CreateNftArgs) -> Result<(Pubkey, Signature), ChainOperationError> {
        let (mint, signature) = create_nft(&self.client, &self.authority, args).await?;
        tracing::info!("Token Mint: {}", explorer_url(&mint, self.cluster));
        Ok((mint, signature))
    }

    async fn find_by_mint(&self, mint: Pubkey) -> Result<OnChainNft, ChainOperationError> {
        find_by_mint(&self.client, mint).await
    }

    async fn update(
        &self,
        nft: &OnChainNft,
        args: UpdateNftArgs,
    ) -> Result<Option<Signature>, ChainOperationError> {
        let signature = update_nft(&self.client, &self.authority, nft, args).await?;
        tracing::info!("Token Mint: {}", explorer_url(&nft.mint, self.cluster));
        Ok(signature)
    }
}
