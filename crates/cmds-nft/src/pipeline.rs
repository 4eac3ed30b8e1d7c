use crate::{
    connection, identity,
    nft::{
        publish_metadata, upload_file, BundlrStorage, CreateNftArgs, MetaplexProgram,
        NftMetadata, NftProgram, Storage, UpdateNftArgs,
    },
    prelude::*,
    Result,
};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub image_uri: String,
    pub metadata_uri: String,
    pub mint: Pubkey,
    pub signature: Option<Signature>,
}

/// Upload, publish, then create or update, one step after the other.
pub struct MintPipeline<'a, S: ?Sized, P: ?Sized> {
    storage: &'a S,
    program: &'a P,
}

impl<'a, S, P> MintPipeline<'a, S, P>
where
    S: Storage + ?Sized,
    P: NftProgram + ?Sized,
{
    pub fn new(storage: &'a S, program: &'a P) -> Self {
        Self { storage, program }
    }

    pub async fn run(&self, cfg: &MintConfig) -> Result<RunReport> {
        let image_uri = upload_file(self.storage, &cfg.image_path()).await?;
        tracing::info!("image uri: {}", image_uri);

        let metadata = NftMetadata::new(
            cfg.token_name.clone(),
            cfg.description.clone(),
            image_uri.clone(),
        );
        let metadata_uri = publish_metadata(self.storage, &metadata).await?;
        tracing::info!("metadata uri: {}", metadata_uri);

        let (mint, signature) = match &cfg.mode {
            TokenMode::Create => {
                let (mint, signature) = self
                    .program
                    .create(CreateNftArgs {
                        uri: metadata_uri.clone(),
                        name: cfg.token_name.clone(),
                        seller_fee_basis_points: cfg.seller_fee_basis_points,
                        symbol: cfg.symbol.clone(),
                    })
                    .await?;
                (mint, Some(signature))
            }
            TokenMode::Update { mint } => {
                let nft = self.program.find_by_mint(*mint).await?;
                let signature = self
                    .program
                    .update(
                        &nft,
                        UpdateNftArgs {
                            name: Some(cfg.token_name.clone()),
                            symbol: Some(cfg.symbol.clone()),
                            uri: Some(metadata_uri.clone()),
                            seller_fee_basis_points: Some(cfg.seller_fee_basis_points),
                            ..Default::default()
                        },
                    )
                    .await?;
                (*mint, signature)
            }
        };

        if let Some(signature) = &signature {
            tracing::info!("signature: {}", signature);
        }

        Ok(RunReport {
            image_uri,
            metadata_uri,
            mint,
            signature,
        })
    }
}

/// Full run: identity, connection, then the [`MintPipeline`] against Bundlr
/// and the Metaplex program.
pub async fn run(cfg: &MintConfig) -> Result<RunReport> {
    let identity = identity::load_or_generate(&cfg.keypair_path).await?;
    tracing::info!("PublicKey: {}", identity.pubkey());

    let client = connection::connect(cfg.cluster).await?;

    identity::airdrop_if_needed(
        &client,
        &identity.pubkey(),
        cfg.cluster,
        cfg.airdrop_threshold,
    )
    .await?;

    let storage = BundlrStorage::new(client.clone(), cfg, identity.clone_keypair())?;
    let program = MetaplexProgram::new(client, identity, cfg.cluster);

    MintPipeline::new(&storage, &program).run(cfg).await
}
