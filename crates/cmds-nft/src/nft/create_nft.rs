use super::CreateNftArgs;
use crate::{error::ChainOperationError, prelude::*, utils};
use mpl_token_metadata::{
    accounts::{MasterEdition, Metadata},
    instructions::{CreateMasterEditionV3InstructionArgs, CreateMetadataAccountV3InstructionArgs},
    types::{Creator, DataV2},
};
use solana_sdk::{system_instruction, system_program};
use spl_token::solana_program::program_pack::Pack;

// metadata account with every optional field at its maximum size
const METADATA_ACCOUNT_LEN: usize = 679;
const MASTER_EDITION_ACCOUNT_LEN: usize = 282;

/// Every account the create transaction opens, each paying its own rent.
const NEW_ACCOUNT_LENS: [usize; 4] = [
    spl_token::state::Mint::LEN,
    spl_token::state::Account::LEN,
    METADATA_ACCOUNT_LEN,
    MASTER_EDITION_ACCOUNT_LEN,
];

/// Instructions minting one NFT to `owner`, with `owner` as payer and every authority.
pub fn instructions(
    owner: &Pubkey,
    mint: &Pubkey,
    args: CreateNftArgs,
    mint_rent: u64,
) -> Result<Vec<Instruction>, ChainOperationError> {
    let (metadata_account, _) = Metadata::find_pda(mint);
    let (master_edition_account, _) = MasterEdition::find_pda(mint);

    let token_account =
        spl_associated_token_account::get_associated_token_address(owner, mint);

    let data = DataV2 {
        name: args.name,
        symbol: args.symbol,
        uri: args.uri,
        seller_fee_basis_points: args.seller_fee_basis_points,
        creators: Some(vec![Creator {
            address: *owner,
            verified: true,
            share: 100,
        }]),
        collection: None,
        uses: None,
    };

    let create_metadata = mpl_token_metadata::instructions::CreateMetadataAccountV3 {
        metadata: metadata_account,
        mint: *mint,
        mint_authority: *owner,
        payer: *owner,
        update_authority: (*owner, true),
        system_program: system_program::id(),
        rent: None,
    }
    .instruction(CreateMetadataAccountV3InstructionArgs {
        data,
        is_mutable: true,
        collection_details: None,
    });

    let create_master_edition = mpl_token_metadata::instructions::CreateMasterEditionV3 {
        edition: master_edition_account,
        mint: *mint,
        update_authority: *owner,
        mint_authority: *owner,
        payer: *owner,
        metadata: metadata_account,
        token_program: spl_token::id(),
        system_program: system_program::id(),
        rent: None,
    }
    .instruction(CreateMasterEditionV3InstructionArgs {
        max_supply: Some(0),
    });

    Ok(vec![
        system_instruction::create_account(
            owner,
            mint,
            mint_rent,
            spl_token::state::Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint2(&spl_token::id(), mint, owner, Some(owner), 0)?,
        spl_associated_token_account::instruction::create_associated_token_account(
            owner,
            owner,
            mint,
            &spl_token::id(),
        ),
        spl_token::instruction::mint_to(&spl_token::id(), mint, &token_account, owner, &[], 1)?,
        create_metadata,
        create_master_edition,
    ])
}

/// Mint a new NFT owned by `payer`; returns the mint address.
pub async fn create_nft(
    client: &RpcClient,
    payer: &Keypair,
    args: CreateNftArgs,
) -> Result<(Pubkey, Signature), ChainOperationError> {
    let mint = Keypair::new();

    let mut rents = Vec::with_capacity(NEW_ACCOUNT_LENS.len());
    for len in NEW_ACCOUNT_LENS {
        rents.push(client.get_minimum_balance_for_rent_exemption(len).await?);
    }
    let mint_rent = rents[0];
    let minimum_balance_for_rent_exemption = rents.iter().sum();

    let instructions = instructions(&payer.pubkey(), &mint.pubkey(), args, mint_rent)?;

    let signature = utils::sign_and_submit(
        client,
        &payer.pubkey(),
        &[payer, &mint],
        &instructions,
        minimum_balance_for_rent_exemption,
    )
    .await?;

    Ok((mint.pubkey(), signature))
}
