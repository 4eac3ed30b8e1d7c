use crate::{error::ChainOperationError, prelude::*};
use nft_lib::solana::find_failed_instruction;
use solana_sdk::{hash::Hash, message::Message, transaction::Transaction};

/// Build an unsigned transaction, checking that `fee_payer` can cover fees and rent.
pub async fn execute(
    client: &RpcClient,
    fee_payer: &Pubkey,
    instructions: &[Instruction],
    minimum_balance_for_rent_exemption: u64,
) -> Result<(Transaction, Hash), ChainOperationError> {
    let recent_blockhash = client.get_latest_blockhash().await?;

    let message = Message::new_with_blockhash(instructions, Some(fee_payer), &recent_blockhash);

    let balance = client.get_balance(fee_payer).await?;

    let needed = minimum_balance_for_rent_exemption + client.get_fee_for_message(&message).await?;

    if balance < needed {
        return Err(ChainOperationError::InsufficientSolanaBalance { balance, needed });
    }

    let transaction = Transaction::new_unsigned(message);

    Ok((transaction, recent_blockhash))
}

pub async fn submit_transaction(
    client: &RpcClient,
    tx: Transaction,
) -> Result<Signature, ChainOperationError> {
    client
        .send_and_confirm_transaction(&tx)
        .await
        .map_err(|error| {
            if let Some(index) = find_failed_instruction(&error) {
                tracing::error!("instruction {} failed", index);
            }
            error.into()
        })
}

/// [`execute`], sign with every keypair in `signers`, then submit.
pub async fn sign_and_submit(
    client: &RpcClient,
    fee_payer: &Pubkey,
    signers: &[&Keypair],
    instructions: &[Instruction],
    minimum_balance_for_rent_exemption: u64,
) -> Result<Signature, ChainOperationError> {
    let (mut tx, recent_blockhash) = execute(
        client,
        fee_payer,
        instructions,
        minimum_balance_for_rent_exemption,
    )
    .await?;

    tx.try_sign(signers, recent_blockhash)?;

    submit_transaction(client, tx).await
}
