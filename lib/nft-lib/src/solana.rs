use crate::SolanaNet;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_request::{RpcError, RpcResponseErrorData},
    rpc_response::RpcSimulateTransactionResult,
};
use solana_sdk::{pubkey::Pubkey, signer::keypair::Keypair};

pub fn find_failed_instruction(err: &ClientError) -> Option<usize> {
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError { message, .. }) = &err.kind {
        if let Some(s) =
            message.strip_prefix("Transaction simulation failed: Error processing Instruction ")
        {
            let index = s
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>();
            index.parse().ok()
        } else {
            None
        }
    } else {
        None
    }
}

/// Render an RPC error together with the simulation logs, if any.
pub fn verbose_solana_error(err: &ClientError) -> String {
    use std::fmt::Write;
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
        code,
        message,
        data,
    }) = &err.kind
    {
        let mut s = String::new();
        writeln!(s, "{} ({})", message, code).ok();
        if let RpcResponseErrorData::SendTransactionPreflightFailure(
            RpcSimulateTransactionResult {
                logs: Some(logs), ..
            },
        ) = data
        {
            for (i, log) in logs.iter().enumerate() {
                writeln!(s, "{}: {}", i + 1, log).ok();
            }
        }
        s
    } else {
        err.to_string()
    }
}

pub trait KeypairExt {
    fn clone_keypair(&self) -> Self;
}

impl KeypairExt for Keypair {
    fn clone_keypair(&self) -> Self {
        Self::from_bytes(&self.to_bytes()).expect("round-trip of a valid keypair")
    }
}

/// Solana Explorer page of an address.
pub fn explorer_url(address: &Pubkey, cluster: SolanaNet) -> String {
    match cluster {
        SolanaNet::Mainnet => format!("https://explorer.solana.com/address/{}", address),
        cluster => format!(
            "https://explorer.solana.com/address/{}?cluster={}",
            address,
            cluster.as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signer::Signer;

    #[test]
    fn test_clone_keypair() {
        let keypair = Keypair::new();
        let cloned = keypair.clone_keypair();
        assert_eq!(keypair.pubkey(), cloned.pubkey());
        assert_eq!(keypair.to_bytes(), cloned.to_bytes());
    }

    #[test]
    fn test_explorer_url() {
        let mint = solana_sdk::pubkey!("6kh6jZyzVmLRXNsvEPanmSxh9Qbdmi2AGh7aFFWotBuu");
        assert_eq!(
            explorer_url(&mint, SolanaNet::Devnet),
            "https://explorer.solana.com/address/6kh6jZyzVmLRXNsvEPanmSxh9Qbdmi2AGh7aFFWotBuu?cluster=devnet"
        );
        assert_eq!(
            explorer_url(&mint, SolanaNet::Mainnet),
            "https://explorer.solana.com/address/6kh6jZyzVmLRXNsvEPanmSxh9Qbdmi2AGh7aFFWotBuu"
        );
    }

    #[test]
    fn test_failed_instruction_of_other_errors() {
        let err = ClientError::from(ClientErrorKind::Custom("boom".to_owned()));
        assert_eq!(find_failed_instruction(&err), None);
        assert_eq!(verbose_solana_error(&err), err.to_string());
    }
}
