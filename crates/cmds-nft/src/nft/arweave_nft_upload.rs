use super::{arweave_file_upload::upload_checked, NftMetadata, Storage};
use crate::{error::UploadError, prelude::*, utils};
use bundlr_sdk::{error::BundlrError, tags::Tag, Bundlr, Ed25519Signer};
use bytes::Bytes;
use std::{future::Future, time::Duration};

/// Serialize `metadata` to JSON and upload it, returning its URI.
pub async fn publish_metadata<S: Storage + ?Sized>(
    storage: &S,
    metadata: &NftMetadata,
) -> Result<String, UploadError> {
    let data = serde_json::to_vec(metadata)?;
    upload_checked(storage, data.into(), "application/json".to_owned()).await
}

pub struct BundlrSigner {
    keypair: Keypair,
}

impl BundlrSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

impl bundlr_sdk::Signer for BundlrSigner {
    const SIG_TYPE: u16 = Ed25519Signer::SIG_TYPE;
    const SIG_LENGTH: u16 = Ed25519Signer::SIG_LENGTH;
    const PUB_LENGTH: u16 = Ed25519Signer::PUB_LENGTH;

    fn sign(&self, msg: bytes::Bytes) -> Result<bytes::Bytes, BundlrError> {
        let sig = self.keypair.sign_message(&msg);
        Ok(<[u8; 64]>::from(sig).to_vec().into())
    }

    fn pub_key(&self) -> bytes::Bytes {
        self.keypair.pubkey().to_bytes().to_vec().into()
    }
}

/// Bundlr node paid in SOL by the identity keypair.
pub struct BundlrStorage {
    fee_payer: Keypair,
    node_url: String,
    timeout: Duration,
    fund: bool,
    http: reqwest::Client,
    client: Arc<RpcClient>,
}

impl BundlrStorage {
    pub fn new(
        client: Arc<RpcClient>,
        cfg: &MintConfig,
        fee_payer: Keypair,
    ) -> Result<BundlrStorage, UploadError> {
        let node_url = cfg
            .storage_url()
            .ok_or(UploadError::BundlrNotAvailableOnTestnet)?;

        let http = reqwest::Client::builder()
            .timeout(cfg.storage.timeout)
            .build()?;

        Ok(BundlrStorage {
            fee_payer,
            node_url,
            timeout: cfg.storage.timeout,
            fund: cfg.storage.fund,
            http,
            client,
        })
    }

    async fn with_timeout<T, F>(&self, fut: F) -> Result<T, UploadError>
    where
        F: Future<Output = Result<T, UploadError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| UploadError::Timeout)?
    }

    /// Top up the Bundlr balance so that `size` bytes can be stored.
    pub async fn lazy_fund(&self, size: u64) -> Result<(), UploadError> {
        let needed_size = size + 10_000;

        let needed_balance = self.with_timeout(self.get_price(needed_size)).await?;
        let needed_balance = needed_balance + needed_balance / 10;

        let current_balance = self.with_timeout(self.get_current_balance()).await?;

        if current_balance < needed_balance {
            self.fund(needed_balance - current_balance).await?;
        } else {
            tracing::debug!(
                "bundlr balance {} covers {} bytes",
                current_balance,
                needed_size
            );
        }

        Ok(())
    }

    async fn get_price(&self, size: u64) -> Result<u64, UploadError> {
        let resp = self
            .http
            .get(format!("{}/price/solana/{}", &self.node_url, size))
            .send()
            .await?;
        let text = resp.text().await?;
        text.trim()
            .parse::<u64>()
            .map_err(|_| UploadError::BundlrApiInvalidResponse(text.clone()))
    }

    async fn get_current_balance(&self) -> Result<u64, UploadError> {
        #[serde_with::serde_as]
        #[derive(Deserialize)]
        struct Resp {
            #[serde_as(as = "serde_with::DisplayFromStr")]
            balance: u64,
        }

        let resp = self
            .http
            .get(format!(
                "{}/account/balance/solana/?address={}",
                &self.node_url,
                self.fee_payer.pubkey()
            ))
            .send()
            .await?;

        if resp.status().is_success() {
            let resp = resp.json::<Resp>().await?;
            Ok(resp.balance)
        } else {
            let text = resp.text().await?;
            Err(UploadError::BundlrApiInvalidResponse(text))
        }
    }

    async fn get_deposit_address(&self) -> Result<Pubkey, UploadError> {
        #[derive(Deserialize, Serialize)]
        struct Addresses {
            solana: String,
        }

        #[derive(Deserialize, Serialize)]
        struct Info {
            addresses: Addresses,
        }

        let resp = self
            .http
            .get(format!("{}/info", &self.node_url))
            .send()
            .await?;

        let info: Info = serde_json::from_str(&resp.text().await?)?;

        info.addresses
            .solana
            .parse::<Pubkey>()
            .map_err(UploadError::custom)
    }

    async fn register_funding_tx(&self, signature: &Signature) -> Result<(), UploadError> {
        let resp = self
            .http
            .post(format!("{}/account/balance/solana", &self.node_url))
            .json(&serde_json::json!({
                "tx_id": signature.to_string(),
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(UploadError::BundlrTxRegisterFailed(signature.to_string()));
        }

        Ok(())
    }

    async fn fund(&self, amount: u64) -> Result<(), UploadError> {
        tracing::info!("funding bundlr with {} lamports", amount);

        let recipient = self.with_timeout(self.get_deposit_address()).await?;

        let instruction =
            solana_sdk::system_instruction::transfer(&self.fee_payer.pubkey(), &recipient, amount);
        let signature = utils::sign_and_submit(
            &self.client,
            &self.fee_payer.pubkey(),
            &[&self.fee_payer],
            &[instruction],
            0,
        )
        .await?;

        self.with_timeout(self.register_funding_tx(&signature))
            .await
    }

    async fn send(&self, data: Bytes, content_type: String) -> Result<String, UploadError> {
        let bundlr = Bundlr::new(
            self.node_url.clone(),
            "solana".to_string(),
            "sol".to_string(),
            BundlrSigner::new(self.fee_payer.clone_keypair()),
        );

        let (bundlr, tx) = tokio::task::spawn_blocking(move || {
            let tx = bundlr.create_transaction_with_tags(
                data.to_vec(),
                vec![Tag::new("Content-Type".into(), content_type)],
            );
            (bundlr, tx)
        })
        .await
        .map_err(|_| {
            UploadError::custom(anyhow::anyhow!(
                "failed to create and sign bundlr transaction"
            ))
        })?;

        let resp = self
            .with_timeout(async { bundlr.send_transaction(tx).await.map_err(UploadError::from) })
            .await?;
        let resp: BundlrResponse = serde_json::from_value(resp)?;

        Ok(format!("https://arweave.net/{}", resp.id))
    }
}

#[async_trait]
impl Storage for BundlrStorage {
    async fn upload(&self, data: Bytes, content_type: String) -> Result<String, UploadError> {
        if self.fund {
            self.lazy_fund(data.len() as u64).await?;
        }

        self.send(data, content_type).await
    }
}

#[derive(Deserialize)]
struct BundlrResponse {
    id: String,
}
