use crate::{
    error::{ChainOperationError, UploadError},
    prelude::*,
};
use bytes::Bytes;
use mpl_token_metadata::{
    accounts::Metadata,
    types::{Collection, Creator, DataV2, Uses},
};

pub mod arweave_file_upload;
pub mod arweave_nft_upload;
pub mod create_nft;
pub mod find_by_mint;
pub mod program;
pub mod update_nft;

pub use arweave_file_upload::upload_file;
pub use arweave_nft_upload::{publish_metadata, BundlrStorage};
pub use program::MetaplexProgram;

/// Off-chain metadata document, stored as JSON next to the image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NftMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_fee_basis_points: Option<u16>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<NftMetadataAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<NftMetadataProperties>,
    /// Any other key, kept as is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NftMetadata {
    pub fn new(name: String, description: String, image: String) -> Self {
        Self {
            name,
            symbol: None,
            description,
            seller_fee_basis_points: None,
            image,
            animation_url: None,
            external_url: None,
            attributes: Vec::new(),
            properties: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NftMetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NftMetadataProperties {
    pub files: Option<Vec<NftMetadataFile>>,
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NftMetadataFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Content storage returning a stable URI for every upload.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(&self, data: Bytes, content_type: String) -> Result<String, UploadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNftArgs {
    pub uri: String,
    pub name: String,
    pub seller_fee_basis_points: u16,
    pub symbol: String,
}

/// Partial update of a token record; `None` keeps the on-chain value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateNftArgs {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub uri: Option<String>,
    pub seller_fee_basis_points: Option<u16>,
    pub new_update_authority: Option<Pubkey>,
    pub primary_sale_happened: Option<bool>,
    pub is_mutable: Option<bool>,
}

impl UpdateNftArgs {
    fn changes_data(&self) -> bool {
        self.name.is_some()
            || self.symbol.is_some()
            || self.uri.is_some()
            || self.seller_fee_basis_points.is_some()
    }

    pub fn is_noop(&self) -> bool {
        !self.changes_data()
            && self.new_update_authority.is_none()
            && self.primary_sale_happened.is_none()
            && self.is_mutable.is_none()
    }

    /// Data to write: present fields replace those of `current`, the rest is kept.
    pub fn merge(&self, current: &OnChainNft) -> Option<DataV2> {
        if !self.changes_data() {
            return None;
        }

        Some(DataV2 {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            symbol: self.symbol.clone().unwrap_or_else(|| current.symbol.clone()),
            uri: self.uri.clone().unwrap_or_else(|| current.uri.clone()),
            seller_fee_basis_points: self
                .seller_fee_basis_points
                .unwrap_or(current.seller_fee_basis_points),
            creators: current.creators.clone(),
            collection: current.collection.clone(),
            uses: current.uses.clone(),
        })
    }
}

/// Token record as read from its metadata account.
#[derive(Debug, Clone, PartialEq)]
pub struct OnChainNft {
    pub mint: Pubkey,
    pub metadata_account: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
}

fn trim_padding(s: String) -> String {
    s.trim_end_matches('\0').to_owned()
}

impl OnChainNft {
    pub fn from_metadata(metadata_account: Pubkey, metadata: Metadata) -> Self {
        Self {
            mint: metadata.mint,
            metadata_account,
            update_authority: metadata.update_authority,
            name: trim_padding(metadata.name),
            symbol: trim_padding(metadata.symbol),
            uri: trim_padding(metadata.uri),
            seller_fee_basis_points: metadata.seller_fee_basis_points,
            creators: metadata.creators,
            collection: metadata.collection,
            uses: metadata.uses,
            primary_sale_happened: metadata.primary_sale_happened,
            is_mutable: metadata.is_mutable,
        }
    }
}

/// On-chain token program operations.
#[async_trait]
pub trait NftProgram: Send + Sync {
    /// Mint a new NFT and return its mint address.
    async fn create(&self, args: CreateNftArgs) -> Result<(Pubkey, Signature), ChainOperationError>;

    async fn find_by_mint(&self, mint: Pubkey) -> Result<OnChainNft, ChainOperationError>;

    /// Returns `None` when `args` changes nothing and no transaction was sent.
    async fn update(
        &self,
        nft: &OnChainNft,
        args: UpdateNftArgs,
    ) -> Result<Option<Signature>, ChainOperationError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{
        collections::HashMap,
        sync::{Mutex, MutexGuard},
    };

    /// Calls made to the fakes, in order.
    pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

    #[derive(Debug, Clone)]
    pub(crate) struct Upload {
        pub content_type: String,
        pub data: Bytes,
    }

    #[derive(Default)]
    pub(crate) struct MemoryStorage {
        fixed_uri: Option<String>,
        uploads: Mutex<Vec<Upload>>,
        journal: Journal,
    }

    impl MemoryStorage {
        pub fn returning(uri: &str) -> Self {
            Self {
                fixed_uri: Some(uri.to_owned()),
                ..Default::default()
            }
        }

        pub fn with_journal(journal: Journal) -> Self {
            Self {
                journal,
                ..Default::default()
            }
        }

        pub fn uploads(&self) -> Vec<Upload> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn upload(&self, data: Bytes, content_type: String) -> Result<String, UploadError> {
            let mut uploads = self.uploads.lock().unwrap();
            let uri = self
                .fixed_uri
                .clone()
                .unwrap_or_else(|| format!("https://arweave.net/{}", uploads.len()));
            self.journal
                .lock()
                .unwrap()
                .push(format!("upload {} -> {}", content_type, uri));
            uploads.push(Upload { content_type, data });
            Ok(uri)
        }
    }

    /// Token program keeping records in memory.
    pub(crate) struct MemoryProgram {
        pub authority: Pubkey,
        records: Mutex<HashMap<Pubkey, OnChainNft>>,
        journal: Journal,
    }

    impl MemoryProgram {
        pub fn new(journal: Journal) -> Self {
            Self {
                authority: Pubkey::new_unique(),
                records: Mutex::new(HashMap::new()),
                journal,
            }
        }

        pub fn insert(&self, mut nft: OnChainNft) {
            nft.update_authority = self.authority;
            self.records.lock().unwrap().insert(nft.mint, nft);
        }

        pub fn get(&self, mint: &Pubkey) -> Option<OnChainNft> {
            self.records.lock().unwrap().get(mint).cloned()
        }

        fn log(&self) -> MutexGuard<'_, Vec<String>> {
            self.journal.lock().unwrap()
        }
    }

    #[async_trait]
    impl NftProgram for MemoryProgram {
        async fn create(
            &self,
            args: CreateNftArgs,
        ) -> Result<(Pubkey, Signature), ChainOperationError> {
            let mint = Pubkey::new_unique();
            self.log().push(format!("create {} {}", args.name, args.uri));
            self.insert(OnChainNft {
                mint,
                metadata_account: Metadata::find_pda(&mint).0,
                update_authority: self.authority,
                name: args.name,
                symbol: args.symbol,
                uri: args.uri,
                seller_fee_basis_points: args.seller_fee_basis_points,
                creators: None,
                collection: None,
                uses: None,
                primary_sale_happened: false,
                is_mutable: true,
            });
            Ok((mint, Signature::default()))
        }

        async fn find_by_mint(&self, mint: Pubkey) -> Result<OnChainNft, ChainOperationError> {
            self.log().push(format!("find {}", mint));
            self.get(&mint)
                .ok_or(ChainOperationError::AccountNotFound(mint))
        }

        async fn update(
            &self,
            nft: &OnChainNft,
            args: UpdateNftArgs,
        ) -> Result<Option<Signature>, ChainOperationError> {
            update_nft::check_can_update(nft, &self.authority)?;
            if args.is_noop() {
                return Ok(None);
            }
            self.log().push(format!(
                "update {} {:?} {:?} {:?} {:?}",
                nft.mint, args.name, args.symbol, args.uri, args.seller_fee_basis_points
            ));
            let mut records = self.records.lock().unwrap();
            let record = records
                .get_mut(&nft.mint)
                .ok_or(ChainOperationError::AccountNotFound(nft.mint))?;
            if let Some(data) = args.merge(record) {
                record.name = data.name;
                record.symbol = data.symbol;
                record.uri = data.uri;
                record.seller_fee_basis_points = data.seller_fee_basis_points;
            }
            if let Some(is_mutable) = args.is_mutable {
                record.is_mutable = is_mutable;
            }
            Ok(Some(Signature::default()))
        }
    }

    pub(crate) fn deagle_nft(mint: Pubkey) -> OnChainNft {
        OnChainNft {
            mint,
            metadata_account: Metadata::find_pda(&mint).0,
            update_authority: Pubkey::new_unique(),
            name: "DeagleNFT".to_owned(),
            symbol: "DEN".to_owned(),
            uri: "https://arweave.net/old".to_owned(),
            seller_fee_basis_points: 100,
            creators: Some(vec![Creator {
                address: Pubkey::new_unique(),
                verified: true,
                share: 100,
            }]),
            collection: None,
            uses: None,
            primary_sale_happened: false,
            is_mutable: true,
        }
    }

    #[test]
    fn test_merge_only_uri() {
        let current = deagle_nft(Pubkey::new_unique());
        let args = UpdateNftArgs {
            uri: Some("X".to_owned()),
            ..Default::default()
        };
        let data = args.merge(&current).unwrap();
        assert_eq!(data.uri, "X");
        assert_eq!(data.name, current.name);
        assert_eq!(data.symbol, current.symbol);
        assert_eq!(data.seller_fee_basis_points, current.seller_fee_basis_points);
        assert_eq!(data.creators, current.creators);
    }

    #[test]
    fn test_merge_all_fields() {
        let current = deagle_nft(Pubkey::new_unique());
        let args = UpdateNftArgs {
            name: Some("Other".to_owned()),
            symbol: Some("OTH".to_owned()),
            uri: Some("https://arweave.net/new".to_owned()),
            seller_fee_basis_points: Some(250),
            ..Default::default()
        };
        let data = args.merge(&current).unwrap();
        assert_eq!(data.name, "Other");
        assert_eq!(data.symbol, "OTH");
        assert_eq!(data.uri, "https://arweave.net/new");
        assert_eq!(data.seller_fee_basis_points, 250);
    }

    #[test]
    fn test_noop() {
        let current = deagle_nft(Pubkey::new_unique());
        let args = UpdateNftArgs::default();
        assert!(args.is_noop());
        assert_eq!(args.merge(&current), None);

        let args = UpdateNftArgs {
            is_mutable: Some(false),
            ..Default::default()
        };
        assert!(!args.is_noop());
        assert_eq!(args.merge(&current), None);
    }

    #[test]
    fn test_trim_padding() {
        assert_eq!(trim_padding("DEN\0\0\0\0\0\0\0".to_owned()), "DEN");
        assert_eq!(trim_padding(String::new()), "");
    }

    #[test]
    fn test_metadata_json() {
        let metadata = NftMetadata::new(
            "DeagleNFT".to_owned(),
            "The first operation".to_owned(),
            "https://arweave.net/image".to_owned(),
        );
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            serde_json::json!({
                "name": "DeagleNFT",
                "description": "The first operation",
                "image": "https://arweave.net/image",
            })
        );
    }

    #[test]
    fn test_metadata_passthrough() {
        let json = serde_json::json!({
            "name": "SO #11111",
            "symbol": "SPOP",
            "description": "Space Operator is a dynamic PFP collection",
            "seller_fee_basis_points": 250,
            "image": "https://arweave.net/vb1tD7tfAyrhZceA1MOYvvyqzZWgzHGDVZF37yDNH1Q",
            "attributes": [
                { "trait_type": "Season", "value": "Fall" }
            ],
            "properties": {
                "files": [
                    {
                        "uri": "https://arweave.net/vb1tD7tfAyrhZceA1MOYvvyqzZWgzHGDVZF37yDNH1Q",
                        "type": "image/jpeg"
                    }
                ],
                "category": null
            },
            "collection": { "name": "Space Operator", "family": "SPOP" },
            "creators": [
                { "address": "6kh6jZyzVmLRXNsvEPanmSxh9Qbdmi2AGh7aFFWotBuu", "share": 100 }
            ]
        });
        let metadata: NftMetadata = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(metadata.attributes.len(), 1);
        assert_eq!(metadata.extra["collection"]["family"], "SPOP");
        assert_eq!(metadata.extra.len(), 2);
        assert_eq!(serde_json::to_value(&metadata).unwrap(), json);
    }
}
