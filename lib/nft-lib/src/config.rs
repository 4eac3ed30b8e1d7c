use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, DurationMilliSeconds};
use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use std::{
    path::PathBuf,
    str::FromStr,
    sync::LazyLock,
    time::Duration,
};
use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolanaNet {
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "testnet")]
    Testnet,
    #[serde(rename = "mainnet-beta")]
    Mainnet,
}

/// Unknown Sonana network.
#[derive(Debug, ThisError)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for SolanaNet {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet-beta" => Ok(Self::Mainnet),
            s => Err(UnknownNetwork(s.to_owned())),
        }
    }
}

impl SolanaNet {
    pub fn url(&self) -> String {
        match self {
            SolanaNet::Devnet => {
                static URL: LazyLock<String> = LazyLock::new(|| {
                    std::env::var("SOLANA_DEVNET_URL")
                        .unwrap_or_else(|_| "https://api.devnet.solana.com".to_owned())
                });
                URL.clone()
            }
            SolanaNet::Testnet => {
                static URL: LazyLock<String> = LazyLock::new(|| {
                    std::env::var("SOLANA_TESTNET_URL")
                        .unwrap_or_else(|_| "https://api.testnet.solana.com".to_owned())
                });
                URL.clone()
            }
            SolanaNet::Mainnet => {
                static URL: LazyLock<String> = LazyLock::new(|| {
                    std::env::var("SOLANA_MAINNET_URL")
                        .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_owned())
                });
                URL.clone()
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolanaNet::Devnet => "devnet",
            SolanaNet::Testnet => "testnet",
            SolanaNet::Mainnet => "mainnet-beta",
        }
    }

    /// Bundlr node serving this cluster, `None` on testnet.
    pub fn bundlr_url(&self) -> Option<&'static str> {
        match self {
            SolanaNet::Mainnet => Some("https://node1.bundlr.network"),
            SolanaNet::Devnet => Some("https://devnet.bundlr.network"),
            SolanaNet::Testnet => None,
        }
    }

    pub fn from_url(url: &str) -> Result<Self, UnknownNetwork> {
        if url.contains("devnet") {
            Ok(SolanaNet::Devnet)
        } else if url.contains("testnet") {
            Ok(SolanaNet::Testnet)
        } else if url.contains("mainnet") {
            Ok(SolanaNet::Mainnet)
        } else {
            Err(UnknownNetwork(url.to_owned()))
        }
    }
}

/// Which token operation a run performs.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TokenMode {
    /// Mint a new NFT.
    Create,
    /// Update the NFT whose mint is `mint`.
    Update {
        #[serde_as(as = "DisplayFromStr")]
        mint: Pubkey,
    },
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bundlr node, defaults to the node of the configured cluster.
    #[serde(default)]
    pub node_url: Option<String>,
    /// Timeout applied to every call made to the storage node.
    #[serde(default = "StorageConfig::default_timeout")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    /// Top up the Bundlr balance before uploading when it is too low.
    #[serde(default = "StorageConfig::default_fund")]
    pub fund: bool,
}

impl StorageConfig {
    pub fn default_timeout() -> Duration {
        Duration::from_millis(60_000)
    }

    pub fn default_fund() -> bool {
        true
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            node_url: None,
            timeout: Self::default_timeout(),
            fund: Self::default_fund(),
        }
    }
}

/// Everything a run needs, fixed before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfig {
    pub token_name: String,
    pub description: String,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub image_file: String,
    #[serde(default = "MintConfig::default_asset_dir")]
    pub asset_dir: PathBuf,
    #[serde(default = "MintConfig::default_keypair_path")]
    pub keypair_path: PathBuf,
    pub cluster: SolanaNet,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Airdrop when the identity balance is below this many lamports.
    #[serde(default = "MintConfig::default_airdrop_threshold")]
    pub airdrop_threshold: Option<u64>,
    pub mode: TokenMode,
}

impl MintConfig {
    pub fn default_asset_dir() -> PathBuf {
        PathBuf::from("src")
    }

    pub fn default_keypair_path() -> PathBuf {
        PathBuf::from(".keypair.json")
    }

    pub fn default_airdrop_threshold() -> Option<u64> {
        Some(LAMPORTS_PER_SOL)
    }

    pub fn image_path(&self) -> PathBuf {
        self.asset_dir.join(&self.image_file)
    }

    pub fn storage_url(&self) -> Option<String> {
        self.storage
            .node_url
            .clone()
            .or_else(|| self.cluster.bundlr_url().map(str::to_owned))
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            token_name: "DeagleNFT".to_owned(),
            description: "The first operation".to_owned(),
            symbol: "DEN".to_owned(),
            seller_fee_basis_points: 100,
            image_file: "albatross.jpeg".to_owned(),
            asset_dir: Self::default_asset_dir(),
            keypair_path: Self::default_keypair_path(),
            cluster: SolanaNet::Devnet,
            storage: StorageConfig::default(),
            airdrop_threshold: Self::default_airdrop_threshold(),
            mode: TokenMode::Update {
                mint: solana_sdk::pubkey!("6kh6jZyzVmLRXNsvEPanmSxh9Qbdmi2AGh7aFFWotBuu"),
            },
        }
    }
}
