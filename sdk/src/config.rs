//! SDK configuration

use crate::reward::RewardSchedule;
use crate::utils::pubkey_string;
use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

/// Deployed staking program
pub const STAKING_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("HukSceTP6dd1oc3C4uKNwakKQowrdQBgK3EJBPmN9Rus");
/// Reward token mint held by the reward vault
pub const REWARD_TOKEN_MINT: Pubkey =
    solana_sdk::pubkey!("8EoML7gaBJsgJtepm25wq3GuUCqLYHBoqd3HP1JxtyBx");
/// Metaplex token metadata program
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const LOCALNET_RPC_URL: &str = "http://localhost:8899";
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingConfig {
    /// RPC endpoint to read state from
    pub rpc_url: String,

    #[serde(with = "pubkey_string")]
    pub program_id: Pubkey,

    #[serde(with = "pubkey_string")]
    pub reward_mint: Pubkey,

    #[serde(with = "pubkey_string")]
    pub token_metadata_program: Pubkey,

    pub commitment: CommitmentConfig,

    pub reward_schedule: RewardSchedule,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEVNET_RPC_URL.to_string(),
            program_id: STAKING_PROGRAM_ID,
            reward_mint: REWARD_TOKEN_MINT,
            token_metadata_program: TOKEN_METADATA_PROGRAM_ID,
            commitment: CommitmentConfig::confirmed(),
            reward_schedule: RewardSchedule::default(),
        }
    }
}

impl StakingConfig {
    /// Create a new config for localhost/test
    pub fn localnet() -> Self {
        Self {
            rpc_url: LOCALNET_RPC_URL.to_string(),
            ..Self::default()
        }
    }

    /// Create a new config for devnet
    pub fn devnet() -> Self {
        Self::default()
    }

    pub fn mainnet() -> Self {
        Self {
            rpc_url: MAINNET_RPC_URL.to_string(),
            ..Self::default()
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_reward_mint(mut self, reward_mint: Pubkey) -> Self {
        self.reward_mint = reward_mint;
        self
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_reward_schedule(mut self, reward_schedule: RewardSchedule) -> Self {
        self.reward_schedule = reward_schedule;
        self
    }
}
