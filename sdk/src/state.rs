//! Account records of the staking program
//!
//! These mirror the on-chain `GlobalPool` and `UserPool` accounts. The binary
//! layout lives in [`crate::codec`]; this module only holds the decoded form
//! plus the append / remove-and-compact rules the program applies to a pool.

use crate::error::{StakingError, StakingResult};
use crate::utils::pubkey_string;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Maximum number of NFTs a single user pool can hold
pub const USER_POOL_CAPACITY: usize = 100;

/// Reward tier of a staked NFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
#[repr(u8)]
pub enum Rarity {
    Normal = 0,
    Obsidian = 1,
    Ice = 2,
    Unique = 3,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Normal, Rarity::Obsidian, Rarity::Ice, Rarity::Unique];

    /// Index into the four-entry tier rate table
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u64> for Rarity {
    type Error = StakingError;

    fn try_from(value: u64) -> StakingResult<Self> {
        match value {
            0 => Ok(Rarity::Normal),
            1 => Ok(Rarity::Obsidian),
            2 => Ok(Rarity::Ice),
            3 => Ok(Rarity::Unique),
            other => Err(StakingError::InvalidRarity(other)),
        }
    }
}

impl From<Rarity> for u64 {
    fn from(rarity: Rarity) -> Self {
        rarity as u64
    }
}

/// Singleton state stored at the global authority PDA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalPoolRecord {
    #[serde(with = "pubkey_string")]
    pub admin: Pubkey,
    pub total_staked_count: u64,
}

/// One staked NFT inside a user pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakedEntry {
    #[serde(with = "pubkey_string")]
    pub mint: Pubkey,
    pub staked_time: u64,
    pub claimed_time: u64,
    pub rarity: Rarity,
}

/// Per-owner staking state
///
/// Only the valid slots are kept: `staking.len()` is the on-chain
/// `staked_count`, and left-over slots beyond it are never materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoolRecord {
    #[serde(with = "pubkey_string")]
    pub owner: Pubkey,
    pub last_claimed_time: u64,
    pub staking: Vec<StakedEntry>,
}

impl UserPoolRecord {
    /// Create an empty pool, as left by `initialize_user_pool`
    pub fn new(owner: Pubkey) -> Self {
        Self {
            owner,
            last_claimed_time: 0,
            staking: Vec::new(),
        }
    }

    pub fn staked_count(&self) -> u64 {
        self.staking.len() as u64
    }

    pub fn is_full(&self) -> bool {
        self.staking.len() >= USER_POOL_CAPACITY
    }

    pub fn find_entry(&self, mint: &Pubkey) -> Option<&StakedEntry> {
        self.staking.iter().find(|entry| entry.mint == *mint)
    }

    /// Append a newly staked NFT
    pub fn add_entry(&mut self, mint: Pubkey, rarity: Rarity, timestamp: u64) -> StakingResult<()> {
        if self.is_full() {
            return Err(StakingError::CapacityExceeded {
                count: self.staked_count() + 1,
                capacity: USER_POOL_CAPACITY,
            });
        }
        self.staking.push(StakedEntry {
            mint,
            staked_time: timestamp,
            claimed_time: timestamp,
            rarity,
        });
        Ok(())
    }

    /// Remove a staked NFT, shifting later entries down so no gap is left
    pub fn remove_entry(&mut self, mint: &Pubkey) -> StakingResult<StakedEntry> {
        let index = self
            .staking
            .iter()
            .position(|entry| entry.mint == *mint)
            .ok_or(StakingError::EntryNotFound(*mint))?;
        Ok(self.staking.remove(index))
    }
}
