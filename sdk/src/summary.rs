//! Human-readable views of staking state, as printed by status commands

use crate::error::StakingResult;
use crate::reward::{format_token_amount, RewardSchedule};
use crate::state::{GlobalPoolRecord, Rarity, UserPoolRecord};
use crate::utils::timestamp_to_string;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub admin: String,
    pub total_staked_count: u64,
}

impl GlobalSummary {
    pub fn to_json(&self) -> StakingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<&GlobalPoolRecord> for GlobalSummary {
    fn from(record: &GlobalPoolRecord) -> Self {
        Self {
            admin: record.admin.to_string(),
            total_staked_count: record.total_staked_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub mint: String,
    pub rarity: Rarity,
    pub staked_at: String,
    pub claimed_at: String,
    pub pending_reward: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakerSummary {
    pub owner: String,
    pub last_claimed_at: String,
    pub staked_count: u64,
    pub pending_reward: String,
    pub staking: Vec<EntrySummary>,
}

impl StakerSummary {
    pub fn new(pool: &UserPoolRecord, schedule: &RewardSchedule, now: u64) -> Self {
        let staking = pool
            .staking
            .iter()
            .map(|entry| EntrySummary {
                mint: entry.mint.to_string(),
                rarity: entry.rarity,
                staked_at: timestamp_to_string(entry.staked_time),
                claimed_at: timestamp_to_string(entry.claimed_time),
                pending_reward: format_token_amount(schedule.estimate_entry(entry, now)),
            })
            .collect();

        Self {
            owner: pool.owner.to_string(),
            last_claimed_at: timestamp_to_string(pool.last_claimed_time),
            staked_count: pool.staked_count(),
            pending_reward: format_token_amount(schedule.estimate_pool(pool, now)),
            staking,
        }
    }

    /// Pretty-printed JSON, as shown by the user status command
    pub fn to_json(&self) -> StakingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
