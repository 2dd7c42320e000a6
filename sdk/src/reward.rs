//! Off-chain reward estimation
//!
//! `reward = floor((now - reference) / epoch_seconds) * tier_rate[rarity]`
//!
//! The program is the only authority on payouts; this is used to verify or
//! preview them and must stay in step with the on-chain constants.

use crate::error::{StakingError, StakingResult};
use crate::state::{Rarity, StakedEntry, UserPoolRecord};
use serde::{Deserialize, Serialize};

/// Length of one reward epoch in seconds
pub const EPOCH_SECONDS: u64 = 1;

// Per-epoch reward, in reward token base units
pub const NORMAL_REWARD_AMOUNT: u64 = 57_870;
pub const OBSIDIAN_REWARD_AMOUNT: u64 = 92_593;
pub const ICE_REWARD_AMOUNT: u64 = 115_741;
pub const UNIQUE_REWARD_AMOUNT: u64 = 173_611;

/// Reward token decimals (1 token = 10^9 base units)
pub const REWARD_TOKEN_DECIMALS: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSchedule {
    pub epoch_seconds: u64,
    /// Indexed by [`Rarity::index`]
    pub tier_rates: [u64; 4],
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            epoch_seconds: EPOCH_SECONDS,
            tier_rates: [
                NORMAL_REWARD_AMOUNT,
                OBSIDIAN_REWARD_AMOUNT,
                ICE_REWARD_AMOUNT,
                UNIQUE_REWARD_AMOUNT,
            ],
        }
    }
}

impl RewardSchedule {
    pub fn new(epoch_seconds: u64, tier_rates: [u64; 4]) -> StakingResult<Self> {
        if epoch_seconds == 0 {
            return Err(StakingError::invalid_input("epoch length must be non-zero"));
        }
        Ok(Self {
            epoch_seconds,
            tier_rates,
        })
    }

    pub fn rate(&self, rarity: Rarity) -> u64 {
        self.tier_rates[rarity.index()]
    }

    /// Reward accrued between `reference` and `now`; zero when `now` precedes it
    pub fn estimate(&self, now: u64, reference: u64, rarity: Rarity) -> u64 {
        let epochs = now
            .saturating_sub(reference)
            .checked_div(self.epoch_seconds)
            .unwrap_or(0);
        epochs.saturating_mul(self.rate(rarity))
    }

    /// Pending reward of one entry since it was last claimed
    pub fn estimate_entry(&self, entry: &StakedEntry, now: u64) -> u64 {
        self.estimate(now, entry.claimed_time, entry.rarity)
    }

    /// Pending reward across every staked entry of a pool
    pub fn estimate_pool(&self, pool: &UserPoolRecord, now: u64) -> u64 {
        pool.staking
            .iter()
            .map(|entry| self.estimate_entry(entry, now))
            .fold(0u64, u64::saturating_add)
    }
}

/// Render base units as a decimal token amount
pub fn format_token_amount(amount: u64) -> String {
    format!(
        "{}.{:09}",
        amount / REWARD_TOKEN_DECIMALS,
        amount % REWARD_TOKEN_DECIMALS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn test_floor_division() {
        let rate = 1_000;
        let schedule = RewardSchedule::new(60, [rate, 0, 0, 0]).unwrap();
        assert_eq!(schedule.estimate(1_125, 1_000, Rarity::Normal), 2 * rate);
        assert_eq!(schedule.estimate(1_059, 1_000, Rarity::Normal), 0);
        assert_eq!(schedule.estimate(1_060, 1_000, Rarity::Normal), rate);
    }

    #[test]
    fn test_tier_rates() {
        let schedule = RewardSchedule::default();
        assert_eq!(schedule.estimate(10, 0, Rarity::Normal), 10 * NORMAL_REWARD_AMOUNT);
        assert_eq!(schedule.estimate(10, 0, Rarity::Obsidian), 10 * OBSIDIAN_REWARD_AMOUNT);
        assert_eq!(schedule.estimate(10, 0, Rarity::Ice), 10 * ICE_REWARD_AMOUNT);
        assert_eq!(schedule.estimate(10, 0, Rarity::Unique), 10 * UNIQUE_REWARD_AMOUNT);
    }

    #[test]
    fn test_reference_in_future() {
        let schedule = RewardSchedule::default();
        assert_eq!(schedule.estimate(100, 200, Rarity::Unique), 0);
    }

    #[test]
    fn test_zero_epoch_rejected() {
        assert!(RewardSchedule::new(0, [1; 4]).is_err());

        // a hand-built schedule with a zero epoch estimates nothing instead of panicking
        let schedule = RewardSchedule {
            epoch_seconds: 0,
            tier_rates: [1; 4],
        };
        assert_eq!(schedule.estimate(100, 0, Rarity::Normal), 0);
    }

    #[test]
    fn test_estimate_pool() {
        let schedule = RewardSchedule::new(60, [1, 2, 3, 4]).unwrap();
        let mut pool = UserPoolRecord::new(Pubkey::new_unique());
        pool.add_entry(Pubkey::new_unique(), Rarity::Normal, 0).unwrap();
        pool.add_entry(Pubkey::new_unique(), Rarity::Unique, 60).unwrap();

        // entry 0: 600/60 * 1, entry 1: 540/60 * 4
        assert_eq!(schedule.estimate_pool(&pool, 600), 10 + 36);
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(5 * REWARD_TOKEN_DECIMALS), "5.000000000");
        assert_eq!(format_token_amount(57_870), "0.000057870");
    }
}
