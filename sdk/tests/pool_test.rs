//! Test the read path against ledger state mutated the way the program mutates it

#[cfg(test)]
mod tests {
    use basilisk_staking_sdk::address::derive_user_pool_address;
    use basilisk_staking_sdk::codec::{
        account_discriminator, encode_global_pool, encode_user_pool, GLOBAL_POOL_SIZE,
        USER_POOL_ACCOUNT_NAME, USER_POOL_SIZE, USER_POOL_STAKED_COUNT_OFFSET,
    };
    use basilisk_staking_sdk::testing::MockAccountSource;
    use basilisk_staking_sdk::*;

    const NOW: u64 = 1_650_000_000;

    fn config() -> StakingConfig {
        StakingConfig::localnet().with_program_id(Pubkey::new_unique())
    }

    fn store_pool(source: &mut MockAccountSource, config: &StakingConfig, pool: &UserPoolRecord) {
        let address = derive_user_pool_address(&pool.owner, &config.program_id).unwrap();
        source.insert_program_account(address, config.program_id, encode_user_pool(pool).unwrap());
    }

    #[test]
    fn test_fetch_all_user_pools_skips_malformed() {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = config();
        let mut source = MockAccountSource::new();

        let mut expected = Vec::new();
        for i in 0..4u64 {
            let mut pool = UserPoolRecord::new(Pubkey::new_unique());
            pool.add_entry(Pubkey::new_unique(), Rarity::Obsidian, NOW + i).unwrap();
            store_pool(&mut source, &config, &pool);
            expected.push(pool);
        }

        // right size, right discriminator, but an impossible entry count
        let mut corrupt = encode_user_pool(&UserPoolRecord::new(Pubkey::new_unique())).unwrap();
        let count_at = 8 + USER_POOL_STAKED_COUNT_OFFSET;
        corrupt[count_at..count_at + 8].copy_from_slice(&101u64.to_le_bytes());
        source.insert_program_account(Pubkey::new_unique(), config.program_id, corrupt);

        // allocated through create_with_seed but never initialized
        source.insert_program_account(Pubkey::new_unique(), config.program_id, vec![0u8; USER_POOL_SIZE]);

        // a global pool is filtered out by size before decoding
        let global = GlobalPoolRecord {
            admin: Pubkey::new_unique(),
            total_staked_count: 4,
        };
        source.insert_program_account(Pubkey::new_unique(), config.program_id, encode_global_pool(&global));
        assert_eq!(encode_global_pool(&global).len(), GLOBAL_POOL_SIZE);

        let client = StakingClient::new(&source, config);
        let mut pools = client.fetch_all_user_pools().unwrap();
        assert_eq!(pools.len(), expected.len());

        pools.sort_by_key(|pool| pool.owner);
        expected.sort_by_key(|pool| pool.owner);
        assert_eq!(pools, expected);
    }

    #[test]
    fn test_fetch_all_user_pools_network_failure() {
        let client = StakingClient::new(MockAccountSource::offline(), config());
        let err = client.fetch_all_user_pools().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NetworkError);
    }

    #[test]
    fn test_stake_claim_withdraw_lifecycle() {
        let config = config();
        let schedule = config.reward_schedule;
        let owner = Pubkey::new_unique();
        let (first, second, third) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

        let mut pool = UserPoolRecord::new(owner);
        pool.add_entry(first, Rarity::Normal, NOW).unwrap();
        pool.add_entry(second, Rarity::Unique, NOW + 10).unwrap();
        pool.add_entry(third, Rarity::Ice, NOW + 20).unwrap();

        let mut source = MockAccountSource::new();
        store_pool(&mut source, &config, &pool);
        let client = StakingClient::new(&source, config.clone());

        let pending = client.estimate_claimable(&owner, NOW + 30).unwrap().unwrap();
        assert_eq!(
            pending,
            30 * schedule.rate(Rarity::Normal)
                + 20 * schedule.rate(Rarity::Unique)
                + 10 * schedule.rate(Rarity::Ice)
        );

        // withdrawing the middle entry keeps the rest contiguous and in order
        let removed = pool.remove_entry(&second).unwrap();
        assert_eq!(removed.rarity, Rarity::Unique);
        let mut source = MockAccountSource::new();
        store_pool(&mut source, &config, &pool);
        let client = StakingClient::new(&source, config);

        let stored = client.fetch_user_pool(&owner).unwrap().unwrap();
        assert_eq!(stored.staked_count(), 2);
        assert_eq!(stored.staking[0].mint, first);
        assert_eq!(stored.staking[1].mint, third);
        assert!(stored.find_entry(&second).is_none());
        assert!(matches!(
            pool.remove_entry(&second),
            Err(StakingError::EntryNotFound(m)) if m == second
        ));

        let summary = client.staker_summary(&owner, NOW + 30).unwrap().unwrap();
        assert_eq!(summary.staked_count, 2);
        assert_eq!(summary.staking.len(), 2);
        assert_eq!(summary.owner, owner.to_string());
    }

    #[test]
    fn test_stake_then_withdraw_restores_pool() {
        let config = config();
        let owner = Pubkey::new_unique();
        let mut pool = UserPoolRecord::new(owner);
        pool.add_entry(Pubkey::new_unique(), Rarity::Normal, NOW).unwrap();
        pool.add_entry(Pubkey::new_unique(), Rarity::Ice, NOW + 5).unwrap();
        let before = pool.clone();

        let mint = Pubkey::new_unique();
        pool.add_entry(mint, Rarity::Obsidian, NOW + 10).unwrap();
        assert_eq!(pool.staked_count(), before.staked_count() + 1);
        pool.remove_entry(&mint).unwrap();

        assert_eq!(pool, before);
        assert_eq!(pool.staked_count(), before.staked_count());

        // and the stored bytes match what was there before the stake
        let mut source = MockAccountSource::new();
        store_pool(&mut source, &config, &pool);
        let client = StakingClient::new(&source, config);
        assert_eq!(client.fetch_user_pool(&owner).unwrap(), Some(before.clone()));
        assert_eq!(encode_user_pool(&pool).unwrap(), encode_user_pool(&before).unwrap());
    }

    #[test]
    fn test_full_pool_round_trips() {
        let config = config();
        let mut pool = UserPoolRecord::new(Pubkey::new_unique());
        for i in 0..USER_POOL_CAPACITY {
            pool.add_entry(Pubkey::new_unique(), Rarity::ALL[i % 4], NOW + i as u64).unwrap();
        }
        assert!(pool.is_full());
        assert!(matches!(
            pool.add_entry(Pubkey::new_unique(), Rarity::Normal, NOW),
            Err(StakingError::CapacityExceeded { .. })
        ));

        let data = encode_user_pool(&pool).unwrap();
        assert_eq!(data.len(), USER_POOL_SIZE);
        assert_eq!(&data[..8], &account_discriminator(USER_POOL_ACCOUNT_NAME));

        let mut source = MockAccountSource::new();
        store_pool(&mut source, &config, &pool);
        let client = StakingClient::new(&source, config);
        assert_eq!(client.fetch_user_pool(&pool.owner).unwrap(), Some(pool));
    }
}
