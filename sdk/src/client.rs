//! Client context and read path
//!
//! [`StakingClient`] bundles the read-only connection with the configuration.
//! It carries no mutable state, so any number of builder calls can share one.

use crate::address::{derive_global_authority, derive_user_pool_address};
use crate::codec::{decode_global_pool, decode_user_pool, scan_user_pools, USER_POOL_SIZE};
use crate::config::StakingConfig;
use crate::error::StakingResult;
use crate::source::AccountSource;
use crate::state::{GlobalPoolRecord, UserPoolRecord};
use crate::summary::StakerSummary;
use crate::utils::current_timestamp;
use log::{debug, info};
use solana_client::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;

pub struct StakingClient<S> {
    source: S,
    config: StakingConfig,
}

impl StakingClient<RpcClient> {
    /// Connect to `config.rpc_url` with the configured commitment
    pub fn from_config(config: StakingConfig) -> Self {
        let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment);
        Self::new(rpc, config)
    }
}

impl<S: AccountSource> StakingClient<S> {
    pub fn new(source: S, config: StakingConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.config.program_id
    }

    /// Global authority PDA and its bump
    pub fn global_authority(&self) -> (Pubkey, u8) {
        derive_global_authority(&self.config.program_id)
    }

    pub fn user_pool_address(&self, owner: &Pubkey) -> StakingResult<Pubkey> {
        derive_user_pool_address(owner, &self.config.program_id)
    }

    /// Fetch the global pool; `Ok(None)` if the program was never initialized
    pub fn fetch_global_pool(&self) -> StakingResult<Option<GlobalPoolRecord>> {
        let (global_authority, _) = self.global_authority();
        self.source
            .get_account(&global_authority)?
            .map(|account| decode_global_pool(&account.data))
            .transpose()
    }

    /// Fetch an owner's user pool; `Ok(None)` if it was never created
    pub fn fetch_user_pool(&self, owner: &Pubkey) -> StakingResult<Option<UserPoolRecord>> {
        let address = self.user_pool_address(owner)?;
        debug!("Fetching user pool {address} for {owner}");
        self.source
            .get_account(&address)?
            .map(|account| decode_user_pool(&account.data))
            .transpose()
    }

    /// Decode every user pool owned by the program
    pub fn fetch_all_user_pools(&self) -> StakingResult<Vec<UserPoolRecord>> {
        let accounts = self
            .source
            .get_program_accounts_by_size(&self.config.program_id, USER_POOL_SIZE as u64)?;
        info!("Encountered {} user pool accounts", accounts.len());
        Ok(scan_user_pools(&accounts))
    }

    /// Status of one staker as of `now`
    pub fn staker_summary(&self, owner: &Pubkey, now: u64) -> StakingResult<Option<StakerSummary>> {
        Ok(self
            .fetch_user_pool(owner)?
            .map(|pool| StakerSummary::new(&pool, &self.config.reward_schedule, now)))
    }

    /// Pending reward across all of `owner`'s staked NFTs
    pub fn estimate_claimable(&self, owner: &Pubkey, now: u64) -> StakingResult<Option<u64>> {
        Ok(self
            .fetch_user_pool(owner)?
            .map(|pool| self.config.reward_schedule.estimate_pool(&pool, now)))
    }

    /// [`Self::estimate_claimable`] against the local clock
    pub fn estimate_claimable_now(&self, owner: &Pubkey) -> StakingResult<Option<u64>> {
        self.estimate_claimable(owner, current_timestamp())
    }
}
