//! Read access to ledger state
//!
//! [`AccountSource`] is the only I/O boundary of the SDK. Everything else is
//! pure: derivation, codec and instruction assembly never talk to the network
//! directly.

use crate::error::{StakingError, StakingResult};
use log::debug;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::RpcFilterType,
};
use solana_sdk::{account::Account, pubkey::Pubkey};
use std::str::FromStr;

pub trait AccountSource {
    /// Fetch an account. `Ok(None)` means the ledger confirmed it does not
    /// exist; a failed read is always an `Err`.
    fn get_account(&self, address: &Pubkey) -> StakingResult<Option<Account>>;

    /// All accounts owned by `program_id` whose data is exactly `data_size` bytes
    fn get_program_accounts_by_size(
        &self,
        program_id: &Pubkey,
        data_size: u64,
    ) -> StakingResult<Vec<(Pubkey, Account)>>;

    /// Token account currently holding the largest balance of `mint`
    fn largest_token_account(&self, mint: &Pubkey) -> StakingResult<Option<Pubkey>>;

    fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> StakingResult<u64>;

    fn account_exists(&self, address: &Pubkey) -> StakingResult<bool> {
        Ok(self.get_account(address)?.is_some())
    }
}

impl<T: AccountSource + ?Sized> AccountSource for &T {
    fn get_account(&self, address: &Pubkey) -> StakingResult<Option<Account>> {
        (**self).get_account(address)
    }

    fn get_program_accounts_by_size(
        &self,
        program_id: &Pubkey,
        data_size: u64,
    ) -> StakingResult<Vec<(Pubkey, Account)>> {
        (**self).get_program_accounts_by_size(program_id, data_size)
    }

    fn largest_token_account(&self, mint: &Pubkey) -> StakingResult<Option<Pubkey>> {
        (**self).largest_token_account(mint)
    }

    fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> StakingResult<u64> {
        (**self).minimum_balance_for_rent_exemption(data_len)
    }
}

impl AccountSource for RpcClient {
    fn get_account(&self, address: &Pubkey) -> StakingResult<Option<Account>> {
        // `get_account` folds "missing" into an error; the commitment variant keeps them apart
        let response = self.get_account_with_commitment(address, self.commitment())?;
        debug!(
            "Fetched {address} at slot {}: {}",
            response.context.slot,
            if response.value.is_some() { "found" } else { "absent" }
        );
        Ok(response.value)
    }

    fn get_program_accounts_by_size(
        &self,
        program_id: &Pubkey,
        data_size: u64,
    ) -> StakingResult<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::DataSize(data_size)]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self.get_program_accounts_with_config(program_id, config)?;
        debug!(
            "Found {} accounts of {data_size} bytes owned by {program_id}",
            accounts.len()
        );
        Ok(accounts)
    }

    fn largest_token_account(&self, mint: &Pubkey) -> StakingResult<Option<Pubkey>> {
        let balances = self.get_token_largest_accounts(mint)?;
        balances
            .into_iter()
            .find(|balance| balance.amount.amount != "0")
            .map(|balance| {
                Pubkey::from_str(&balance.address).map_err(|e| {
                    StakingError::network_error(format!(
                        "RPC returned invalid token account address {}: {e}",
                        balance.address
                    ))
                })
            })
            .transpose()
    }

    fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> StakingResult<u64> {
        Ok(self.get_minimum_balance_for_rent_exemption(data_len)?)
    }
}
