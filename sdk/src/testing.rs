//! Testing infrastructure for the staking SDK
//!
//! [`MockAccountSource`] is an in-memory ledger that stands in for an RPC node,
//! so builders and the read path can be exercised without a validator.

use crate::error::{StakingError, StakingResult};
use crate::source::AccountSource;
use solana_sdk::{account::Account, pubkey::Pubkey};
use spl_token::solana_program::program_pack::Pack;
use std::cell::Cell;
use std::collections::HashMap;

/// Lamports the mock reports for any rent-exempt allocation
pub const MOCK_RENT_LAMPORTS_PER_BYTE: u64 = 6_960;

#[derive(Debug, Default)]
pub struct MockAccountSource {
    accounts: HashMap<Pubkey, Account>,
    largest_holders: HashMap<Pubkey, Pubkey>,
    offline: bool,
    reads: Cell<usize>,
}

impl MockAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every read fails, as if the RPC node were unreachable
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Number of reads served so far
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn insert_account(&mut self, address: Pubkey, account: Account) {
        self.accounts.insert(address, account);
    }

    /// Store a program-owned account holding `data`
    pub fn insert_program_account(&mut self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.insert_account(
            address,
            Account {
                lamports: MOCK_RENT_LAMPORTS_PER_BYTE * data.len() as u64,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    /// Store an initialized SPL token account and mark it as the mint's largest holder
    /// when it carries a balance
    pub fn insert_token_account(&mut self, address: Pubkey, mint: Pubkey, owner: Pubkey, amount: u64) {
        let token_account = spl_token::state::Account {
            mint,
            owner,
            amount,
            state: spl_token::state::AccountState::Initialized,
            ..spl_token::state::Account::default()
        };
        let mut data = vec![0u8; spl_token::state::Account::LEN];
        token_account.pack_into_slice(&mut data);

        self.insert_program_account(address, spl_token::id(), data);
        if amount > 0 {
            self.largest_holders.insert(mint, address);
        }
    }

    fn record_read(&self) -> StakingResult<()> {
        self.reads.set(self.reads.get() + 1);
        if self.offline {
            return Err(StakingError::network_error("mock RPC node is offline"));
        }
        Ok(())
    }
}

impl AccountSource for MockAccountSource {
    fn get_account(&self, address: &Pubkey) -> StakingResult<Option<Account>> {
        self.record_read()?;
        Ok(self.accounts.get(address).cloned())
    }

    fn get_program_accounts_by_size(
        &self,
        program_id: &Pubkey,
        data_size: u64,
    ) -> StakingResult<Vec<(Pubkey, Account)>> {
        self.record_read()?;
        let mut accounts: Vec<(Pubkey, Account)> = self
            .accounts
            .iter()
            .filter(|(_, account)| {
                account.owner == *program_id && account.data.len() as u64 == data_size
            })
            .map(|(address, account)| (*address, account.clone()))
            .collect();
        accounts.sort_by_key(|(address, _)| *address);
        Ok(accounts)
    }

    fn largest_token_account(&self, mint: &Pubkey) -> StakingResult<Option<Pubkey>> {
        self.record_read()?;
        Ok(self.largest_holders.get(mint).copied())
    }

    fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> StakingResult<u64> {
        self.record_read()?;
        Ok(MOCK_RENT_LAMPORTS_PER_BYTE * data_len as u64)
    }
}
