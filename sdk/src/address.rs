//! Address derivation utilities and PDA helpers for the staking program
//!
//! Every address here must match what the on-chain program derives itself;
//! an off-by-one seed means every downstream instruction fails with a seeds
//! constraint violation.

use crate::error::StakingResult;
use solana_sdk::pubkey::Pubkey;

pub const GLOBAL_AUTHORITY_SEED: &str = "global-authority";
pub const USER_POOL_SEED: &str = "user-pool";
pub const METADATA_SEED: &str = "metadata";

/// Find the global authority PDA (also the escrow owner and reward vault owner)
pub fn derive_global_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[GLOBAL_AUTHORITY_SEED.as_bytes()], program_id)
}

/// Address of the owner's user pool, created with `create_account_with_seed`
pub fn derive_user_pool_address(owner: &Pubkey, program_id: &Pubkey) -> StakingResult<Pubkey> {
    Ok(Pubkey::create_with_seed(owner, USER_POOL_SEED, program_id)?)
}

/// Canonical associated token account of `owner` for `mint`
pub fn derive_associated_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, mint)
}

/// Token metadata account of an NFT mint
pub fn derive_metadata_account(mint: &Pubkey, metadata_program: &Pubkey) -> Pubkey {
    let (metadata, _) = Pubkey::find_program_address(
        &[METADATA_SEED.as_bytes(), metadata_program.as_ref(), mint.as_ref()],
        metadata_program,
    );
    metadata
}

/// Account structures for instruction contexts
///
/// Field order is the account order of the program's `#[derive(Accounts)]`
/// structs, which is the order `to_account_metas` emits.
pub mod accounts {
    use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

    #[derive(Debug, Clone)]
    pub struct Initialize {
        pub admin: Pubkey,
        pub global_authority: Pubkey,
        pub reward_vault: Pubkey,
        pub system_program: Pubkey,
        pub rent: Pubkey,
    }

    impl Initialize {
        pub fn to_account_metas(&self) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.admin, true),
                AccountMeta::new(self.global_authority, false),
                AccountMeta::new(self.reward_vault, false),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.rent, false),
            ]
        }
    }

    #[derive(Debug, Clone)]
    pub struct InitializeUserPool {
        pub user_pool: Pubkey,
        pub owner: Pubkey,
    }

    impl InitializeUserPool {
        pub fn to_account_metas(&self) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.user_pool, false),
                AccountMeta::new(self.owner, true),
            ]
        }
    }

    #[derive(Debug, Clone)]
    pub struct StakeNftToPool {
        pub owner: Pubkey,
        pub user_pool: Pubkey,
        pub global_authority: Pubkey,
        pub user_nft_token_account: Pubkey,
        pub dest_nft_token_account: Pubkey,
        pub nft_mint: Pubkey,
        pub mint_metadata: Pubkey,
        pub token_program: Pubkey,
        pub token_metadata_program: Pubkey,
    }

    impl StakeNftToPool {
        pub fn to_account_metas(&self) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.owner, true),
                AccountMeta::new(self.user_pool, false),
                AccountMeta::new(self.global_authority, false),
                AccountMeta::new(self.user_nft_token_account, false),
                AccountMeta::new(self.dest_nft_token_account, false),
                AccountMeta::new_readonly(self.nft_mint, false),
                AccountMeta::new(self.mint_metadata, false),
                AccountMeta::new_readonly(self.token_program, false),
                AccountMeta::new_readonly(self.token_metadata_program, false),
            ]
        }
    }

    #[derive(Debug, Clone)]
    pub struct WithdrawNftFromPool {
        pub owner: Pubkey,
        pub user_pool: Pubkey,
        pub global_authority: Pubkey,
        pub user_nft_token_account: Pubkey,
        pub dest_nft_token_account: Pubkey,
        pub reward_vault: Pubkey,
        pub user_reward_account: Pubkey,
        pub nft_mint: Pubkey,
        pub token_program: Pubkey,
    }

    impl WithdrawNftFromPool {
        pub fn to_account_metas(&self) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.owner, true),
                AccountMeta::new(self.user_pool, false),
                AccountMeta::new(self.global_authority, false),
                AccountMeta::new(self.user_nft_token_account, false),
                AccountMeta::new(self.dest_nft_token_account, false),
                AccountMeta::new(self.reward_vault, false),
                AccountMeta::new(self.user_reward_account, false),
                AccountMeta::new_readonly(self.nft_mint, false),
                AccountMeta::new_readonly(self.token_program, false),
            ]
        }
    }

    #[derive(Debug, Clone)]
    pub struct ClaimReward {
        pub owner: Pubkey,
        pub global_authority: Pubkey,
        pub user_pool: Pubkey,
        pub reward_vault: Pubkey,
        pub user_reward_account: Pubkey,
        pub token_program: Pubkey,
    }

    impl ClaimReward {
        pub fn to_account_metas(&self) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.owner, true),
                AccountMeta::new(self.global_authority, false),
                AccountMeta::new(self.user_pool, false),
                AccountMeta::new(self.reward_vault, false),
                AccountMeta::new(self.user_reward_account, false),
                AccountMeta::new_readonly(self.token_program, false),
            ]
        }
    }
}
