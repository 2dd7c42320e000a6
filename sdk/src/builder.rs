//! Instruction assembly for the five staking operations
//!
//! Builders only read what they need to resolve accounts; they never sign or
//! submit. Each returns an unsigned [`TransactionPayload`] for the caller's
//! signer and submission layer.
//!
//! Instruction data follows the Anchor convention: `sha256("global:<name>")[..8]`
//! followed by the borsh-encoded arguments.

use crate::address::{
    accounts, derive_associated_account, derive_metadata_account, USER_POOL_SEED,
};
use crate::client::StakingClient;
use crate::codec::USER_POOL_SIZE;
use crate::error::{StakingError, StakingResult};
use crate::resolver::{ensure_associated_account, locate_asset_custody, AssetCustody};
use crate::source::AccountSource;
use crate::state::Rarity;
use borsh::BorshSerialize;
use log::{debug, info};
use sha2::{Digest, Sha256};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, sysvar, transaction::Transaction};
// Deprecated from solana-sdk 2.2 in favour of solana-system-interface, which the 2.0 stack lacks
#[allow(deprecated)]
use solana_sdk::{system_instruction, system_program};

pub const INITIALIZE: &str = "initialize";
pub const INITIALIZE_USER_POOL: &str = "initialize_user_pool";
pub const STAKE_NFT_TO_POOL: &str = "stake_nft_to_pool";
pub const WITHDRAW_NFT_FROM_POOL: &str = "withdraw_nft_from_pool";
pub const CLAIM_REWARD: &str = "claim_reward";

/// Anchor instruction discriminator
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{name}").as_bytes());
    let hash = hasher.finalize();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

#[derive(BorshSerialize)]
struct InitializeArgs {
    global_bump: u8,
}

#[derive(BorshSerialize)]
struct StakeNftToPoolArgs {
    global_bump: u8,
    rarity: u64,
}

#[derive(BorshSerialize)]
struct WithdrawNftFromPoolArgs {
    global_bump: u8,
}

#[derive(BorshSerialize)]
struct ClaimRewardArgs {
    global_bump: u8,
    mint: Option<[u8; 32]>,
}

fn instruction_data<T: BorshSerialize>(name: &str, args: &T) -> StakingResult<Vec<u8>> {
    let mut data = instruction_discriminator(name).to_vec();
    args.serialize(&mut data)?;
    Ok(data)
}

pub fn initialize_instruction(
    program_id: &Pubkey,
    ctx: &accounts::Initialize,
    global_bump: u8,
) -> StakingResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: ctx.to_account_metas(),
        data: instruction_data(INITIALIZE, &InitializeArgs { global_bump })?,
    })
}

pub fn initialize_user_pool_instruction(
    program_id: &Pubkey,
    ctx: &accounts::InitializeUserPool,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: ctx.to_account_metas(),
        data: instruction_discriminator(INITIALIZE_USER_POOL).to_vec(),
    }
}

pub fn stake_nft_to_pool_instruction(
    program_id: &Pubkey,
    ctx: &accounts::StakeNftToPool,
    global_bump: u8,
    rarity: Rarity,
) -> StakingResult<Instruction> {
    let args = StakeNftToPoolArgs {
        global_bump,
        rarity: rarity.into(),
    };
    Ok(Instruction {
        program_id: *program_id,
        accounts: ctx.to_account_metas(),
        data: instruction_data(STAKE_NFT_TO_POOL, &args)?,
    })
}

pub fn withdraw_nft_from_pool_instruction(
    program_id: &Pubkey,
    ctx: &accounts::WithdrawNftFromPool,
    global_bump: u8,
) -> StakingResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: ctx.to_account_metas(),
        data: instruction_data(WITHDRAW_NFT_FROM_POOL, &WithdrawNftFromPoolArgs { global_bump })?,
    })
}

pub fn claim_reward_instruction(
    program_id: &Pubkey,
    ctx: &accounts::ClaimReward,
    global_bump: u8,
    mint: Option<Pubkey>,
) -> StakingResult<Instruction> {
    let args = ClaimRewardArgs {
        global_bump,
        mint: mint.map(Pubkey::to_bytes),
    };
    Ok(Instruction {
        program_id: *program_id,
        accounts: ctx.to_account_metas(),
        data: instruction_data(CLAIM_REWARD, &args)?,
    })
}

/// Ordered instructions for one transaction, ready for signing
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPayload {
    pub fee_payer: Pubkey,
    pub instructions: Vec<Instruction>,
}

impl TransactionPayload {
    pub fn new(fee_payer: Pubkey) -> Self {
        Self {
            fee_payer,
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Append `instruction` if present
    pub fn push_optional(&mut self, instruction: Option<Instruction>) {
        if let Some(instruction) = instruction {
            self.push(instruction);
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Unsigned transaction; the caller sets the blockhash and signs
    pub fn to_transaction(&self) -> Transaction {
        Transaction::new_with_payer(&self.instructions, Some(&self.fee_payer))
    }
}

/// The stake protocol is two transactions when the user pool does not exist yet
///
/// `prerequisite` creates the pool and must be confirmed before `stake` is
/// submitted. The two are not atomic: a concurrent creator can race the
/// existence check, and a stake submitted against a still-missing pool is
/// rejected by the program.
#[derive(Debug, Clone, PartialEq)]
pub struct StakePlan {
    pub prerequisite: Option<TransactionPayload>,
    pub stake: TransactionPayload,
}

impl StakePlan {
    /// Payloads in submission order
    pub fn transactions(&self) -> Vec<&TransactionPayload> {
        self.prerequisite.iter().chain(std::iter::once(&self.stake)).collect()
    }
}

impl<S: AccountSource> StakingClient<S> {
    /// Address of `owner`'s user pool, which must already exist on chain
    fn require_user_pool(&self, owner: &Pubkey) -> StakingResult<Pubkey> {
        let user_pool = self.user_pool_address(owner)?;
        if !self.source().account_exists(&user_pool)? {
            return Err(StakingError::AccountNotFound(user_pool));
        }
        Ok(user_pool)
    }

    /// Register the program's root state; `admin` becomes the super admin
    #[allow(deprecated)]
    pub fn build_initialize(&self, admin: &Pubkey) -> StakingResult<TransactionPayload> {
        let (global_authority, global_bump) = self.global_authority();
        let reward_vault = derive_associated_account(&global_authority, &self.config().reward_mint);

        let ctx = accounts::Initialize {
            admin: *admin,
            global_authority,
            reward_vault,
            system_program: system_program::id(),
            rent: sysvar::rent::id(),
        };
        info!("Initializing program, reward vault {reward_vault}");

        let mut payload = TransactionPayload::new(*admin);
        payload.push(initialize_instruction(self.program_id(), &ctx, global_bump)?);
        Ok(payload)
    }

    /// Allocate the owner's user pool and initialize it in the same transaction
    #[allow(deprecated)]
    pub fn build_init_user_pool(&self, owner: &Pubkey) -> StakingResult<TransactionPayload> {
        let user_pool = self.user_pool_address(owner)?;
        let lamports = self.source().minimum_balance_for_rent_exemption(USER_POOL_SIZE)?;

        let allocate = system_instruction::create_account_with_seed(
            owner,
            &user_pool,
            owner,
            USER_POOL_SEED,
            lamports,
            USER_POOL_SIZE as u64,
            self.program_id(),
        );
        let ctx = accounts::InitializeUserPool {
            user_pool,
            owner: *owner,
        };
        info!("Initializing user pool {user_pool} for {owner}");

        let mut payload = TransactionPayload::new(*owner);
        payload.push(allocate);
        payload.push(initialize_user_pool_instruction(self.program_id(), &ctx));
        Ok(payload)
    }

    /// Stake an NFT; `rarity` must be a tier in 0..=3
    pub fn build_stake_asset(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        rarity: u64,
    ) -> StakingResult<StakePlan> {
        let rarity = Rarity::try_from(rarity)?;
        let (global_authority, global_bump) = self.global_authority();

        let user_nft_token_account =
            match locate_asset_custody(self.source(), mint, owner, &global_authority)? {
                AssetCustody::UserHeld { token_account } => token_account,
                AssetCustody::Escrowed { .. } => return Err(StakingError::AlreadyEscrowed(*mint)),
                AssetCustody::Mismatched { holder, .. } => {
                    return Err(StakingError::NotOwnedByUser {
                        mint: *mint,
                        owner: *owner,
                        holder,
                    })
                }
            };

        let user_pool = self.user_pool_address(owner)?;
        let prerequisite = if self.source().account_exists(&user_pool)? {
            None
        } else {
            info!("User pool {user_pool} missing, it must be created in a prior transaction");
            Some(self.build_init_user_pool(owner)?)
        };

        let dest = ensure_associated_account(self.source(), owner, &global_authority, mint)?;
        let mint_metadata = derive_metadata_account(mint, &self.config().token_metadata_program);
        debug!("Stake {mint} from {user_nft_token_account} to {}", dest.address);

        let ctx = accounts::StakeNftToPool {
            owner: *owner,
            user_pool,
            global_authority,
            user_nft_token_account,
            dest_nft_token_account: dest.address,
            nft_mint: *mint,
            mint_metadata,
            token_program: spl_token::id(),
            token_metadata_program: self.config().token_metadata_program,
        };

        let mut stake = TransactionPayload::new(*owner);
        stake.push_optional(dest.creation_instruction);
        stake.push(stake_nft_to_pool_instruction(
            self.program_id(),
            &ctx,
            global_bump,
            rarity,
        )?);
        info!("Staking {mint} with rarity {rarity:?}");

        Ok(StakePlan {
            prerequisite,
            stake,
        })
    }

    /// Withdraw a staked NFT back to the owner, paying out its pending reward
    ///
    /// Fails with `AccountNotFound` if the user pool is missing and with
    /// `NotEscrowed` if the NFT is not held by the program.
    pub fn build_withdraw_asset(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> StakingResult<TransactionPayload> {
        let (global_authority, global_bump) = self.global_authority();
        let reward_mint = self.config().reward_mint;
        let user_pool = self.require_user_pool(owner)?;

        let escrow_account =
            match locate_asset_custody(self.source(), mint, owner, &global_authority)? {
                AssetCustody::Escrowed { token_account } => token_account,
                AssetCustody::UserHeld { .. } => {
                    return Err(StakingError::NotEscrowed {
                        mint: *mint,
                        holder: *owner,
                    })
                }
                AssetCustody::Mismatched { holder, .. } => {
                    return Err(StakingError::NotEscrowed {
                        mint: *mint,
                        holder,
                    })
                }
            };

        let user_nft = ensure_associated_account(self.source(), owner, owner, mint)?;
        let user_reward = ensure_associated_account(self.source(), owner, owner, &reward_mint)?;

        let ctx = accounts::WithdrawNftFromPool {
            owner: *owner,
            user_pool,
            global_authority,
            user_nft_token_account: user_nft.address,
            dest_nft_token_account: escrow_account,
            reward_vault: derive_associated_account(&global_authority, &reward_mint),
            user_reward_account: user_reward.address,
            nft_mint: *mint,
            token_program: spl_token::id(),
        };

        let mut payload = TransactionPayload::new(*owner);
        payload.push_optional(user_nft.creation_instruction);
        payload.push_optional(user_reward.creation_instruction);
        payload.push(withdraw_nft_from_pool_instruction(
            self.program_id(),
            &ctx,
            global_bump,
        )?);
        info!("Withdrawing {mint} to {}", ctx.user_nft_token_account);
        Ok(payload)
    }

    /// Claim rewards for one staked NFT, or for all of them when `mint` is `None`
    ///
    /// Fails with `AccountNotFound` if the user pool is missing.
    pub fn build_claim(
        &self,
        owner: &Pubkey,
        mint: Option<&Pubkey>,
    ) -> StakingResult<TransactionPayload> {
        let (global_authority, global_bump) = self.global_authority();
        let reward_mint = self.config().reward_mint;
        let user_pool = self.require_user_pool(owner)?;
        let user_reward = ensure_associated_account(self.source(), owner, owner, &reward_mint)?;

        let ctx = accounts::ClaimReward {
            owner: *owner,
            global_authority,
            user_pool,
            reward_vault: derive_associated_account(&global_authority, &reward_mint),
            user_reward_account: user_reward.address,
            token_program: spl_token::id(),
        };

        let mut payload = TransactionPayload::new(*owner);
        payload.push_optional(user_reward.creation_instruction);
        payload.push(claim_reward_instruction(
            self.program_id(),
            &ctx,
            global_bump,
            mint.copied(),
        )?);
        match mint {
            Some(mint) => info!("Claiming reward for {mint}"),
            None => info!("Claiming reward for all staked NFTs"),
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminators_are_distinct() {
        let names = [
            INITIALIZE,
            INITIALIZE_USER_POOL,
            STAKE_NFT_TO_POOL,
            WITHDRAW_NFT_FROM_POOL,
            CLAIM_REWARD,
        ];
        let discriminators: std::collections::HashSet<[u8; 8]> =
            names.iter().map(|n| instruction_discriminator(n)).collect();
        assert_eq!(discriminators.len(), names.len());
    }

    #[test]
    fn test_stake_args_layout() {
        let data = instruction_data(
            STAKE_NFT_TO_POOL,
            &StakeNftToPoolArgs {
                global_bump: 254,
                rarity: 3,
            },
        )
        .unwrap();
        assert_eq!(data.len(), 8 + 1 + 8);
        assert_eq!(data[8], 254);
        assert_eq!(&data[9..], &3u64.to_le_bytes());
    }

    #[test]
    fn test_claim_args_option_encoding() {
        let mint = Pubkey::new_unique();
        let some = instruction_data(
            CLAIM_REWARD,
            &ClaimRewardArgs {
                global_bump: 7,
                mint: Some(mint.to_bytes()),
            },
        )
        .unwrap();
        assert_eq!(some.len(), 8 + 1 + 1 + 32);
        assert_eq!(some[9], 1);
        assert_eq!(&some[10..], mint.as_ref());

        let none = instruction_data(
            CLAIM_REWARD,
            &ClaimRewardArgs {
                global_bump: 7,
                mint: None,
            },
        )
        .unwrap();
        assert_eq!(none.len(), 8 + 1 + 1);
        assert_eq!(none[9], 0);
    }

    #[test]
    fn test_payload_to_transaction() {
        let payer = Pubkey::new_unique();
        let mut payload = TransactionPayload::new(payer);
        assert!(payload.is_empty());
        payload.push(initialize_user_pool_instruction(
            &Pubkey::new_unique(),
            &accounts::InitializeUserPool {
                user_pool: Pubkey::new_unique(),
                owner: payer,
            },
        ));
        payload.push_optional(None);
        assert_eq!(payload.len(), 1);

        let tx = payload.to_transaction();
        assert_eq!(tx.message.account_keys[0], payer);
        assert_eq!(tx.message.instructions.len(), 1);
        assert!(tx.signatures.iter().all(|s| *s == Default::default()));
    }
}
