//! Token account resolution
//!
//! Finds (and, when missing, prepares creation of) associated token accounts,
//! and works out where an NFT currently sits relative to its expected owner
//! and the program escrow.

use crate::address::derive_associated_account;
use crate::error::{StakingError, StakingResult};
use crate::source::AccountSource;
use log::{debug, info};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::solana_program::program_pack::Pack;

/// Associated token account plus the instruction that creates it, if it is missing
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAccount {
    pub address: Pubkey,
    pub creation_instruction: Option<Instruction>,
}

impl ResolvedAccount {
    pub fn needs_creation(&self) -> bool {
        self.creation_instruction.is_some()
    }
}

/// Where an NFT is held right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCustody {
    /// Held by the expected owner in `token_account`
    UserHeld { token_account: Pubkey },
    /// Held by the program's escrow authority
    Escrowed { token_account: Pubkey },
    /// Held by somebody else entirely
    Mismatched { token_account: Pubkey, holder: Pubkey },
}

/// Resolve `owner`'s associated token account for `mint`, funded by `payer`
///
/// Repeated calls against an existing account never emit a creation instruction.
pub fn ensure_associated_account<S: AccountSource + ?Sized>(
    source: &S,
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> StakingResult<ResolvedAccount> {
    let address = derive_associated_account(owner, mint);
    let creation_instruction = if source.account_exists(&address)? {
        None
    } else {
        info!("Associated account {address} for owner {owner} / mint {mint} will be created");
        Some(create_associated_token_account(
            payer,
            owner,
            mint,
            &spl_token::id(),
        ))
    };
    Ok(ResolvedAccount {
        address,
        creation_instruction,
    })
}

/// Decode an SPL token account
pub fn unpack_token_account(data: &[u8]) -> StakingResult<spl_token::state::Account> {
    Ok(spl_token::state::Account::unpack(data)?)
}

/// Classify the current custody of an NFT
pub fn locate_asset_custody<S: AccountSource + ?Sized>(
    source: &S,
    mint: &Pubkey,
    expected_owner: &Pubkey,
    escrow_authority: &Pubkey,
) -> StakingResult<AssetCustody> {
    // Common case: the NFT sits in the owner's associated account
    let user_ata = derive_associated_account(expected_owner, mint);
    if let Some(account) = source.get_account(&user_ata)? {
        let token = unpack_token_account(&account.data)?;
        if token.mint == *mint && token.owner == *expected_owner && token.amount > 0 {
            debug!("NFT {mint} held in associated account {user_ata}");
            return Ok(AssetCustody::UserHeld {
                token_account: user_ata,
            });
        }
    }

    let token_account = source
        .largest_token_account(mint)?
        .ok_or(StakingError::AssetNotFound(*mint))?;
    let account = source
        .get_account(&token_account)?
        .ok_or(StakingError::AccountNotFound(token_account))?;
    let token = unpack_token_account(&account.data)?;
    if token.mint != *mint {
        return Err(StakingError::decode_error(format!(
            "token account {token_account} holds mint {}, expected {mint}",
            token.mint
        )));
    }

    let custody = if token.owner == *expected_owner {
        AssetCustody::UserHeld { token_account }
    } else if token.owner == *escrow_authority {
        AssetCustody::Escrowed { token_account }
    } else {
        AssetCustody::Mismatched {
            token_account,
            holder: token.owner,
        }
    };
    debug!("NFT {mint} custody: {custody:?}");
    Ok(custody)
}
