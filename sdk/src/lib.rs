//! Basilisk Staking SDK - client-side interface for the Basilisk NFT staking program
//!
//! This SDK provides:
//! - Address derivation for the global authority, user pools and token accounts
//! - A fixed-layout codec for the program's `GlobalPool` and `UserPool` accounts
//! - Associated token account resolution and NFT custody checks
//! - Instruction builders for initialize, user pool creation, stake, withdraw and claim
//! - Off-chain reward estimation for verifying payouts
//!
//! Signing and submission are left to the caller: builders return unsigned
//! [`TransactionPayload`]s.

pub mod address;
pub mod builder;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod resolver;
pub mod reward;
pub mod source;
pub mod state;
pub mod summary;
pub mod testing;
pub mod utils;

// Re-export the main client and types
pub use builder::{StakePlan, TransactionPayload};
pub use client::StakingClient;
pub use config::StakingConfig;
pub use error::{ErrorCategory, StakingError, StakingResult};
pub use resolver::{AssetCustody, ResolvedAccount};
pub use reward::RewardSchedule;
pub use source::AccountSource;
pub use state::*;
pub use summary::{GlobalSummary, StakerSummary};

// Re-export commonly used Solana types
pub use solana_sdk::{
    commitment_config::CommitmentConfig, instruction::Instruction, pubkey::Pubkey,
    transaction::Transaction,
};
