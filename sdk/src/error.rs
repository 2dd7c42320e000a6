//! Error types for the Basilisk staking SDK
//!
//! Every fallible SDK operation returns [`StakingResult`]. Variants are grouped
//! into the categories exposed by [`StakingError::category`] so callers can
//! decide between "fix the input", "the account is missing", "retry later" and
//! so on without matching every variant.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Coarse classification of SDK failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    AccountNotFound,
    CustodyMismatch,
    DecodeError,
    NetworkError,
}

/// Main error type for the Basilisk staking SDK
#[derive(Error, Debug)]
pub enum StakingError {
    // Input Errors (1000-1099)
    #[error("Invalid rarity tier: {0} (expected 0..=3)")]
    InvalidRarity(u64),

    #[error("Invalid input parameters: {0}")]
    InvalidInput(String),

    #[error("Staked count {count} exceeds pool capacity {capacity}")]
    CapacityExceeded { count: u64, capacity: usize },

    #[error("Mint {0} is not staked in this user pool")]
    EntryNotFound(Pubkey),

    // Account Errors (2000-2099)
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("No token account currently holds mint {0}")]
    AssetNotFound(Pubkey),

    // Custody Errors (3000-3099)
    #[error("NFT {mint} is not owned by {owner} (held by {holder})")]
    NotOwnedByUser {
        mint: Pubkey,
        owner: Pubkey,
        holder: Pubkey,
    },

    #[error("NFT {0} is already escrowed by the staking program")]
    AlreadyEscrowed(Pubkey),

    #[error("NFT {mint} is not escrowed by the staking program (held by {holder})")]
    NotEscrowed { mint: Pubkey, holder: Pubkey },

    // Codec Errors (4000-4099)
    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // Network Errors (8000-8099)
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Solana client error: {0}")]
    SolanaClientError(#[from] solana_client::client_error::ClientError),

    // Wrapped errors
    #[error("Solana program error: {0}")]
    SolanaProgramError(#[from] solana_sdk::program_error::ProgramError),

    #[error("Address derivation error: {0}")]
    PubkeyError(#[from] solana_sdk::pubkey::PubkeyError),
}

impl StakingError {
    /// Get the error code for this error
    pub fn code(&self) -> u32 {
        match self {
            // Input Errors
            StakingError::InvalidRarity(_) => 1000,
            StakingError::InvalidInput(_) => 1001,
            StakingError::CapacityExceeded { .. } => 1002,
            StakingError::EntryNotFound(_) => 1003,

            // Account Errors
            StakingError::AccountNotFound(_) => 2000,
            StakingError::AssetNotFound(_) => 2001,

            // Custody Errors
            StakingError::NotOwnedByUser { .. } => 3000,
            StakingError::AlreadyEscrowed(_) => 3001,
            StakingError::NotEscrowed { .. } => 3002,

            // Codec Errors
            StakingError::DecodeError(_) => 4000,
            StakingError::SerializationError(_) => 4001,
            StakingError::JsonError(_) => 4002,

            // Network Errors
            StakingError::NetworkError(_) => 8000,
            StakingError::SolanaClientError(_) => 8001,

            // Wrapped errors use generic codes
            StakingError::SolanaProgramError(_) => 9000,
            StakingError::PubkeyError(_) => 9001,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StakingError::InvalidRarity(_)
            | StakingError::InvalidInput(_)
            | StakingError::CapacityExceeded { .. }
            | StakingError::EntryNotFound(_)
            | StakingError::PubkeyError(_) => ErrorCategory::InvalidInput,
            StakingError::AccountNotFound(_) | StakingError::AssetNotFound(_) => {
                ErrorCategory::AccountNotFound
            }
            StakingError::NotOwnedByUser { .. }
            | StakingError::AlreadyEscrowed(_)
            | StakingError::NotEscrowed { .. } => ErrorCategory::CustodyMismatch,
            StakingError::DecodeError(_)
            | StakingError::SerializationError(_)
            | StakingError::JsonError(_)
            | StakingError::SolanaProgramError(_) => ErrorCategory::DecodeError,
            StakingError::NetworkError(_) | StakingError::SolanaClientError(_) => {
                ErrorCategory::NetworkError
            }
        }
    }

    /// Create a new network error
    pub fn network_error<T: std::fmt::Display>(msg: T) -> Self {
        StakingError::NetworkError(msg.to_string())
    }

    /// Create a new decode error
    pub fn decode_error<T: std::fmt::Display>(msg: T) -> Self {
        StakingError::DecodeError(msg.to_string())
    }

    /// Create a new invalid input error
    pub fn invalid_input<T: std::fmt::Display>(msg: T) -> Self {
        StakingError::InvalidInput(msg.to_string())
    }
}

/// Result type for SDK operations
pub type StakingResult<T> = std::result::Result<T, StakingError>;
