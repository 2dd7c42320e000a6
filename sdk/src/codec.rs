//! Fixed-layout binary codec for staking program accounts
//!
//! Both records are zero-copy Anchor accounts: an 8-byte discriminator
//! (`sha256("account:<Name>")[..8]`) followed by the record body. Keys are raw
//! 32-byte values and every integer is an unsigned 64-bit little-endian value.
//! All offsets below are relative to the start of the body.
//!
//! | Record          | Field               | Offset      | Size |
//! |-----------------|---------------------|-------------|------|
//! | GlobalPool      | admin               | 0           | 32   |
//! | GlobalPool      | total_staked_count  | 32          | 8    |
//! | UserPool        | owner               | 0           | 32   |
//! | UserPool        | last_claimed_time   | 32          | 8    |
//! | UserPool        | staked_count        | 40          | 8    |
//! | UserPool.entry  | mint                | 48 + 56·i   | 32   |
//! | UserPool.entry  | staked_time         | 80 + 56·i   | 8    |
//! | UserPool.entry  | claimed_time        | 88 + 56·i   | 8    |
//! | UserPool.entry  | rarity              | 96 + 56·i   | 8    |

use crate::error::{StakingError, StakingResult};
use crate::state::{GlobalPoolRecord, Rarity, StakedEntry, UserPoolRecord, USER_POOL_CAPACITY};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use solana_sdk::{account::Account, pubkey::Pubkey};

pub const DISCRIMINATOR_LEN: usize = 8;
const KEY_LEN: usize = 32;
const U64_LEN: usize = 8;

// GlobalPool body
pub const GLOBAL_POOL_ADMIN_OFFSET: usize = 0;
pub const GLOBAL_POOL_TOTAL_STAKED_OFFSET: usize = 32;
pub const GLOBAL_POOL_BODY_LEN: usize = 40;
pub const GLOBAL_POOL_SIZE: usize = DISCRIMINATOR_LEN + GLOBAL_POOL_BODY_LEN;

// UserPool body
pub const USER_POOL_OWNER_OFFSET: usize = 0;
pub const USER_POOL_LAST_CLAIMED_OFFSET: usize = 32;
pub const USER_POOL_STAKED_COUNT_OFFSET: usize = 40;
pub const USER_POOL_ENTRIES_OFFSET: usize = 48;

// StakedEntry, relative to the entry start
pub const ENTRY_MINT_OFFSET: usize = 0;
pub const ENTRY_STAKED_TIME_OFFSET: usize = 32;
pub const ENTRY_CLAIMED_TIME_OFFSET: usize = 40;
pub const ENTRY_RARITY_OFFSET: usize = 48;
pub const ENTRY_LEN: usize = 56;

pub const USER_POOL_BODY_LEN: usize = USER_POOL_ENTRIES_OFFSET + ENTRY_LEN * USER_POOL_CAPACITY;
/// Allocated size of a user pool account (5656 bytes)
pub const USER_POOL_SIZE: usize = DISCRIMINATOR_LEN + USER_POOL_BODY_LEN;

pub const GLOBAL_POOL_ACCOUNT_NAME: &str = "GlobalPool";
pub const USER_POOL_ACCOUNT_NAME: &str = "UserPool";

/// Anchor account discriminator: `sha256("account:<name>")[..8]`
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(format!("account:{name}").as_bytes());
    let hash = hasher.finalize();
    let mut discriminator = [0u8; DISCRIMINATOR_LEN];
    discriminator.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    discriminator
}

/// Kind of a raw program account, judged by exact size and discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    GlobalPool,
    UserPool,
    Unknown,
}

pub fn classify_account(data: &[u8]) -> AccountKind {
    let has_tag = |name: &str| {
        data.get(..DISCRIMINATOR_LEN)
            .is_some_and(|tag| tag == account_discriminator(name))
    };
    match data.len() {
        GLOBAL_POOL_SIZE if has_tag(GLOBAL_POOL_ACCOUNT_NAME) => AccountKind::GlobalPool,
        USER_POOL_SIZE if has_tag(USER_POOL_ACCOUNT_NAME) => AccountKind::UserPool,
        _ => AccountKind::Unknown,
    }
}

/// Bounds-checked reader over a record body
struct BodyReader<'a> {
    body: &'a [u8],
    record: &'static str,
}

impl<'a> BodyReader<'a> {
    /// Check the length and discriminator, then position after the discriminator
    fn new(data: &'a [u8], record: &'static str, min_len: usize) -> StakingResult<Self> {
        if data.len() < min_len {
            return Err(StakingError::decode_error(format!(
                "{record} account too short: {} bytes, need at least {min_len}",
                data.len()
            )));
        }
        if data[..DISCRIMINATOR_LEN] != account_discriminator(record) {
            return Err(StakingError::decode_error(format!(
                "{record} discriminator mismatch"
            )));
        }
        Ok(Self {
            body: &data[DISCRIMINATOR_LEN..],
            record,
        })
    }

    fn field(&self, offset: usize, len: usize) -> StakingResult<&'a [u8]> {
        self.body.get(offset..offset + len).ok_or_else(|| {
            StakingError::decode_error(format!(
                "{} field at offset {offset} runs past the end of the account ({} bytes)",
                self.record,
                self.body.len() + DISCRIMINATOR_LEN
            ))
        })
    }

    fn read_key(&self, offset: usize) -> StakingResult<Pubkey> {
        let bytes: [u8; KEY_LEN] = self
            .field(offset, KEY_LEN)?
            .try_into()
            .map_err(StakingError::decode_error)?;
        Ok(Pubkey::new_from_array(bytes))
    }

    fn read_u64_le(&self, offset: usize) -> StakingResult<u64> {
        let bytes: [u8; U64_LEN] = self
            .field(offset, U64_LEN)?
            .try_into()
            .map_err(StakingError::decode_error)?;
        Ok(u64::from_le_bytes(bytes))
    }
}

/// Decode the global pool account
pub fn decode_global_pool(data: &[u8]) -> StakingResult<GlobalPoolRecord> {
    let reader = BodyReader::new(data, GLOBAL_POOL_ACCOUNT_NAME, GLOBAL_POOL_SIZE)?;
    Ok(GlobalPoolRecord {
        admin: reader.read_key(GLOBAL_POOL_ADMIN_OFFSET)?,
        total_staked_count: reader.read_u64_le(GLOBAL_POOL_TOTAL_STAKED_OFFSET)?,
    })
}

/// Decode a user pool account
///
/// Only the first `staked_count` entries are read; anything after them is
/// left-over data and ignored. A count above [`USER_POOL_CAPACITY`] is
/// rejected before any entry is touched.
///
/// The program stores whatever rarity the staker passed, so a single entry
/// outside 0..=3 makes the whole record fail to decode. Such a pool reads as
/// an error from single fetches and is dropped from bulk scans.
pub fn decode_user_pool(data: &[u8]) -> StakingResult<UserPoolRecord> {
    let reader = BodyReader::new(
        data,
        USER_POOL_ACCOUNT_NAME,
        DISCRIMINATOR_LEN + USER_POOL_ENTRIES_OFFSET,
    )?;

    let owner = reader.read_key(USER_POOL_OWNER_OFFSET)?;
    let last_claimed_time = reader.read_u64_le(USER_POOL_LAST_CLAIMED_OFFSET)?;
    let staked_count = reader.read_u64_le(USER_POOL_STAKED_COUNT_OFFSET)?;

    if staked_count > USER_POOL_CAPACITY as u64 {
        return Err(StakingError::CapacityExceeded {
            count: staked_count,
            capacity: USER_POOL_CAPACITY,
        });
    }

    let staking = (0..staked_count as usize)
        .map(|index| {
            let base = USER_POOL_ENTRIES_OFFSET + index * ENTRY_LEN;
            let raw_rarity = reader.read_u64_le(base + ENTRY_RARITY_OFFSET)?;
            let rarity = Rarity::try_from(raw_rarity).map_err(|_| {
                StakingError::decode_error(format!("entry {index} has invalid rarity {raw_rarity}"))
            })?;
            Ok(StakedEntry {
                mint: reader.read_key(base + ENTRY_MINT_OFFSET)?,
                staked_time: reader.read_u64_le(base + ENTRY_STAKED_TIME_OFFSET)?,
                claimed_time: reader.read_u64_le(base + ENTRY_CLAIMED_TIME_OFFSET)?,
                rarity,
            })
        })
        .collect::<StakingResult<Vec<_>>>()?;

    Ok(UserPoolRecord {
        owner,
        last_claimed_time,
        staking,
    })
}

fn write_at(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Encode a global pool into its full on-chain representation
pub fn encode_global_pool(record: &GlobalPoolRecord) -> Vec<u8> {
    let mut data = vec![0u8; GLOBAL_POOL_SIZE];
    write_at(&mut data, 0, &account_discriminator(GLOBAL_POOL_ACCOUNT_NAME));
    let body = &mut data[DISCRIMINATOR_LEN..];
    write_at(body, GLOBAL_POOL_ADMIN_OFFSET, record.admin.as_ref());
    write_at(
        body,
        GLOBAL_POOL_TOTAL_STAKED_OFFSET,
        &record.total_staked_count.to_le_bytes(),
    );
    data
}

/// Encode a user pool into a zero-padded account of [`USER_POOL_SIZE`] bytes
pub fn encode_user_pool(record: &UserPoolRecord) -> StakingResult<Vec<u8>> {
    if record.staking.len() > USER_POOL_CAPACITY {
        return Err(StakingError::CapacityExceeded {
            count: record.staked_count(),
            capacity: USER_POOL_CAPACITY,
        });
    }

    let mut data = vec![0u8; USER_POOL_SIZE];
    write_at(&mut data, 0, &account_discriminator(USER_POOL_ACCOUNT_NAME));
    let body = &mut data[DISCRIMINATOR_LEN..];
    write_at(body, USER_POOL_OWNER_OFFSET, record.owner.as_ref());
    write_at(body, USER_POOL_LAST_CLAIMED_OFFSET, &record.last_claimed_time.to_le_bytes());
    write_at(body, USER_POOL_STAKED_COUNT_OFFSET, &record.staked_count().to_le_bytes());

    for (index, entry) in record.staking.iter().enumerate() {
        let base = USER_POOL_ENTRIES_OFFSET + index * ENTRY_LEN;
        write_at(body, base + ENTRY_MINT_OFFSET, entry.mint.as_ref());
        write_at(body, base + ENTRY_STAKED_TIME_OFFSET, &entry.staked_time.to_le_bytes());
        write_at(body, base + ENTRY_CLAIMED_TIME_OFFSET, &entry.claimed_time.to_le_bytes());
        write_at(body, base + ENTRY_RARITY_OFFSET, &u64::from(entry.rarity).to_le_bytes());
    }

    Ok(data)
}

/// Decode every user pool in a batch of program accounts
///
/// Accounts that [`classify_account`] does not recognise as user pools, or
/// that fail to decode, are logged and skipped; the batch as a whole never fails.
pub fn scan_user_pools(accounts: &[(Pubkey, Account)]) -> Vec<UserPoolRecord> {
    let mut pools = Vec::with_capacity(accounts.len());

    for (address, account) in accounts {
        let kind = classify_account(&account.data);
        if kind != AccountKind::UserPool {
            warn!(
                "Skipping {address}: {} bytes classified as {kind:?}, not a user pool",
                account.data.len()
            );
            continue;
        }
        match decode_user_pool(&account.data) {
            Ok(pool) => pools.push(pool),
            Err(e) => warn!("Skipping malformed user pool {address}: {e}"),
        }
    }

    debug!("Decoded {} of {} user pool accounts", pools.len(), accounts.len());
    pools
}
