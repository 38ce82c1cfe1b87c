//! External Staking Program Account Structures
//!
//! These mirror the staking program's on-chain layouts. Accounts are
//! validated by owner and 8-byte discriminator before deserialization.

use anchor_lang::prelude::*;

use super::STAKING_PROGRAM_ID;
use crate::errors::VaultError;
use crate::state::mul_div;

/// Anchor account discriminators (first 8 bytes of sha256("account:<Name>"))
pub mod discriminators {
    /// StakingPool
    pub const STAKING_POOL: [u8; 8] = [203, 19, 214, 220, 220, 154, 24, 102];

    /// WithdrawalQueue
    pub const WITHDRAWAL_QUEUE: [u8; 8] = [54, 56, 158, 88, 232, 203, 241, 163];

    /// WithdrawalTicket
    pub const WITHDRAWAL_TICKET: [u8; 8] = [92, 140, 181, 69, 244, 220, 233, 156];
}

fn load<T: AnchorDeserialize>(info: &AccountInfo, discriminator: &[u8; 8]) -> Result<T> {
    require!(info.owner == &STAKING_PROGRAM_ID, VaultError::InvalidStakingAccount);
    let data = info.try_borrow_data()?;
    require!(
        data.len() > 8 && data[..8] == discriminator[..],
        VaultError::InvalidStakingAccount
    );
    T::deserialize(&mut &data[8..]).map_err(|_| VaultError::InvalidStakingAccount.into())
}

// ============================================================
// STAKING POOL (exchange-rate oracle)
// ============================================================

/// The staking pool state: total native value under management and total
/// shares outstanding. The ratio is the shares <-> value exchange rate.
#[derive(AnchorDeserialize, AnchorSerialize, Clone, Debug)]
pub struct StakingPool {
    /// Pool authority
    pub authority: Pubkey,

    /// Native value the pool manages, including accrued yield/losses
    pub total_pooled: u64,

    /// Pool shares outstanding
    pub total_shares: u64,
}

impl StakingPool {
    pub fn load(info: &AccountInfo) -> Result<Self> {
        load(info, &discriminators::STAKING_POOL)
    }

    /// Shares minted for (or removed by) a native value at the current rate
    pub fn shares_for_value(&self, value: u64) -> Result<u64> {
        if self.total_pooled == 0 || self.total_shares == 0 {
            return Ok(value);
        }
        mul_div(value, self.total_shares, self.total_pooled)
    }

    /// Native value of a share balance at the current rate
    pub fn value_for_shares(&self, shares: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        mul_div(shares, self.total_pooled, self.total_shares)
    }
}

// ============================================================
// WITHDRAWAL QUEUE
// ============================================================

/// Queue head state. Request ids are assigned sequentially.
#[derive(AnchorDeserialize, AnchorSerialize, Clone, Debug)]
pub struct WithdrawalQueue {
    /// Id the next request will receive
    pub next_request_id: u64,

    /// Hard cap on a single request's value
    pub max_request_value: u64,

    /// Smallest accepted request value
    pub min_request_value: u64,
}

impl WithdrawalQueue {
    pub fn load(info: &AccountInfo) -> Result<Self> {
        load(info, &discriminators::WITHDRAWAL_QUEUE)
    }
}

// ============================================================
// WITHDRAWAL TICKET
// ============================================================

/// One per queue request. `value_claimable` is authoritative once
/// `finalized`; it may differ from `value_requested` by yield or loss
/// realized during the unbonding delay.
#[derive(AnchorDeserialize, AnchorSerialize, Clone, Debug)]
pub struct WithdrawalTicket {
    /// Request id
    pub id: u64,

    /// Requesting account (the vault's native PDA)
    pub owner: Pubkey,

    /// Value asked for at request time
    pub value_requested: u64,

    /// Whether the unbonding delay has elapsed and the value is settled
    pub finalized: bool,

    /// Settled value, valid once finalized
    pub value_claimable: u64,
}

impl WithdrawalTicket {
    pub fn load(info: &AccountInfo) -> Result<Self> {
        load(info, &discriminators::WITHDRAWAL_TICKET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(total_pooled: u64, total_shares: u64) -> StakingPool {
        StakingPool {
            authority: Pubkey::default(),
            total_pooled,
            total_shares,
        }
    }

    #[test]
    fn test_conversion_at_par() {
        let p = pool(0, 0);
        assert_eq!(p.shares_for_value(1_000).unwrap(), 1_000);
    }

    #[test]
    fn test_conversion_after_yield() {
        // 5% accrued yield: each share worth 1.05
        let p = pool(1_050_000, 1_000_000);
        assert_eq!(p.value_for_shares(1_000_000).unwrap(), 1_050_000);
        assert_eq!(p.shares_for_value(1_050_000).unwrap(), 1_000_000);
    }

    #[test]
    fn test_conversion_after_loss() {
        let p = pool(900_000, 1_000_000);
        assert_eq!(p.value_for_shares(500_000).unwrap(), 450_000);
    }

    #[test]
    fn test_round_trip_never_gains() {
        let p = pool(1_050_001, 999_983);
        for value in [1u64, 17, 999_999, 12_345_678] {
            let shares = p.shares_for_value(value).unwrap();
            assert!(p.value_for_shares(shares).unwrap() <= value);
        }
    }
}
