//! External Staking CPI Helpers
//!
//! High-level wrappers for the three staking-program calls the vault makes:
//! staking a deposit, enqueueing a delayed withdrawal, and claiming a
//! finalized queue ticket. All calls are signed by the vault's native PDA.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, program::invoke_signed};

use super::accounts::{StakingPool, WithdrawalQueue, WithdrawalTicket};
use super::instructions::*;
use crate::errors::VaultError;

/// Helper to create writable account meta
pub fn writable(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

/// Helper to create writable signer account meta
pub fn writable_signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, true)
}

/// Helper to create readonly account meta
pub fn readonly(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

/// Accounts for a `deposit` CPI
pub struct StakeAccounts<'info> {
    /// The vault's native PDA; pays the staked lamports and receives shares
    pub staker: AccountInfo<'info>,
    pub pool: AccountInfo<'info>,
    /// Pool's own lamport vault
    pub pool_vault: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

/// Stake native value, returning the shares minted at the live rate.
///
/// The share count is computed from the pool state read in this same
/// instruction, so it matches what the staking program mints.
pub fn stake<'info>(
    staking_program: &AccountInfo<'info>,
    accounts: StakeAccounts<'info>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let pool_state = StakingPool::load(&accounts.pool)?;
    let shares = pool_state.shares_for_value(amount)?;

    let ix = Instruction {
        program_id: staking_program.key(),
        accounts: vec![
            writable_signer(accounts.staker.key()),
            writable(accounts.pool.key()),
            writable(accounts.pool_vault.key()),
            readonly(accounts.system_program.key()),
        ],
        data: DepositArgs { amount }.to_instruction_data(),
    };

    invoke_signed(
        &ix,
        &[
            accounts.staker,
            accounts.pool,
            accounts.pool_vault,
            accounts.system_program,
        ],
        signer_seeds,
    )?;

    Ok(shares)
}

/// Accounts for a `request_withdrawal` CPI
pub struct RequestWithdrawalAccounts<'info> {
    /// The vault's native PDA; owns the resulting tickets
    pub requester: AccountInfo<'info>,
    pub pool: AccountInfo<'info>,
    pub queue: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

/// Enqueue a value-denominated withdrawal, splitting it into
/// ceil(value / max_request_value) requests under the queue's per-request
/// cap. One ticket account per request is taken from `tickets` (the
/// caller's remaining_accounts). Returns the sequential request ids.
/// Split a request value into per-ticket chunks under the queue's
/// per-request cap. Chunks sum to the value exactly; all but the last are
/// the full cap. Fails when the split needs more tickets than the caller
/// supplied.
pub fn split_request_value(value: u64, cap: u64, ticket_budget: usize) -> Result<Vec<u64>> {
    require!(value > 0, VaultError::Overflow);
    require!(cap > 0, VaultError::InvalidStakingAccount);
    let count = value.div_ceil(cap);
    require!(
        (count as usize) <= ticket_budget,
        VaultError::TooManyWithdrawalRequests
    );

    let mut chunks = Vec::with_capacity(count as usize);
    let mut remaining = value;
    while remaining > 0 {
        let chunk = remaining.min(cap);
        remaining -= chunk;
        chunks.push(chunk);
    }
    Ok(chunks)
}

pub fn request_withdrawals<'info>(
    staking_program: &AccountInfo<'info>,
    accounts: RequestWithdrawalAccounts<'info>,
    tickets: &[AccountInfo<'info>],
    value: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<Vec<u64>> {
    let queue_state = WithdrawalQueue::load(&accounts.queue)?;
    let chunks = split_request_value(value, queue_state.max_request_value, tickets.len())?;

    msg!(
        "Requesting withdrawal of {} in {} queue request(s)",
        value,
        chunks.len()
    );

    let mut ids = Vec::with_capacity(chunks.len());
    for (i, (&chunk, ticket)) in chunks.iter().zip(tickets).enumerate() {
        let ix = Instruction {
            program_id: staking_program.key(),
            accounts: vec![
                writable_signer(accounts.requester.key()),
                writable(accounts.pool.key()),
                writable(accounts.queue.key()),
                writable(ticket.key()),
                readonly(accounts.system_program.key()),
            ],
            data: RequestWithdrawalArgs { value: chunk }.to_instruction_data(),
        };

        invoke_signed(
            &ix,
            &[
                accounts.requester.clone(),
                accounts.pool.clone(),
                accounts.queue.clone(),
                ticket.clone(),
                accounts.system_program.clone(),
            ],
            signer_seeds,
        )?;

        ids.push(queue_state.next_request_id + i as u64);
    }

    Ok(ids)
}

/// Accounts for a `claim_withdrawal` CPI
pub struct ClaimWithdrawalAccounts<'info> {
    /// Ticket owner (the vault's native PDA), also the payout recipient
    pub owner: AccountInfo<'info>,
    pub queue: AccountInfo<'info>,
    pub ticket: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

/// Claim a finalized ticket, paying its settled value to the owner.
/// Returns the settled value read from the ticket. Callers must have
/// checked `finalized` beforehand (WithdrawalNotFinalizedYet).
pub fn claim_withdrawal<'info>(
    staking_program: &AccountInfo<'info>,
    accounts: ClaimWithdrawalAccounts<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let ticket_state = WithdrawalTicket::load(&accounts.ticket)?;
    require!(ticket_state.finalized, VaultError::WithdrawalNotFinalizedYet);

    let ix = Instruction {
        program_id: staking_program.key(),
        accounts: vec![
            writable_signer(accounts.owner.key()),
            writable(accounts.queue.key()),
            writable(accounts.ticket.key()),
            readonly(accounts.system_program.key()),
        ],
        data: claim_withdrawal_instruction_data(),
    };

    invoke_signed(
        &ix,
        &[
            accounts.owner,
            accounts.queue,
            accounts.ticket,
            accounts.system_program,
        ],
        signer_seeds,
    )?;

    Ok(ticket_state.value_claimable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_QUEUE_REQUESTS;

    #[test]
    fn test_split_below_cap_is_a_single_request() {
        assert_eq!(split_request_value(999, 1_000, 16).unwrap(), vec![999]);
        assert_eq!(split_request_value(1_000, 1_000, 16).unwrap(), vec![1_000]);
    }

    #[test]
    fn test_split_exact_multiple_of_cap() {
        assert_eq!(
            split_request_value(3_000, 1_000, 16).unwrap(),
            vec![1_000, 1_000, 1_000]
        );
    }

    #[test]
    fn test_split_cap_plus_one_spills_into_second_request() {
        assert_eq!(split_request_value(1_001, 1_000, 16).unwrap(), vec![1_000, 1]);
    }

    #[test]
    fn test_split_respects_ticket_budget() {
        assert!(split_request_value(16_000, 1_000, 16).is_ok());
        let err = split_request_value(16_001, 1_000, 16).unwrap_err();
        assert_eq!(err, VaultError::TooManyWithdrawalRequests.into());
    }

    // creation caps combined capacity at cap * MAX_QUEUE_REQUESTS / 2, so
    // the ended unwind still fits the id budget after the staked position
    // doubles over the term
    #[test]
    fn test_unwind_at_double_capacity_fits_the_id_budget() {
        let cap = 1_000u64;
        let combined = cap * (MAX_QUEUE_REQUESTS as u64 / 2);
        let chunks = split_request_value(combined * 2, cap, MAX_QUEUE_REQUESTS).unwrap();
        assert_eq!(chunks.len(), MAX_QUEUE_REQUESTS);
        assert_eq!(chunks.iter().sum::<u64>(), combined * 2);
    }
}
