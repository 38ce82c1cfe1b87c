use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::{FundsWithdrawn, VaultEnded, WithdrawalRequested};
use crate::instructions::pay_from_native_vault;
use crate::staking::{self, StakingPool};
use crate::state::{Position, RequestPhase, Tranche, VaultPhase, VaultState};

#[derive(Accounts)]
#[instruction(side: u8)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, &vault.id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [
            POSITION_SEED,
            vault.key().as_ref(),
            depositor.key().as_ref(),
            &[side],
        ],
        bump = position.bump
    )]
    pub position: Account<'info, Position>,

    /// CHECK: PDA that holds SOL
    #[account(
        mut,
        seeds = [NATIVE_VAULT_SEED, vault.key().as_ref()],
        bump = vault.native_vault_bump
    )]
    pub native_vault: SystemAccount<'info>,

    /// CHECK: Validated against the known staking program id
    #[account(address = staking::STAKING_PROGRAM_ID @ VaultError::InvalidStakingAccount)]
    pub staking_program: UncheckedAccount<'info>,

    /// CHECK: Owner and discriminator checked at deserialization
    #[account(mut)]
    pub staking_pool: UncheckedAccount<'info>,

    /// CHECK: Owner and discriminator checked at deserialization
    #[account(mut)]
    pub withdrawal_queue: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    // remaining_accounts: uninitialized ticket accounts, one per queue
    // request the withdrawal splits into
}

/// Phase-routed withdrawal request. The vault's phase at call time decides
/// the treatment, and the request carries that phase tag to its matching
/// finalize entrypoint:
///
///   NotStarted / fixed     queue request for the live value of the claim
///                          shares, principal back in full
///   NotStarted / variable  instant refund from the liquid premium pool
///   Started / fixed        queue request for the live value of the bearer
///                          shares; the early-exit fee is assessed at
///                          finalization from the timestamp taken here
///   Started / variable     accrued fee earnings paid instantly, the yield
///                          slice above the fixed entitlement queued
///   Ended / either         first caller unwinds the whole staked position
///                          as a shared batch; every caller burns shares
///                          and settles against the frozen snapshot
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    side: u8,
) -> Result<()> {
    let tranche = Tranche::try_from_u8(side)?;
    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;
    let now = Clock::get()?.unix_timestamp;

    require!(!position.has_pending(), VaultError::WithdrawalAlreadyRequested);

    let vault_key = vault.key();
    let native_vault_seeds: &[&[u8]] = &[
        NATIVE_VAULT_SEED,
        vault_key.as_ref(),
        &[vault.native_vault_bump],
    ];
    let request_accounts = staking::RequestWithdrawalAccounts {
        requester: ctx.accounts.native_vault.to_account_info(),
        pool: ctx.accounts.staking_pool.to_account_info(),
        queue: ctx.accounts.withdrawal_queue.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };
    let pool_state = StakingPool::load(&ctx.accounts.staking_pool)?;

    match (vault.phase(now), tranche) {
        // --------------------------------------------------------
        // PRE-START: positions unwind at face value
        // --------------------------------------------------------
        (VaultPhase::NotStarted, Tranche::Fixed) => {
            let shares = position.claim_shares;
            require!(shares > 0, VaultError::NoClaimTokens);
            let value = pool_state.value_for_shares(shares)?;

            position.claim_shares = 0;
            let principal = position.deposited;
            position.deposited = 0;
            vault.fixed_claim_shares_total -= shares;
            vault.fixed_deposit_total -= principal;
            vault.staking_shares = vault
                .staking_shares
                .checked_sub(shares)
                .ok_or(VaultError::Overflow)?;

            let ids = staking::request_withdrawals(
                &ctx.accounts.staking_program,
                request_accounts,
                ctx.remaining_accounts,
                value,
                &[native_vault_seeds],
            )?;
            position.begin_request(RequestPhase::NotStarted, ids.clone(), now, value, shares)?;

            emit!(WithdrawalRequested {
                vault_id: vault.id,
                side: tranche,
                owner: position.owner,
                phase: RequestPhase::NotStarted,
                shares_burned: shares,
                value_requested: value,
                request_ids: ids,
                requested_at: now,
            });
        }

        (VaultPhase::NotStarted, Tranche::Variable) => {
            let shares = position.bearer_shares;
            require!(shares > 0, VaultError::NoBearerTokens);
            // Variable funds never left the premium pool, so the refund is
            // immediate and exact
            let amount = position.deposited;
            position.bearer_shares = 0;
            position.deposited = 0;
            vault.variable_bearer_shares_total -= shares;
            vault.variable_deposit_total -= amount;
            vault.premium_pool = vault
                .premium_pool
                .checked_sub(amount)
                .ok_or(VaultError::InsufficientVaultBalance)?;

            pay_from_native_vault(
                &ctx.accounts.native_vault.to_account_info(),
                &ctx.accounts.depositor.to_account_info(),
                amount,
            )?;

            emit!(FundsWithdrawn {
                vault_id: vault.id,
                side: tranche,
                owner: position.owner,
                amount,
            });
        }

        // --------------------------------------------------------
        // ONGOING: mid-term exits
        // --------------------------------------------------------
        (VaultPhase::Started, Tranche::Fixed) => {
            let shares = position.bearer_shares;
            require!(shares > 0, VaultError::NoBearerTokens);
            let value = pool_state.value_for_shares(shares)?;

            position.bearer_shares = 0;
            let principal = position.deposited;
            position.deposited = 0;
            vault.fixed_bearer_shares_total -= shares;
            vault.fixed_deposit_total -= principal;
            vault.staking_shares = vault
                .staking_shares
                .checked_sub(shares)
                .ok_or(VaultError::Overflow)?;

            let ids = staking::request_withdrawals(
                &ctx.accounts.staking_program,
                request_accounts,
                ctx.remaining_accounts,
                value,
                &[native_vault_seeds],
            )?;
            // the fee is a function of this timestamp, not the finalize time
            position.begin_request(RequestPhase::Ongoing, ids.clone(), now, value, shares)?;

            emit!(WithdrawalRequested {
                vault_id: vault.id,
                side: tranche,
                owner: position.owner,
                phase: RequestPhase::Ongoing,
                shares_burned: shares,
                value_requested: value,
                request_ids: ids,
                requested_at: now,
            });
        }

        (VaultPhase::Started, Tranche::Variable) => {
            let shares = position.bearer_shares;
            require!(shares > 0, VaultError::NoBearerTokens);

            let staking_balance = pool_state.value_for_shares(vault.staking_shares)?;
            let (yield_slice, fee_slice) = vault.variable_exit_slices(staking_balance, shares)?;
            // a zero-payout exit must not burn shares: the position keeps
            // its claim on future yield, fees and the ended distribution
            require!(
                yield_slice > 0 || fee_slice > 0,
                VaultError::NothingToWithdraw
            );

            position.bearer_shares = 0;
            let principal = position.deposited;
            position.deposited = 0;
            vault.variable_bearer_shares_total -= shares;
            vault.variable_deposit_total -= principal;
            vault.fee_earnings -= fee_slice;

            if yield_slice > 0 {
                let yield_shares = pool_state.shares_for_value(yield_slice)?;
                vault.staking_shares = vault
                    .staking_shares
                    .checked_sub(yield_shares)
                    .ok_or(VaultError::Overflow)?;

                let ids = staking::request_withdrawals(
                    &ctx.accounts.staking_program,
                    request_accounts,
                    ctx.remaining_accounts,
                    yield_slice,
                    &[native_vault_seeds],
                )?;
                position.begin_request(
                    RequestPhase::Ongoing,
                    ids.clone(),
                    now,
                    yield_slice,
                    shares,
                )?;

                emit!(WithdrawalRequested {
                    vault_id: vault.id,
                    side: tranche,
                    owner: position.owner,
                    phase: RequestPhase::Ongoing,
                    shares_burned: shares,
                    value_requested: yield_slice,
                    request_ids: ids,
                    requested_at: now,
                });
            }

            if fee_slice > 0 {
                pay_from_native_vault(
                    &ctx.accounts.native_vault.to_account_info(),
                    &ctx.accounts.depositor.to_account_info(),
                    fee_slice,
                )?;
                emit!(FundsWithdrawn {
                    vault_id: vault.id,
                    side: tranche,
                    owner: position.owner,
                    amount: fee_slice,
                });
            }
        }

        // --------------------------------------------------------
        // ENDED: one-time unwind, then snapshot settlement
        // --------------------------------------------------------
        (VaultPhase::Ended, _) => {
            if !vault.ended_snapshot_taken {
                let staking_balance = pool_state.value_for_shares(vault.staking_shares)?;
                msg!(
                    "Vault {} ended, unwinding staked balance of {}",
                    vault.id,
                    staking_balance
                );
                vault.take_ended_snapshot(now, staking_balance)?;

                if staking_balance > 0 {
                    let ids = staking::request_withdrawals(
                        &ctx.accounts.staking_program,
                        request_accounts,
                        ctx.remaining_accounts,
                        staking_balance,
                        &[native_vault_seeds],
                    )?;
                    require!(
                        ids.len() <= MAX_QUEUE_REQUESTS,
                        VaultError::TooManyWithdrawalRequests
                    );
                    vault.ended_request_ids = ids;
                    vault.staking_shares = 0;
                } else {
                    vault.settle_ended_batch(0)?;
                }

                emit!(VaultEnded {
                    vault_id: vault.id,
                    ended_at: vault.ended_at,
                    staking_balance: vault.ended_staking_balance,
                    fixed_entitlement: vault.ended_fixed_entitlement,
                    fixed_shares: vault.ended_fixed_shares,
                    variable_shares: vault.ended_variable_shares,
                    request_ids: vault.ended_request_ids.clone(),
                });
            }

            let shares = match tranche {
                // unclaimed and claimed fixed shares settle identically here
                Tranche::Fixed => position.claim_shares + position.bearer_shares,
                Tranche::Variable => position.bearer_shares,
            };
            require!(shares > 0, VaultError::NoBearerTokens);

            match tranche {
                Tranche::Fixed => {
                    vault.fixed_claim_shares_total -= position.claim_shares;
                    vault.fixed_bearer_shares_total -= position.bearer_shares;
                    position.claim_shares = 0;
                    position.bearer_shares = 0;
                }
                Tranche::Variable => {
                    vault.variable_bearer_shares_total -= position.bearer_shares;
                    position.bearer_shares = 0;
                }
            }
            let principal = position.deposited;
            position.deposited = 0;
            match tranche {
                Tranche::Fixed => vault.fixed_deposit_total -= principal,
                Tranche::Variable => vault.variable_deposit_total -= principal,
            }

            // settles against the shared batch; owns no queue requests
            position.begin_request(RequestPhase::Ended, Vec::new(), now, 0, shares)?;

            emit!(WithdrawalRequested {
                vault_id: vault.id,
                side: tranche,
                owner: position.owner,
                phase: RequestPhase::Ended,
                shares_burned: shares,
                value_requested: 0,
                request_ids: Vec::new(),
                requested_at: now,
            });
        }
    }

    Ok(())
}
