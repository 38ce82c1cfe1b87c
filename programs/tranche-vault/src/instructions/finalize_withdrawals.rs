use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::WithdrawalFinalized;
use crate::instructions::pay_from_native_vault;
use crate::staking::{self, WithdrawalTicket};
use crate::state::{Position, RequestPhase, Tranche, VaultState};

/// Claim a set of finalized queue tickets into the native vault, in the
/// order the request recorded them. The settled total must match the
/// vault's lamport delta exactly; anything else means a foreign transfer
/// landed mid-instruction.
fn claim_tickets<'info>(
    staking_program: &AccountInfo<'info>,
    queue: &AccountInfo<'info>,
    native_vault: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    tickets: &[AccountInfo<'info>],
    expected_ids: &[u64],
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    require!(
        tickets.len() == expected_ids.len(),
        VaultError::InvalidStakingAccount
    );

    let balance_before = native_vault.lamports();
    let mut total: u64 = 0;

    for (ticket_info, &expected_id) in tickets.iter().zip(expected_ids) {
        let ticket = WithdrawalTicket::load(ticket_info)?;
        require!(ticket.id == expected_id, VaultError::InvalidStakingAccount);
        require!(
            ticket.owner == native_vault.key(),
            VaultError::InvalidStakingAccount
        );

        let settled = staking::claim_withdrawal(
            staking_program,
            staking::ClaimWithdrawalAccounts {
                owner: native_vault.clone(),
                queue: queue.clone(),
                ticket: ticket_info.clone(),
                system_program: system_program.clone(),
            },
            signer_seeds,
        )?;
        total = total.checked_add(settled).ok_or(VaultError::Overflow)?;
    }

    let received = native_vault
        .lamports()
        .checked_sub(balance_before)
        .ok_or(VaultError::UnexpectedDirectTransfer)?;
    require!(received == total, VaultError::UnexpectedDirectTransfer);

    Ok(total)
}

// ============================================================
// FIXED-SIDE FINALIZATION (pre-start and mid-term requests)
// ============================================================

#[derive(Accounts)]
pub struct FinalizeFixed<'info> {
    /// Anyone may crank a finalization; funds only ever reach the owner
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: Payout recipient; bound to the position by its PDA seeds
    #[account(mut)]
    pub owner: UncheckedAccount<'info>,

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
            owner.key().as_ref(),
            &[Tranche::Fixed as u8],
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
    pub withdrawal_queue: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    // remaining_accounts: the request's ticket accounts, in id order
}

/// Settle a pre-start fixed exit: principal back at the settled ticket
/// value, no fee of any kind.
pub fn finalize_not_started_fixed_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, FinalizeFixed<'info>>,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;

    position.ensure_finalizable(RequestPhase::NotStarted)?;

    let vault_key = vault.key();
    let native_vault_seeds: &[&[u8]] = &[
        NATIVE_VAULT_SEED,
        vault_key.as_ref(),
        &[vault.native_vault_bump],
    ];

    let request_ids = position.pending.request_ids.clone();
    let settled = claim_tickets(
        &ctx.accounts.staking_program,
        &ctx.accounts.withdrawal_queue,
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &request_ids,
        &[native_vault_seeds],
    )?;

    position.clear_pending();

    pay_from_native_vault(
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        settled,
    )?;

    emit!(WithdrawalFinalized {
        vault_id: vault.id,
        side: Tranche::Fixed,
        owner: ctx.accounts.owner.key(),
        phase: RequestPhase::NotStarted,
        settled_value: settled,
        early_exit_fee: 0,
        protocol_fee: 0,
        amount_paid: settled,
    });

    Ok(())
}

/// Settle a mid-term fixed exit. The early-exit fee is computed from the
/// request timestamp, capped at the settled value, and accrues to the
/// variable tranche's fee earnings.
pub fn finalize_ongoing_fixed_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, FinalizeFixed<'info>>,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;

    position.ensure_finalizable(RequestPhase::Ongoing)?;

    let vault_key = vault.key();
    let native_vault_seeds: &[&[u8]] = &[
        NATIVE_VAULT_SEED,
        vault_key.as_ref(),
        &[vault.native_vault_bump],
    ];

    let request_ids = position.pending.request_ids.clone();
    let requested_at = position.pending.requested_at;
    let settled = claim_tickets(
        &ctx.accounts.staking_program,
        &ctx.accounts.withdrawal_queue,
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &request_ids,
        &[native_vault_seeds],
    )?;

    let fee = vault
        .calculate_early_exit_fee(position.upfront_premium, requested_at)?
        .min(settled);
    vault.fee_earnings = vault
        .fee_earnings
        .checked_add(fee)
        .ok_or(VaultError::Overflow)?;
    if vault.ended_snapshot_taken {
        // late settlement: grow the frozen distribution base so end-phase
        // variable claimants share this fee too
        vault.ended_fee_earnings_total = vault
            .ended_fee_earnings_total
            .checked_add(fee)
            .ok_or(VaultError::Overflow)?;
    }

    position.clear_pending();

    let amount_paid = settled - fee;
    pay_from_native_vault(
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        amount_paid,
    )?;

    emit!(WithdrawalFinalized {
        vault_id: vault.id,
        side: Tranche::Fixed,
        owner: ctx.accounts.owner.key(),
        phase: RequestPhase::Ongoing,
        settled_value: settled,
        early_exit_fee: fee,
        protocol_fee: 0,
        amount_paid,
    });

    Ok(())
}

// ============================================================
// VARIABLE-SIDE FINALIZATION (mid-term yield exits)
// ============================================================

#[derive(Accounts)]
pub struct FinalizeVariable<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: Payout recipient; bound to the position by its PDA seeds
    #[account(mut)]
    pub owner: UncheckedAccount<'info>,

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
            owner.key().as_ref(),
            &[Tranche::Variable as u8],
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
    pub withdrawal_queue: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Settle a mid-term variable exit. The queued slice is pure yield, so the
/// protocol fee applies to the whole settled value.
pub fn finalize_ongoing_variable_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, FinalizeVariable<'info>>,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;

    position.ensure_finalizable(RequestPhase::Ongoing)?;

    let vault_key = vault.key();
    let native_vault_seeds: &[&[u8]] = &[
        NATIVE_VAULT_SEED,
        vault_key.as_ref(),
        &[vault.native_vault_bump],
    ];

    let request_ids = position.pending.request_ids.clone();
    let settled = claim_tickets(
        &ctx.accounts.staking_program,
        &ctx.accounts.withdrawal_queue,
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
        &request_ids,
        &[native_vault_seeds],
    )?;

    let fee = vault.protocol_fee(settled)?;
    vault.protocol_fee_accrued = vault
        .protocol_fee_accrued
        .checked_add(fee)
        .ok_or(VaultError::Overflow)?;

    position.clear_pending();

    let amount_paid = settled - fee;
    pay_from_native_vault(
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        amount_paid,
    )?;

    emit!(WithdrawalFinalized {
        vault_id: vault.id,
        side: Tranche::Variable,
        owner: ctx.accounts.owner.key(),
        phase: RequestPhase::Ongoing,
        settled_value: settled,
        early_exit_fee: 0,
        protocol_fee: fee,
        amount_paid,
    });

    Ok(())
}

// ============================================================
// END-PHASE FINALIZATION (shared unwind batch)
// ============================================================

#[derive(Accounts)]
#[instruction(side: u8)]
pub struct FinalizeEnded<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: Payout recipient; bound to the position by its PDA seeds
    #[account(mut)]
    pub owner: UncheckedAccount<'info>,

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
            owner.key().as_ref(),
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
    pub withdrawal_queue: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    // remaining_accounts: the full unwind batch's tickets on the first call,
    // none afterwards
}

/// Settle an end-phase request. The first finalize after the unwind claims
/// the shared batch and splits it into the fixed and variable pools; every
/// call pays the caller's pro-rata slice from the frozen snapshot.
pub fn finalize_ended_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, FinalizeEnded<'info>>,
    side: u8,
) -> Result<()> {
    let tranche = Tranche::try_from_u8(side)?;
    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;

    position.ensure_finalizable(RequestPhase::Ended)?;

    if !vault.ended_requests_claimed {
        let vault_key = vault.key();
        let native_vault_seeds: &[&[u8]] = &[
            NATIVE_VAULT_SEED,
            vault_key.as_ref(),
            &[vault.native_vault_bump],
        ];

        let batch_ids = vault.ended_request_ids.clone();
        let settled = claim_tickets(
            &ctx.accounts.staking_program,
            &ctx.accounts.withdrawal_queue,
            &ctx.accounts.native_vault.to_account_info(),
            &ctx.accounts.system_program.to_account_info(),
            ctx.remaining_accounts,
            &batch_ids,
            &[native_vault_seeds],
        )?;
        vault.settle_ended_batch(settled)?;
        msg!(
            "Unwind batch settled at {}: fixed pool {}, variable pool {}",
            settled,
            vault.ended_fixed_pool_total,
            vault.ended_variable_pool_total
        );
    }

    let shares = position.pending.shares;
    let (payout, settled_value, early_exit_fee) = match tranche {
        Tranche::Fixed => {
            let amount = vault.ended_fixed_payout(shares)?;
            (amount, amount, 0)
        }
        Tranche::Variable => {
            let (yield_part, fee_part, premium_part) = vault.ended_variable_payout(shares)?;
            let amount = yield_part
                .checked_add(fee_part)
                .and_then(|v| v.checked_add(premium_part))
                .ok_or(VaultError::Overflow)?;
            (amount, amount, 0)
        }
    };

    position.clear_pending();

    pay_from_native_vault(
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        payout,
    )?;

    emit!(WithdrawalFinalized {
        vault_id: vault.id,
        side: tranche,
        owner: ctx.accounts.owner.key(),
        phase: RequestPhase::Ended,
        settled_value,
        early_exit_fee,
        // withheld once at batch settlement, not per position
        protocol_fee: 0,
        amount_paid: payout,
    });

    Ok(())
}
