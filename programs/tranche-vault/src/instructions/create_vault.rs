use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::VaultCreated;
use crate::staking::WithdrawalQueue;
use crate::state::{ProtocolConfig, VaultState};

#[derive(Accounts)]
pub struct CreateVault<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        init,
        payer = creator,
        space = VaultState::LEN,
        seeds = [VAULT_SEED, &protocol_config.next_vault_id.to_le_bytes()],
        bump
    )]
    pub vault: Account<'info, VaultState>,

    /// Lamport vault holding the premium pool, fee earnings and queue
    /// settlements for this vault
    /// CHECK: PDA that holds SOL
    #[account(
        mut,
        seeds = [NATIVE_VAULT_SEED, vault.key().as_ref()],
        bump
    )]
    pub native_vault: SystemAccount<'info>,

    /// CHECK: External withdrawal queue; read for the per-request cap
    pub withdrawal_queue: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<CreateVault>,
    fixed_side_capacity: u64,
    duration: i64,
    variable_side_capacity: u64,
) -> Result<()> {
    let protocol = &ctx.accounts.protocol_config;
    let vault = &mut ctx.accounts.vault;

    require!(protocol.is_initialized, VaultError::NotInitialized);
    require!(fixed_side_capacity > 0, VaultError::InvalidParameters);
    require!(variable_side_capacity > 0, VaultError::InvalidParameters);
    require!(duration > 0, VaultError::InvalidParameters);
    require!(
        protocol.protocol_fee_receiver != Pubkey::default(),
        VaultError::InvalidParameters
    );

    // A fixed deposit of the minimum size must itself pass the global
    // minimum, otherwise the capacity can never fill exactly
    let minimum_fixed = crate::state::mul_div(
        fixed_side_capacity,
        protocol.minimum_fixed_deposit_bps as u64,
        BPS_100_PERCENT,
    )?;
    require!(
        minimum_fixed >= protocol.minimum_deposit,
        VaultError::InvalidParameters
    );

    // The ended unwind requests the whole remaining position in one batch;
    // cap capacities so that batch always fits the tracked id budget, with
    // 2x headroom for accrued yield
    let queue = WithdrawalQueue::load(&ctx.accounts.withdrawal_queue)?;
    let combined = fixed_side_capacity
        .checked_add(variable_side_capacity)
        .ok_or(VaultError::Overflow)?;
    let batch_budget = queue
        .max_request_value
        .checked_mul(MAX_QUEUE_REQUESTS as u64 / 2)
        .ok_or(VaultError::Overflow)?;
    require!(combined <= batch_budget, VaultError::InvalidParameters);

    vault.id = protocol.next_vault_id;
    vault.creator = ctx.accounts.creator.key();
    vault.duration = duration;
    vault.fixed_side_capacity = fixed_side_capacity;
    vault.variable_side_capacity = variable_side_capacity;
    vault.early_exit_fee_bps = protocol.early_exit_fee_bps;
    vault.protocol_fee_bps = protocol.protocol_fee_bps;
    vault.protocol_fee_receiver = protocol.protocol_fee_receiver;
    vault.minimum_deposit = protocol.minimum_deposit;
    vault.minimum_fixed_deposit_bps = protocol.minimum_fixed_deposit_bps;
    vault.bump = ctx.bumps.vault;
    vault.native_vault_bump = ctx.bumps.native_vault;

    let protocol = &mut ctx.accounts.protocol_config;
    protocol.next_vault_id = protocol
        .next_vault_id
        .checked_add(1)
        .ok_or(VaultError::Overflow)?;

    // Keep the lamport vault rent-exempt so payout floors never eat into
    // depositor funds
    let rent = Rent::get()?;
    let transfer_ix = anchor_lang::system_program::Transfer {
        from: ctx.accounts.creator.to_account_info(),
        to: ctx.accounts.native_vault.to_account_info(),
    };
    anchor_lang::system_program::transfer(
        CpiContext::new(ctx.accounts.system_program.to_account_info(), transfer_ix),
        rent.minimum_balance(0),
    )?;

    emit!(VaultCreated {
        vault_id: vault.id,
        creator: vault.creator,
        duration,
        fixed_side_capacity,
        variable_side_capacity,
        early_exit_fee_bps: vault.early_exit_fee_bps,
        protocol_fee_bps: vault.protocol_fee_bps,
        protocol_fee_receiver: vault.protocol_fee_receiver,
    });

    Ok(())
}
