use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::{FundsDeposited, TrancheFilled, VaultStarted};
use crate::staking::{self, StakingPool};
use crate::state::{Position, Tranche, VaultState};

#[derive(Accounts)]
#[instruction(side: u8)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, &vault.id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, VaultState>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = Position::LEN,
        seeds = [
            POSITION_SEED,
            vault.key().as_ref(),
            depositor.key().as_ref(),
            &[side],
        ],
        bump
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

    /// CHECK: The pool's lamport vault; the staking program validates it
    #[account(mut)]
    pub staking_pool_vault: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Deposit>, side: u8, amount: u64) -> Result<()> {
    let tranche = Tranche::try_from_u8(side)?;
    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;
    let now = Clock::get()?.unix_timestamp;

    // Both capacities fill exactly once; the start transition closes the door
    require!(!vault.is_started(), VaultError::DepositsClosed);

    match tranche {
        Tranche::Fixed => vault.validate_fixed_deposit(amount)?,
        Tranche::Variable => vault.validate_variable_deposit(amount)?,
    }

    position.vault = vault.key();
    position.owner = ctx.accounts.depositor.key();
    position.side = side;
    position.bump = ctx.bumps.position;

    // Fund the native vault first; fixed deposits are staked straight out
    // of it under the vault's signature
    let transfer_ix = anchor_lang::system_program::Transfer {
        from: ctx.accounts.depositor.to_account_info(),
        to: ctx.accounts.native_vault.to_account_info(),
    };
    anchor_lang::system_program::transfer(
        CpiContext::new(ctx.accounts.system_program.to_account_info(), transfer_ix),
        amount,
    )?;

    let vault_key = vault.key();
    let native_vault_seeds: &[&[u8]] = &[
        NATIVE_VAULT_SEED,
        vault_key.as_ref(),
        &[vault.native_vault_bump],
    ];

    let shares_minted = match tranche {
        Tranche::Fixed => {
            let shares = staking::stake(
                &ctx.accounts.staking_program,
                staking::StakeAccounts {
                    staker: ctx.accounts.native_vault.to_account_info(),
                    pool: ctx.accounts.staking_pool.to_account_info(),
                    pool_vault: ctx.accounts.staking_pool_vault.to_account_info(),
                    system_program: ctx.accounts.system_program.to_account_info(),
                },
                amount,
                &[native_vault_seeds],
            )?;

            position.deposited = position
                .deposited
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            position.claim_shares = position
                .claim_shares
                .checked_add(shares)
                .ok_or(VaultError::Overflow)?;

            vault.fixed_deposit_total = vault
                .fixed_deposit_total
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            vault.fixed_claim_shares_total = vault
                .fixed_claim_shares_total
                .checked_add(shares)
                .ok_or(VaultError::Overflow)?;
            vault.staking_shares = vault
                .staking_shares
                .checked_add(shares)
                .ok_or(VaultError::Overflow)?;
            shares
        }
        Tranche::Variable => {
            // Variable deposits stay liquid as the premium pool; bearer
            // shares are minted 1:1 with the native amount
            position.deposited = position
                .deposited
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            position.bearer_shares = position
                .bearer_shares
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;

            vault.variable_deposit_total = vault
                .variable_deposit_total
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            vault.variable_bearer_shares_total = vault
                .variable_bearer_shares_total
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            vault.premium_pool = vault
                .premium_pool
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            amount
        }
    };

    let side_total = match tranche {
        Tranche::Fixed => vault.fixed_deposit_total,
        Tranche::Variable => vault.variable_deposit_total,
    };

    emit!(FundsDeposited {
        vault_id: vault.id,
        side: tranche,
        depositor: ctx.accounts.depositor.key(),
        amount,
        shares_minted,
        side_total,
    });

    let filled = match tranche {
        Tranche::Fixed => vault.is_fixed_filled(),
        Tranche::Variable => vault.is_variable_filled(),
    };
    if filled {
        emit!(TrancheFilled {
            vault_id: vault.id,
            side: tranche,
            capacity: side_total,
        });
    }

    // The deposit that fills the second side starts the term in the same
    // transaction
    let pool_state = StakingPool::load(&ctx.accounts.staking_pool)?;
    let staking_balance = pool_state.value_for_shares(vault.staking_shares)?;
    if vault.try_start(now, staking_balance)? {
        emit!(VaultStarted {
            vault_id: vault.id,
            started_at: vault.started_at,
            end_time: vault.end_time,
            fixed_shares_at_start: vault.fixed_shares_at_start,
            fixed_value_at_start: vault.fixed_value_at_start,
        });
    }

    Ok(())
}
