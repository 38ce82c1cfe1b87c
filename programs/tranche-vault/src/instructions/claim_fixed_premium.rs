use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::PremiumClaimed;
use crate::instructions::pay_from_native_vault;
use crate::state::{Position, Tranche, VaultState};

#[derive(Accounts)]
pub struct ClaimFixedPremium<'info> {
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
}

/// Converts a fixed position's claim shares into bearer shares and pays the
/// upfront premium out of the liquid premium pool. One-shot per position:
/// the claim share balance goes to zero here and is never minted again.
pub fn handler(ctx: Context<ClaimFixedPremium>) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;

    require!(vault.is_started(), VaultError::ClaimBeforeStart);
    // The unwind folds unclaimed premiums into the variable distribution
    require!(!vault.ended_snapshot_taken, VaultError::PremiumClaimClosed);
    require!(position.claim_shares > 0, VaultError::NoClaimTokens);

    let claim_shares = position.claim_shares;
    let premium = vault.premium_for(claim_shares)?;

    position.claim_shares = 0;
    position.bearer_shares = position
        .bearer_shares
        .checked_add(claim_shares)
        .ok_or(VaultError::Overflow)?;
    position.upfront_premium = premium;

    vault.fixed_claim_shares_total = vault
        .fixed_claim_shares_total
        .checked_sub(claim_shares)
        .ok_or(VaultError::Overflow)?;
    vault.fixed_bearer_shares_total = vault
        .fixed_bearer_shares_total
        .checked_add(claim_shares)
        .ok_or(VaultError::Overflow)?;
    vault.premium_pool = vault
        .premium_pool
        .checked_sub(premium)
        .ok_or(VaultError::InsufficientVaultBalance)?;

    pay_from_native_vault(
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.depositor.to_account_info(),
        premium,
    )?;

    emit!(PremiumClaimed {
        vault_id: vault.id,
        depositor: ctx.accounts.depositor.key(),
        claim_shares,
        premium,
        premium_pool_remaining: vault.premium_pool,
    });

    Ok(())
}
