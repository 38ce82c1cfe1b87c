use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::ProtocolFeeCollected;
use crate::instructions::pay_from_native_vault;
use crate::state::VaultState;

#[derive(Accounts)]
pub struct CollectProtocolFees<'info> {
    #[account(
        mut,
        address = vault.protocol_fee_receiver @ VaultError::UnauthorizedFeeReceiver
    )]
    pub protocol_fee_receiver: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, &vault.id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, VaultState>,

    /// CHECK: PDA that holds SOL
    #[account(
        mut,
        seeds = [NATIVE_VAULT_SEED, vault.key().as_ref()],
        bump = vault.native_vault_bump
    )]
    pub native_vault: SystemAccount<'info>,
}

/// Sweep the protocol fees a vault has withheld so far. Callable any number
/// of times; pays whatever has accrued since the last sweep.
pub fn handler(ctx: Context<CollectProtocolFees>) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    let amount = vault.protocol_fee_accrued;
    vault.protocol_fee_accrued = 0;

    pay_from_native_vault(
        &ctx.accounts.native_vault.to_account_info(),
        &ctx.accounts.protocol_fee_receiver.to_account_info(),
        amount,
    )?;

    emit!(ProtocolFeeCollected {
        vault_id: vault.id,
        receiver: ctx.accounts.protocol_fee_receiver.key(),
        amount,
    });

    Ok(())
}
