use anchor_lang::prelude::*;

use crate::errors::VaultError;

pub mod admin;
pub mod claim_fixed_premium;
pub mod collect_protocol_fees;
pub mod create_vault;
pub mod deposit;
pub mod finalize_withdrawals;
pub mod initialize_protocol;
pub mod withdraw;

// Context structs must be in scope for the #[program] macro; the `handler`
// name collides across modules but lib.rs always routes through fully
// qualified paths
#[allow(ambiguous_glob_reexports)]
pub use admin::*;
pub use claim_fixed_premium::*;
pub use collect_protocol_fees::*;
pub use create_vault::*;
pub use deposit::*;
pub use finalize_withdrawals::*;
pub use initialize_protocol::*;
pub use withdraw::*;

/// Pay lamports out of a vault's native PDA, keeping it rent exempt.
/// Ledger state must be updated before calling this.
pub(crate) fn pay_from_native_vault<'info>(
    native_vault: &AccountInfo<'info>,
    recipient: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let rent = Rent::get()?;
    let min_rent = rent.minimum_balance(0);
    let available = native_vault.lamports().saturating_sub(min_rent);
    require!(available >= amount, VaultError::InsufficientVaultBalance);

    let vault_current = native_vault.lamports();
    let recipient_current = recipient.lamports();

    **native_vault.try_borrow_mut_lamports()? = vault_current
        .checked_sub(amount)
        .ok_or(VaultError::InsufficientVaultBalance)?;
    **recipient.try_borrow_mut_lamports()? = recipient_current
        .checked_add(amount)
        .ok_or(VaultError::Overflow)?;

    Ok(())
}
