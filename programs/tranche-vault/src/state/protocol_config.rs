use anchor_lang::prelude::*;

use crate::constants::*;

/// Protocol-level configuration
/// Single PDA holding the fee parameters copied into every new vault
#[account]
#[derive(Default)]
pub struct ProtocolConfig {
    /// Protocol admin - can update fees and settings
    pub authority: Pubkey,

    /// Receiver of the protocol fee on realized variable-side yield
    pub protocol_fee_receiver: Pubkey,

    /// Protocol fee in basis points (applied to realized positive yield)
    pub protocol_fee_bps: u16,

    /// Early exit fee in basis points (fixed tranche, mid-term exits)
    pub early_exit_fee_bps: u16,

    /// Minimum single deposit in lamports, either tranche
    pub minimum_deposit: u64,

    /// Minimum fixed deposit as bps of a vault's fixed side capacity
    pub minimum_fixed_deposit_bps: u16,

    /// Id assigned to the next vault created
    pub next_vault_id: u64,

    /// Set once by initialize_protocol
    pub is_initialized: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl ProtocolConfig {
    pub const LEN: usize = 8  // discriminator
        + 32  // authority
        + 32  // protocol_fee_receiver
        + 2   // protocol_fee_bps
        + 2   // early_exit_fee_bps
        + 8   // minimum_deposit
        + 2   // minimum_fixed_deposit_bps
        + 8   // next_vault_id
        + 1   // is_initialized
        + 1   // bump
        + 32; // padding for future expansion

    pub fn default_protocol_fee_bps() -> u16 {
        DEFAULT_PROTOCOL_FEE_BPS
    }

    pub fn default_early_exit_fee_bps() -> u16 {
        DEFAULT_EARLY_EXIT_FEE_BPS
    }

    pub fn default_minimum_deposit() -> u64 {
        DEFAULT_MINIMUM_DEPOSIT
    }

    pub fn default_minimum_fixed_deposit_bps() -> u16 {
        DEFAULT_MINIMUM_FIXED_DEPOSIT_BPS
    }
}
