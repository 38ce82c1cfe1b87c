use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::ProtocolInitialized;
use crate::state::ProtocolConfig;

#[derive(Accounts)]
pub struct InitializeProtocol<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = ProtocolConfig::LEN,
        seeds = [PROTOCOL_CONFIG_SEED],
        bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// CHECK: Receiver of protocol fees - must not be the zero address
    #[account(
        constraint = protocol_fee_receiver.key() != Pubkey::default() @ VaultError::InvalidParameters
    )]
    pub protocol_fee_receiver: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeProtocol>,
    protocol_fee_bps: u16,
    early_exit_fee_bps: u16,
) -> Result<()> {
    let protocol = &mut ctx.accounts.protocol_config;

    require!(!protocol.is_initialized, VaultError::AlreadyInitialized);
    require!(
        protocol_fee_bps as u64 <= BPS_100_PERCENT,
        VaultError::InvalidParameters
    );
    require!(
        early_exit_fee_bps as u64 <= BPS_100_PERCENT,
        VaultError::InvalidParameters
    );

    protocol.authority = ctx.accounts.authority.key();
    protocol.protocol_fee_receiver = ctx.accounts.protocol_fee_receiver.key();
    protocol.protocol_fee_bps = protocol_fee_bps;
    protocol.early_exit_fee_bps = early_exit_fee_bps;

    // Deposit limits start at the protocol defaults
    protocol.minimum_deposit = ProtocolConfig::default_minimum_deposit();
    protocol.minimum_fixed_deposit_bps = ProtocolConfig::default_minimum_fixed_deposit_bps();

    protocol.next_vault_id = 1;
    protocol.is_initialized = true;
    protocol.bump = ctx.bumps.protocol_config;

    emit!(ProtocolInitialized {
        authority: protocol.authority,
        protocol_fee_receiver: protocol.protocol_fee_receiver,
        protocol_fee_bps,
        early_exit_fee_bps,
    });

    Ok(())
}
