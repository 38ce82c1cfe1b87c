use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::ProtocolConfigUpdated;
use crate::state::ProtocolConfig;

/// Update protocol-level fee parameters
/// Only callable by the protocol authority; applies to vaults created later
#[derive(Accounts)]
pub struct UpdateProtocolConfig<'info> {
    #[account(
        address = protocol_config.authority @ VaultError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// CHECK: New protocol fee receiver, if changing
    pub new_protocol_fee_receiver: Option<UncheckedAccount<'info>>,
}

pub fn update_protocol_config_handler(
    ctx: Context<UpdateProtocolConfig>,
    new_protocol_fee_bps: Option<u16>,
    new_early_exit_fee_bps: Option<u16>,
    new_minimum_deposit: Option<u64>,
    new_minimum_fixed_deposit_bps: Option<u16>,
) -> Result<()> {
    let protocol = &mut ctx.accounts.protocol_config;
    require!(protocol.is_initialized, VaultError::NotInitialized);

    if let Some(bps) = new_protocol_fee_bps {
        require!(bps as u64 <= BPS_100_PERCENT, VaultError::InvalidParameters);
        protocol.protocol_fee_bps = bps;
    }

    if let Some(bps) = new_early_exit_fee_bps {
        require!(bps as u64 <= BPS_100_PERCENT, VaultError::InvalidParameters);
        protocol.early_exit_fee_bps = bps;
    }

    if let Some(min) = new_minimum_deposit {
        require!(min > 0, VaultError::InvalidParameters);
        protocol.minimum_deposit = min;
    }

    if let Some(bps) = new_minimum_fixed_deposit_bps {
        require!(bps as u64 <= BPS_100_PERCENT, VaultError::InvalidParameters);
        protocol.minimum_fixed_deposit_bps = bps;
    }

    if let Some(receiver) = &ctx.accounts.new_protocol_fee_receiver {
        require!(
            receiver.key() != Pubkey::default(),
            VaultError::InvalidParameters
        );
        protocol.protocol_fee_receiver = receiver.key();
    }

    emit!(ProtocolConfigUpdated {
        protocol_fee_bps: protocol.protocol_fee_bps,
        early_exit_fee_bps: protocol.early_exit_fee_bps,
        protocol_fee_receiver: protocol.protocol_fee_receiver,
        minimum_deposit: protocol.minimum_deposit,
        minimum_fixed_deposit_bps: protocol.minimum_fixed_deposit_bps,
    });

    Ok(())
}

/// Transfer protocol authority to a new address
#[derive(Accounts)]
pub struct TransferAuthority<'info> {
    #[account(
        address = protocol_config.authority @ VaultError::Unauthorized
    )]
    pub authority: Signer<'info>,

    /// CHECK: New authority address
    #[account(
        constraint = new_authority.key() != Pubkey::default() @ VaultError::InvalidParameters
    )]
    pub new_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [PROTOCOL_CONFIG_SEED],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,
}

pub fn transfer_authority_handler(ctx: Context<TransferAuthority>) -> Result<()> {
    let protocol = &mut ctx.accounts.protocol_config;
    protocol.authority = ctx.accounts.new_authority.key();
    Ok(())
}
