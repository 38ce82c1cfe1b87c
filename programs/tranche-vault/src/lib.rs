use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod staking;
pub mod state;

use instructions::*;

declare_id!("7xFH8yGpJk4BubhFb1WsdCpL7Vjz9dkPxsF4aKug6iHk");

#[program]
pub mod tranche_vault {
    use super::*;

    // ============ Protocol Initialization ============

    /// Initialize the protocol config (one-time setup)
    pub fn initialize_protocol(
        ctx: Context<InitializeProtocol>,
        protocol_fee_bps: u16,
        early_exit_fee_bps: u16,
    ) -> Result<()> {
        instructions::initialize_protocol::handler(ctx, protocol_fee_bps, early_exit_fee_bps)
    }

    // ============ Vault Lifecycle ============

    /// Create a new fixed/variable vault with frozen terms
    pub fn create_vault(
        ctx: Context<CreateVault>,
        fixed_side_capacity: u64,
        duration: i64,
        variable_side_capacity: u64,
    ) -> Result<()> {
        instructions::create_vault::handler(ctx, fixed_side_capacity, duration, variable_side_capacity)
    }

    /// Deposit SOL into a tranche before the vault starts
    pub fn deposit(ctx: Context<Deposit>, side: u8, amount: u64) -> Result<()> {
        instructions::deposit::handler(ctx, side, amount)
    }

    /// Convert fixed claim shares to bearer shares and collect the premium
    pub fn claim_fixed_premium(ctx: Context<ClaimFixedPremium>) -> Result<()> {
        instructions::claim_fixed_premium::handler(ctx)
    }

    // ============ Withdrawals ============

    /// Request a withdrawal; treatment depends on the vault's current phase
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        side: u8,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, side)
    }

    /// Settle a fixed exit requested before the vault started
    pub fn finalize_not_started_fixed<'info>(
        ctx: Context<'_, '_, 'info, 'info, FinalizeFixed<'info>>,
    ) -> Result<()> {
        instructions::finalize_withdrawals::finalize_not_started_fixed_handler(ctx)
    }

    /// Settle a mid-term fixed exit, assessing the early-exit fee
    pub fn finalize_ongoing_fixed<'info>(
        ctx: Context<'_, '_, 'info, 'info, FinalizeFixed<'info>>,
    ) -> Result<()> {
        instructions::finalize_withdrawals::finalize_ongoing_fixed_handler(ctx)
    }

    /// Settle a mid-term variable yield exit
    pub fn finalize_ongoing_variable<'info>(
        ctx: Context<'_, '_, 'info, 'info, FinalizeVariable<'info>>,
    ) -> Result<()> {
        instructions::finalize_withdrawals::finalize_ongoing_variable_handler(ctx)
    }

    /// Settle an end-phase request against the unwind snapshot
    pub fn finalize_ended<'info>(
        ctx: Context<'_, '_, 'info, 'info, FinalizeEnded<'info>>,
        side: u8,
    ) -> Result<()> {
        instructions::finalize_withdrawals::finalize_ended_handler(ctx, side)
    }

    // ============ Fee Management ============

    /// Sweep accrued protocol fees to the configured receiver
    pub fn collect_protocol_fees(ctx: Context<CollectProtocolFees>) -> Result<()> {
        instructions::collect_protocol_fees::handler(ctx)
    }

    // ============ Admin Functions ============

    /// Update protocol-wide default parameters
    pub fn update_protocol_config(
        ctx: Context<UpdateProtocolConfig>,
        new_protocol_fee_bps: Option<u16>,
        new_early_exit_fee_bps: Option<u16>,
        new_minimum_deposit: Option<u64>,
        new_minimum_fixed_deposit_bps: Option<u16>,
    ) -> Result<()> {
        instructions::admin::update_protocol_config_handler(
            ctx,
            new_protocol_fee_bps,
            new_early_exit_fee_bps,
            new_minimum_deposit,
            new_minimum_fixed_deposit_bps,
        )
    }

    /// Transfer protocol authority
    pub fn transfer_authority(ctx: Context<TransferAuthority>) -> Result<()> {
        instructions::admin::transfer_authority_handler(ctx)
    }
}
