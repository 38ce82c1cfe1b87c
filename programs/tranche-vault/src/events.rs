use anchor_lang::prelude::*;
use crate::state::{RequestPhase, Tranche};

// ============================================================
// PROTOCOL EVENTS
// ============================================================

#[event]
pub struct ProtocolInitialized {
    pub authority: Pubkey,
    pub protocol_fee_receiver: Pubkey,
    pub protocol_fee_bps: u16,
    pub early_exit_fee_bps: u16,
}

#[event]
pub struct ProtocolConfigUpdated {
    pub protocol_fee_bps: u16,
    pub early_exit_fee_bps: u16,
    pub protocol_fee_receiver: Pubkey,
    pub minimum_deposit: u64,
    pub minimum_fixed_deposit_bps: u16,
}

// ============================================================
// VAULT LIFECYCLE EVENTS
// ============================================================

#[event]
pub struct VaultCreated {
    pub vault_id: u64,
    pub creator: Pubkey,
    pub duration: i64,
    pub fixed_side_capacity: u64,
    pub variable_side_capacity: u64,
    pub early_exit_fee_bps: u16,
    pub protocol_fee_bps: u16,
    pub protocol_fee_receiver: Pubkey,
}

#[event]
pub struct TrancheFilled {
    pub vault_id: u64,
    pub side: Tranche,
    pub capacity: u64,
}

#[event]
pub struct VaultStarted {
    pub vault_id: u64,
    pub started_at: i64,
    pub end_time: i64,
    pub fixed_shares_at_start: u64,
    pub fixed_value_at_start: u64,
}

/// Emitted when the first post-end withdrawal unwinds the staked position
#[event]
pub struct VaultEnded {
    pub vault_id: u64,
    pub ended_at: i64,
    pub staking_balance: u64,
    pub fixed_entitlement: u64,
    pub fixed_shares: u64,
    pub variable_shares: u64,
    pub request_ids: Vec<u64>,
}

// ============================================================
// DEPOSIT / PREMIUM EVENTS
// ============================================================

#[event]
pub struct FundsDeposited {
    pub vault_id: u64,
    pub side: Tranche,
    pub depositor: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
    pub side_total: u64,
}

#[event]
pub struct PremiumClaimed {
    pub vault_id: u64,
    pub depositor: Pubkey,
    pub claim_shares: u64,
    pub premium: u64,
    pub premium_pool_remaining: u64,
}

// ============================================================
// WITHDRAWAL EVENTS
// ============================================================

#[event]
pub struct WithdrawalRequested {
    pub vault_id: u64,
    pub side: Tranche,
    pub owner: Pubkey,
    pub phase: RequestPhase,
    pub shares_burned: u64,
    pub value_requested: u64,
    pub request_ids: Vec<u64>,
    pub requested_at: i64,
}

#[event]
pub struct WithdrawalFinalized {
    pub vault_id: u64,
    pub side: Tranche,
    pub owner: Pubkey,
    pub phase: RequestPhase,
    pub settled_value: u64,
    pub early_exit_fee: u64,
    pub protocol_fee: u64,
    pub amount_paid: u64,
}

/// Immediate (non-queued) payouts: variable pre-start refunds and
/// fee-earnings slices paid at request time
#[event]
pub struct FundsWithdrawn {
    pub vault_id: u64,
    pub side: Tranche,
    pub owner: Pubkey,
    pub amount: u64,
}

#[event]
pub struct ProtocolFeeCollected {
    pub vault_id: u64,
    pub receiver: Pubkey,
    pub amount: u64,
}
