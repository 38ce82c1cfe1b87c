use anchor_lang::prelude::*;

// ============================================================
// LAMPORTS
// ============================================================

/// SOL per lamport (1 SOL = 1_000_000_000 lamports)
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// 0.01 SOL in lamports
pub const POINT_ZERO_ONE_SOL: u64 = 10_000_000;

// ============================================================
// BASIS POINTS
// ============================================================

/// 100% in basis points (denominator for BPS calculations)
pub const BPS_100_PERCENT: u64 = 10_000;

/// Default protocol fee on realized variable-side yield (1% = 100 bps)
pub const DEFAULT_PROTOCOL_FEE_BPS: u16 = 100;

/// Default early exit fee for fixed depositors leaving mid-term (10% = 1000 bps)
pub const DEFAULT_EARLY_EXIT_FEE_BPS: u16 = 1000;

/// Default minimum fixed deposit, as bps of the fixed side capacity (5% = 500 bps)
pub const DEFAULT_MINIMUM_FIXED_DEPOSIT_BPS: u16 = 500;

// ============================================================
// PROTOCOL DEFAULTS
// ============================================================

/// Default minimum single deposit, either tranche (0.01 SOL)
pub const DEFAULT_MINIMUM_DEPOSIT: u64 = POINT_ZERO_ONE_SOL;

/// Upper bound on tracked queue request ids per withdrawal or unwind batch.
///
/// The largest batch is the ended unwind, which requests the whole staked
/// position at once. Creation caps combined capacity at
/// `max_request_value * MAX_QUEUE_REQUESTS / 2`, so the batch fits this
/// budget until staking yield more than doubles the position over the
/// term. Yield beyond that would make every post-end withdrawal fail
/// `TooManyWithdrawalRequests`; the creation bound is the guard.
pub const MAX_QUEUE_REQUESTS: usize = 16;

// ============================================================
// PDA SEEDS
// ============================================================

pub const PROTOCOL_CONFIG_SEED: &[u8] = b"protocol_config";
pub const VAULT_SEED: &[u8] = b"vault";
pub const POSITION_SEED: &[u8] = b"position";
pub const NATIVE_VAULT_SEED: &[u8] = b"native_vault";

// ============================================================
// EXTERNAL PROGRAM IDS
// ============================================================

/// External staking program (exchange-rate oracle + delayed withdrawal queue)
pub const STAKING_PROGRAM_ID: Pubkey = staking_program::ID;

pub mod staking_program {
    use anchor_lang::prelude::*;
    declare_id!("2JYW3snD6ez8JG9TnZP3eCM9oJbzum4fY5pMXXBry2Jr");
}
