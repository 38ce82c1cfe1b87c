use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;

/// Vault tranche selector
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Tranche {
    /// Principal-protected side, paid an upfront premium
    #[default]
    Fixed,
    /// Residual-yield side, absorbs first losses
    Variable,
}

impl Tranche {
    /// Closed two-variant selector; anything else is rejected
    pub fn try_from_u8(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(Tranche::Fixed),
            1 => Ok(Tranche::Variable),
            _ => Err(VaultError::InvalidTranche.into()),
        }
    }
}

/// Lifecycle phase, derived from capacity fill and wall clock (never stored)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum VaultPhase {
    /// Accepting deposits, neither side full
    #[default]
    NotStarted,
    /// Both capacities filled exactly, term running
    Started,
    /// Wall clock passed end_time (monotonic, read-time predicate)
    Ended,
}

/// Main vault state account - one per vault
#[account]
#[derive(Default)]
pub struct VaultState {
    // ============================================================
    // IDENTIFICATION
    // ============================================================

    /// Unique identifier for this vault
    pub id: u64,

    /// Creator's wallet address
    pub creator: Pubkey,

    // ============================================================
    // TERMS (immutable after creation)
    // ============================================================

    /// Term length in seconds, measured from the start transition
    pub duration: i64,

    /// Fixed side capacity in lamports; must fill exactly to start
    pub fixed_side_capacity: u64,

    /// Variable side capacity in lamports; must fill exactly to start
    pub variable_side_capacity: u64,

    /// Early exit fee in basis points (fixed tranche, mid-term exits)
    pub early_exit_fee_bps: u16,

    /// Protocol fee in basis points on realized variable-side yield
    pub protocol_fee_bps: u16,

    /// Receiver of accrued protocol fees
    pub protocol_fee_receiver: Pubkey,

    /// Minimum single deposit in lamports
    pub minimum_deposit: u64,

    /// Minimum fixed deposit as bps of fixed_side_capacity
    pub minimum_fixed_deposit_bps: u16,

    // ============================================================
    // LIFECYCLE
    // ============================================================

    /// Unix timestamp of the start transition (0 while NotStarted)
    pub started_at: i64,

    /// started_at + duration; set once at start, never changes
    pub end_time: i64,

    // ============================================================
    // FIXED TRANCHE LEDGER
    // ============================================================

    /// Native principal deposited and not yet withdrawn
    pub fixed_deposit_total: u64,

    /// Staking shares backing positions that have not claimed the premium
    pub fixed_claim_shares_total: u64,

    /// Staking shares backing claimed (bearer) positions
    pub fixed_bearer_shares_total: u64,

    /// Claim share total at the start transition (premium denominator)
    pub fixed_shares_at_start: u64,

    /// Staking balance at the start transition (fixed entitlement base)
    pub fixed_value_at_start: u64,

    // ============================================================
    // VARIABLE TRANCHE LEDGER
    // ============================================================

    /// Native deposited by variable depositors and not yet withdrawn
    pub variable_deposit_total: u64,

    /// Variable bearer shares outstanding (minted 1:1 with deposits)
    pub variable_bearer_shares_total: u64,

    /// Liquid lamports backing unclaimed upfront premiums
    pub premium_pool: u64,

    // ============================================================
    // ACCUMULATORS
    // ============================================================

    /// Early-exit payback + penalty collected and not yet distributed
    pub fee_earnings: u64,

    /// Protocol fee withheld and not yet collected by the receiver
    pub protocol_fee_accrued: u64,

    /// External staking shares currently owned by the vault
    pub staking_shares: u64,

    // ============================================================
    // VAULT-ENDED SNAPSHOT
    // ============================================================

    /// Set exactly once, by the first withdrawal after end_time
    pub ended_snapshot_taken: bool,

    /// Timestamp the unwind ran
    pub ended_at: i64,

    /// Staking balance requested from the queue at unwind
    pub ended_staking_balance: u64,

    /// Fixed tranche's frozen entitlement out of ended_staking_balance
    pub ended_fixed_entitlement: u64,

    /// Fixed shares outstanding (claim + bearer) at unwind
    pub ended_fixed_shares: u64,

    /// Variable bearer shares outstanding at unwind
    pub ended_variable_shares: u64,

    /// Fee earnings accumulated by unwind time (distribution numerator base)
    pub ended_fee_earnings_total: u64,

    /// Shared batch of queue request ids covering the whole unwind
    pub ended_request_ids: Vec<u64>,

    /// Whether the shared batch has been claimed and split into pools
    pub ended_requests_claimed: bool,

    /// Settled fixed-side pool (total / remaining to distribute)
    pub ended_fixed_pool_total: u64,
    pub ended_fixed_pool_remaining: u64,

    /// Settled variable-side pool, net of the protocol fee
    pub ended_variable_pool_total: u64,
    pub ended_variable_pool_remaining: u64,

    /// Premium pool folded in at unwind (unclaimed premiums)
    pub ended_premium_pool_total: u64,
    pub ended_premium_pool_remaining: u64,

    // ============================================================
    // PDA
    // ============================================================

    /// PDA bump seed
    pub bump: u8,

    /// Bump of the native (lamport) vault PDA
    pub native_vault_bump: u8,
}

/// Floor(a * b / d) over u128, erroring on overflow or a zero denominator
pub fn mul_div(a: u64, b: u64, d: u64) -> Result<u64> {
    if d == 0 {
        return Err(VaultError::Overflow.into());
    }
    let v = (a as u128)
        .checked_mul(b as u128)
        .ok_or(VaultError::Overflow)?
        / (d as u128);
    u64::try_from(v).map_err(|_| VaultError::Overflow.into())
}

impl VaultState {
    pub const LEN: usize = 8  // discriminator
        + 8   // id
        + 32  // creator
        + 8   // duration
        + 8   // fixed_side_capacity
        + 8   // variable_side_capacity
        + 2   // early_exit_fee_bps
        + 2   // protocol_fee_bps
        + 32  // protocol_fee_receiver
        + 8   // minimum_deposit
        + 2   // minimum_fixed_deposit_bps
        + 8   // started_at
        + 8   // end_time
        + 8   // fixed_deposit_total
        + 8   // fixed_claim_shares_total
        + 8   // fixed_bearer_shares_total
        + 8   // fixed_shares_at_start
        + 8   // fixed_value_at_start
        + 8   // variable_deposit_total
        + 8   // variable_bearer_shares_total
        + 8   // premium_pool
        + 8   // fee_earnings
        + 8   // protocol_fee_accrued
        + 8   // staking_shares
        + 1   // ended_snapshot_taken
        + 8   // ended_at
        + 8   // ended_staking_balance
        + 8   // ended_fixed_entitlement
        + 8   // ended_fixed_shares
        + 8   // ended_variable_shares
        + 8   // ended_fee_earnings_total
        + (4 + 8 * MAX_QUEUE_REQUESTS) // ended_request_ids
        + 1   // ended_requests_claimed
        + 8   // ended_fixed_pool_total
        + 8   // ended_fixed_pool_remaining
        + 8   // ended_variable_pool_total
        + 8   // ended_variable_pool_remaining
        + 8   // ended_premium_pool_total
        + 8   // ended_premium_pool_remaining
        + 1   // bump
        + 1   // native_vault_bump
        + 32; // padding for future expansion

    // ============================================================
    // LIFECYCLE
    // ============================================================

    pub fn is_started(&self) -> bool {
        self.started_at != 0
    }

    pub fn is_ended(&self, now: i64) -> bool {
        self.is_started() && now >= self.end_time
    }

    pub fn phase(&self, now: i64) -> VaultPhase {
        if !self.is_started() {
            VaultPhase::NotStarted
        } else if now >= self.end_time {
            VaultPhase::Ended
        } else {
            VaultPhase::Started
        }
    }

    pub fn is_fixed_filled(&self) -> bool {
        self.fixed_deposit_total == self.fixed_side_capacity
    }

    pub fn is_variable_filled(&self) -> bool {
        self.variable_deposit_total == self.variable_side_capacity
    }

    /// Start transition: runs the instant both capacities are exactly filled.
    /// Snapshots the claim-share total (premium denominator) and the staking
    /// balance (fixed entitlement base). Returns true if the vault started.
    pub fn try_start(&mut self, now: i64, staking_balance: u64) -> Result<bool> {
        if self.is_started() || !self.is_fixed_filled() || !self.is_variable_filled() {
            return Ok(false);
        }
        self.started_at = now;
        self.end_time = now
            .checked_add(self.duration)
            .ok_or(VaultError::Overflow)?;
        self.fixed_shares_at_start = self.fixed_claim_shares_total;
        self.fixed_value_at_start = staking_balance;
        Ok(true)
    }

    // ============================================================
    // DEPOSIT VALIDATION
    // ============================================================

    /// Smallest fixed deposit a vault accepts
    pub fn minimum_fixed_deposit(&self) -> Result<u64> {
        mul_div(
            self.fixed_side_capacity,
            self.minimum_fixed_deposit_bps as u64,
            BPS_100_PERCENT,
        )
    }

    pub fn validate_fixed_deposit(&self, amount: u64) -> Result<()> {
        require!(amount >= self.minimum_deposit, VaultError::BelowMinimumDeposit);
        let minimum_fixed = self.minimum_fixed_deposit()?;
        require!(amount >= minimum_fixed, VaultError::BelowMinimumFixedDeposit);
        let new_total = self
            .fixed_deposit_total
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        require!(new_total <= self.fixed_side_capacity, VaultError::CapacityExceeded);
        // Reject deposits that strand an unfillable dust remainder
        let remaining = self.fixed_side_capacity - new_total;
        require!(
            remaining == 0 || remaining >= minimum_fixed,
            VaultError::RemainingCapacityTooSmall
        );
        Ok(())
    }

    pub fn validate_variable_deposit(&self, amount: u64) -> Result<()> {
        require!(amount >= self.minimum_deposit, VaultError::BelowMinimumDeposit);
        let new_total = self
            .variable_deposit_total
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        require!(
            new_total <= self.variable_side_capacity,
            VaultError::CapacityExceeded
        );
        Ok(())
    }

    // ============================================================
    // FIXED ENTITLEMENT / PREMIUM
    // ============================================================

    pub fn fixed_shares_outstanding(&self) -> u64 {
        self.fixed_claim_shares_total + self.fixed_bearer_shares_total
    }

    /// Start-snapshot value still owed to outstanding fixed shares
    pub fn remaining_fixed_entitlement(&self) -> Result<u64> {
        if self.fixed_shares_at_start == 0 {
            return Ok(0);
        }
        mul_div(
            self.fixed_value_at_start,
            self.fixed_shares_outstanding(),
            self.fixed_shares_at_start,
        )
    }

    /// Upfront premium for a claim-share balance: the caller's pro-rata
    /// slice of the entire variable pool, fixed at start, never re-computed
    pub fn premium_for(&self, claim_shares: u64) -> Result<u64> {
        mul_div(
            self.variable_side_capacity,
            claim_shares,
            self.fixed_shares_at_start,
        )
    }

    /// Staking yield currently attributable to the variable tranche
    pub fn variable_yield(&self, staking_balance: u64) -> Result<u64> {
        Ok(staking_balance.saturating_sub(self.remaining_fixed_entitlement()?))
    }

    /// Mid-term variable exit entitlements for a bearer-share balance:
    /// (yield slice to queue, fee-earnings slice paid instantly), pro rata
    /// against the live share total. Both zero means the exit pays nothing
    /// and must be refused rather than burn the caller's shares.
    pub fn variable_exit_slices(&self, staking_balance: u64, shares: u64) -> Result<(u64, u64)> {
        let denom = self.variable_bearer_shares_total;
        let yield_slice = mul_div(self.variable_yield(staking_balance)?, shares, denom)?;
        let fee_slice = mul_div(self.fee_earnings, shares, denom)?.min(self.fee_earnings);
        Ok((yield_slice, fee_slice))
    }

    // ============================================================
    // FEE ENGINE
    // ============================================================

    /// Early-exit fee for a fixed depositor leaving mid-term.
    ///
    /// pay_back: the unearned remainder of the upfront premium
    /// penalty:  premium * (1 + early_exit_fee_bps) / 10000, scaled by the
    ///           remaining proportion of the term
    ///
    /// The sum decreases linearly to zero as the request time approaches
    /// end_time. Callers cap it at the settled payout.
    pub fn calculate_early_exit_fee(&self, premium: u64, requested_at: i64) -> Result<u64> {
        let duration = self.duration as u64;
        let remaining = self
            .end_time
            .saturating_sub(requested_at)
            .clamp(0, self.duration) as u64;
        let elapsed = duration - remaining;
        let earned = mul_div(premium, elapsed, duration)?;
        let pay_back = premium - earned;
        let penalty = mul_div(
            mul_div(premium, 1 + self.early_exit_fee_bps as u64, BPS_100_PERCENT)?,
            remaining,
            duration,
        )?;
        pay_back.checked_add(penalty).ok_or(VaultError::Overflow.into())
    }

    /// Protocol fee withheld from realized positive yield
    pub fn protocol_fee(&self, positive_yield: u64) -> Result<u64> {
        mul_div(positive_yield, self.protocol_fee_bps as u64, BPS_100_PERCENT)
    }

    // ============================================================
    // VAULT-ENDED SNAPSHOT
    // ============================================================

    /// One-time unwind snapshot. The staked balance is requested from the
    /// queue as a shared batch; every later end-phase settlement divides
    /// against these frozen totals. The unclaimed premium pool folds into
    /// the variable-side distribution since claiming closes here.
    pub fn take_ended_snapshot(&mut self, now: i64, staking_balance: u64) -> Result<()> {
        require!(!self.ended_snapshot_taken, VaultError::WithdrawalAlreadyInProgress);
        self.ended_snapshot_taken = true;
        self.ended_at = now;
        self.ended_staking_balance = staking_balance;
        self.ended_fixed_entitlement = self.remaining_fixed_entitlement()?.min(staking_balance);
        self.ended_fixed_shares = self.fixed_shares_outstanding();
        self.ended_variable_shares = self.variable_bearer_shares_total;
        self.ended_fee_earnings_total = self.fee_earnings;
        self.ended_premium_pool_total = self.premium_pool;
        self.ended_premium_pool_remaining = self.premium_pool;
        self.premium_pool = 0;
        Ok(())
    }

    /// Split the settled batch value into distribution pools. Losses during
    /// the unbonding delay hit the variable residual first; the protocol fee
    /// is withheld once from the variable residual (all of which is yield).
    pub fn settle_ended_batch(&mut self, settled_value: u64) -> Result<()> {
        let fixed_pool = self.ended_fixed_entitlement.min(settled_value);
        let residual = settled_value - fixed_pool;
        let fee = self.protocol_fee(residual)?;
        self.protocol_fee_accrued = self
            .protocol_fee_accrued
            .checked_add(fee)
            .ok_or(VaultError::Overflow)?;
        self.ended_fixed_pool_total = fixed_pool;
        self.ended_fixed_pool_remaining = fixed_pool;
        self.ended_variable_pool_total = residual - fee;
        self.ended_variable_pool_remaining = residual - fee;
        self.ended_requests_claimed = true;
        Ok(())
    }

    /// Fixed-side payout from the frozen snapshot, pro rata by shares burned
    /// at request time; capped by what is left so settlement order can never
    /// over-distribute
    pub fn ended_fixed_payout(&mut self, shares: u64) -> Result<u64> {
        if self.ended_fixed_shares == 0 {
            return Ok(0);
        }
        let amount = mul_div(self.ended_fixed_pool_total, shares, self.ended_fixed_shares)?
            .min(self.ended_fixed_pool_remaining);
        self.ended_fixed_pool_remaining -= amount;
        Ok(amount)
    }

    /// Variable-side payout: staking residual + fee-earnings slice + folded
    /// premium slice, each pro rata against the frozen share denominator
    pub fn ended_variable_payout(&mut self, shares: u64) -> Result<(u64, u64, u64)> {
        if self.ended_variable_shares == 0 {
            return Ok((0, 0, 0));
        }
        let yield_part = mul_div(self.ended_variable_pool_total, shares, self.ended_variable_shares)?
            .min(self.ended_variable_pool_remaining);
        self.ended_variable_pool_remaining -= yield_part;

        // fee earnings may still grow from ongoing-fixed finalizes that land
        // after the unwind; payouts are capped at what is actually left
        let fee_part = mul_div(self.ended_fee_earnings_total, shares, self.ended_variable_shares)?
            .min(self.fee_earnings);
        self.fee_earnings -= fee_part;

        let premium_part = mul_div(self.ended_premium_pool_total, shares, self.ended_variable_shares)?
            .min(self.ended_premium_pool_remaining);
        self.ended_premium_pool_remaining -= premium_part;

        Ok((yield_part, fee_part, premium_part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: u64 = LAMPORTS_PER_SOL;

    fn test_vault() -> VaultState {
        VaultState {
            id: 1,
            duration: 120,
            fixed_side_capacity: 1000 * SOL,
            variable_side_capacity: 30 * SOL,
            early_exit_fee_bps: 1000,
            protocol_fee_bps: 100,
            minimum_deposit: DEFAULT_MINIMUM_DEPOSIT,
            minimum_fixed_deposit_bps: 500,
            ..Default::default()
        }
    }

    fn started_vault(now: i64) -> VaultState {
        let mut v = test_vault();
        v.fixed_deposit_total = v.fixed_side_capacity;
        v.variable_deposit_total = v.variable_side_capacity;
        v.fixed_claim_shares_total = 1000 * SOL;
        v.variable_bearer_shares_total = 30 * SOL;
        v.premium_pool = 30 * SOL;
        v.staking_shares = 1000 * SOL;
        v.try_start(now, 1000 * SOL).unwrap();
        assert!(v.is_started());
        v
    }

    #[test]
    fn test_start_requires_both_sides_exactly_filled() {
        let mut v = test_vault();
        v.fixed_deposit_total = v.fixed_side_capacity;
        assert!(!v.try_start(100, 1000 * SOL).unwrap());
        assert_eq!(v.end_time, 0);

        v.variable_deposit_total = v.variable_side_capacity - 1;
        assert!(!v.try_start(100, 1000 * SOL).unwrap());

        v.variable_deposit_total = v.variable_side_capacity;
        v.fixed_claim_shares_total = 990 * SOL;
        assert!(v.try_start(100, 1001 * SOL).unwrap());
        assert_eq!(v.started_at, 100);
        assert_eq!(v.end_time, 220);
        assert_eq!(v.fixed_shares_at_start, 990 * SOL);
        assert_eq!(v.fixed_value_at_start, 1001 * SOL);

        // start is one-shot
        assert!(!v.try_start(200, 2000 * SOL).unwrap());
        assert_eq!(v.end_time, 220);
    }

    #[test]
    fn test_phase_derivation() {
        let mut v = test_vault();
        assert_eq!(v.phase(0), VaultPhase::NotStarted);
        v.started_at = 100;
        v.end_time = 220;
        assert_eq!(v.phase(219), VaultPhase::Started);
        assert_eq!(v.phase(220), VaultPhase::Ended);
        assert_eq!(v.phase(i64::MAX), VaultPhase::Ended);
    }

    #[test]
    fn test_fixed_deposit_validation() {
        let v = test_vault();
        // below global minimum
        assert!(v.validate_fixed_deposit(1).is_err());
        // below 5% of capacity
        assert!(v.validate_fixed_deposit(49 * SOL).is_err());
        // exactly the minimum fixed deposit is fine
        assert!(v.validate_fixed_deposit(50 * SOL).is_ok());
        // overshoot
        assert!(v.validate_fixed_deposit(1001 * SOL).is_err());
        // filling deposit may ignore the remainder rule
        assert!(v.validate_fixed_deposit(1000 * SOL).is_ok());
        // leaving a sub-minimum remainder is rejected
        assert!(v.validate_fixed_deposit(960 * SOL).is_err());
        // leaving exactly the minimum remainder is fine
        assert!(v.validate_fixed_deposit(950 * SOL).is_ok());
    }

    #[test]
    fn test_variable_deposit_validation() {
        let mut v = test_vault();
        v.variable_deposit_total = 29 * SOL;
        assert!(v.validate_variable_deposit(SOL).is_ok());
        assert!(v.validate_variable_deposit(SOL + 1).is_err());
        assert!(v.validate_variable_deposit(1).is_err());
    }

    #[test]
    fn test_premium_splits_pro_rata() {
        let v = started_vault(100);
        // two fixed depositors at 600/400 share a 30 premium 60/40
        let p600 = v.premium_for(600 * SOL).unwrap();
        let p400 = v.premium_for(400 * SOL).unwrap();
        assert_eq!(p600, 18 * SOL);
        assert_eq!(p400, 12 * SOL);
        assert_eq!(p600 + p400, v.variable_side_capacity);
    }

    #[test]
    fn test_early_exit_fee_immediate_exit_costs_full_premium_plus_penalty() {
        let v = started_vault(100);
        let premium = 30 * SOL;
        let fee = v.calculate_early_exit_fee(premium, 100).unwrap();
        // full payback + 10.01% scaled penalty
        let penalty = mul_div(premium, 1001, 10_000).unwrap();
        assert_eq!(fee, premium + penalty);
    }

    #[test]
    fn test_early_exit_fee_is_zero_at_end() {
        let v = started_vault(100);
        assert_eq!(v.calculate_early_exit_fee(30 * SOL, 220).unwrap(), 0);
        // requests can only be tagged while ongoing, but the math saturates
        assert_eq!(v.calculate_early_exit_fee(30 * SOL, 500).unwrap(), 0);
    }

    #[test]
    fn test_early_exit_fee_monotonically_non_increasing() {
        let v = started_vault(100);
        let premium = 30 * SOL;
        let mut last = u64::MAX;
        for t in (100..=220).step_by(10) {
            let fee = v.calculate_early_exit_fee(premium, t).unwrap();
            assert!(fee <= last, "fee increased at t={}", t);
            last = fee;
        }
    }

    #[test]
    fn test_remaining_fixed_entitlement_tracks_burns() {
        let mut v = started_vault(100);
        assert_eq!(v.remaining_fixed_entitlement().unwrap(), 1000 * SOL);
        // a 600-share exit leaves 40% of the start value owed
        v.fixed_claim_shares_total -= 600 * SOL;
        assert_eq!(v.remaining_fixed_entitlement().unwrap(), 400 * SOL);
    }

    #[test]
    fn test_variable_yield_is_residual_above_entitlement() {
        let v = started_vault(100);
        assert_eq!(v.variable_yield(1010 * SOL).unwrap(), 10 * SOL);
        // losses never produce negative yield
        assert_eq!(v.variable_yield(990 * SOL).unwrap(), 0);
    }

    #[test]
    fn test_variable_exit_slices_are_zero_until_something_accrues() {
        let mut v = started_vault(100);
        // no yield, no fee earnings: an exit would pay nothing
        assert_eq!(v.variable_exit_slices(1000 * SOL, 10 * SOL).unwrap(), (0, 0));

        // 10 SOL of yield and 3 SOL of early-exit fees, 10/30 share slice
        v.fee_earnings = 3 * SOL;
        let (yield_slice, fee_slice) = v.variable_exit_slices(1010 * SOL, 10 * SOL).unwrap();
        assert_eq!(yield_slice, 10 * SOL / 3);
        assert_eq!(fee_slice, SOL);

        // losses leave only the fee slice
        let (yield_slice, fee_slice) = v.variable_exit_slices(990 * SOL, 10 * SOL).unwrap();
        assert_eq!(yield_slice, 0);
        assert_eq!(fee_slice, SOL);
    }

    #[test]
    fn test_ended_snapshot_taken_once() {
        let mut v = started_vault(100);
        v.take_ended_snapshot(220, 1010 * SOL).unwrap();
        assert!(v.ended_snapshot_taken);
        assert_eq!(v.ended_fixed_entitlement, 1000 * SOL);
        assert_eq!(v.ended_fixed_shares, 1000 * SOL);
        assert_eq!(v.ended_variable_shares, 30 * SOL);
        // premium pool folds into the ended distribution
        assert_eq!(v.ended_premium_pool_total, 30 * SOL);
        assert_eq!(v.premium_pool, 0);
        assert!(v.take_ended_snapshot(221, 1010 * SOL).is_err());
    }

    #[test]
    fn test_ended_settlement_with_yield() {
        let mut v = started_vault(100);
        v.take_ended_snapshot(220, 1010 * SOL).unwrap();
        v.settle_ended_batch(1010 * SOL).unwrap();
        assert_eq!(v.ended_fixed_pool_total, 1000 * SOL);
        // 10 SOL residual, 1% protocol fee withheld
        let fee = mul_div(10 * SOL, 100, 10_000).unwrap();
        assert_eq!(v.protocol_fee_accrued, fee);
        assert_eq!(v.ended_variable_pool_total, 10 * SOL - fee);
    }

    #[test]
    fn test_ended_settlement_loss_hits_variable_first() {
        let mut v = started_vault(100);
        v.take_ended_snapshot(220, 1010 * SOL).unwrap();
        // 15 SOL realized loss during unbonding wipes the variable residual
        v.settle_ended_batch(995 * SOL).unwrap();
        assert_eq!(v.ended_fixed_pool_total, 995 * SOL);
        assert_eq!(v.ended_variable_pool_total, 0);
        assert_eq!(v.protocol_fee_accrued, 0);
    }

    #[test]
    fn test_ended_payouts_conserve_pools_regardless_of_order() {
        let mut v = started_vault(100);
        v.fee_earnings = 5 * SOL;
        v.take_ended_snapshot(220, 1010 * SOL).unwrap();
        v.settle_ended_batch(1010 * SOL).unwrap();

        // fixed: 600 then 400
        let a = v.ended_fixed_payout(600 * SOL).unwrap();
        let b = v.ended_fixed_payout(400 * SOL).unwrap();
        assert_eq!(a + b, v.ended_fixed_pool_total);
        assert_eq!(v.ended_fixed_pool_remaining, 0);

        // variable: 20 then 10 shares; each pot drains within rounding dust
        let (y1, f1, p1) = v.ended_variable_payout(20 * SOL).unwrap();
        let (y2, f2, p2) = v.ended_variable_payout(10 * SOL).unwrap();
        assert!(v.ended_variable_pool_total - (y1 + y2) <= 1);
        assert!(5 * SOL - (f1 + f2) <= 1);
        assert!(v.ended_premium_pool_total - (p1 + p2) <= 1);
    }

    #[test]
    fn test_protocol_fee_math() {
        let v = test_vault();
        assert_eq!(v.protocol_fee(10_000).unwrap(), 100);
        assert_eq!(v.protocol_fee(0).unwrap(), 0);
    }

    #[test]
    fn test_tranche_selector_is_closed() {
        assert_eq!(Tranche::try_from_u8(0).unwrap(), Tranche::Fixed);
        assert_eq!(Tranche::try_from_u8(1).unwrap(), Tranche::Variable);
        assert!(Tranche::try_from_u8(2).is_err());
    }
}
