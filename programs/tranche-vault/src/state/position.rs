use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;

/// Lifecycle phase a withdrawal request was made in. A request keeps this
/// tag forever: it resolves through its own finalize entrypoint with its
/// original fee treatment even if the vault has since started or ended.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum RequestPhase {
    /// No request outstanding
    #[default]
    Idle,
    /// Requested before the vault started (fixed principal return, no fee)
    NotStarted,
    /// Requested mid-term (fixed: early-exit fee; variable: yield exit)
    Ongoing,
    /// Requested after end_time, settles against the frozen unwind snapshot
    Ended,
}

/// The two-phase (request -> finalize) withdrawal record embedded in a
/// position. At most one may be outstanding per (owner, tranche).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug)]
pub struct PendingWithdrawal {
    /// Phase at request time
    pub phase: RequestPhase,

    /// Queue request ids owned by this request (empty for ended-phase
    /// requests, which settle against the shared unwind batch)
    pub request_ids: Vec<u64>,

    /// Request timestamp; drives the time-scaled early exit fee
    pub requested_at: i64,

    /// Value requested from the queue (settlement may differ)
    pub requested_value: u64,

    /// Shares burned at request time (snapshot numerator at settlement)
    pub shares: u64,
}

impl PendingWithdrawal {
    pub const LEN: usize = 1                          // phase
        + (4 + 8 * MAX_QUEUE_REQUESTS)                // request_ids
        + 8                                           // requested_at
        + 8                                           // requested_value
        + 8; // shares
}

/// Per (vault, owner, tranche) ledger record. Never deleted; balances go
/// to zero.
#[account]
#[derive(Default)]
pub struct Position {
    /// The vault this position belongs to
    pub vault: Pubkey,

    /// The depositor's wallet address
    pub owner: Pubkey,

    /// Tranche selector (Tranche as u8, part of the PDA seeds)
    pub side: u8,

    /// Native principal deposited and not yet withdrawn
    pub deposited: u64,

    /// Fixed claim shares: minted at deposit, converted 1:1 to bearer
    /// shares exactly once at claim_fixed_premium
    pub claim_shares: u64,

    /// Bearer shares (fixed: converted claim shares; variable: 1:1 with
    /// the native deposit). Burned at withdrawal request.
    pub bearer_shares: u64,

    /// Upfront premium paid at claim; recorded once for the fee engine
    pub upfront_premium: u64,

    /// Outstanding two-phase withdrawal, if any
    pub pending: PendingWithdrawal,

    /// PDA bump seed
    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8  // discriminator
        + 32  // vault
        + 32  // owner
        + 1   // side
        + 8   // deposited
        + 8   // claim_shares
        + 8   // bearer_shares
        + 8   // upfront_premium
        + PendingWithdrawal::LEN
        + 1   // bump
        + 16; // padding

    pub fn has_pending(&self) -> bool {
        self.pending.phase != RequestPhase::Idle
    }

    /// Record a new withdrawal request. Fails while an earlier request is
    /// outstanding so an entitlement can never be claimed twice.
    pub fn begin_request(
        &mut self,
        phase: RequestPhase,
        request_ids: Vec<u64>,
        requested_at: i64,
        requested_value: u64,
        shares: u64,
    ) -> Result<()> {
        require!(!self.has_pending(), VaultError::WithdrawalAlreadyRequested);
        require!(
            request_ids.len() <= MAX_QUEUE_REQUESTS,
            VaultError::TooManyWithdrawalRequests
        );
        self.pending = PendingWithdrawal {
            phase,
            request_ids,
            requested_at,
            requested_value,
            shares,
        };
        Ok(())
    }

    /// Gate a finalize entrypoint to the matching request phase.
    /// No pending record -> WithdrawalNotRequested (also the idempotence
    /// guard: a second finalize of a cleared request lands here).
    /// A pending record from a different phase -> WithdrawalAlreadyInProgress.
    pub fn ensure_finalizable(&self, phase: RequestPhase) -> Result<()> {
        require!(self.has_pending(), VaultError::WithdrawalNotRequested);
        require!(
            self.pending.phase == phase,
            VaultError::WithdrawalAlreadyInProgress
        );
        Ok(())
    }

    /// Clear the pending record; must run before any value transfer
    pub fn clear_pending(&mut self) {
        self.pending = PendingWithdrawal::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_most_one_outstanding_request() {
        let mut p = Position::default();
        p.begin_request(RequestPhase::Ongoing, vec![7], 100, 500, 500)
            .unwrap();
        let err = p
            .begin_request(RequestPhase::Ended, vec![], 220, 0, 0)
            .unwrap_err();
        assert_eq!(err, VaultError::WithdrawalAlreadyRequested.into());
    }

    #[test]
    fn test_finalize_routing_by_phase() {
        let mut p = Position::default();
        // nothing requested
        assert_eq!(
            p.ensure_finalizable(RequestPhase::Ongoing).unwrap_err(),
            VaultError::WithdrawalNotRequested.into()
        );

        p.begin_request(RequestPhase::NotStarted, vec![1, 2], 50, 900, 900)
            .unwrap();
        // a pre-start request must resolve through its own entrypoint even
        // after the vault has since started
        assert_eq!(
            p.ensure_finalizable(RequestPhase::Ongoing).unwrap_err(),
            VaultError::WithdrawalAlreadyInProgress.into()
        );
        assert!(p.ensure_finalizable(RequestPhase::NotStarted).is_ok());
    }

    #[test]
    fn test_finalize_is_idempotent_safe() {
        let mut p = Position::default();
        p.begin_request(RequestPhase::Ongoing, vec![3], 100, 42, 42)
            .unwrap();
        p.ensure_finalizable(RequestPhase::Ongoing).unwrap();
        p.clear_pending();
        assert_eq!(
            p.ensure_finalizable(RequestPhase::Ongoing).unwrap_err(),
            VaultError::WithdrawalNotRequested.into()
        );
    }

    #[test]
    fn test_request_id_budget_enforced() {
        let mut p = Position::default();
        let ids = vec![0u64; MAX_QUEUE_REQUESTS + 1];
        let err = p
            .begin_request(RequestPhase::Ongoing, ids, 100, 1, 1)
            .unwrap_err();
        assert_eq!(err, VaultError::TooManyWithdrawalRequests.into());
    }
}
