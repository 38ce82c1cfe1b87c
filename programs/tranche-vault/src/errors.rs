use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    // ============================================================
    // INITIALIZATION ERRORS
    // ============================================================

    #[msg("Protocol config has already been initialized")]
    AlreadyInitialized,

    #[msg("Protocol config has not been initialized")]
    NotInitialized,

    #[msg("Invalid vault parameters (zero/oversized fee bps, zero capacity, duration or receiver)")]
    InvalidParameters,

    // ============================================================
    // DEPOSIT ERRORS
    // ============================================================

    #[msg("Deposit would exceed the tranche capacity")]
    CapacityExceeded,

    #[msg("Deposit amount below the minimum deposit")]
    BelowMinimumDeposit,

    #[msg("Fixed deposit below the minimum fixed deposit")]
    BelowMinimumFixedDeposit,

    #[msg("Deposit would leave the remaining fixed capacity below the minimum fixed deposit")]
    RemainingCapacityTooSmall,

    #[msg("Deposits are closed once the vault has started")]
    DepositsClosed,

    // ============================================================
    // TRANCHE / CLAIM ERRORS
    // ============================================================

    #[msg("Tranche selector out of range")]
    InvalidTranche,

    #[msg("Caller holds no bearer shares for this tranche")]
    NoBearerTokens,

    #[msg("Caller holds no fixed claim shares")]
    NoClaimTokens,

    #[msg("Premium cannot be claimed before the vault has started")]
    ClaimBeforeStart,

    #[msg("Premium claims are closed once the vault-ended unwind has run")]
    PremiumClaimClosed,

    // ============================================================
    // WITHDRAWAL ERRORS
    // ============================================================

    #[msg("A withdrawal is already requested for this owner and tranche")]
    WithdrawalAlreadyRequested,

    #[msg("No matching withdrawal request for this owner and tranche")]
    WithdrawalNotRequested,

    #[msg("The external queue has not finalized the withdrawal yet")]
    WithdrawalNotFinalizedYet,

    #[msg("A withdrawal from an earlier lifecycle phase is still outstanding")]
    WithdrawalAlreadyInProgress,

    #[msg("Withdrawal would need more queue requests than a position can track")]
    TooManyWithdrawalRequests,

    #[msg("No yield or fee earnings have accrued to this position yet")]
    NothingToWithdraw,

    // ============================================================
    // FEE / AUTHORITY ERRORS
    // ============================================================

    #[msg("Signer is not the protocol fee receiver")]
    UnauthorizedFeeReceiver,

    #[msg("Signer is not authorized")]
    Unauthorized,

    // ============================================================
    // ACCOUNTING ERRORS
    // ============================================================

    #[msg("Native balance changed by an amount the ledger does not account for")]
    UnexpectedDirectTransfer,

    #[msg("Vault native balance is lower than the tracked liabilities")]
    InsufficientVaultBalance,

    #[msg("External staking account failed validation")]
    InvalidStakingAccount,

    #[msg("Arithmetic overflow")]
    Overflow,
}
