//! External Staking Protocol Integration Module
//!
//! The vault treats the staking protocol as two opaque collaborators:
//!
//! - an **exchange-rate oracle** (the pool account converts between staking
//!   shares and native value; the rate may rise with yield or fall with
//!   losses), and
//! - a **delayed withdrawal queue** (value-denominated requests capped per
//!   request, settled after an unbonding delay for a possibly different
//!   final value).
//!
//! ## Key Components
//!
//! - **accounts**: layouts for deserializing the staking program's accounts
//! - **instructions**: instruction data builders for staking CPI calls
//! - **cpi**: high-level CPI helper functions
//!
//! ## Supported Operations
//!
//! - `deposit` - stake native value, minting pool shares to the staker
//! - `request_withdrawal` - enqueue a value-denominated withdrawal
//! - `claim_withdrawal` - pay out a finalized queue ticket

pub mod accounts;
pub mod cpi;
pub mod instructions;

// accounts and instructions each have their own `discriminators` module;
// re-export by name so neither shadows the other
pub use accounts::{StakingPool, WithdrawalQueue, WithdrawalTicket};
pub use cpi::{
    claim_withdrawal, request_withdrawals, split_request_value, stake,
    ClaimWithdrawalAccounts, RequestWithdrawalAccounts, StakeAccounts,
};
pub use instructions::{claim_withdrawal_instruction_data, DepositArgs, RequestWithdrawalArgs};

use anchor_lang::prelude::*;

/// External staking program ID
pub const STAKING_PROGRAM_ID: Pubkey = crate::constants::staking_program::ID;
