//! External Staking Program Instruction Data
//!
//! Each instruction is an 8-byte Anchor discriminator
//! (`sha256("global:<instruction_name>")[..8]`) followed by the serialized
//! arguments.

use anchor_lang::prelude::*;

/// Instruction discriminators for staking CPI calls
pub mod discriminators {
    /// deposit
    pub const DEPOSIT: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];

    /// request_withdrawal
    pub const REQUEST_WITHDRAWAL: [u8; 8] = [251, 85, 121, 205, 56, 201, 12, 177];

    /// claim_withdrawal
    pub const CLAIM_WITHDRAWAL: [u8; 8] = [118, 206, 173, 38, 239, 165, 65, 30];
}

/// Instruction data for `deposit`: stake native value, minting pool shares
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct DepositArgs {
    /// Native value to stake, in lamports
    pub amount: u64,
}

impl DepositArgs {
    pub fn to_instruction_data(&self) -> Vec<u8> {
        let mut data = discriminators::DEPOSIT.to_vec();
        data.extend(self.try_to_vec().unwrap());
        data
    }
}

/// Instruction data for `request_withdrawal`: enqueue a value-denominated
/// withdrawal (value must not exceed the queue's per-request cap)
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct RequestWithdrawalArgs {
    /// Native value to unbond, in lamports
    pub value: u64,
}

impl RequestWithdrawalArgs {
    pub fn to_instruction_data(&self) -> Vec<u8> {
        let mut data = discriminators::REQUEST_WITHDRAWAL.to_vec();
        data.extend(self.try_to_vec().unwrap());
        data
    }
}

/// Instruction data for `claim_withdrawal` (no arguments; the ticket
/// account identifies the request)
pub fn claim_withdrawal_instruction_data() -> Vec<u8> {
    discriminators::CLAIM_WITHDRAWAL.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_data_is_discriminator_then_le_args() {
        let data = DepositArgs { amount: 7 }.to_instruction_data();
        assert_eq!(data[..8], crate::staking::instructions::discriminators::DEPOSIT);
        assert_eq!(data[8..], 7u64.to_le_bytes());

        let data = RequestWithdrawalArgs { value: 9 }.to_instruction_data();
        assert_eq!(data[..8], discriminators::REQUEST_WITHDRAWAL);
        assert_eq!(data[8..], 9u64.to_le_bytes());

        assert_eq!(
            claim_withdrawal_instruction_data(),
            discriminators::CLAIM_WITHDRAWAL
        );
    }

    // account-layout discriminators stay addressable alongside this
    // module's instruction discriminators
    #[test]
    fn test_account_and_instruction_discriminators_are_distinct() {
        assert_ne!(
            crate::staking::accounts::discriminators::WITHDRAWAL_TICKET,
            discriminators::REQUEST_WITHDRAWAL
        );
    }
}
