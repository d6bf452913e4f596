//! Error types for ledger operations.

use thiserror::Error;

use crate::amount::Amount;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operations.
///
/// Every failing operation leaves balances and allowances untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Invalid address format.
    #[error("invalid address: {message}")]
    InvalidAddress {
        /// Description of the address error.
        message: String,
    },

    /// Holder balance below the requested amount.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// Current balance.
        have: Amount,
        /// Required balance.
        need: Amount,
    },

    /// Spender allowance below the requested amount.
    #[error("insufficient allowance: approved {approved}, need {need}")]
    InsufficientAllowance {
        /// Amount the holder approved for the spender.
        approved: Amount,
        /// Required allowance.
        need: Amount,
    },

    /// Invalid amount (overflow).
    #[error("invalid amount: {message}")]
    InvalidAmount {
        /// Description of the amount error.
        message: String,
    },
}

impl LedgerError {
    /// Create an invalid address error.
    #[must_use]
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    /// Create an insufficient balance error.
    #[must_use]
    pub const fn insufficient_balance(have: Amount, need: Amount) -> Self {
        Self::InsufficientBalance { have, need }
    }

    /// Create an insufficient allowance error.
    #[must_use]
    pub const fn insufficient_allowance(approved: Amount, need: Amount) -> Self {
        Self::InsufficientAllowance { approved, need }
    }

    /// Create an invalid amount error.
    #[must_use]
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }
}
