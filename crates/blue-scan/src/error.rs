//! Error types for blue-scan.

use blue_token::{Address, Amount, LedgerError};
use thiserror::Error;

use crate::access::Role;
use crate::job::{JobId, JobStatus};

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that can occur in marketplace operations.
///
/// A failed operation never leaves a partial mutation behind and never
/// publishes an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Caller lacks the role the operation requires.
    #[error("unauthorized: {caller} is not {required}")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
        /// Role the operation requires.
        required: Role,
    },

    /// Asset has no active payment method.
    #[error("payment method not registered: {asset}")]
    NotRegistered {
        /// The asset that was looked up.
        asset: Address,
    },

    /// Allowance granted to the marketplace is below the pay amount.
    #[error("insufficient approval: required {required}, approved {approved}")]
    InsufficientApproval {
        /// Pay amount of the payment method.
        required: Amount,
        /// Allowance the requester granted.
        approved: Amount,
    },

    /// Requester balance is below the hold amount.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Hold amount of the payment method.
        required: Amount,
        /// Requester's current balance.
        available: Amount,
    },

    /// Dequeue attempted with no pending jobs.
    #[error("no scan job available")]
    NoJobAvailable,

    /// Job is not in the status the operation requires.
    #[error("invalid state: job {job} is {status}")]
    InvalidState {
        /// The job.
        job: JobId,
        /// Its current status.
        status: JobStatus,
    },

    /// Result submitted by a worker that does not hold the job.
    #[error("job {job} is not assigned to {caller}")]
    JobNotAssignedToCaller {
        /// The job.
        job: JobId,
        /// The submitting worker.
        caller: Address,
    },

    /// Unknown job id.
    #[error("job not found: {job}")]
    JobNotFound {
        /// The job id that was looked up.
        job: JobId,
    },

    /// Rejected argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The asset ledger refused the operation.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl ScanError {
    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(caller: &Address, required: Role) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            required,
        }
    }

    /// Create a not registered error.
    #[must_use]
    pub fn not_registered(asset: &Address) -> Self {
        Self::NotRegistered {
            asset: asset.clone(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
