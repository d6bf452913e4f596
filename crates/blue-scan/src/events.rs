//! Notifications published after a state change commits.

use blue_token::Address;
use serde::{Deserialize, Serialize};

use crate::job::{JobId, ScanMode};
use crate::payment::PaymentMethod;

/// Marketplace event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// A payment method was created or replaced.
    PaymentMethodUpdated {
        /// The configured asset.
        payment_method_address: Address,
        /// The new configuration.
        method: PaymentMethod,
    },
    /// A scan request was admitted.
    ScanRequested {
        /// The new job.
        job: JobId,
        /// The address to scan.
        address_to_scan: Address,
        /// Who asked for the scan.
        requester: Address,
        /// Admission mode.
        mode: ScanMode,
    },
    /// A worker submitted a result.
    ScanResultSubmitted {
        /// The completed job.
        job: JobId,
        /// The scanned address.
        address_scanned: Address,
        /// The submitting worker.
        worker: Address,
    },
}

impl RegistryEvent {
    /// Short event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PaymentMethodUpdated { .. } => "PaymentMethodUpdated",
            Self::ScanRequested { .. } => "ScanRequested",
            Self::ScanResultSubmitted { .. } => "ScanResultSubmitted",
        }
    }
}
