//! Payment methods: which assets may pay for scans, and on what terms.

use std::collections::BTreeMap;

use blue_token::{Address, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// How an asset may be used to admit scan requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// The asset (token) this configuration applies to.
    pub asset: Address,
    /// Free-form label.
    pub description: String,
    /// Charged per scan in payment mode.
    pub pay_amount: Amount,
    /// Balance a requester must hold in holding mode.
    pub hold_amount: Amount,
    /// Set on every upsert; nothing clears it.
    pub active: bool,
    /// Time of the last upsert.
    pub updated_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Creates an active payment method stamped with the current time.
    #[must_use]
    pub fn new(
        asset: Address,
        description: impl Into<String>,
        pay_amount: Amount,
        hold_amount: Amount,
    ) -> Self {
        Self {
            asset,
            description: description.into(),
            pay_amount,
            hold_amount,
            active: true,
            updated_at: Utc::now(),
        }
    }
}

/// Payment method table keyed by asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMethods {
    methods: BTreeMap<Address, PaymentMethod>,
}

impl PaymentMethods {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or fully replaces the entry for `method.asset`.
    ///
    /// Returns the previous configuration, if any.
    pub fn upsert(&mut self, method: PaymentMethod) -> Option<PaymentMethod> {
        self.methods.insert(method.asset.clone(), method)
    }

    /// Gets the configuration for an asset.
    #[must_use]
    pub fn get(&self, asset: &Address) -> Option<&PaymentMethod> {
        self.methods.get(asset)
    }

    /// Gets the configuration for an asset, provided it is active.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotRegistered`] if the asset is unknown or inactive.
    pub fn active(&self, asset: &Address) -> Result<&PaymentMethod> {
        self.methods
            .get(asset)
            .filter(|m| m.active)
            .ok_or_else(|| ScanError::not_registered(asset))
    }

    /// All configured methods in asset order.
    #[must_use]
    pub fn list(&self) -> Vec<PaymentMethod> {
        self.methods.values().cloned().collect()
    }

    /// Number of configured assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true if no asset is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
