//! Token amount representation.
//!
//! Amounts are whole numbers of an asset's base unit. The ledger has no
//! notion of decimals; pricing is configured directly in base units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of some fungible asset, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount {
    units: u64,
}

impl Amount {
    /// Zero units.
    pub const ZERO: Self = Self { units: 0 };

    /// Maximum amount (`u64::MAX` units).
    pub const MAX: Self = Self { units: u64::MAX };

    /// Create an amount from base units.
    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self { units }
    }

    /// Get the amount in base units.
    #[must_use]
    pub const fn units(&self) -> u64 {
        self.units
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.units == 0
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.units.checked_add(other.units) {
            Some(units) => Some(Self { units }),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.units.checked_sub(other.units) {
            Some(units) => Some(Self { units }),
            None => None,
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.units)
    }
}
