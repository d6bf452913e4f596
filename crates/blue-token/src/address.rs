//! Account and asset addresses.
//!
//! An address is 32 raw bytes, carried around in base58 form. The same type
//! names holders, spenders, the marketplace itself, scan targets, and the
//! assets (token contracts) held in the ledger.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::ADDRESS_LEN;

/// A base58-encoded 32-byte address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Generate a fresh random address.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bs58::encode(bytes).into_string())
    }

    /// Create an address from a base58-encoded string.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not valid base58 or wrong length.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| LedgerError::invalid_address(format!("invalid base58: {e}")))?;

        if bytes.len() != ADDRESS_LEN {
            return Err(LedgerError::invalid_address(format!(
                "address must be {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self(s.to_string()))
    }

    /// Get the base58-encoded address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_base58(s)
    }
}

impl TryFrom<String> for Address {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_base58(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
