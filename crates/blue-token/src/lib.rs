//! # blue-token
//!
//! Fungible asset capability used by the BLUE scan marketplace.
//!
//! This crate provides:
//! - [`Address`] identities for holders, spenders and assets
//! - [`Amount`] values in an asset's base units
//! - The [`AssetLedger`] trait the marketplace calls into
//!   (`balance_of`, `allowance`, `transfer_from`)
//! - [`SimulatedLedger`], an in-memory multi-asset backend for development
//!   and tests
//!
//! ## Example
//!
//! ```rust
//! use blue_token::{Address, Amount, AssetLedger, SimulatedLedger};
//!
//! # fn example() -> blue_token::Result<()> {
//! let ledger = SimulatedLedger::new();
//! let asset = Address::generate();
//! let holder = Address::generate();
//! let spender = Address::generate();
//!
//! ledger.mint(&asset, &holder, Amount::from_units(10))?;
//! ledger.approve(&asset, &holder, &spender, Amount::from_units(4))?;
//! ledger.transfer_from(&asset, &spender, &holder, &spender, Amount::from_units(4))?;
//!
//! assert_eq!(ledger.balance_of(&asset, &holder)?, Amount::from_units(6));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod amount;
pub mod error;
pub mod ledger;

pub use address::Address;
pub use amount::Amount;
pub use error::{LedgerError, Result};
pub use ledger::{AssetLedger, SimulatedLedger};

/// Length in bytes of a raw address.
pub const ADDRESS_LEN: usize = 32;
