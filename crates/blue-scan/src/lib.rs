//! # blue-scan
//!
//! Access-gated scan marketplace.
//!
//! This crate provides:
//!
//! - Owner / admin / worker access control
//! - Payment methods: which assets admit scan requests, by payment or by holding
//! - A FIFO scan job queue with exclusive worker assignment
//! - A catalog of score types
//! - The latest scan result per target
//!
//! [`ScanRegistry`] ties these together behind one lock and calls into an
//! [`blue_token::AssetLedger`] for allowance, balance and transfer checks.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use blue_scan::ScanRegistry;
//! use blue_token::{Address, Amount, SimulatedLedger};
//!
//! # fn example() -> blue_scan::Result<()> {
//! let ledger = Arc::new(SimulatedLedger::new());
//! let owner = Address::generate();
//! let registry = ScanRegistry::new(owner.clone(), ledger.clone());
//!
//! registry.add_authorized_admin(&owner, owner.clone())?;
//! let coin = Address::generate();
//! registry.upsert_payment_method(&owner, coin.clone(), "BLUECoin", Amount::from_units(1), Amount::from_units(5))?;
//!
//! let requester = Address::generate();
//! ledger.mint(&coin, &requester, Amount::from_units(5))?;
//! let target = Address::generate();
//! registry.scan_address_with_holding(&requester, target.clone(), &coin)?;
//!
//! let worker = Address::generate();
//! registry.add_worker(&owner, worker.clone())?;
//! let assignment = registry.get_next_scan_job(&worker)?;
//! registry.push_scan_result(&worker, assignment.job, "score_1=35;")?;
//!
//! assert_eq!(registry.get_scan_result(&target).map(|r| r.score), Some("score_1=35;".to_string()));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod job;
pub mod payment;
pub mod queue;
pub mod registry;
pub mod result;
pub mod score;

pub use access::{AccessControl, Role};
pub use config::RegistryConfig;
pub use error::{Result, ScanError};
pub use events::RegistryEvent;
pub use job::{JobAssignment, JobId, JobStatus, ScanJob, ScanMode};
pub use payment::{PaymentMethod, PaymentMethods};
pub use queue::ScanJobQueue;
pub use registry::ScanRegistry;
pub use result::{ScanResult, ScanResultStore};
pub use score::ScoreTypes;
