//! Integration test crate for the BLUE scan marketplace.
//!
//! This crate exists solely to run integration tests that span the ledger and
//! the registry. It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
