//! Access control: one owner, a set of admins, a set of workers.
//!
//! The owner manages admins and admins manage workers. Being the owner does
//! not make an identity an admin; the owner has to add itself.

use std::collections::BTreeSet;
use std::fmt;

use blue_token::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// A privilege an entrypoint can require of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The single identity the registry was created for.
    Owner,
    /// May manage workers, payment methods and score types.
    Admin,
    /// May take scan jobs and submit results.
    Worker,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// Owner, admin and worker membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    admins: BTreeSet<Address>,
    workers: BTreeSet<Address>,
}

impl AccessControl {
    /// Creates access control with `owner` and no admins or workers.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            admins: BTreeSet::new(),
            workers: BTreeSet::new(),
        }
    }

    /// The owner identity.
    #[must_use]
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Returns true if `identity` is the owner.
    #[must_use]
    pub fn is_owner(&self, identity: &Address) -> bool {
        self.owner == *identity
    }

    /// Returns true if `identity` is an admin.
    #[must_use]
    pub fn is_admin(&self, identity: &Address) -> bool {
        self.admins.contains(identity)
    }

    /// Returns true if `identity` is a worker.
    #[must_use]
    pub fn is_worker(&self, identity: &Address) -> bool {
        self.workers.contains(identity)
    }

    /// Returns true if `identity` holds `role`.
    #[must_use]
    pub fn has_role(&self, identity: &Address, role: Role) -> bool {
        match role {
            Role::Owner => self.is_owner(identity),
            Role::Admin => self.is_admin(identity),
            Role::Worker => self.is_worker(identity),
        }
    }

    /// Checks that `caller` holds `role`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unauthorized`] otherwise.
    pub fn require(&self, caller: &Address, role: Role) -> Result<()> {
        if self.has_role(caller, role) {
            Ok(())
        } else {
            Err(ScanError::unauthorized(caller, role))
        }
    }

    /// Adds an admin. Returns false if it was already present.
    pub fn insert_admin(&mut self, identity: Address) -> bool {
        self.admins.insert(identity)
    }

    /// Adds a worker. Returns false if it was already present.
    pub fn insert_worker(&mut self, identity: Address) -> bool {
        self.workers.insert(identity)
    }

    /// Admins in address order.
    #[must_use]
    pub fn admins(&self) -> Vec<Address> {
        self.admins.iter().cloned().collect()
    }

    /// Workers in address order.
    #[must_use]
    pub fn workers(&self) -> Vec<Address> {
        self.workers.iter().cloned().collect()
    }
}
