//! Scan jobs and their lifecycle.
//!
//! A job moves `Pending -> Assigned -> Completed` and nowhere else. Apart
//! from its status and assigned worker, a job never changes after admission.

use std::fmt;

use blue_token::{Address, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Monotonically increasing job identifier. The first job is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a job was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// The requester paid the pay amount.
    Payment,
    /// The requester proved it holds the hold amount.
    Holding,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => write!(f, "Payment"),
            Self::Holding => write!(f, "Holding"),
        }
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting in the queue.
    Pending,
    /// Handed to a worker, result outstanding.
    Assigned,
    /// Result submitted.
    Completed,
}

impl JobStatus {
    /// Checks if a transition to the target state is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Assigned) | (Self::Assigned, Self::Completed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Assigned => write!(f, "Assigned"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// An admitted scan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJob {
    /// Job identifier, also its queue position.
    pub id: JobId,
    /// Who asked for the scan.
    pub requester: Address,
    /// The address to scan.
    pub target: Address,
    /// Asset used for admission.
    pub asset: Address,
    /// Admission mode.
    pub mode: ScanMode,
    /// Amount transferred at admission (zero for holding mode).
    pub charged: Amount,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Worker holding the job, once dequeued.
    pub assigned_worker: Option<Address>,
    /// Admission time.
    pub created_at: DateTime<Utc>,
}

impl ScanJob {
    /// Creates a pending job.
    #[must_use]
    pub fn new(
        id: JobId,
        requester: Address,
        target: Address,
        asset: Address,
        mode: ScanMode,
        charged: Amount,
    ) -> Self {
        Self {
            id,
            requester,
            target,
            asset,
            mode,
            charged,
            status: JobStatus::Pending,
            assigned_worker: None,
            created_at: Utc::now(),
        }
    }

    fn transition_to(&mut self, target: JobStatus) -> Result<()> {
        if self.status.can_transition_to(&target) {
            self.status = target;
            Ok(())
        } else {
            Err(ScanError::InvalidState {
                job: self.id,
                status: self.status,
            })
        }
    }

    /// Binds the job to `worker`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidState`] unless the job is pending.
    pub fn assign(&mut self, worker: Address) -> Result<()> {
        self.transition_to(JobStatus::Assigned)?;
        self.assigned_worker = Some(worker);
        Ok(())
    }

    /// Checks that `worker` may submit the result for this job.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidState`] unless the job is assigned, or
    /// [`ScanError::JobNotAssignedToCaller`] if another worker holds it.
    pub fn check_completion(&self, worker: &Address) -> Result<()> {
        if self.status != JobStatus::Assigned {
            return Err(ScanError::InvalidState {
                job: self.id,
                status: self.status,
            });
        }
        if self.assigned_worker.as_ref() != Some(worker) {
            return Err(ScanError::JobNotAssignedToCaller {
                job: self.id,
                caller: worker.clone(),
            });
        }
        Ok(())
    }

    /// Marks the job completed by `worker`.
    ///
    /// # Errors
    ///
    /// Same as [`ScanJob::check_completion`].
    pub fn complete(&mut self, worker: &Address) -> Result<()> {
        self.check_completion(worker)?;
        self.transition_to(JobStatus::Completed)
    }

    /// The identifying fields handed to a worker.
    #[must_use]
    pub fn assignment(&self) -> JobAssignment {
        JobAssignment {
            job: self.id,
            target: self.target.clone(),
            asset: self.asset.clone(),
            mode: self.mode,
        }
    }
}

/// What a worker receives from a dequeue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAssignment {
    /// Reference to pass back with the result.
    pub job: JobId,
    /// The address to scan.
    pub target: Address,
    /// Asset used for admission.
    pub asset: Address,
    /// Admission mode.
    pub mode: ScanMode,
}
