//! FIFO queue of admitted scan jobs.
//!
//! Every job ever admitted stays in the job table. The pending list holds
//! the ids of jobs not yet dequeued, in admission order.

use std::collections::{BTreeMap, VecDeque};

use blue_token::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::job::{JobAssignment, JobId, ScanJob, ScanMode};

/// Job table plus the ordered pending list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJobQueue {
    next_id: u64,
    jobs: BTreeMap<JobId, ScanJob>,
    pending: VecDeque<JobId>,
}

impl Default for ScanJobQueue {
    fn default() -> Self {
        Self {
            next_id: 1,
            jobs: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }
}

impl ScanJobQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that another job can be admitted.
    ///
    /// Admission calls this before moving any funds so that [`Self::enqueue`]
    /// cannot fail afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidInput`] once the id space is exhausted.
    pub fn ensure_capacity(&self) -> Result<()> {
        if self.next_id == u64::MAX {
            return Err(ScanError::invalid_input("job id space exhausted"));
        }
        Ok(())
    }

    /// Appends a new pending job to the tail.
    pub fn enqueue(
        &mut self,
        requester: Address,
        target: Address,
        asset: Address,
        mode: ScanMode,
        charged: Amount,
    ) -> ScanJob {
        let id = JobId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let job = ScanJob::new(id, requester, target, asset, mode, charged);
        self.jobs.insert(id, job.clone());
        self.pending.push_back(id);
        job
    }

    /// Removes the oldest pending job and binds it to `worker`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NoJobAvailable`] if nothing is pending.
    pub fn assign_next(&mut self, worker: &Address) -> Result<JobAssignment> {
        let id = *self.pending.front().ok_or(ScanError::NoJobAvailable)?;
        let job = self
            .jobs
            .get_mut(&id)
            .ok_or(ScanError::JobNotFound { job: id })?;
        job.assign(worker.clone())?;
        self.pending.pop_front();
        Ok(job.assignment())
    }

    /// Marks `id` completed by `worker`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::JobNotFound`], [`ScanError::InvalidState`] or
    /// [`ScanError::JobNotAssignedToCaller`].
    pub fn complete(&mut self, id: JobId, worker: &Address) -> Result<&ScanJob> {
        let job = self
            .jobs
            .get_mut(&id)
            .ok_or(ScanError::JobNotFound { job: id })?;
        job.complete(worker)?;
        Ok(&*job)
    }

    /// Looks up a job by id.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::JobNotFound`] for an unknown id.
    pub fn get(&self, id: JobId) -> Result<&ScanJob> {
        self.jobs.get(&id).ok_or(ScanError::JobNotFound { job: id })
    }

    /// Number of jobs waiting to be dequeued.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of jobs ever admitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if no job was ever admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
