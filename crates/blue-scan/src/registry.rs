//! The scan registry service.
//!
//! [`ScanRegistry`] owns all marketplace state behind a single lock. Every
//! mutating entrypoint holds the write lock for its whole duration,
//! including the call into the asset ledger, so operations are serialized
//! and a dequeue can never hand the same job to two workers. Each entrypoint
//! checks all of its preconditions before it mutates anything, and events are
//! published only once the mutation is in place.

use std::sync::Arc;

use blue_token::{Address, Amount, AssetLedger};
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::access::{AccessControl, Role};
use crate::config::RegistryConfig;
use crate::error::{Result, ScanError};
use crate::events::RegistryEvent;
use crate::job::{JobAssignment, JobId, ScanJob, ScanMode};
use crate::payment::{PaymentMethod, PaymentMethods};
use crate::queue::ScanJobQueue;
use crate::result::{ScanResult, ScanResultStore};
use crate::score::ScoreTypes;

#[derive(Debug)]
struct RegistryState {
    access: AccessControl,
    payments: PaymentMethods,
    score_types: ScoreTypes,
    queue: ScanJobQueue,
    results: ScanResultStore,
}

impl RegistryState {
    fn new(owner: Address) -> Self {
        Self {
            access: AccessControl::new(owner),
            payments: PaymentMethods::new(),
            score_types: ScoreTypes::new(),
            queue: ScanJobQueue::new(),
            results: ScanResultStore::new(),
        }
    }

    fn require(&self, caller: &Address, role: Role) -> Result<()> {
        self.access.require(caller, role).inspect_err(|_| {
            warn!(caller = %caller, required = %role, "caller rejected");
        })
    }
}

/// Access-gated scan marketplace.
pub struct ScanRegistry {
    address: Address,
    max_score_len: usize,
    ledger: Arc<dyn AssetLedger>,
    state: RwLock<RegistryState>,
    events: broadcast::Sender<RegistryEvent>,
}

impl ScanRegistry {
    /// Creates a registry owned by `owner` with default settings and a
    /// freshly generated registry address.
    #[must_use]
    pub fn new(owner: Address, ledger: Arc<dyn AssetLedger>) -> Self {
        let config = RegistryConfig::new(owner);
        Self::build(config, ledger)
    }

    /// Creates a registry from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the configuration is invalid.
    pub fn with_config(config: RegistryConfig, ledger: Arc<dyn AssetLedger>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, ledger))
    }

    fn build(config: RegistryConfig, ledger: Arc<dyn AssetLedger>) -> Self {
        let address = config.registry_address.unwrap_or_else(Address::generate);
        let (events, _) = broadcast::channel(config.event_capacity);

        info!(owner = %config.owner, registry = %address, "scan registry created");

        Self {
            address,
            max_score_len: config.max_score_len,
            ledger,
            state: RwLock::new(RegistryState::new(config.owner)),
            events,
        }
    }

    /// The registry's own ledger identity: the spender requesters approve and
    /// the recipient of scan payments.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: RegistryEvent) {
        debug!(event = event.name(), "publishing registry event");
        // No subscribers is fine.
        self.events.send(event).ok();
    }

    // ------------------------------------------------------------------
    // Access control
    // ------------------------------------------------------------------

    /// Adds an admin. Owner only.
    ///
    /// Returns false if `identity` was already an admin.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unauthorized`] if `caller` is not the owner.
    pub fn add_authorized_admin(&self, caller: &Address, identity: Address) -> Result<bool> {
        let mut state = self.state.write();
        state.require(caller, Role::Owner)?;

        let added = state.access.insert_admin(identity.clone());
        info!(admin = %identity, added, "authorized admin");
        Ok(added)
    }

    /// Adds a worker. Admin only.
    ///
    /// Returns false if `identity` was already a worker.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unauthorized`] if `caller` is not an admin.
    pub fn add_worker(&self, caller: &Address, identity: Address) -> Result<bool> {
        let mut state = self.state.write();
        state.require(caller, Role::Admin)?;

        let added = state.access.insert_worker(identity.clone());
        info!(worker = %identity, admin = %caller, added, "worker registered");
        Ok(added)
    }

    /// Returns true if `identity` is the owner.
    #[must_use]
    pub fn is_owner(&self, identity: &Address) -> bool {
        self.state.read().access.is_owner(identity)
    }

    /// Returns true if `identity` is an admin.
    #[must_use]
    pub fn is_admin(&self, identity: &Address) -> bool {
        self.state.read().access.is_admin(identity)
    }

    /// Returns true if `identity` is a worker.
    #[must_use]
    pub fn is_worker(&self, identity: &Address) -> bool {
        self.state.read().access.is_worker(identity)
    }

    /// The owner identity.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.state.read().access.owner().clone()
    }

    /// Admins in address order.
    #[must_use]
    pub fn admins(&self) -> Vec<Address> {
        self.state.read().access.admins()
    }

    /// Workers in address order.
    #[must_use]
    pub fn workers(&self) -> Vec<Address> {
        self.state.read().access.workers()
    }

    // ------------------------------------------------------------------
    // Payment methods
    // ------------------------------------------------------------------

    /// Creates or fully replaces the payment method for `asset`. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unauthorized`] if `caller` is not an admin.
    pub fn upsert_payment_method(
        &self,
        caller: &Address,
        asset: Address,
        description: impl Into<String>,
        pay_amount: Amount,
        hold_amount: Amount,
    ) -> Result<PaymentMethod> {
        let mut state = self.state.write();
        state.require(caller, Role::Admin)?;

        let method = PaymentMethod::new(asset.clone(), description, pay_amount, hold_amount);
        let replaced = state.payments.upsert(method.clone()).is_some();

        info!(
            asset = %asset,
            pay_amount = %pay_amount,
            hold_amount = %hold_amount,
            replaced,
            "payment method updated"
        );
        self.publish(RegistryEvent::PaymentMethodUpdated {
            payment_method_address: asset,
            method: method.clone(),
        });
        Ok(method)
    }

    /// Configuration for `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotRegistered`] if the asset has no payment method.
    pub fn get_payment_method(&self, asset: &Address) -> Result<PaymentMethod> {
        self.state
            .read()
            .payments
            .get(asset)
            .cloned()
            .ok_or_else(|| ScanError::not_registered(asset))
    }

    /// All configured payment methods in asset order.
    #[must_use]
    pub fn payment_methods(&self) -> Vec<PaymentMethod> {
        self.state.read().payments.list()
    }

    // ------------------------------------------------------------------
    // Score types
    // ------------------------------------------------------------------

    /// Registers a score type name. Admin only.
    ///
    /// Returns false if the name was already registered.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unauthorized`] if `caller` is not an admin, or
    /// [`ScanError::InvalidInput`] for a blank name.
    pub fn add_score_type(&self, caller: &Address, name: impl Into<String>) -> Result<bool> {
        let mut state = self.state.write();
        state.require(caller, Role::Admin)?;

        let name = name.into();
        let added = state.score_types.insert(name.clone())?;
        info!(name = %name, added, "score type registered");
        Ok(added)
    }

    /// Returns true if `name` is a registered score type.
    #[must_use]
    pub fn is_score_type(&self, name: &str) -> bool {
        self.state.read().score_types.contains(name)
    }

    /// Registered score type names in lexical order.
    #[must_use]
    pub fn score_types(&self) -> Vec<String> {
        self.state.read().score_types.list()
    }

    // ------------------------------------------------------------------
    // Admission
    // ------------------------------------------------------------------

    /// Admits a scan of `target` paid for with `asset`.
    ///
    /// The requester must have approved at least the pay amount for the
    /// registry address. The pay amount moves from the requester to the
    /// registry address; if that transfer fails, nothing is enqueued.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotRegistered`], [`ScanError::InsufficientApproval`],
    /// or [`ScanError::Ledger`] if the transfer is refused.
    pub fn scan_address_with_payment(
        &self,
        caller: &Address,
        target: Address,
        asset: &Address,
    ) -> Result<ScanJob> {
        let mut state = self.state.write();
        let pay_amount = state.payments.active(asset)?.pay_amount;
        state.queue.ensure_capacity()?;

        let approved = self.ledger.allowance(asset, caller, &self.address)?;
        if approved < pay_amount {
            return Err(ScanError::InsufficientApproval {
                required: pay_amount,
                approved,
            });
        }

        self.ledger
            .transfer_from(asset, &self.address, caller, &self.address, pay_amount)?;
        debug!(requester = %caller, asset = %asset, amount = %pay_amount, "scan payment collected");

        let job = state.queue.enqueue(
            caller.clone(),
            target,
            asset.clone(),
            ScanMode::Payment,
            pay_amount,
        );
        self.admitted(&job);
        Ok(job)
    }

    /// Admits a scan of `target` for a requester holding enough of `asset`.
    ///
    /// No funds move.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotRegistered`] or [`ScanError::InsufficientBalance`].
    pub fn scan_address_with_holding(
        &self,
        caller: &Address,
        target: Address,
        asset: &Address,
    ) -> Result<ScanJob> {
        let mut state = self.state.write();
        let hold_amount = state.payments.active(asset)?.hold_amount;
        state.queue.ensure_capacity()?;

        let available = self.ledger.balance_of(asset, caller)?;
        if available < hold_amount {
            return Err(ScanError::InsufficientBalance {
                required: hold_amount,
                available,
            });
        }

        let job = state.queue.enqueue(
            caller.clone(),
            target,
            asset.clone(),
            ScanMode::Holding,
            Amount::ZERO,
        );
        self.admitted(&job);
        Ok(job)
    }

    fn admitted(&self, job: &ScanJob) {
        info!(
            job = %job.id,
            target = %job.target,
            requester = %job.requester,
            mode = %job.mode,
            "scan requested"
        );
        self.publish(RegistryEvent::ScanRequested {
            job: job.id,
            address_to_scan: job.target.clone(),
            requester: job.requester.clone(),
            mode: job.mode,
        });
    }

    // ------------------------------------------------------------------
    // Workers
    // ------------------------------------------------------------------

    /// Takes the oldest pending job and assigns it to `caller`. Worker only.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unauthorized`] if `caller` is not a worker, or
    /// [`ScanError::NoJobAvailable`] if nothing is pending.
    pub fn get_next_scan_job(&self, caller: &Address) -> Result<JobAssignment> {
        let mut state = self.state.write();
        state.require(caller, Role::Worker)?;

        let assignment = state.queue.assign_next(caller)?;
        info!(job = %assignment.job, worker = %caller, target = %assignment.target, "scan job assigned");
        Ok(assignment)
    }

    /// Records the result for `job`, completing it. Only the worker the job
    /// is assigned to may submit.
    ///
    /// The stored result replaces any earlier one for the same target.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unauthorized`], [`ScanError::JobNotFound`],
    /// [`ScanError::InvalidState`], [`ScanError::JobNotAssignedToCaller`], or
    /// [`ScanError::InvalidInput`] for an oversized payload.
    pub fn push_scan_result(
        &self,
        caller: &Address,
        job: JobId,
        score: impl Into<String>,
    ) -> Result<ScanResult> {
        let score = score.into();
        let mut state = self.state.write();
        state.require(caller, Role::Worker)?;

        if score.len() > self.max_score_len {
            return Err(ScanError::invalid_input(format!(
                "score payload is {} bytes, limit is {}",
                score.len(),
                self.max_score_len
            )));
        }

        let target = state.queue.complete(job, caller)?.target.clone();
        let result = ScanResult {
            worker: caller.clone(),
            score,
            submitted_at: Utc::now(),
            job,
        };
        let replaced = state.results.record(target.clone(), result.clone()).is_some();

        info!(job = %job, target = %target, worker = %caller, replaced, "scan result submitted");
        self.publish(RegistryEvent::ScanResultSubmitted {
            job,
            address_scanned: target,
            worker: caller.clone(),
        });
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Latest result for `target`, if any.
    #[must_use]
    pub fn get_scan_result(&self, target: &Address) -> Option<ScanResult> {
        self.state.read().results.get(target).cloned()
    }

    /// Looks up a job by id.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::JobNotFound`] for an unknown id.
    pub fn get_scan_job(&self, job: JobId) -> Result<ScanJob> {
        self.state.read().queue.get(job).cloned()
    }

    /// Number of jobs waiting for a worker.
    #[must_use]
    pub fn pending_job_count(&self) -> usize {
        self.state.read().queue.pending_len()
    }
}

#[allow(clippy::missing_fields_in_debug)]
impl std::fmt::Debug for ScanRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanRegistry")
            .field("address", &self.address)
            .field("max_score_len", &self.max_score_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_EVENT_CAPACITY;
    use crate::job::JobStatus;
    use blue_token::{LedgerError, SimulatedLedger};
    use std::collections::HashSet;
    use std::thread;
    use test_case::test_case;

    struct Fixture {
        ledger: Arc<SimulatedLedger>,
        registry: ScanRegistry,
        owner: Address,
        admin: Address,
        asset: Address,
    }

    fn setup() -> Fixture {
        let ledger = Arc::new(SimulatedLedger::new());
        let owner = Address::generate();
        let admin = Address::generate();
        let asset = Address::generate();
        let registry = ScanRegistry::new(owner.clone(), ledger.clone());
        registry
            .add_authorized_admin(&owner, admin.clone())
            .expect("owner adds admin");
        Fixture {
            ledger,
            registry,
            owner,
            admin,
            asset,
        }
    }

    fn with_method(pay: u64, hold: u64) -> Fixture {
        let f = setup();
        f.registry
            .upsert_payment_method(
                &f.admin,
                f.asset.clone(),
                "BLUECoin, best payment method",
                Amount::from_units(pay),
                Amount::from_units(hold),
            )
            .expect("admin upserts");
        f
    }

    /// Funds and approves a new requester for `amount`.
    fn paying_requester(f: &Fixture, amount: u64) -> Address {
        let requester = Address::generate();
        f.ledger
            .mint(&f.asset, &requester, Amount::from_units(amount))
            .unwrap();
        f.ledger
            .approve(&f.asset, &requester, f.registry.address(), Amount::from_units(amount))
            .unwrap();
        requester
    }

    fn worker(f: &Fixture) -> Address {
        let worker = Address::generate();
        f.registry.add_worker(&f.admin, worker.clone()).unwrap();
        worker
    }

    #[test]
    fn owner_is_not_implicitly_admin() {
        let f = setup();
        assert!(f.registry.is_owner(&f.owner));
        assert!(!f.registry.is_admin(&f.owner));

        let err = f.registry.add_worker(&f.owner, Address::generate()).unwrap_err();
        assert!(matches!(err, ScanError::Unauthorized { required: Role::Admin, .. }));
    }

    #[test]
    fn non_owner_cannot_add_admin() {
        let f = setup();
        let before = f.registry.admins();

        let err = f
            .registry
            .add_authorized_admin(&f.admin, Address::generate())
            .unwrap_err();

        assert!(matches!(err, ScanError::Unauthorized { required: Role::Owner, .. }));
        assert_eq!(f.registry.admins(), before);
    }

    #[test]
    fn owner_can_make_itself_admin() {
        let f = setup();
        assert!(f.registry.add_authorized_admin(&f.owner, f.owner.clone()).unwrap());
        assert!(f.registry.is_admin(&f.owner));
        assert!(!f.registry.add_authorized_admin(&f.owner, f.owner.clone()).unwrap());
    }

    #[test]
    fn non_admin_cannot_upsert() {
        let f = setup();
        let mut events = f.registry.subscribe();

        let err = f
            .registry
            .upsert_payment_method(
                &Address::generate(),
                f.asset.clone(),
                "nope",
                Amount::from_units(1),
                Amount::from_units(1),
            )
            .unwrap_err();

        assert!(matches!(err, ScanError::Unauthorized { .. }));
        assert!(f.registry.payment_methods().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn upsert_emits_event_and_replaces() {
        let f = with_method(1, 1);
        let mut events = f.registry.subscribe();

        let method = f
            .registry
            .upsert_payment_method(
                &f.admin,
                f.asset.clone(),
                "repriced",
                Amount::from_units(2),
                Amount::from_units(5),
            )
            .unwrap();

        assert_eq!(f.registry.payment_methods().len(), 1);
        assert_eq!(f.registry.get_payment_method(&f.asset).unwrap(), method);
        match events.try_recv().expect("event") {
            RegistryEvent::PaymentMethodUpdated {
                payment_method_address,
                method,
            } => {
                assert_eq!(payment_method_address, f.asset);
                assert_eq!(method.description, "repriced");
                assert!(method.active);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn get_payment_method_unknown() {
        let f = setup();
        assert_eq!(
            f.registry.get_payment_method(&f.asset).unwrap_err(),
            ScanError::not_registered(&f.asset)
        );
    }

    #[test]
    fn score_types_are_admin_only() {
        let f = setup();
        assert!(f.registry.add_score_type(&f.admin, "score_1").unwrap());
        assert!(f.registry.add_score_type(&f.owner, "score_2").is_err());
        assert_eq!(f.registry.score_types(), vec!["score_1"]);
        assert!(f.registry.is_score_type("score_1"));
    }

    #[test_case(true ; "payment")]
    #[test_case(false ; "holding")]
    fn admission_against_unregistered_asset(payment: bool) {
        let f = setup();
        let requester = paying_requester(&f, 10);
        let mut events = f.registry.subscribe();

        let result = if payment {
            f.registry
                .scan_address_with_payment(&requester, Address::generate(), &f.asset)
        } else {
            f.registry
                .scan_address_with_holding(&requester, Address::generate(), &f.asset)
        };

        assert_eq!(result.unwrap_err(), ScanError::not_registered(&f.asset));
        assert_eq!(f.registry.pending_job_count(), 0);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn payment_moves_exactly_pay_amount() {
        let f = with_method(3, 1);
        let requester = paying_requester(&f, 10);
        let target = Address::generate();
        let mut events = f.registry.subscribe();

        let job = f
            .registry
            .scan_address_with_payment(&requester, target.clone(), &f.asset)
            .unwrap();

        assert_eq!(job.mode, ScanMode::Payment);
        assert_eq!(job.charged, Amount::from_units(3));
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(
            f.ledger.balance_of(&f.asset, &requester).unwrap(),
            Amount::from_units(7)
        );
        assert_eq!(
            f.ledger
                .allowance(&f.asset, &requester, f.registry.address())
                .unwrap(),
            Amount::from_units(7)
        );
        assert_eq!(
            f.ledger.balance_of(&f.asset, f.registry.address()).unwrap(),
            Amount::from_units(3)
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::ScanRequested {
                job: job.id,
                address_to_scan: target,
                requester,
                mode: ScanMode::Payment,
            }
        );
    }

    #[test]
    fn payment_with_low_approval() {
        let f = with_method(2, 1);
        let requester = Address::generate();
        f.ledger
            .mint(&f.asset, &requester, Amount::from_units(10))
            .unwrap();
        f.ledger
            .approve(&f.asset, &requester, f.registry.address(), Amount::from_units(1))
            .unwrap();

        let err = f
            .registry
            .scan_address_with_payment(&requester, Address::generate(), &f.asset)
            .unwrap_err();

        assert_eq!(
            err,
            ScanError::InsufficientApproval {
                required: Amount::from_units(2),
                approved: Amount::from_units(1),
            }
        );
        assert_eq!(
            f.ledger.balance_of(&f.asset, &requester).unwrap(),
            Amount::from_units(10)
        );
    }

    #[test]
    fn failed_transfer_enqueues_nothing() {
        let f = with_method(9_999_999_999, 1);
        let requester = Address::generate();
        f.ledger
            .approve(
                &f.asset,
                &requester,
                f.registry.address(),
                Amount::from_units(9_999_999_999),
            )
            .unwrap();
        let mut events = f.registry.subscribe();

        let err = f
            .registry
            .scan_address_with_payment(&requester, Address::generate(), &f.asset)
            .unwrap_err();

        assert!(matches!(
            err,
            ScanError::Ledger(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(f.registry.pending_job_count(), 0);
        assert!(f.registry.get_scan_job(JobId::new(1)).is_err());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn holding_moves_no_funds() {
        let f = with_method(2, 5);
        let holder = Address::generate();
        f.ledger
            .mint(&f.asset, &holder, Amount::from_units(5))
            .unwrap();

        let job = f
            .registry
            .scan_address_with_holding(&holder, Address::generate(), &f.asset)
            .unwrap();

        assert_eq!(job.mode, ScanMode::Holding);
        assert!(job.charged.is_zero());
        assert_eq!(
            f.ledger.balance_of(&f.asset, &holder).unwrap(),
            Amount::from_units(5)
        );
    }

    #[test]
    fn holding_below_requirement() {
        let f = with_method(2, 1);
        let err = f
            .registry
            .scan_address_with_holding(&Address::generate(), Address::generate(), &f.asset)
            .unwrap_err();
        assert_eq!(
            err,
            ScanError::InsufficientBalance {
                required: Amount::from_units(1),
                available: Amount::ZERO,
            }
        );
        assert_eq!(f.registry.pending_job_count(), 0);
    }

    #[test]
    fn non_worker_cannot_dequeue() {
        let f = with_method(1, 1);
        let requester = paying_requester(&f, 1);
        f.registry
            .scan_address_with_payment(&requester, Address::generate(), &f.asset)
            .unwrap();

        let err = f.registry.get_next_scan_job(&f.admin).unwrap_err();
        assert!(matches!(err, ScanError::Unauthorized { required: Role::Worker, .. }));
        assert_eq!(f.registry.pending_job_count(), 1);
    }

    #[test]
    fn worker_on_empty_queue() {
        let f = setup();
        let w = worker(&f);
        assert_eq!(
            f.registry.get_next_scan_job(&w).unwrap_err(),
            ScanError::NoJobAvailable
        );
    }

    #[test]
    fn result_submission_completes_job() {
        let f = with_method(1, 1);
        let requester = paying_requester(&f, 1);
        let target = Address::generate();
        f.registry
            .scan_address_with_payment(&requester, target.clone(), &f.asset)
            .unwrap();
        let w = worker(&f);
        let assignment = f.registry.get_next_scan_job(&w).unwrap();
        let mut events = f.registry.subscribe();

        let result = f
            .registry
            .push_scan_result(&w, assignment.job, "score_1=35;score_2=3443;")
            .unwrap();

        assert_eq!(result.worker, w);
        assert_eq!(f.registry.get_scan_result(&target), Some(result));
        assert_eq!(
            f.registry.get_scan_job(assignment.job).unwrap().status,
            JobStatus::Completed
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::ScanResultSubmitted {
                job: assignment.job,
                address_scanned: target,
                worker: w,
            }
        );
    }

    #[test]
    fn other_worker_cannot_submit() {
        let f = with_method(1, 1);
        let requester = paying_requester(&f, 1);
        let target = Address::generate();
        f.registry
            .scan_address_with_payment(&requester, target.clone(), &f.asset)
            .unwrap();
        let holder = worker(&f);
        let intruder = worker(&f);
        let assignment = f.registry.get_next_scan_job(&holder).unwrap();

        let err = f
            .registry
            .push_scan_result(&intruder, assignment.job, "score_1=0;")
            .unwrap_err();

        assert!(matches!(err, ScanError::JobNotAssignedToCaller { .. }));
        assert!(f.registry.get_scan_result(&target).is_none());
        assert_eq!(
            f.registry.get_scan_job(assignment.job).unwrap().status,
            JobStatus::Assigned
        );
    }

    #[test]
    fn non_worker_cannot_submit() {
        let f = with_method(1, 1);
        let requester = paying_requester(&f, 1);
        let target = Address::generate();
        f.registry
            .scan_address_with_payment(&requester, target.clone(), &f.asset)
            .unwrap();
        let assignment = f.registry.get_next_scan_job(&worker(&f)).unwrap();
        let stranger = Address::generate();

        let err = f
            .registry
            .push_scan_result(&stranger, assignment.job, "score_1=0;")
            .unwrap_err();

        assert!(matches!(
            err,
            ScanError::Unauthorized {
                required: Role::Worker,
                ..
            }
        ));
        assert!(f.registry.get_scan_result(&target).is_none());
        assert_eq!(
            f.registry.get_scan_job(assignment.job).unwrap().status,
            JobStatus::Assigned
        );
    }

    #[test]
    fn second_submission_for_same_job_rejected() {
        let f = with_method(1, 1);
        let requester = paying_requester(&f, 1);
        let target = Address::generate();
        f.registry
            .scan_address_with_payment(&requester, target.clone(), &f.asset)
            .unwrap();
        let w = worker(&f);
        let assignment = f.registry.get_next_scan_job(&w).unwrap();
        f.registry.push_scan_result(&w, assignment.job, "first").unwrap();

        let err = f
            .registry
            .push_scan_result(&w, assignment.job, "second")
            .unwrap_err();

        assert!(matches!(err, ScanError::InvalidState { .. }));
        assert_eq!(f.registry.get_scan_result(&target).unwrap().score, "first");
    }

    #[test]
    fn submission_for_pending_job_rejected() {
        let f = with_method(1, 1);
        let requester = paying_requester(&f, 1);
        let job = f
            .registry
            .scan_address_with_payment(&requester, Address::generate(), &f.asset)
            .unwrap();
        let w = worker(&f);

        let err = f.registry.push_scan_result(&w, job.id, "early").unwrap_err();
        assert!(matches!(err, ScanError::InvalidState { .. }));
    }

    #[test]
    fn oversized_score_rejected() {
        let owner = Address::generate();
        let mut config = RegistryConfig::new(owner.clone());
        config.max_score_len = 8;
        let registry =
            ScanRegistry::with_config(config, Arc::new(SimulatedLedger::new())).unwrap();
        registry.add_authorized_admin(&owner, owner.clone()).unwrap();
        let asset = Address::generate();
        registry
            .upsert_payment_method(&owner, asset.clone(), "x", Amount::ZERO, Amount::ZERO)
            .unwrap();
        let w = Address::generate();
        registry.add_worker(&owner, w.clone()).unwrap();
        registry
            .scan_address_with_holding(&Address::generate(), Address::generate(), &asset)
            .unwrap();
        let assignment = registry.get_next_scan_job(&w).unwrap();

        let err = registry
            .push_scan_result(&w, assignment.job, "score_1=35;score_2=3443;")
            .unwrap_err();

        assert!(matches!(err, ScanError::InvalidInput(_)));
        assert_eq!(
            registry.get_scan_job(assignment.job).unwrap().status,
            JobStatus::Assigned
        );
    }

    #[test]
    fn with_config_uses_registry_address() {
        let registry_address = Address::generate();
        let config =
            RegistryConfig::new(Address::generate()).with_registry_address(registry_address.clone());
        let registry =
            ScanRegistry::with_config(config, Arc::new(SimulatedLedger::new())).unwrap();
        assert_eq!(registry.address(), &registry_address);
    }

    #[test]
    fn with_config_rejects_invalid() {
        let mut config = RegistryConfig::new(Address::generate());
        config.event_capacity = 0;
        let result = ScanRegistry::with_config(config, Arc::new(SimulatedLedger::new()));
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn with_config_rejects_oversized_event_capacity() {
        let owner = Address::generate();
        let toml = format!("owner = \"{owner}\"\nevent_capacity = 4611686018427387904\n");
        assert!(matches!(
            RegistryConfig::from_toml(&toml),
            Err(ScanError::Config(_))
        ));

        let mut config = RegistryConfig::new(owner);
        config.event_capacity = MAX_EVENT_CAPACITY + 1;
        let result = ScanRegistry::with_config(config, Arc::new(SimulatedLedger::new()));
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn concurrent_dequeue_is_exclusive() {
        const JOBS: usize = 200;
        const WORKERS: usize = 8;

        let f = with_method(0, 0);
        for _ in 0..JOBS {
            f.registry
                .scan_address_with_holding(&Address::generate(), Address::generate(), &f.asset)
                .unwrap();
        }
        let workers: Vec<Address> = (0..WORKERS).map(|_| worker(&f)).collect();
        let registry = Arc::new(f.registry);

        let handles: Vec<_> = workers
            .into_iter()
            .map(|w| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Ok(assignment) = registry.get_next_scan_job(&w) {
                        taken.push(assignment.job);
                    }
                    taken
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.join().expect("worker thread"));
        }

        let unique: HashSet<JobId> = all.iter().copied().collect();
        assert_eq!(all.len(), JOBS);
        assert_eq!(unique.len(), JOBS);
        assert_eq!(registry.pending_job_count(), 0);
    }
}
