//! Request lifecycle orchestration.
//!
//! Single entry point for every state change: load the request, run the
//! validator, apply the side effects, persist, audit. Handlers never
//! touch the store or the validator directly.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use fleet_core::{
    queue, validator, AuditRecord, QueueEntry, RequestStatus, RiskThresholds, Role, ScheduleBlock,
    ServiceRequest, SideEffect, Technician, TimeWindow, TransitionContext, Vehicle,
};

use crate::audit::AuditLog;
use crate::config::Config;
use crate::error::OpError;
use crate::scheduler::Scheduler;
use crate::store::{delete_block_for_request, read_request, write_request, Store};

/// Authenticated identity attached to every call.
#[derive(Debug, Clone)]
pub struct Caller {
    pub role: Role,
    pub actor: String,
}

#[derive(Clone)]
pub struct LifecycleService {
    store: Store,
    audit: AuditLog,
    scheduler: Scheduler,
    thresholds: RiskThresholds,
    min_notes_len: usize,
}

impl LifecycleService {
    pub fn new(store: Store, audit: AuditLog, config: &Config) -> Self {
        let scheduler = Scheduler::new(store.clone(), audit.clone());
        Self {
            store,
            audit,
            scheduler,
            thresholds: config.risk.thresholds(),
            min_notes_len: config.dispatch.min_notes_len,
        }
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Open a new request in NEW for the given customer and vehicle.
    pub async fn create_request(
        &self,
        caller: &Caller,
        customer_id: String,
        vehicle_id: String,
    ) -> Result<ServiceRequest, OpError> {
        if !matches!(caller.role, Role::Customer | Role::Office | Role::Admin) {
            return Err(fleet_core::Error::Forbidden {
                reason: format!("role {} may not create requests", caller.role),
            }
            .into());
        }

        let request = ServiceRequest::new(
            Uuid::new_v4().to_string(),
            customer_id,
            vehicle_id,
            Utc::now(),
        );
        let request = self.store.insert_request(request).await?;

        let record = AuditRecord::new(&caller.actor, caller.role, "create", &request.id).detail(
            format!(
                "customer {} vehicle {}",
                request.customer_id, request.vehicle_id
            ),
        );
        if let Err(e) = self.audit.append(&record).await {
            warn!("audit write failed: {e}");
        }

        Ok(request)
    }

    pub async fn get_request(&self, id: &str) -> Result<ServiceRequest, OpError> {
        self.store.get_request(id.to_string()).await
    }

    /// Move a request along one edge of the status machine.
    pub async fn submit_transition(
        &self,
        caller: &Caller,
        request_id: &str,
        target: RequestStatus,
        notes: Option<String>,
    ) -> Result<ServiceRequest, OpError> {
        let role = caller.role;
        let min_notes_len = self.min_notes_len;
        let req_id = request_id.to_string();

        let (request, from) = self
            .store
            .with_conn(move |conn| {
                let tx = conn.transaction()?;

                let mut request = read_request(&tx, &req_id)?;
                let ctx = TransitionContext {
                    notes,
                    technician_id: None,
                    min_notes_len,
                };
                let outcome = validator::validate(role, &request, target, &ctx)?;

                let from = request.status;
                request.status = outcome.new_status;
                for effect in outcome.effects {
                    match effect {
                        SideEffect::RecordCompletion { notes } => {
                            request.notes = Some(notes);
                            request.completed_at = Some(Utc::now());
                        }
                        SideEffect::ReleaseAssignment => {
                            request.technician_id = None;
                            request.scheduled_window = None;
                            delete_block_for_request(&tx, &request.id)?;
                        }
                    }
                }

                write_request(&tx, &request)?;
                tx.commit()?;
                Ok((request, from))
            })
            .await?;

        let record = AuditRecord::new(&caller.actor, caller.role, "transition", request_id)
            .statuses(from, request.status);
        if let Err(e) = self.audit.append(&record).await {
            warn!("audit write failed: {e}");
        }

        Ok(request)
    }

    pub async fn assign(
        &self,
        caller: &Caller,
        request_id: &str,
        technician_id: &str,
        window: TimeWindow,
    ) -> Result<ServiceRequest, OpError> {
        self.scheduler
            .assign(caller, request_id, technician_id, window)
            .await
    }

    pub async fn unassign(
        &self,
        caller: &Caller,
        request_id: &str,
    ) -> Result<ServiceRequest, OpError> {
        self.scheduler.unassign(caller, request_id).await
    }

    /// READY_TO_SCHEDULE requests ranked by risk, most urgent first.
    pub async fn dispatch_queue(&self) -> Result<Vec<QueueEntry>, OpError> {
        let rows = self.store.schedulable_requests().await?;
        Ok(queue::rank(rows, Utc::now(), &self.thresholds))
    }

    pub async fn technician_schedule(&self, id: &str) -> Result<Vec<ScheduleBlock>, OpError> {
        self.store.technician_schedule(id.to_string()).await
    }

    pub async fn upsert_vehicle(
        &self,
        caller: &Caller,
        vehicle: Vehicle,
    ) -> Result<Vehicle, OpError> {
        if !matches!(caller.role, Role::Office | Role::Admin) {
            return Err(fleet_core::Error::Forbidden {
                reason: format!("role {} may not modify vehicles", caller.role),
            }
            .into());
        }
        self.store.upsert_vehicle(vehicle).await
    }

    pub async fn upsert_technician(
        &self,
        caller: &Caller,
        technician: Technician,
    ) -> Result<Technician, OpError> {
        if !matches!(caller.role, Role::Office | Role::Admin) {
            return Err(fleet_core::Error::Forbidden {
                reason: format!("role {} may not modify technicians", caller.role),
            }
            .into());
        }
        self.store.upsert_technician(technician).await
    }

    pub async fn request_count(&self) -> Result<u64, OpError> {
        self.store.count_requests().await
    }
}
