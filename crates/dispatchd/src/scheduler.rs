//! Technician assignment and release.
//!
//! Both operations run entirely inside one SQLite transaction: the
//! request row, the technician row, and the schedule blocks are read and
//! written under the same lock, so two dispatchers racing for the same
//! slot cannot both commit. Whatever the validator rejects rolls back.

use tracing::warn;

use fleet_core::{
    validator, AuditRecord, RequestStatus, ScheduleBlock, ServiceRequest, SideEffect, TimeWindow,
    TransitionContext,
};

use crate::audit::AuditLog;
use crate::error::OpError;
use crate::lifecycle::Caller;
use crate::store::{
    blocks_for_technician, delete_block_for_request, insert_block, read_request, read_technician,
    write_request, Store,
};

#[derive(Clone)]
pub struct Scheduler {
    store: Store,
    audit: AuditLog,
}

impl Scheduler {
    pub fn new(store: Store, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    /// Book a technician onto a request.
    ///
    /// A RESCHEDULE_PENDING request is first stepped back to
    /// READY_TO_SCHEDULE; both edges commit together or not at all.
    pub async fn assign(
        &self,
        caller: &Caller,
        request_id: &str,
        technician_id: &str,
        window: TimeWindow,
    ) -> Result<ServiceRequest, OpError> {
        if window.is_degenerate() {
            return Err(fleet_core::Error::ValidationFailed {
                reason: format!(
                    "window start {} must be before end {}",
                    window.start, window.end
                ),
            }
            .into());
        }

        let role = caller.role;
        let req_id = request_id.to_string();
        let tech_id = technician_id.to_string();

        let (request, edges) = self
            .store
            .with_conn(move |conn| {
                let tx = conn.transaction()?;

                let mut request = read_request(&tx, &req_id)?;
                let technician = read_technician(&tx, &tech_id)?;
                if !technician.active {
                    return Err(fleet_core::Error::ValidationFailed {
                        reason: format!("technician {} is inactive", technician.id),
                    }
                    .into());
                }

                let blocks = blocks_for_technician(&tx, &tech_id)?;
                if blocks.iter().any(|block| block.window.overlaps(&window)) {
                    return Err(fleet_core::Error::ScheduleConflict {
                        technician_id: tech_id,
                        start: window.start,
                        end: window.end,
                    }
                    .into());
                }

                let mut edges = Vec::new();

                if request.status == RequestStatus::ReschedulePending {
                    let outcome = validator::validate(
                        role,
                        &request,
                        RequestStatus::ReadyToSchedule,
                        &TransitionContext::default(),
                    )?;
                    edges.push((request.status, outcome.new_status));
                    request.status = outcome.new_status;
                }

                let ctx = TransitionContext::with_technician(tech_id.clone());
                let outcome =
                    validator::validate(role, &request, RequestStatus::Scheduled, &ctx)?;
                edges.push((request.status, outcome.new_status));
                request.status = outcome.new_status;
                request.technician_id = Some(tech_id.clone());
                request.scheduled_window = Some(window);

                write_request(&tx, &request)?;
                insert_block(
                    &tx,
                    &ScheduleBlock {
                        technician_id: tech_id,
                        request_id: req_id,
                        window,
                    },
                )?;

                tx.commit()?;
                Ok((request, edges))
            })
            .await?;

        let last = edges.len().saturating_sub(1);
        for (i, (from, to)) in edges.iter().enumerate() {
            let mut record = AuditRecord::new(&caller.actor, caller.role, "assign", request_id)
                .statuses(*from, *to);
            if i == last {
                record = record.detail(format!(
                    "technician {} booked {} - {}",
                    technician_id, window.start, window.end
                ));
            }
            if let Err(e) = self.audit.append(&record).await {
                warn!("audit write failed: {e}");
            }
        }

        Ok(request)
    }

    /// Take a scheduled request back off the calendar and free the slot.
    pub async fn unassign(
        &self,
        caller: &Caller,
        request_id: &str,
    ) -> Result<ServiceRequest, OpError> {
        let role = caller.role;
        let req_id = request_id.to_string();

        let (request, from) = self
            .store
            .with_conn(move |conn| {
                let tx = conn.transaction()?;

                let mut request = read_request(&tx, &req_id)?;
                if request.status != RequestStatus::Scheduled {
                    return Err(fleet_core::Error::ValidationFailed {
                        reason: "only scheduled requests can be unassigned".to_string(),
                    }
                    .into());
                }

                let outcome = validator::validate(
                    role,
                    &request,
                    RequestStatus::ReadyToSchedule,
                    &TransitionContext::default(),
                )?;
                let from = request.status;
                request.status = outcome.new_status;
                if outcome.effects.contains(&SideEffect::ReleaseAssignment) {
                    request.technician_id = None;
                    request.scheduled_window = None;
                    delete_block_for_request(&tx, &request.id)?;
                }

                write_request(&tx, &request)?;
                tx.commit()?;
                Ok((request, from))
            })
            .await?;

        let record = AuditRecord::new(&caller.actor, caller.role, "unassign", request_id)
            .statuses(from, request.status);
        if let Err(e) = self.audit.append(&record).await {
            warn!("audit write failed: {e}");
        }

        Ok(request)
    }
}
