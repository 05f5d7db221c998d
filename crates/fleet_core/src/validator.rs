//! The transition validator: transition table, role matrix, and business
//! guards combined into a single accept/reject decision.
//!
//! `validate` is pure. It never touches storage; on acceptance it returns
//! the new status together with side-effect instructions the lifecycle
//! service applies inside one transaction.

use crate::error::Error;
use crate::permissions;
use crate::request::ServiceRequest;
use crate::role::Role;
use crate::status::RequestStatus;
use crate::transitions;

/// Default minimum closing-notes length, counted in characters after
/// trimming.
pub const DEFAULT_MIN_NOTES_LEN: usize = 10;

/// Caller-supplied context for one proposed transition.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Closing notes; required when the target is COMPLETED
    pub notes: Option<String>,
    /// Technician bound to the request; set only by the assignment
    /// scheduler, which is the sole legitimate route into SCHEDULED
    pub technician_id: Option<String>,
    /// Minimum trimmed length for closing notes
    pub min_notes_len: usize,
}

impl Default for TransitionContext {
    fn default() -> Self {
        Self {
            notes: None,
            technician_id: None,
            min_notes_len: DEFAULT_MIN_NOTES_LEN,
        }
    }
}

impl TransitionContext {
    /// Context for a completion attempt carrying closing notes.
    pub fn with_notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    /// Context for a scheduling attempt made by the assignment scheduler.
    pub fn with_technician(technician_id: impl Into<String>) -> Self {
        Self {
            technician_id: Some(technician_id.into()),
            ..Self::default()
        }
    }
}

/// Follow-up persistence instructions derived from an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Persist the closing notes and stamp `completed_at`
    RecordCompletion { notes: String },
    /// Drop the technician assignment and scheduled window, and release
    /// the schedule block
    ReleaseAssignment,
}

/// An accepted transition: the status to persist plus its side effects.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub new_status: RequestStatus,
    pub effects: Vec<SideEffect>,
}

/// Decide one proposed status change.
///
/// Checks run in order: transition table, role matrix, business guards.
/// The first failure wins, so an impossible edge reports
/// `IllegalTransition` even when the role would also have been refused.
pub fn validate(
    role: Role,
    request: &ServiceRequest,
    target: RequestStatus,
    ctx: &TransitionContext,
) -> Result<TransitionOutcome, Error> {
    let from = request.status;

    if !transitions::is_legal(from, target) {
        return Err(Error::IllegalTransition { from, to: target });
    }

    if !permissions::is_permitted(role, from, target) {
        return Err(Error::Forbidden {
            reason: format!("role {role} may not move a request from {from} to {to}", to = target),
        });
    }

    let mut effects = Vec::new();
    match target {
        RequestStatus::Completed => {
            if role == Role::Office && request.is_assigned() {
                return Err(Error::Forbidden {
                    reason: "office may not close work already assigned to a technician"
                        .to_string(),
                });
            }
            let notes = ctx.notes.as_deref().map(str::trim).unwrap_or("");
            if notes.chars().count() < ctx.min_notes_len {
                return Err(Error::ValidationFailed {
                    reason: format!(
                        "closing notes of at least {} characters are required",
                        ctx.min_notes_len
                    ),
                });
            }
            effects.push(SideEffect::RecordCompletion {
                notes: notes.to_string(),
            });
        }
        RequestStatus::Scheduled => {
            if ctx.technician_id.is_none() {
                return Err(Error::ValidationFailed {
                    reason: "scheduling requires a technician assignment; use the assign operation"
                        .to_string(),
                });
            }
        }
        RequestStatus::ReschedulePending | RequestStatus::Cancelled => {
            if request.is_assigned() {
                effects.push(SideEffect::ReleaseAssignment);
            }
        }
        RequestStatus::ReadyToSchedule => {
            // Coming from SCHEDULED this is the unassignment edge
            if from == RequestStatus::Scheduled {
                effects.push(SideEffect::ReleaseAssignment);
            }
        }
        _ => {}
    }

    Ok(TransitionOutcome {
        new_status: target,
        effects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use RequestStatus::*;

    fn request_in(status: RequestStatus) -> ServiceRequest {
        let mut request = ServiceRequest::new(
            "r-1",
            "c-1",
            "v-1",
            Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
        );
        request.status = status;
        request
    }

    fn assigned_request_in(status: RequestStatus) -> ServiceRequest {
        let mut request = request_in(status);
        request.technician_id = Some("t-1".to_string());
        request.scheduled_window = Some(crate::request::TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 9, 11, 0, 0).unwrap(),
        ));
        request
    }

    /// Context that satisfies every business guard, so acceptance depends
    /// only on the table and the matrix.
    fn permissive_ctx() -> TransitionContext {
        TransitionContext {
            notes: Some("replaced brake pads and rotors".to_string()),
            technician_id: Some("t-1".to_string()),
            min_notes_len: DEFAULT_MIN_NOTES_LEN,
        }
    }

    #[test]
    fn test_accepts_exactly_table_intersect_matrix() {
        let ctx = permissive_ctx();
        for role in Role::all() {
            for from in RequestStatus::all() {
                for to in RequestStatus::all() {
                    let request = request_in(*from);
                    let result = validate(*role, &request, *to, &ctx);
                    let expected = crate::transitions::is_legal(*from, *to)
                        && crate::permissions::is_permitted(*role, *from, *to);
                    assert_eq!(
                        result.is_ok(),
                        expected,
                        "{role}: {from} -> {to} gave {result:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_illegal_edge_wins_over_forbidden_role() {
        // NEW -> COMPLETED is not an edge; even a customer gets the
        // table answer, not the role answer
        let request = request_in(New);
        let err = validate(Role::Customer, &request, Completed, &permissive_ctx()).unwrap_err();
        assert_eq!(
            err,
            Error::IllegalTransition {
                from: New,
                to: Completed
            }
        );
    }

    #[test]
    fn test_completion_requires_notes() {
        let request = assigned_request_in(InProgress);

        let missing = validate(Role::Tech, &request, Completed, &TransitionContext::default());
        assert!(matches!(missing, Err(Error::ValidationFailed { .. })));

        let blank = validate(
            Role::Tech,
            &request,
            Completed,
            &TransitionContext::with_notes("   \t  "),
        );
        assert!(matches!(blank, Err(Error::ValidationFailed { .. })));

        let short = validate(
            Role::Tech,
            &request,
            Completed,
            &TransitionContext::with_notes("done"),
        );
        assert!(matches!(short, Err(Error::ValidationFailed { .. })));

        let ok = validate(
            Role::Tech,
            &request,
            Completed,
            &TransitionContext::with_notes("  Replaced brake pads  "),
        )
        .unwrap();
        assert_eq!(ok.new_status, Completed);
        assert_eq!(
            ok.effects,
            vec![SideEffect::RecordCompletion {
                notes: "Replaced brake pads".to_string()
            }]
        );
    }

    #[test]
    fn test_notes_length_counts_characters_after_trimming() {
        let request = assigned_request_in(InProgress);
        // Nine characters: one short of the default minimum
        let nine = validate(
            Role::Tech,
            &request,
            Completed,
            &TransitionContext::with_notes("123456789"),
        );
        assert!(matches!(nine, Err(Error::ValidationFailed { .. })));

        let ten = validate(
            Role::Tech,
            &request,
            Completed,
            &TransitionContext::with_notes("1234567890"),
        );
        assert!(ten.is_ok());
    }

    #[test]
    fn test_office_never_completes_regardless_of_notes() {
        let ctx = TransitionContext::with_notes("full service performed on site");

        let assigned = assigned_request_in(InProgress);
        let err = validate(Role::Office, &assigned, Completed, &ctx).unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        let unassigned = request_in(InProgress);
        let err = validate(Role::Office, &unassigned, Completed, &ctx).unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }

    #[test]
    fn test_completion_keeps_the_assignment() {
        let request = assigned_request_in(InProgress);
        let outcome = validate(
            Role::Tech,
            &request,
            Completed,
            &TransitionContext::with_notes("replaced alternator belt"),
        )
        .unwrap();
        assert!(!outcome.effects.contains(&SideEffect::ReleaseAssignment));
    }

    #[test]
    fn test_scheduling_without_scheduler_context_fails() {
        let request = request_in(ReadyToSchedule);
        let bare = validate(
            Role::Dispatch,
            &request,
            Scheduled,
            &TransitionContext::default(),
        );
        assert!(matches!(bare, Err(Error::ValidationFailed { .. })));

        let scheduled = validate(
            Role::Dispatch,
            &request,
            Scheduled,
            &TransitionContext::with_technician("t-9"),
        );
        assert!(scheduled.is_ok());
    }

    #[test]
    fn test_unassign_edge_releases_assignment() {
        let request = assigned_request_in(Scheduled);
        let outcome = validate(
            Role::Dispatch,
            &request,
            ReadyToSchedule,
            &TransitionContext::default(),
        )
        .unwrap();
        assert_eq!(outcome.effects, vec![SideEffect::ReleaseAssignment]);
    }

    #[test]
    fn test_requeue_edge_has_no_release_when_unassigned() {
        // RESCHEDULE_PENDING cleared the assignment on entry
        let request = request_in(ReschedulePending);
        let outcome = validate(
            Role::Dispatch,
            &request,
            ReadyToSchedule,
            &TransitionContext::default(),
        )
        .unwrap();
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn test_entering_reschedule_pending_releases_assignment() {
        let request = assigned_request_in(InProgress);
        let outcome = validate(
            Role::Tech,
            &request,
            ReschedulePending,
            &TransitionContext::default(),
        )
        .unwrap();
        assert_eq!(outcome.effects, vec![SideEffect::ReleaseAssignment]);
    }

    #[test]
    fn test_cancelling_in_progress_work_releases_assignment() {
        let request = assigned_request_in(InProgress);
        let outcome = validate(
            Role::Admin,
            &request,
            Cancelled,
            &TransitionContext::default(),
        )
        .unwrap();
        assert_eq!(outcome.effects, vec![SideEffect::ReleaseAssignment]);
    }

    #[test]
    fn test_terminal_states_reject_every_target() {
        for from in [Cancelled, Billed, AttentionRequired] {
            for to in RequestStatus::all() {
                let request = request_in(from);
                let result = validate(Role::Admin, &request, *to, &permissive_ctx());
                assert!(
                    matches!(result, Err(Error::IllegalTransition { .. })),
                    "{from} -> {to} should be illegal"
                );
            }
        }
    }
}
