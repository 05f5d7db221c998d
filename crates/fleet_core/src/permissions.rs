//! Role permission matrix: which roles may drive which edges.
//!
//! Always a subset of the transition table. The matrix is a fixed lookup
//! compiled into the binary; there is no runtime mutation and no role
//! inheritance.

use crate::role::Role;
use crate::status::RequestStatus;
use crate::transitions;

/// Targets `role` may move a request to from `from`.
pub fn permitted_targets(role: Role, from: RequestStatus) -> &'static [RequestStatus] {
    use RequestStatus::*;
    match role {
        // Customers read; they never transition
        Role::Customer => &[],
        Role::Office => match from {
            New => &[WaitingApproval, WaitingParts, ReadyToSchedule],
            WaitingApproval => &[WaitingParts],
            WaitingParts => &[ReadyToSchedule],
            Completed => &[Billed],
            _ => &[],
        },
        Role::Dispatch => match from {
            ReadyToSchedule => &[Scheduled],
            Scheduled => &[ReadyToSchedule],
            ReschedulePending => &[ReadyToSchedule],
            _ => &[],
        },
        Role::Tech => match from {
            Scheduled => &[InProgress],
            InProgress => &[Completed, ReschedulePending],
            _ => &[],
        },
        // Admins may drive every edge of the table
        Role::Admin => transitions::legal_targets(from),
    }
}

/// True when `role` may drive `from -> to`.
pub fn is_permitted(role: Role, from: RequestStatus, to: RequestStatus) -> bool {
    permitted_targets(role, from).contains(&to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    #[test]
    fn test_matrix_is_subset_of_table() {
        for role in Role::all() {
            for from in RequestStatus::all() {
                for to in permitted_targets(*role, *from) {
                    assert!(
                        transitions::is_legal(*from, *to),
                        "{role} permitted on non-edge {from} -> {to}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_customer_has_no_transition_rights() {
        for from in RequestStatus::all() {
            assert!(permitted_targets(Role::Customer, *from).is_empty());
        }
    }

    #[test]
    fn test_office_handles_intake_and_billing() {
        assert!(is_permitted(Role::Office, New, WaitingApproval));
        assert!(is_permitted(Role::Office, New, WaitingParts));
        assert!(is_permitted(Role::Office, New, ReadyToSchedule));
        assert!(is_permitted(Role::Office, WaitingApproval, WaitingParts));
        assert!(is_permitted(Role::Office, WaitingParts, ReadyToSchedule));
        assert!(is_permitted(Role::Office, Completed, Billed));

        assert!(!is_permitted(Role::Office, ReadyToSchedule, Scheduled));
        assert!(!is_permitted(Role::Office, InProgress, Completed));
        assert!(!is_permitted(Role::Office, InProgress, Cancelled));
    }

    #[test]
    fn test_dispatch_owns_the_calendar_edges() {
        assert!(is_permitted(Role::Dispatch, ReadyToSchedule, Scheduled));
        assert!(is_permitted(Role::Dispatch, Scheduled, ReadyToSchedule));
        assert!(is_permitted(Role::Dispatch, ReschedulePending, ReadyToSchedule));

        assert!(!is_permitted(Role::Dispatch, Scheduled, InProgress));
        assert!(!is_permitted(Role::Dispatch, New, ReadyToSchedule));
        assert!(!is_permitted(Role::Dispatch, Completed, Billed));
    }

    #[test]
    fn test_tech_works_the_job() {
        assert!(is_permitted(Role::Tech, Scheduled, InProgress));
        assert!(is_permitted(Role::Tech, InProgress, Completed));
        assert!(is_permitted(Role::Tech, InProgress, ReschedulePending));

        // Cancelling mid-job is admin-only
        assert!(!is_permitted(Role::Tech, InProgress, Cancelled));
        assert!(!is_permitted(Role::Tech, ReadyToSchedule, Scheduled));
    }

    #[test]
    fn test_admin_equals_the_full_table() {
        for from in RequestStatus::all() {
            assert_eq!(
                permitted_targets(Role::Admin, *from),
                transitions::legal_targets(*from)
            );
        }
    }
}
