//! The transition table: which status-to-status moves exist at all,
//! independent of who is asking. Role filtering happens in
//! [`crate::permissions`]; business guards in [`crate::validator`].

use crate::status::RequestStatus;

/// Legal targets from a given status, for any caller.
pub fn legal_targets(from: RequestStatus) -> &'static [RequestStatus] {
    use RequestStatus::*;
    match from {
        New => &[WaitingApproval, WaitingParts, ReadyToSchedule],
        WaitingApproval => &[WaitingParts],
        WaitingParts => &[ReadyToSchedule],
        ReadyToSchedule => &[Scheduled],
        // ReadyToSchedule is the unassignment edge back off the calendar
        Scheduled => &[InProgress, ReschedulePending, ReadyToSchedule],
        InProgress => &[Completed, ReschedulePending, Cancelled],
        ReschedulePending => &[ReadyToSchedule],
        Completed => &[Billed],
        Cancelled | Billed | AttentionRequired => &[],
    }
}

/// True when `from -> to` is an edge of the table.
pub fn is_legal(from: RequestStatus, to: RequestStatus) -> bool {
    legal_targets(from).contains(&to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    #[test]
    fn test_every_edge_of_the_table() {
        let edges = [
            (New, WaitingApproval),
            (New, WaitingParts),
            (New, ReadyToSchedule),
            (WaitingApproval, WaitingParts),
            (WaitingParts, ReadyToSchedule),
            (ReadyToSchedule, Scheduled),
            (Scheduled, InProgress),
            (Scheduled, ReschedulePending),
            (Scheduled, ReadyToSchedule),
            (InProgress, Completed),
            (InProgress, ReschedulePending),
            (InProgress, Cancelled),
            (ReschedulePending, ReadyToSchedule),
            (Completed, Billed),
        ];

        for (from, to) in edges {
            assert!(is_legal(from, to), "{from} -> {to} should be legal");
        }

        // Exactly these edges and no others
        let count: usize = RequestStatus::all()
            .iter()
            .map(|s| legal_targets(*s).len())
            .sum();
        assert_eq!(count, edges.len());
    }

    #[test]
    fn test_representative_illegal_pairs() {
        assert!(!is_legal(New, Scheduled));
        assert!(!is_legal(New, Completed));
        assert!(!is_legal(WaitingApproval, ReadyToSchedule));
        assert!(!is_legal(ReadyToSchedule, InProgress));
        assert!(!is_legal(ReschedulePending, Scheduled));
        assert!(!is_legal(Completed, New));
        assert!(!is_legal(Billed, Completed));
        assert!(!is_legal(Cancelled, New));
    }

    #[test]
    fn test_self_loops_are_illegal() {
        for status in RequestStatus::all() {
            assert!(!is_legal(*status, *status), "{status} -> {status}");
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_targets() {
        for status in RequestStatus::all() {
            assert_eq!(
                status.is_terminal(),
                legal_targets(*status).is_empty(),
                "terminality of {status} disagrees with the table"
            );
        }
    }

    #[test]
    fn test_attention_required_has_no_edges_in_or_out() {
        assert!(legal_targets(AttentionRequired).is_empty());
        for status in RequestStatus::all() {
            assert!(
                !is_legal(*status, AttentionRequired),
                "{status} -> ATTENTION_REQUIRED should not exist"
            );
        }
    }
}
