//! Service request lifecycle states.

use serde::{Deserialize, Serialize};

/// Status of a service request in the lifecycle state machine.
///
/// This is the canonical vocabulary. Legacy imports with divergent
/// spellings are reconciled by migration tooling before they reach the
/// engine, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Created by an intake surface, not yet triaged
    #[default]
    New,
    /// Estimate sent, waiting for the customer to approve
    WaitingApproval,
    /// Approved, waiting for parts to arrive
    WaitingParts,
    /// Eligible for the dispatch queue
    ReadyToSchedule,
    /// Bound to a technician and a time window
    Scheduled,
    /// Technician on site, work underway
    InProgress,
    /// Bumped off the calendar, waiting to be re-slotted
    ReschedulePending,
    /// Work finished, closing notes recorded
    Completed,
    /// Abandoned before completion
    Cancelled,
    /// Invoiced by the office
    Billed,
    /// Legacy parking state with no legal edges in or out
    AttentionRequired,
}

impl RequestStatus {
    /// Canonical storage/wire token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::WaitingApproval => "WAITING_APPROVAL",
            Self::WaitingParts => "WAITING_PARTS",
            Self::ReadyToSchedule => "READY_TO_SCHEDULE",
            Self::Scheduled => "SCHEDULED",
            Self::InProgress => "IN_PROGRESS",
            Self::ReschedulePending => "RESCHEDULE_PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Billed => "BILLED",
            Self::AttentionRequired => "ATTENTION_REQUIRED",
        }
    }

    /// Parse a canonical token back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "WAITING_APPROVAL" => Some(Self::WaitingApproval),
            "WAITING_PARTS" => Some(Self::WaitingParts),
            "READY_TO_SCHEDULE" => Some(Self::ReadyToSchedule),
            "SCHEDULED" => Some(Self::Scheduled),
            "IN_PROGRESS" => Some(Self::InProgress),
            "RESCHEDULE_PENDING" => Some(Self::ReschedulePending),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            "BILLED" => Some(Self::Billed),
            "ATTENTION_REQUIRED" => Some(Self::AttentionRequired),
            _ => None,
        }
    }

    /// Every defined status, in rough lifecycle order.
    pub fn all() -> &'static [RequestStatus] {
        &[
            Self::New,
            Self::WaitingApproval,
            Self::WaitingParts,
            Self::ReadyToSchedule,
            Self::Scheduled,
            Self::InProgress,
            Self::ReschedulePending,
            Self::Completed,
            Self::Cancelled,
            Self::Billed,
            Self::AttentionRequired,
        ]
    }

    /// True when the request can never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Billed | Self::AttentionRequired)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        for status in RequestStatus::all() {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(RequestStatus::parse("NOT_A_STATUS"), None);
        assert_eq!(RequestStatus::parse("ready_to_schedule"), None);
    }

    #[test]
    fn test_serde_uses_canonical_tokens() {
        let json = serde_json::to_string(&RequestStatus::ReadyToSchedule).unwrap();
        assert_eq!(json, "\"READY_TO_SCHEDULE\"");

        let status: RequestStatus = serde_json::from_str("\"RESCHEDULE_PENDING\"").unwrap();
        assert_eq!(status, RequestStatus::ReschedulePending);
    }

    #[test]
    fn test_default_is_new() {
        assert_eq!(RequestStatus::default(), RequestStatus::New);
    }

    #[test]
    fn test_terminal_states() {
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(RequestStatus::Billed.is_terminal());
        assert!(RequestStatus::AttentionRequired.is_terminal());
        assert!(!RequestStatus::Completed.is_terminal());
        assert!(!RequestStatus::New.is_terminal());
    }
}
