//! Error taxonomy for lifecycle and scheduling operations.
//!
//! Every rejection is final for the submitted operation: the caller either
//! fixes the input (`ValidationFailed`, `ScheduleConflict`) or stops
//! (`IllegalTransition`, `Forbidden`). Nothing here is retried internally.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::status::RequestStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The target status is unreachable from the current one, for anyone.
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// The caller's role may not drive this edge, or a business guard said no.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Correctable input problem: fix the request and resubmit.
    #[error("validation failed: {reason}")]
    ValidationFailed { reason: String },

    /// The proposed window overlaps an existing block on that calendar.
    #[error("schedule conflict: technician {technician_id} already booked within {start} - {end}")]
    ScheduleConflict {
        technician_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },
}

impl Error {
    /// Stable machine-readable kind, used in API error bodies and audit detail.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::IllegalTransition { .. } => "illegal_transition",
            Error::Forbidden { .. } => "forbidden",
            Error::ValidationFailed { .. } => "validation_failed",
            Error::ScheduleConflict { .. } => "schedule_conflict",
            Error::NotFound { .. } => "not_found",
        }
    }
}
