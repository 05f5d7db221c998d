//! The service request entity and its scheduled time window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::RequestStatus;

/// Half-open time interval `[start, end)` on a technician's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the interval is empty or inverted.
    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }

    /// Half-open overlap: `[a, b)` and `[c, d)` overlap iff `a < d && c < b`.
    /// Back-to-back windows sharing an endpoint do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A unit of fleet-maintenance work tracked through the lifecycle.
///
/// `technician_id` and `scheduled_window` are always set together or not at
/// all; the assignment scheduler is the only writer of either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub status: RequestStatus,
    pub customer_id: String,
    pub vehicle_id: String,
    pub technician_id: Option<String>,
    pub scheduled_window: Option<TimeWindow>,
    /// Closing notes written by the technician on completion
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Create a fresh request in NEW.
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            status: RequestStatus::New,
            customer_id: customer_id.into(),
            vehicle_id: vehicle_id.into(),
            technician_id: None,
            scheduled_window: None,
            notes: None,
            created_at,
            completed_at: None,
        }
    }

    /// True when a technician currently holds this request.
    pub fn is_assigned(&self) -> bool {
        self.technician_id.is_some()
    }
}
