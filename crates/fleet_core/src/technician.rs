//! Technicians and their reserved calendar blocks.

use serde::{Deserialize, Serialize};

use crate::request::TimeWindow;

/// A field technician who can hold scheduled work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    /// Inactive technicians keep their history but accept no new work
    pub active: bool,
    /// Market/region the technician serves
    pub market: String,
}

/// A reserved interval on one technician's calendar, bound 1:1 to a
/// scheduled request. Created and destroyed only by the assignment
/// scheduler, in lock-step with the request's `scheduled_window`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub technician_id: String,
    pub request_id: String,
    pub window: TimeWindow,
}
