//! Vehicle snapshot consumed by the risk scorer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of one fleet vehicle. Read-only from the engine's
/// perspective; the office keeps it current through the upsert surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub current_odometer: u32,
    pub odometer_at_last_service: u32,
    pub last_service_date: DateTime<Utc>,
}

impl Vehicle {
    /// Miles driven since the last recorded service. A rolled-back or
    /// corrected odometer never produces a negative delta.
    pub fn miles_since_service(&self) -> u32 {
        self.current_odometer
            .saturating_sub(self.odometer_at_last_service)
    }
}
