//! Vehicle risk scoring for dispatch prioritization.
//!
//! Deterministic and referentially transparent: `now` is an explicit
//! argument, there is no I/O and no randomness, so the same snapshot
//! always scores the same.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vehicle::Vehicle;

/// Miles per scoring point.
const MILES_PER_POINT: u32 = 100;
/// Days per scoring point.
const DAYS_PER_POINT: i64 = 7;

/// Priority bucket derived from a vehicle's risk score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket boundaries: a score at or above each bound lands in that bucket.
///
/// The defaults put a typical fleet vehicle at MEDIUM around 2,500 miles
/// or six months overdue, and at HIGH around double that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub medium: u32,
    pub high: u32,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 25,
            high: 50,
        }
    }
}

/// Derived urgency for one vehicle snapshot. Computed on demand, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: u32,
    pub level: RiskLevel,
    /// Human-readable summary of the dominant driver
    pub label: String,
}

impl RiskScore {
    /// Placeholder score for a request whose vehicle row is missing.
    pub fn no_vehicle_data() -> Self {
        Self {
            score: 0,
            level: RiskLevel::Low,
            label: "no vehicle data".to_string(),
        }
    }
}

/// Score a vehicle snapshot at `now`.
///
/// One point per 100 miles driven plus one point per week elapsed since
/// the last service. Negative deltas (odometer corrections, future-dated
/// service records) contribute nothing.
pub fn assess(vehicle: &Vehicle, now: DateTime<Utc>, thresholds: &RiskThresholds) -> RiskScore {
    let miles = vehicle.miles_since_service();
    let days = (now - vehicle.last_service_date).num_days().max(0);

    let mileage_points = miles / MILES_PER_POINT;
    let time_points = u32::try_from(days / DAYS_PER_POINT).unwrap_or(u32::MAX);
    let score = mileage_points.saturating_add(time_points);

    let level = if score >= thresholds.high {
        RiskLevel::High
    } else if score >= thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let label = if mileage_points == 0 && time_points == 0 {
        "recently serviced".to_string()
    } else if mileage_points >= time_points {
        format!("{miles} mi since last service")
    } else {
        format!("{days} days since last service")
    };

    RiskScore {
        score,
        level,
        label,
    }
}
