//! Dispatch queue ordering for schedulable requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::ServiceRequest;
use crate::risk::{self, RiskScore, RiskThresholds};
use crate::vehicle::Vehicle;

/// One ranked row of the dispatch queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub request: ServiceRequest,
    pub risk: RiskScore,
}

/// Rank schedulable requests by urgency.
///
/// Orders by risk level, then raw score, then oldest creation time, then
/// request id, so the ranking is total and identical inputs always rank
/// identically. A request whose vehicle snapshot is missing scores as
/// "no vehicle data" at LOW instead of failing the whole queue.
pub fn rank(
    rows: Vec<(ServiceRequest, Option<Vehicle>)>,
    now: DateTime<Utc>,
    thresholds: &RiskThresholds,
) -> Vec<QueueEntry> {
    let mut entries: Vec<QueueEntry> = rows
        .into_iter()
        .map(|(request, vehicle)| {
            let risk = match vehicle {
                Some(vehicle) => risk::assess(&vehicle, now, thresholds),
                None => RiskScore::no_vehicle_data(),
            };
            QueueEntry { request, risk }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.risk
            .level
            .cmp(&a.risk.level)
            .then_with(|| b.risk.score.cmp(&a.risk.score))
            .then_with(|| a.request.created_at.cmp(&b.request.created_at))
            .then_with(|| a.request.id.cmp(&b.request.id))
    });

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn request(id: &str, created_at: DateTime<Utc>) -> ServiceRequest {
        let mut request = ServiceRequest::new(id, "c-1", format!("veh-{id}"), created_at);
        request.status = crate::status::RequestStatus::ReadyToSchedule;
        request
    }

    fn vehicle_with_miles(id: &str, miles_over: u32, now: DateTime<Utc>) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            current_odometer: 50_000 + miles_over,
            odometer_at_last_service: 50_000,
            last_service_date: now,
        }
    }

    #[test]
    fn test_orders_by_level_then_score() {
        let now = at(20, 12);
        let rows = vec![
            // 1,000 mi -> 10 points, LOW
            (request("r-low", at(1, 8)), Some(vehicle_with_miles("a", 1_000, now))),
            // 6,000 mi -> 60 points, HIGH
            (request("r-high", at(3, 8)), Some(vehicle_with_miles("b", 6_000, now))),
            // 3,000 mi -> 30 points, MEDIUM
            (request("r-med", at(2, 8)), Some(vehicle_with_miles("c", 3_000, now))),
            // 4,000 mi -> 40 points, MEDIUM
            (request("r-med-hot", at(4, 8)), Some(vehicle_with_miles("d", 4_000, now))),
        ];

        let ranked = rank(rows, now, &RiskThresholds::default());
        let ids: Vec<&str> = ranked.iter().map(|e| e.request.id.as_str()).collect();
        assert_eq!(ids, vec!["r-high", "r-med-hot", "r-med", "r-low"]);
        assert_eq!(ranked[0].risk.level, RiskLevel::High);
    }

    #[test]
    fn test_ties_break_by_age_then_id() {
        let now = at(20, 12);
        // Identical vehicles, so identical scores
        let rows = vec![
            (request("r-b", at(5, 9)), Some(vehicle_with_miles("a", 500, now))),
            (request("r-a", at(5, 9)), Some(vehicle_with_miles("b", 500, now))),
            (request("r-c", at(4, 9)), Some(vehicle_with_miles("c", 500, now))),
        ];

        let ranked = rank(rows, now, &RiskThresholds::default());
        let ids: Vec<&str> = ranked.iter().map(|e| e.request.id.as_str()).collect();
        // Oldest first, then id for the same timestamp
        assert_eq!(ids, vec!["r-c", "r-a", "r-b"]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let now = at(20, 12);
        let build = || {
            vec![
                (request("r-1", at(1, 8)), Some(vehicle_with_miles("a", 2_600, now))),
                (request("r-2", at(2, 8)), Some(vehicle_with_miles("b", 2_600, now))),
                (request("r-3", at(3, 8)), None),
                (request("r-4", at(1, 8)), Some(vehicle_with_miles("d", 7_000, now))),
            ]
        };

        let first: Vec<String> = rank(build(), now, &RiskThresholds::default())
            .into_iter()
            .map(|e| e.request.id)
            .collect();
        let second: Vec<String> = rank(build(), now, &RiskThresholds::default())
            .into_iter()
            .map(|e| e.request.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_vehicle_ranks_low_with_label() {
        let now = at(20, 12);
        let rows = vec![
            (request("r-known", at(2, 8)), Some(vehicle_with_miles("a", 3_000, now))),
            (request("r-unknown", at(1, 8)), None),
        ];

        let ranked = rank(rows, now, &RiskThresholds::default());
        assert_eq!(ranked[0].request.id, "r-known");
        assert_eq!(ranked[1].request.id, "r-unknown");
        assert_eq!(ranked[1].risk.level, RiskLevel::Low);
        assert_eq!(ranked[1].risk.label, "no vehicle data");
    }

    #[test]
    fn test_empty_queue_is_fine() {
        let ranked = rank(Vec::new(), at(1, 8), &RiskThresholds::default());
        assert!(ranked.is_empty());
    }
}
