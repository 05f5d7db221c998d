//! Core domain for the fleet request lifecycle.
//!
//! Pure logic only: lifecycle states, the transition table and role
//! permission matrix, the transition validator with its business guards,
//! vehicle risk scoring, and dispatch queue ordering. Persistence and
//! transport live in the `dispatchd` crate.

pub mod audit;
pub mod error;
pub mod permissions;
pub mod queue;
pub mod request;
pub mod risk;
pub mod role;
pub mod status;
pub mod technician;
pub mod transitions;
pub mod validator;
pub mod vehicle;

pub use audit::AuditRecord;
pub use error::Error;
pub use queue::QueueEntry;
pub use request::{ServiceRequest, TimeWindow};
pub use risk::{RiskLevel, RiskScore, RiskThresholds};
pub use role::Role;
pub use status::RequestStatus;
pub use technician::{ScheduleBlock, Technician};
pub use validator::{SideEffect, TransitionContext, TransitionOutcome};
pub use vehicle::Vehicle;
