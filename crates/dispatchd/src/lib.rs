//! Fleet dispatch daemon.
//!
//! Owns the persistent side of the request lifecycle: SQLite storage,
//! the JSONL audit trail, conflict-free technician scheduling, and the
//! HTTP API the office and dispatch surfaces talk to. The pure rules
//! (status machine, permissions, risk, queue ranking) live in
//! `fleet_core`.

pub mod audit;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod routes;
pub mod scheduler;
pub mod server;
pub mod store;
