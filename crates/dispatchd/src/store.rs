//! SQLite persistence for requests, vehicles, technicians, and schedule
//! blocks.
//!
//! Single connection behind an async mutex; every call runs on the
//! blocking pool. Mutating operations open explicit transactions so a
//! rejected guard leaves no partial state behind.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use fleet_core::{RequestStatus, ScheduleBlock, ServiceRequest, Technician, TimeWindow, Vehicle};

use crate::error::OpError;

/// Production database path when no override is configured.
const DEFAULT_DB_PATH: &str = "/var/lib/fleet/dispatch.db";

/// Where the store lives.
#[derive(Debug, Clone)]
pub enum StoreLocation {
    /// Standard production path
    Default,
    /// Explicit path (from config)
    Custom(PathBuf),
    /// In-memory, for tests
    Memory,
}

/// Shared handle to the dispatch database.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open or create the database at the given location.
    pub async fn open(location: StoreLocation) -> Result<Self> {
        let db_path = match &location {
            StoreLocation::Default => Some(PathBuf::from(DEFAULT_DB_PATH)),
            StoreLocation::Custom(path) => Some(path.clone()),
            StoreLocation::Memory => None,
        };

        let conn = match db_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .context("create database directory")?;
                }
                info!("Opening dispatch database at {}", path.display());
                tokio::task::spawn_blocking(move || -> Result<Connection> {
                    let conn = Connection::open(&path).context("open dispatch database")?;
                    init_connection(&conn)?;
                    Ok(conn)
                })
                .await??
            }
            None => {
                tokio::task::spawn_blocking(|| -> Result<Connection> {
                    let conn =
                        Connection::open_in_memory().context("open in-memory database")?;
                    init_connection(&conn)?;
                    Ok(conn)
                })
                .await??
            }
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    ///
    /// The closure gets a `&mut Connection` so it can open transactions.
    pub async fn with_conn<F, R>(&self, f: F) -> Result<R, OpError>
    where
        F: FnOnce(&mut Connection) -> Result<R, OpError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            f(&mut conn)
        })
        .await?
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    pub async fn insert_request(&self, request: ServiceRequest) -> Result<ServiceRequest, OpError> {
        self.with_conn(move |conn| {
            insert_request_row(conn, &request)?;
            Ok(request)
        })
        .await
    }

    pub async fn get_request(&self, id: String) -> Result<ServiceRequest, OpError> {
        self.with_conn(move |conn| read_request(conn, &id)).await
    }

    /// All READY_TO_SCHEDULE requests joined with their vehicle snapshots.
    /// A missing vehicle row comes back as `None` rather than an error.
    pub async fn schedulable_requests(
        &self,
    ) -> Result<Vec<(ServiceRequest, Option<Vehicle>)>, OpError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.status, r.customer_id, r.vehicle_id, r.technician_id,
                        r.window_start, r.window_end, r.notes, r.created_at, r.completed_at,
                        v.id, v.current_odometer, v.odometer_at_last_service, v.last_service_date
                 FROM service_requests r
                 LEFT JOIN vehicles v ON v.id = r.vehicle_id
                 WHERE r.status = ?1
                 ORDER BY r.created_at",
            )?;
            let rows = stmt
                .query_map(params![RequestStatus::ReadyToSchedule.as_str()], |row| {
                    let request = row_to_request(row)?;
                    let vehicle_id: Option<String> = row.get(10)?;
                    let vehicle = match vehicle_id {
                        Some(id) => Some(Vehicle {
                            id,
                            current_odometer: row.get(11)?,
                            odometer_at_last_service: row.get(12)?,
                            last_service_date: row.get(13)?,
                        }),
                        None => None,
                    };
                    Ok((request, vehicle))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn count_requests(&self) -> Result<u64, OpError> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM service_requests", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Reference data
    // ------------------------------------------------------------------

    pub async fn upsert_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle, OpError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO vehicles
                    (id, current_odometer, odometer_at_last_service, last_service_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    vehicle.id,
                    vehicle.current_odometer,
                    vehicle.odometer_at_last_service,
                    vehicle.last_service_date,
                ],
            )?;
            Ok(vehicle)
        })
        .await
    }

    pub async fn upsert_technician(&self, technician: Technician) -> Result<Technician, OpError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO technicians (id, active, market)
                 VALUES (?1, ?2, ?3)",
                params![technician.id, technician.active, technician.market],
            )?;
            Ok(technician)
        })
        .await
    }

    /// The technician's reserved blocks, soonest first.
    pub async fn technician_schedule(&self, id: String) -> Result<Vec<ScheduleBlock>, OpError> {
        self.with_conn(move |conn| {
            read_technician(conn, &id)?;
            blocks_for_technician(conn, &id)
        })
        .await
    }
}

/// Pragmas and schema applied to every fresh connection.
fn init_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("enable WAL mode")?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .context("set synchronous mode")?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("enable foreign keys")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS service_requests (
            id            TEXT PRIMARY KEY,
            status        TEXT NOT NULL,
            customer_id   TEXT NOT NULL,
            vehicle_id    TEXT NOT NULL,
            technician_id TEXT,
            window_start  TEXT,
            window_end    TEXT,
            notes         TEXT,
            created_at    TEXT NOT NULL,
            completed_at  TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_requests_status
            ON service_requests(status);

        CREATE TABLE IF NOT EXISTS vehicles (
            id                       TEXT PRIMARY KEY,
            current_odometer         INTEGER NOT NULL,
            odometer_at_last_service INTEGER NOT NULL,
            last_service_date        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS technicians (
            id     TEXT PRIMARY KEY,
            active INTEGER NOT NULL DEFAULT 1,
            market TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS schedule_blocks (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            technician_id TEXT NOT NULL,
            request_id    TEXT NOT NULL UNIQUE,
            window_start  TEXT NOT NULL,
            window_end    TEXT NOT NULL,
            FOREIGN KEY(request_id) REFERENCES service_requests(id)
        );
        CREATE INDEX IF NOT EXISTS idx_blocks_technician
            ON schedule_blocks(technician_id, window_start);",
    )
    .context("initialize schema")?;

    Ok(())
}

// ----------------------------------------------------------------------
// Row helpers, usable inside `with_conn` transactions
// ----------------------------------------------------------------------

pub(crate) fn read_request(conn: &Connection, id: &str) -> Result<ServiceRequest, OpError> {
    let request = conn
        .query_row(
            "SELECT id, status, customer_id, vehicle_id, technician_id,
                    window_start, window_end, notes, created_at, completed_at
             FROM service_requests WHERE id = ?1",
            params![id],
            row_to_request,
        )
        .optional()?;
    request.ok_or_else(|| {
        fleet_core::Error::NotFound {
            what: "request",
            id: id.to_string(),
        }
        .into()
    })
}

pub(crate) fn insert_request_row(
    conn: &Connection,
    request: &ServiceRequest,
) -> Result<(), OpError> {
    conn.execute(
        "INSERT INTO service_requests
            (id, status, customer_id, vehicle_id, technician_id,
             window_start, window_end, notes, created_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            request.id,
            request.status.as_str(),
            request.customer_id,
            request.vehicle_id,
            request.technician_id,
            request.scheduled_window.map(|w| w.start),
            request.scheduled_window.map(|w| w.end),
            request.notes,
            request.created_at,
            request.completed_at,
        ],
    )?;
    Ok(())
}

/// Persist every mutable field of an existing request.
pub(crate) fn write_request(conn: &Connection, request: &ServiceRequest) -> Result<(), OpError> {
    let updated = conn.execute(
        "UPDATE service_requests
         SET status = ?2, technician_id = ?3, window_start = ?4,
             window_end = ?5, notes = ?6, completed_at = ?7
         WHERE id = ?1",
        params![
            request.id,
            request.status.as_str(),
            request.technician_id,
            request.scheduled_window.map(|w| w.start),
            request.scheduled_window.map(|w| w.end),
            request.notes,
            request.completed_at,
        ],
    )?;
    if updated == 0 {
        return Err(fleet_core::Error::NotFound {
            what: "request",
            id: request.id.clone(),
        }
        .into());
    }
    Ok(())
}

pub(crate) fn read_technician(conn: &Connection, id: &str) -> Result<Technician, OpError> {
    let technician = conn
        .query_row(
            "SELECT id, active, market FROM technicians WHERE id = ?1",
            params![id],
            |row| {
                Ok(Technician {
                    id: row.get(0)?,
                    active: row.get(1)?,
                    market: row.get(2)?,
                })
            },
        )
        .optional()?;
    technician.ok_or_else(|| {
        fleet_core::Error::NotFound {
            what: "technician",
            id: id.to_string(),
        }
        .into()
    })
}

pub(crate) fn blocks_for_technician(
    conn: &Connection,
    technician_id: &str,
) -> Result<Vec<ScheduleBlock>, OpError> {
    let mut stmt = conn.prepare(
        "SELECT technician_id, request_id, window_start, window_end
         FROM schedule_blocks WHERE technician_id = ?1
         ORDER BY window_start",
    )?;
    let blocks = stmt
        .query_map(params![technician_id], row_to_block)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(blocks)
}

pub(crate) fn insert_block(conn: &Connection, block: &ScheduleBlock) -> Result<(), OpError> {
    conn.execute(
        "INSERT INTO schedule_blocks (technician_id, request_id, window_start, window_end)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            block.technician_id,
            block.request_id,
            block.window.start,
            block.window.end,
        ],
    )?;
    Ok(())
}

pub(crate) fn delete_block_for_request(conn: &Connection, request_id: &str) -> Result<(), OpError> {
    conn.execute(
        "DELETE FROM schedule_blocks WHERE request_id = ?1",
        params![request_id],
    )?;
    Ok(())
}

fn row_to_request(row: &Row) -> rusqlite::Result<ServiceRequest> {
    let status_raw: String = row.get(1)?;
    let status = RequestStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown status: {status_raw}").into(),
        )
    })?;

    let window_start: Option<DateTime<Utc>> = row.get(5)?;
    let window_end: Option<DateTime<Utc>> = row.get(6)?;
    let scheduled_window = match (window_start, window_end) {
        (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
        _ => None,
    };

    Ok(ServiceRequest {
        id: row.get(0)?,
        status,
        customer_id: row.get(2)?,
        vehicle_id: row.get(3)?,
        technician_id: row.get(4)?,
        scheduled_window,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

fn row_to_block(row: &Row) -> rusqlite::Result<ScheduleBlock> {
    Ok(ScheduleBlock {
        technician_id: row.get(0)?,
        request_id: row.get(1)?,
        window: TimeWindow::new(row.get(2)?, row.get(3)?),
    })
}
