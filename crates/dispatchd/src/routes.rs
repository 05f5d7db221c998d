//! HTTP route handlers for the dispatch API.
//!
//! Every mutating route reads the caller identity from the
//! `x-fleet-role` and `x-fleet-actor` headers; authorization itself
//! happens in the lifecycle layer.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use fleet_core::{
    QueueEntry, RequestStatus, Role, ScheduleBlock, ServiceRequest, Technician, TimeWindow, Vehicle,
};

use crate::error::ApiError;
use crate::lifecycle::Caller;
use crate::server::AppState;

type AppStateArc = Arc<AppState>;

fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
    let role_raw = headers
        .get("x-fleet-role")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("missing x-fleet-role header"))?;
    let role = Role::parse(role_raw)
        .ok_or_else(|| ApiError::bad_request(format!("unknown role: {role_raw}")))?;
    let actor = headers
        .get("x-fleet-actor")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    Ok(Caller { role, actor })
}

// ============================================================================
// Requests
// ============================================================================

pub fn request_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/requests", post(create_request))
        .route("/v1/requests/:id", get(get_request))
        .route("/v1/requests/:id/status", post(change_status))
        .route(
            "/v1/requests/:id/assign",
            post(assign_technician).delete(unassign_technician),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub customer_id: String,
    pub vehicle_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeBody {
    pub target: RequestStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
    pub technician_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

async fn create_request(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<ServiceRequest>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let request = state
        .service
        .create_request(&caller, body.customer_id, body.vehicle_id)
        .await?;
    Ok(Json(request))
}

async fn get_request(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ServiceRequest>, ApiError> {
    caller_from_headers(&headers)?;
    let request = state.service.get_request(&id).await?;
    Ok(Json(request))
}

async fn change_status(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<StatusChangeBody>,
) -> Result<Json<ServiceRequest>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let request = state
        .service
        .submit_transition(&caller, &id, body.target, body.notes)
        .await?;
    Ok(Json(request))
}

async fn assign_technician(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AssignBody>,
) -> Result<Json<ServiceRequest>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let window = TimeWindow::new(body.start, body.end);
    let request = state
        .service
        .assign(&caller, &id, &body.technician_id, window)
        .await?;
    Ok(Json(request))
}

async fn unassign_technician(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ServiceRequest>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let request = state.service.unassign(&caller, &id).await?;
    Ok(Json(request))
}

// ============================================================================
// Dispatch queue
// ============================================================================

pub fn queue_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/queue", get(get_queue))
}

async fn get_queue(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> Result<Json<Vec<QueueEntry>>, ApiError> {
    caller_from_headers(&headers)?;
    let entries = state.service.dispatch_queue().await?;
    Ok(Json(entries))
}

// ============================================================================
// Technicians
// ============================================================================

pub fn technician_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/technicians/:id", put(put_technician))
        .route("/v1/technicians/:id/schedule", get(get_technician_schedule))
}

#[derive(Debug, Deserialize)]
pub struct TechnicianBody {
    pub active: bool,
    #[serde(default)]
    pub market: String,
}

async fn put_technician(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TechnicianBody>,
) -> Result<Json<Technician>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let technician = Technician {
        id,
        active: body.active,
        market: body.market,
    };
    let technician = state.service.upsert_technician(&caller, technician).await?;
    Ok(Json(technician))
}

async fn get_technician_schedule(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<ScheduleBlock>>, ApiError> {
    caller_from_headers(&headers)?;
    let blocks = state.service.technician_schedule(&id).await?;
    Ok(Json(blocks))
}

// ============================================================================
// Vehicles
// ============================================================================

pub fn vehicle_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/vehicles/:id", put(put_vehicle))
}

#[derive(Debug, Deserialize)]
pub struct VehicleBody {
    pub current_odometer: u32,
    pub odometer_at_last_service: u32,
    pub last_service_date: DateTime<Utc>,
}

async fn put_vehicle(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<VehicleBody>,
) -> Result<Json<Vehicle>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let vehicle = Vehicle {
        id,
        current_odometer: body.current_odometer,
        odometer_at_last_service: body.odometer_at_last_service,
        last_service_date: body.last_service_date,
    };
    let vehicle = state.service.upsert_vehicle(&caller, vehicle).await?;
    Ok(Json(vehicle))
}

// ============================================================================
// Health
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(get_health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub request_count: u64,
}

async fn get_health(State(state): State<AppStateArc>) -> Result<Json<HealthResponse>, ApiError> {
    let request_count = state.service.request_count().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        request_count,
    }))
}
