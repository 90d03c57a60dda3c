// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::EngineState;

use crate::models::{
    AssignRequest, CanAssignQuery, CancelRequest, ConfirmedCountQuery, CreateBookingRequest,
    DateRangeQuery, SlotQuery, StaffConflictsQuery,
};
use crate::services::{AppointmentLifecycleService, BookingService, ConflictDetectionService};

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<EngineState>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);
    let appointments = booking_service.create_booking(request).await?;

    Ok(Json(json!({
        "success": true,
        "booking_group_id": appointments[0].booking_group_id,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<EngineState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);
    let appointment = booking_service.get_appointment(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn assign_appointment(
    State(state): State<Arc<EngineState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);
    let appointment = booking_service
        .approve_and_assign(appointment_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn start_appointment(
    State(state): State<Arc<EngineState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);
    let appointment = lifecycle.start(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn finish_appointment(
    State(state): State<Arc<EngineState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);
    let appointment = lifecycle.finish(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<EngineState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);
    let appointment = lifecycle.cancel(appointment_id, request.reason).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_slot_appointments(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let conflicts = ConflictDetectionService::new(&state);
    let appointments = conflicts.slot_appointments(query.date, query.time).await;

    Ok(Json(json!({
        "success": true,
        "date": query.date,
        "time": query.time,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn check_can_assign(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<CanAssignQuery>,
) -> Result<Json<Value>, AppError> {
    let conflicts = ConflictDetectionService::new(&state);
    let check = conflicts.can_assign(query).await;

    Ok(Json(json!({
        "success": true,
        "can_assign": check.is_clear(),
        "check": check
    })))
}

#[axum::debug_handler]
pub async fn get_slot_report(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let conflicts = ConflictDetectionService::new(&state);
    let report = conflicts.slot_report(query.date, query.time).await;

    Ok(Json(json!({
        "success": true,
        "report": report
    })))
}

#[axum::debug_handler]
pub async fn list_conflicts(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let conflicts = ConflictDetectionService::new(&state);
    let reports = conflicts.list_conflicts(query).await;

    Ok(Json(json!({
        "success": true,
        "conflicts": reports
    })))
}

#[axum::debug_handler]
pub async fn get_staff_commitments(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<StaffConflictsQuery>,
) -> Result<Json<Value>, AppError> {
    let conflicts = ConflictDetectionService::new(&state);
    let appointments = conflicts.staff_commitments(query).await;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_confirmed_count(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<ConfirmedCountQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);
    let count = booking_service.confirmed_count(query).await;

    Ok(Json(json!({
        "success": true,
        "confirmed_count": count
    })))
}
