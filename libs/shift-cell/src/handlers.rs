// libs/shift-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::EngineState;

use crate::models::{AvailabilityQuery, CreateShiftRequest, MoveShiftRequest, RosterQuery};
use crate::services::ShiftRegistryService;

#[axum::debug_handler]
pub async fn create_shift(
    State(state): State<Arc<EngineState>>,
    Json(request): Json<CreateShiftRequest>,
) -> Result<Json<Value>, AppError> {
    let registry = ShiftRegistryService::new(&state);
    let shift = registry.create_shift(request).await?;

    Ok(Json(json!({
        "success": true,
        "shift": shift
    })))
}

#[axum::debug_handler]
pub async fn get_shift(
    State(state): State<Arc<EngineState>>,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let registry = ShiftRegistryService::new(&state);
    let shift = registry.get_shift(shift_id).await?;

    Ok(Json(json!({
        "success": true,
        "shift": shift
    })))
}

#[axum::debug_handler]
pub async fn approve_shift(
    State(state): State<Arc<EngineState>>,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let registry = ShiftRegistryService::new(&state);
    let shift = registry.approve_shift(shift_id).await?;

    Ok(Json(json!({
        "success": true,
        "shift": shift
    })))
}

#[axum::debug_handler]
pub async fn reject_shift(
    State(state): State<Arc<EngineState>>,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let registry = ShiftRegistryService::new(&state);
    let shift = registry.reject_shift(shift_id).await?;

    Ok(Json(json!({
        "success": true,
        "shift": shift
    })))
}

#[axum::debug_handler]
pub async fn move_shift(
    State(state): State<Arc<EngineState>>,
    Path(shift_id): Path<Uuid>,
    Json(request): Json<MoveShiftRequest>,
) -> Result<Json<Value>, AppError> {
    let registry = ShiftRegistryService::new(&state);
    let shift = registry.move_shift(shift_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "shift": shift
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let registry = ShiftRegistryService::new(&state);
    let availability = registry.availability_for(query).await;

    Ok(Json(json!({
        "success": true,
        "availability": availability
    })))
}

#[axum::debug_handler]
pub async fn get_day_roster(
    State(state): State<Arc<EngineState>>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Value>, AppError> {
    let registry = ShiftRegistryService::new(&state);
    let shifts = registry.day_roster(query.date).await;

    Ok(Json(json!({
        "success": true,
        "date": query.date,
        "shifts": shifts
    })))
}
