// libs/course-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::EngineState;

use crate::models::{
    CompleteSessionRequest, CreateCourseRequest, ExpireOverdueRequest, PauseCourseRequest,
    RescheduleSessionRequest, ScheduleSessionRequest,
};
use crate::services::{SessionSchedulingService, TreatmentCourseService};

#[axum::debug_handler]
pub async fn create_course(
    State(state): State<Arc<EngineState>>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    let course = course_service.create_course(request).await?;

    Ok(Json(json!({
        "success": true,
        "course": course
    })))
}

#[axum::debug_handler]
pub async fn get_course(
    State(state): State<Arc<EngineState>>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    let (course, sessions) = course_service.detail(course_id).await?;

    Ok(Json(json!({
        "success": true,
        "course": course,
        "sessions": sessions
    })))
}

#[axum::debug_handler]
pub async fn activate_course(
    State(state): State<Arc<EngineState>>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    let course = course_service.activate(course_id).await?;

    Ok(Json(json!({
        "success": true,
        "course": course
    })))
}

#[axum::debug_handler]
pub async fn pause_course(
    State(state): State<Arc<EngineState>>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<PauseCourseRequest>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    let course = course_service.pause(course_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "course": course
    })))
}

#[axum::debug_handler]
pub async fn resume_course(
    State(state): State<Arc<EngineState>>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    let course = course_service.resume(course_id).await?;

    Ok(Json(json!({
        "success": true,
        "course": course
    })))
}

#[axum::debug_handler]
pub async fn delete_course(
    State(state): State<Arc<EngineState>>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    course_service.delete(course_id).await?;

    Ok(Json(json!({
        "success": true
    })))
}

#[axum::debug_handler]
pub async fn expire_overdue_courses(
    State(state): State<Arc<EngineState>>,
    Json(request): Json<ExpireOverdueRequest>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    let expired = course_service.expire_overdue(request.as_of).await;

    Ok(Json(json!({
        "success": true,
        "expired_count": expired.len(),
        "expired": expired
    })))
}

#[axum::debug_handler]
pub async fn schedule_session(
    State(state): State<Arc<EngineState>>,
    Path((course_id, session_number)): Path<(Uuid, u32)>,
    Json(request): Json<ScheduleSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let scheduling = SessionSchedulingService::new(&state);
    let (session, appointment) = scheduling
        .schedule(course_id, session_number, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "session": session,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_session(
    State(state): State<Arc<EngineState>>,
    Path((course_id, session_number)): Path<(Uuid, u32)>,
    Json(request): Json<RescheduleSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let scheduling = SessionSchedulingService::new(&state);
    let (session, appointment) = scheduling
        .reschedule(course_id, session_number, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "session": session,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn complete_session(
    State(state): State<Arc<EngineState>>,
    Path((course_id, session_number)): Path<(Uuid, u32)>,
    Json(request): Json<CompleteSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let course_service = TreatmentCourseService::new(&state);
    let (course, session) = course_service
        .complete_session(course_id, session_number, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "course": course,
        "session": session
    })))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<EngineState>>,
    Path((course_id, session_number)): Path<(Uuid, u32)>,
) -> Result<Json<Value>, AppError> {
    let scheduling = SessionSchedulingService::new(&state);
    let session = scheduling.get_session(course_id, session_number).await?;

    Ok(Json(json!({
        "success": true,
        "session": session
    })))
}
