// libs/course-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use shared_store::EngineState;

use crate::handlers;

pub fn course_routes(state: Arc<EngineState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_course))
        .route("/expire-overdue", post(handlers::expire_overdue_courses))
        .route("/{course_id}", get(handlers::get_course))
        .route("/{course_id}", delete(handlers::delete_course))
        .route("/{course_id}/activate", post(handlers::activate_course))
        .route("/{course_id}/pause", post(handlers::pause_course))
        .route("/{course_id}/resume", post(handlers::resume_course))
        .route(
            "/{course_id}/sessions/{session_number}",
            get(handlers::get_session),
        )
        .route(
            "/{course_id}/sessions/{session_number}/schedule",
            post(handlers::schedule_session),
        )
        .route(
            "/{course_id}/sessions/{session_number}/reschedule",
            post(handlers::reschedule_session),
        )
        .route(
            "/{course_id}/sessions/{session_number}/complete",
            post(handlers::complete_session),
        )
        .with_state(state)
}
