// libs/shift-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_store::EngineState;

use crate::handlers;

pub fn shift_routes(state: Arc<EngineState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_shift))
        .route("/availability", get(handlers::get_availability))
        .route("/roster", get(handlers::get_day_roster))
        .route("/{shift_id}", get(handlers::get_shift))
        .route("/{shift_id}/approve", post(handlers::approve_shift))
        .route("/{shift_id}/reject", post(handlers::reject_shift))
        .route("/{shift_id}/move", patch(handlers::move_shift))
        .with_state(state)
}
