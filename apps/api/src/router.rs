use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use course_cell::router::course_routes;
use shared_store::EngineState;
use shift_cell::router::shift_routes;

pub fn create_router(state: Arc<EngineState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Scheduling engine API is running!" }))
        .nest("/shifts", shift_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/courses", course_routes(state.clone()))
}
