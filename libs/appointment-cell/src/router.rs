// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_store::EngineState;

use crate::handlers;

pub fn appointment_routes(state: Arc<EngineState>) -> Router {
    Router::new()
        .route("/bookings", post(handlers::create_booking))
        .route("/slots", get(handlers::get_slot_appointments))
        .route("/slots/report", get(handlers::get_slot_report))
        .route("/conflicts", get(handlers::list_conflicts))
        .route("/can-assign", get(handlers::check_can_assign))
        .route("/commitments", get(handlers::get_staff_commitments))
        .route("/confirmed-count", get(handlers::get_confirmed_count))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/assign", post(handlers::assign_appointment))
        .route("/{appointment_id}/start", post(handlers::start_appointment))
        .route("/{appointment_id}/finish", post(handlers::finish_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .with_state(state)
}
