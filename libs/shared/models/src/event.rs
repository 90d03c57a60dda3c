use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::appointment::Appointment;
use crate::course::{TreatmentCourse, TreatmentSession};

/// Cross-entity cascades are explicit events, produced and consumed inside
/// the store's critical section so the invariants they maintain hold
/// atomically with the triggering transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    AppointmentCancelled {
        appointment_id: Uuid,
        /// The treatment session that was bound to the appointment and has
        /// been reverted to pending, if any.
        reopened_session_id: Option<Uuid>,
    },
}

/// Outbound notification published after a transition commits. Delivery is
/// fire-and-forget; a delivery failure never rolls back the transition.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEvent {
    pub name: &'static str,
    pub payload: Value,
}

impl ScheduleEvent {
    pub fn appointment_created(appointment: &Appointment) -> Self {
        Self {
            name: "appointment.created",
            payload: json!({
                "appointment_id": appointment.id,
                "client_id": appointment.client_id,
                "booking_group_id": appointment.booking_group_id,
                "date": appointment.date,
                "time": appointment.time,
            }),
        }
    }

    pub fn appointment_confirmed(appointment: &Appointment) -> Self {
        Self {
            name: "appointment.confirmed",
            payload: json!({
                "appointment_id": appointment.id,
                "client_id": appointment.client_id,
                "therapist_id": appointment.therapist_id,
                "date": appointment.date,
                "time": appointment.time,
            }),
        }
    }

    pub fn appointment_started(appointment: &Appointment) -> Self {
        Self {
            name: "appointment.started",
            payload: json!({ "appointment_id": appointment.id }),
        }
    }

    pub fn appointment_completed(appointment: &Appointment) -> Self {
        Self {
            name: "appointment.completed",
            payload: json!({ "appointment_id": appointment.id }),
        }
    }

    pub fn appointment_cancelled(appointment: &Appointment, reopened_session: Option<Uuid>) -> Self {
        Self {
            name: "appointment.cancelled",
            payload: json!({
                "appointment_id": appointment.id,
                "reason": appointment.rejection_reason,
                "reopened_session_id": reopened_session,
            }),
        }
    }

    pub fn course_created(course: &TreatmentCourse) -> Self {
        Self {
            name: "course.created",
            payload: json!({
                "course_id": course.id,
                "client_id": course.client_id,
                "total_sessions": course.total_sessions,
                "expiry_date": course.expiry_date,
            }),
        }
    }

    pub fn course_paused(course: &TreatmentCourse) -> Self {
        Self {
            name: "course.paused",
            payload: json!({
                "course_id": course.id,
                "reason": course.pause_reason,
            }),
        }
    }

    pub fn course_resumed(course: &TreatmentCourse) -> Self {
        Self {
            name: "course.resumed",
            payload: json!({
                "course_id": course.id,
                "expiry_date": course.expiry_date,
            }),
        }
    }

    pub fn course_completed(course: &TreatmentCourse) -> Self {
        Self {
            name: "course.completed",
            payload: json!({
                "course_id": course.id,
                "client_id": course.client_id,
            }),
        }
    }

    pub fn session_scheduled(session: &TreatmentSession) -> Self {
        Self {
            name: "session.scheduled",
            payload: json!({
                "course_id": session.course_id,
                "session_number": session.session_number,
                "appointment_id": session.appointment_id,
                "date": session.scheduled_date,
                "time": session.scheduled_time,
            }),
        }
    }

    pub fn session_rescheduled(session: &TreatmentSession) -> Self {
        Self {
            name: "session.rescheduled",
            payload: json!({
                "course_id": session.course_id,
                "session_number": session.session_number,
                "appointment_id": session.appointment_id,
                "date": session.scheduled_date,
                "time": session.scheduled_time,
            }),
        }
    }

    pub fn session_completed(session: &TreatmentSession) -> Self {
        Self {
            name: "session.completed",
            payload: json!({
                "course_id": session.course_id,
                "session_number": session.session_number,
            }),
        }
    }
}
